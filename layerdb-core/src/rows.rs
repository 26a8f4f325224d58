use crate::{Result, Value};
use futures::{
    Stream, StreamExt,
    stream::{self, BoxStream},
};
use std::{
    fmt::{self, Debug, Formatter},
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(names: RowNames, values: Row) -> Self {
        Self {
            labels: names,
            values,
        }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values()[i])
    }
}

/// Rows produced by a query: the column labels, known up front, and a stream
/// of row values.
///
/// `Rows` is itself a [`Stream`] of [`RowLabeled`]. Dropping it releases the
/// underlying cursor.
pub struct Rows {
    labels: RowNames,
    stream: BoxStream<'static, Result<Row>>,
}

impl Rows {
    pub fn new(labels: RowNames, stream: BoxStream<'static, Result<Row>>) -> Self {
        Self { labels, stream }
    }

    /// Rows already materialized in memory.
    pub fn from_rows<I>(labels: impl Into<RowNames>, rows: I) -> Self
    where
        I: IntoIterator<Item = Row>,
        I::IntoIter: Send + 'static,
    {
        Self::new(labels.into(), stream::iter(rows.into_iter().map(Ok)).boxed())
    }

    /// No columns and no rows.
    pub fn empty() -> Self {
        Self::from_rows(Vec::<String>::new(), Vec::new())
    }

    pub fn columns(&self) -> &[String] {
        &self.labels
    }
}

impl Stream for Rows {
    type Item = Result<RowLabeled>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let labels = self.labels.clone();
        self.stream
            .poll_next_unpin(cx)
            .map(|row| row.map(|row| row.map(|values| RowLabeled::new(labels, values))))
    }
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rows")
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted / affected identifier when available.
    pub last_affected_id: Option<i64>,
}

impl RowsAffected {
    pub fn new(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            last_affected_id: None,
        }
    }
}
