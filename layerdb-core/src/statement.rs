use crate::{Context, NamedValue, NamedValueChecker, Result, Rows, RowsAffected, Value};
use async_trait::async_trait;
use std::sync::Arc;

/// A backend prepared statement.
///
/// Context-aware execution is an optional capability exposed through
/// [`Stmt::as_query_context`] and [`Stmt::as_exec_context`].
#[async_trait]
pub trait Stmt: Send + Sync {
    async fn close(&self) -> Result<()>;

    /// Number of placeholders, `None` when the driver cannot tell.
    fn num_input(&self) -> Option<usize>;

    async fn query(&self, args: &[Value]) -> Result<Rows>;

    async fn exec(&self, args: &[Value]) -> Result<RowsAffected>;

    fn as_query_context(self: Arc<Self>) -> Option<Arc<dyn StmtQueryContext>> {
        None
    }

    fn as_exec_context(self: Arc<Self>) -> Option<Arc<dyn StmtExecContext>> {
        None
    }

    fn as_named_value_checker(self: Arc<Self>) -> Option<Arc<dyn NamedValueChecker>> {
        None
    }
}

#[async_trait]
pub trait StmtQueryContext: Send + Sync {
    async fn query_context(&self, ctx: &Context, args: &[NamedValue]) -> Result<Rows>;
}

#[async_trait]
pub trait StmtExecContext: Send + Sync {
    async fn exec_context(&self, ctx: &Context, args: &[NamedValue]) -> Result<RowsAffected>;
}
