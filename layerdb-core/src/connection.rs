use crate::{
    Context, NamedValue, NamedValueChecker, Result, Rows, RowsAffected, Stmt, Tx, TxOptions, Value,
};
use async_trait::async_trait;
use std::sync::Arc;

/// A live connection to a database.
///
/// The required methods are the legacy, context-less contract. Everything
/// else is an optional capability that a connection exposes by overriding the
/// matching `as_*` method, for example:
///
/// ```rust,ignore
/// fn as_queryer_context(self: Arc<Self>) -> Option<Arc<dyn QueryerContext>> {
///     Some(self)
/// }
/// ```
///
/// Callers probe the capabilities once and keep the returned handles.
#[async_trait]
pub trait Conn: Send + Sync {
    async fn prepare(&self, query: &str) -> Result<Arc<dyn Stmt>>;

    async fn close(&self) -> Result<()>;

    async fn begin(&self) -> Result<Box<dyn Tx>>;

    fn as_pinger(self: Arc<Self>) -> Option<Arc<dyn Pinger>> {
        None
    }

    fn as_prepare_context(self: Arc<Self>) -> Option<Arc<dyn ConnPrepareContext>> {
        None
    }

    fn as_begin_tx(self: Arc<Self>) -> Option<Arc<dyn ConnBeginTx>> {
        None
    }

    fn as_queryer_context(self: Arc<Self>) -> Option<Arc<dyn QueryerContext>> {
        None
    }

    fn as_queryer(self: Arc<Self>) -> Option<Arc<dyn Queryer>> {
        None
    }

    fn as_execer_context(self: Arc<Self>) -> Option<Arc<dyn ExecerContext>> {
        None
    }

    fn as_execer(self: Arc<Self>) -> Option<Arc<dyn Execer>> {
        None
    }

    fn as_named_value_checker(self: Arc<Self>) -> Option<Arc<dyn NamedValueChecker>> {
        None
    }
}

/// Verifies the connection is still alive.
#[async_trait]
pub trait Pinger: Send + Sync {
    async fn ping(&self, ctx: &Context) -> Result<()>;
}

#[async_trait]
pub trait ConnPrepareContext: Send + Sync {
    async fn prepare_context(&self, ctx: &Context, query: &str) -> Result<Arc<dyn Stmt>>;
}

#[async_trait]
pub trait ConnBeginTx: Send + Sync {
    async fn begin_tx(&self, ctx: &Context, opts: TxOptions) -> Result<Box<dyn Tx>>;
}

/// Context-aware query directly on the connection, without preparing.
#[async_trait]
pub trait QueryerContext: Send + Sync {
    async fn query_context(&self, ctx: &Context, query: &str, args: &[NamedValue])
    -> Result<Rows>;
}

/// Legacy query: positional values only, no cancellation.
#[async_trait]
pub trait Queryer: Send + Sync {
    async fn query(&self, query: &str, args: &[Value]) -> Result<Rows>;
}

#[async_trait]
pub trait ExecerContext: Send + Sync {
    async fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<RowsAffected>;
}

/// Legacy execute: positional values only, no cancellation.
#[async_trait]
pub trait Execer: Send + Sync {
    async fn exec(&self, query: &str, args: &[Value]) -> Result<RowsAffected>;
}
