use super::{
    ExecMiddleware, QueryMiddleware, StmtExecMiddlewareFactory, StmtQueryMiddlewareFactory,
};
use std::fmt::{self, Debug, Formatter};

/// The hooks a [`crate::LayerDriver`] installs on every connection and
/// statement it creates. An absent hook is a pass-through.
///
/// Registering a hook that is already set chains the new middleware inside
/// the existing one, so the first registered stays outermost.
///
/// ```rust,ignore
/// let group = MiddlewareGroup::new()
///     .with_query(tracing)
///     .with_exec(tracing_exec)
///     .with_stmt_exec(retry_factory(|query| query.starts_with("UPDATE").then(RetryConfig::new)));
/// ```
#[derive(Default, Clone)]
pub struct MiddlewareGroup {
    /// Wraps `query_context` of every connection.
    pub query: Option<QueryMiddleware>,
    /// Wraps `exec_context` of every connection.
    pub exec: Option<ExecMiddleware>,
    /// Builds the wrapper of `query_context` for every prepared statement.
    pub stmt_query: Option<StmtQueryMiddlewareFactory>,
    /// Builds the wrapper of `exec_context` for every prepared statement.
    pub stmt_exec: Option<StmtExecMiddlewareFactory>,
}

impl MiddlewareGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, middleware: QueryMiddleware) -> Self {
        self.query = Some(match self.query {
            Some(current) => current.then(middleware),
            None => middleware,
        });
        self
    }

    pub fn with_exec(mut self, middleware: ExecMiddleware) -> Self {
        self.exec = Some(match self.exec {
            Some(current) => current.then(middleware),
            None => middleware,
        });
        self
    }

    pub fn with_stmt_query(mut self, factory: StmtQueryMiddlewareFactory) -> Self {
        self.stmt_query = Some(match self.stmt_query {
            Some(current) => current.then(factory),
            None => factory,
        });
        self
    }

    pub fn with_stmt_exec(mut self, factory: StmtExecMiddlewareFactory) -> Self {
        self.stmt_exec = Some(match self.stmt_exec {
            Some(current) => current.then(factory),
            None => factory,
        });
        self
    }

    /// Merges `other` inside `self`, hook by hook.
    pub fn merge(self, other: MiddlewareGroup) -> Self {
        let mut result = self;
        if let Some(m) = other.query {
            result = result.with_query(m);
        }
        if let Some(m) = other.exec {
            result = result.with_exec(m);
        }
        if let Some(f) = other.stmt_query {
            result = result.with_stmt_query(f);
        }
        if let Some(f) = other.stmt_exec {
            result = result.with_stmt_exec(f);
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.exec.is_none()
            && self.stmt_query.is_none()
            && self.stmt_exec.is_none()
    }
}

impl Debug for MiddlewareGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareGroup")
            .field("query", &self.query.is_some())
            .field("exec", &self.exec.is_some())
            .field("stmt_query", &self.stmt_query.is_some())
            .field("stmt_exec", &self.stmt_exec.is_some())
            .finish()
    }
}
