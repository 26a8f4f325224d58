use crate::{
    StmtCapabilities, Strategy,
    middleware::{MiddlewareGroup, StmtExecInterceptor, StmtQueryInterceptor},
};
use layerdb_core::{
    Context, DefaultChecker, DriverError, NamedValue, NamedValueChecker, Result, Rows,
    RowsAffected, Stmt, StmtExecContext, StmtQueryContext, Value, async_trait, truncate_long,
};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// A prepared statement with the statement middleware of its connection
/// applied.
///
/// The middleware is built once, at prepare time, from the factories of the
/// [`MiddlewareGroup`] which receive the query text. Only the context-aware
/// capabilities of the backing statement are used: when one is missing the
/// matching call fails with [`DriverError::NotSupported`].
#[derive(Clone)]
pub struct LayerStatement {
    target: Arc<dyn Stmt>,
    capabilities: StmtCapabilities,
    conn_checker: Option<Arc<dyn NamedValueChecker>>,
    query_text: Arc<str>,
    query: StmtQueryInterceptor,
    exec: StmtExecInterceptor,
}

impl LayerStatement {
    /// Wraps `target`, prepared from `query_text`.
    ///
    /// When a factory fails the backing statement is closed and the factory
    /// error returned.
    pub async fn new(
        target: Arc<dyn Stmt>,
        conn_checker: Option<Arc<dyn NamedValueChecker>>,
        query_text: &str,
        middleware: &MiddlewareGroup,
    ) -> Result<Self> {
        let capabilities = StmtCapabilities::probe(&target);
        log::debug!(
            "Statement {} resolved query {:?}, exec {:?}",
            truncate_long!(query_text),
            capabilities.query_strategy(),
            capabilities.exec_strategy(),
        );
        let (query, exec) = match interceptors(&capabilities, middleware, query_text) {
            Ok(v) => v,
            Err(error) => {
                if let Err(e) = target.close().await {
                    log::warn!(
                        "Could not close the statement {} after a middleware error: {:#}",
                        truncate_long!(query_text),
                        e
                    );
                }
                return Err(error);
            }
        };
        Ok(Self {
            target,
            capabilities,
            conn_checker,
            query_text: query_text.into(),
            query,
            exec,
        })
    }

    pub async fn close(&self) -> Result<()> {
        self.target.close().await
    }

    pub fn num_input(&self) -> Option<usize> {
        self.target.num_input()
    }

    pub async fn query_context(&self, ctx: &Context, args: Vec<NamedValue>) -> Result<Rows> {
        self.query.call(ctx.clone(), args).await
    }

    pub async fn exec_context(&self, ctx: &Context, args: Vec<NamedValue>) -> Result<RowsAffected> {
        self.exec.call(ctx.clone(), args).await
    }

    /// Converts an argument with the checker of the statement, else the one
    /// of the connection, else [`DefaultChecker`].
    pub fn check_named_value(&self, nv: &mut NamedValue) -> Result<()> {
        match (&self.capabilities.named_value_checker, &self.conn_checker) {
            (Some(checker), _) | (None, Some(checker)) => checker.check_named_value(nv),
            (None, None) => DefaultChecker.check_named_value(nv),
        }
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn query_strategy(&self) -> Strategy {
        self.capabilities.query_strategy()
    }

    pub fn exec_strategy(&self) -> Strategy {
        self.capabilities.exec_strategy()
    }
}

fn interceptors(
    capabilities: &StmtCapabilities,
    middleware: &MiddlewareGroup,
    query_text: &str,
) -> Result<(StmtQueryInterceptor, StmtExecInterceptor)> {
    let mut query = capabilities.query_interceptor();
    let mut exec = capabilities.exec_interceptor();
    if let Some(factory) = &middleware.stmt_query {
        query = factory.build(query_text)?.wrap(query);
    }
    if let Some(factory) = &middleware.stmt_exec {
        exec = factory.build(query_text)?.wrap(exec);
    }
    Ok((query, exec))
}

impl Debug for LayerStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerStatement")
            .field("query_text", &self.query_text)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Stmt for LayerStatement {
    async fn close(&self) -> Result<()> {
        LayerStatement::close(self).await
    }

    fn num_input(&self) -> Option<usize> {
        LayerStatement::num_input(self)
    }

    async fn query(&self, _args: &[Value]) -> Result<Rows> {
        Err(DriverError::UpgradeRequired("Stmt::query").into())
    }

    async fn exec(&self, _args: &[Value]) -> Result<RowsAffected> {
        Err(DriverError::UpgradeRequired("Stmt::exec").into())
    }

    fn as_query_context(self: Arc<Self>) -> Option<Arc<dyn StmtQueryContext>> {
        Some(self)
    }

    fn as_exec_context(self: Arc<Self>) -> Option<Arc<dyn StmtExecContext>> {
        Some(self)
    }

    fn as_named_value_checker(self: Arc<Self>) -> Option<Arc<dyn NamedValueChecker>> {
        Some(self)
    }
}

#[async_trait]
impl StmtQueryContext for LayerStatement {
    async fn query_context(&self, ctx: &Context, args: &[NamedValue]) -> Result<Rows> {
        LayerStatement::query_context(self, ctx, args.to_vec()).await
    }
}

#[async_trait]
impl StmtExecContext for LayerStatement {
    async fn exec_context(&self, ctx: &Context, args: &[NamedValue]) -> Result<RowsAffected> {
        LayerStatement::exec_context(self, ctx, args.to_vec()).await
    }
}

impl NamedValueChecker for LayerStatement {
    fn check_named_value(&self, nv: &mut NamedValue) -> Result<()> {
        LayerStatement::check_named_value(self, nv)
    }
}
