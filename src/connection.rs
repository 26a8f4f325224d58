use crate::{
    ConnCapabilities, LayerStatement, Strategy,
    middleware::{ExecInterceptor, MiddlewareGroup, QueryInterceptor, Request},
};
use layerdb_core::{
    Conn, ConnBeginTx, ConnPrepareContext, Context, DefaultChecker, DriverError, ExecerContext,
    IsolationLevel, NamedValue, NamedValueChecker, Pinger, QueryerContext, Result, Rows,
    RowsAffected, Stmt, Tx, TxOptions, async_trait, truncate_long,
};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// Query used to check a connection that cannot ping by itself.
pub const PING_QUERY: &str = "SELECT ?";

struct Inner {
    target: Arc<dyn Conn>,
    capabilities: ConnCapabilities,
    middleware: MiddlewareGroup,
}

impl Inner {
    async fn prepare_context(&self, ctx: &Context, query: &str) -> Result<LayerStatement> {
        let statement = match &self.capabilities.prepare_context {
            Some(preparer) => preparer.prepare_context(ctx, query).await?,
            None => {
                ctx.check()?;
                log::trace!("Legacy prepare {}", truncate_long!(query));
                self.target.prepare(query).await?
            }
        };
        LayerStatement::new(
            statement,
            self.capabilities.named_value_checker.clone(),
            query,
            &self.middleware,
        )
        .await
    }
}

/// Closes the statement whatever happened with the call, a close error is
/// only logged.
async fn close_after<T>(statement: LayerStatement, result: Result<T>) -> Result<T> {
    if let Err(e) = statement.close().await {
        log::warn!(
            "Could not close the statement {}: {:#}",
            truncate_long!(statement.query_text()),
            e
        );
    }
    result
}

/// A driver connection with the connection middleware applied.
///
/// The query and execute paths are resolved once, when the connection is
/// wrapped: the native context-aware capability, else the legacy one, else a
/// statement prepared through this connection (so statement middleware runs
/// too) and closed right after the call.
///
/// # Example
///
/// ```rust,ignore
/// let connection = LayerConnection::new(conn, group);
/// let result = connection
///     .exec_context(
///         &Context::background(),
///         "UPDATE users SET status = ? WHERE id = ?",
///         positional(["paid".into(), Value::from(100_i64)]),
///     )
///     .await?;
/// ```
#[derive(Clone)]
pub struct LayerConnection {
    inner: Arc<Inner>,
    query: QueryInterceptor,
    exec: ExecInterceptor,
}

impl LayerConnection {
    pub fn new(target: Arc<dyn Conn>, middleware: MiddlewareGroup) -> Self {
        let capabilities = ConnCapabilities::probe(&target);
        log::debug!(
            "Connection resolved query {:?}, exec {:?} from {:?}",
            capabilities.query_strategy(),
            capabilities.exec_strategy(),
            capabilities,
        );
        let inner = Arc::new(Inner {
            target,
            capabilities,
            middleware,
        });
        let mut query = inner
            .capabilities
            .query_interceptor()
            .unwrap_or_else(|| prepared_query(inner.clone()));
        let mut exec = inner
            .capabilities
            .exec_interceptor()
            .unwrap_or_else(|| prepared_exec(inner.clone()));
        if let Some(middleware) = &inner.middleware.query {
            query = middleware.wrap(query);
        }
        if let Some(middleware) = &inner.middleware.exec {
            exec = middleware.wrap(exec);
        }
        Self { inner, query, exec }
    }

    /// Checks the connection with the driver pinger, else by running
    /// [`PING_QUERY`] with the argument `1` through the query path.
    pub async fn ping(&self, ctx: &Context) -> Result<()> {
        if let Some(pinger) = &self.inner.capabilities.pinger {
            return pinger.ping(ctx).await;
        }
        log::trace!("Emulating ping with {}", PING_QUERY);
        self.query_context(ctx, PING_QUERY, vec![NamedValue::new(1, 1_i64)])
            .await
            .map(|_| ())
    }

    pub async fn prepare_context(&self, ctx: &Context, query: &str) -> Result<LayerStatement> {
        self.inner.prepare_context(ctx, query).await
    }

    pub async fn close(&self) -> Result<()> {
        self.inner.target.close().await
    }

    /// Starts a transaction.
    ///
    /// Without native support only default options are accepted, and a
    /// context cancelled right after the begin rolls the transaction back and
    /// returns the cancellation error.
    pub async fn begin_tx(&self, ctx: &Context, opts: TxOptions) -> Result<Box<dyn Tx>> {
        if let Some(begin) = &self.inner.capabilities.begin_tx {
            return begin.begin_tx(ctx, opts).await;
        }
        if opts.isolation != IsolationLevel::Default {
            return Err(DriverError::IsolationLevelUnsupported(opts.isolation).into());
        }
        if opts.read_only {
            return Err(DriverError::ReadOnlyUnsupported.into());
        }
        log::trace!("Legacy begin");
        let tx = self.inner.target.begin().await?;
        if !ctx.is_cancellable() {
            return Ok(tx);
        }
        match ctx.err() {
            Some(reason) => {
                if let Err(e) = tx.rollback().await {
                    log::warn!("Could not roll back the canceled transaction: {:#}", e);
                }
                Err(reason.into())
            }
            None => Ok(tx),
        }
    }

    pub async fn query_context(
        &self,
        ctx: &Context,
        query: &str,
        args: Vec<NamedValue>,
    ) -> Result<Rows> {
        self.query.call(ctx.clone(), Request::new(query, args)).await
    }

    pub async fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: Vec<NamedValue>,
    ) -> Result<RowsAffected> {
        self.exec.call(ctx.clone(), Request::new(query, args)).await
    }

    /// Converts an argument with the checker of the connection, else
    /// [`DefaultChecker`].
    pub fn check_named_value(&self, nv: &mut NamedValue) -> Result<()> {
        match &self.inner.capabilities.named_value_checker {
            Some(checker) => checker.check_named_value(nv),
            None => DefaultChecker.check_named_value(nv),
        }
    }

    pub fn query_strategy(&self) -> Strategy {
        self.inner.capabilities.query_strategy()
    }

    pub fn exec_strategy(&self) -> Strategy {
        self.inner.capabilities.exec_strategy()
    }

    pub fn capabilities(&self) -> &ConnCapabilities {
        &self.inner.capabilities
    }
}

fn prepared_query(inner: Arc<Inner>) -> QueryInterceptor {
    QueryInterceptor::new(move |ctx, request: Request| {
        let inner = inner.clone();
        async move {
            log::trace!("Prepared query {}", truncate_long!(request.query));
            let statement = inner.prepare_context(&ctx, &request.query).await?;
            let result = statement.query_context(&ctx, request.args).await;
            close_after(statement, result).await
        }
    })
}

fn prepared_exec(inner: Arc<Inner>) -> ExecInterceptor {
    ExecInterceptor::new(move |ctx, request: Request| {
        let inner = inner.clone();
        async move {
            log::trace!("Prepared exec {}", truncate_long!(request.query));
            let statement = inner.prepare_context(&ctx, &request.query).await?;
            let result = statement.exec_context(&ctx, request.args).await;
            close_after(statement, result).await
        }
    })
}

impl Debug for LayerConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerConnection")
            .field("capabilities", &self.inner.capabilities)
            .field("middleware", &self.inner.middleware)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Conn for LayerConnection {
    async fn prepare(&self, _query: &str) -> Result<Arc<dyn Stmt>> {
        Err(DriverError::UpgradeRequired("Conn::prepare").into())
    }

    async fn close(&self) -> Result<()> {
        LayerConnection::close(self).await
    }

    async fn begin(&self) -> Result<Box<dyn Tx>> {
        Err(DriverError::UpgradeRequired("Conn::begin").into())
    }

    fn as_pinger(self: Arc<Self>) -> Option<Arc<dyn Pinger>> {
        Some(self)
    }

    fn as_prepare_context(self: Arc<Self>) -> Option<Arc<dyn ConnPrepareContext>> {
        Some(self)
    }

    fn as_begin_tx(self: Arc<Self>) -> Option<Arc<dyn ConnBeginTx>> {
        Some(self)
    }

    fn as_queryer_context(self: Arc<Self>) -> Option<Arc<dyn QueryerContext>> {
        Some(self)
    }

    fn as_execer_context(self: Arc<Self>) -> Option<Arc<dyn ExecerContext>> {
        Some(self)
    }

    fn as_named_value_checker(self: Arc<Self>) -> Option<Arc<dyn NamedValueChecker>> {
        Some(self)
    }
}

#[async_trait]
impl Pinger for LayerConnection {
    async fn ping(&self, ctx: &Context) -> Result<()> {
        LayerConnection::ping(self, ctx).await
    }
}

#[async_trait]
impl ConnPrepareContext for LayerConnection {
    async fn prepare_context(&self, ctx: &Context, query: &str) -> Result<Arc<dyn Stmt>> {
        Ok(Arc::new(LayerConnection::prepare_context(self, ctx, query).await?))
    }
}

#[async_trait]
impl ConnBeginTx for LayerConnection {
    async fn begin_tx(&self, ctx: &Context, opts: TxOptions) -> Result<Box<dyn Tx>> {
        LayerConnection::begin_tx(self, ctx, opts).await
    }
}

#[async_trait]
impl QueryerContext for LayerConnection {
    async fn query_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<Rows> {
        LayerConnection::query_context(self, ctx, query, args.to_vec()).await
    }
}

#[async_trait]
impl ExecerContext for LayerConnection {
    async fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<RowsAffected> {
        LayerConnection::exec_context(self, ctx, query, args.to_vec()).await
    }
}

impl NamedValueChecker for LayerConnection {
    fn check_named_value(&self, nv: &mut NamedValue) -> Result<()> {
        LayerConnection::check_named_value(self, nv)
    }
}
