use crate::{
    middleware::{
        ExecInterceptor, QueryInterceptor, Request, StmtExecInterceptor, StmtQueryInterceptor,
    },
    named_value_to_value,
};
use layerdb_core::{
    Conn, ConnBeginTx, ConnPrepareContext, DriverError, Error, Execer, ExecerContext, NamedValue,
    NamedValueChecker, Pinger, Queryer, QueryerContext, Rows, RowsAffected, Stmt, StmtExecContext,
    StmtQueryContext, truncate_long,
};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// How a call reaches the wrapped driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// The context-aware capability of the handle.
    Native,
    /// The legacy positional call, after a cancellation check.
    Legacy,
    /// Prepare a statement, run it, close it.
    Prepared,
    /// Every call fails.
    Unsupported,
}

/// Optional capabilities of a driver connection, probed once.
#[derive(Clone)]
pub struct ConnCapabilities {
    pub pinger: Option<Arc<dyn Pinger>>,
    pub prepare_context: Option<Arc<dyn ConnPrepareContext>>,
    pub begin_tx: Option<Arc<dyn ConnBeginTx>>,
    pub queryer_context: Option<Arc<dyn QueryerContext>>,
    pub queryer: Option<Arc<dyn Queryer>>,
    pub execer_context: Option<Arc<dyn ExecerContext>>,
    pub execer: Option<Arc<dyn Execer>>,
    pub named_value_checker: Option<Arc<dyn NamedValueChecker>>,
}

impl ConnCapabilities {
    pub fn probe(conn: &Arc<dyn Conn>) -> Self {
        Self {
            pinger: conn.clone().as_pinger(),
            prepare_context: conn.clone().as_prepare_context(),
            begin_tx: conn.clone().as_begin_tx(),
            queryer_context: conn.clone().as_queryer_context(),
            queryer: conn.clone().as_queryer(),
            execer_context: conn.clone().as_execer_context(),
            execer: conn.clone().as_execer(),
            named_value_checker: conn.clone().as_named_value_checker(),
        }
    }

    pub fn query_strategy(&self) -> Strategy {
        if self.queryer_context.is_some() {
            Strategy::Native
        } else if self.queryer.is_some() {
            Strategy::Legacy
        } else {
            Strategy::Prepared
        }
    }

    pub fn exec_strategy(&self) -> Strategy {
        if self.execer_context.is_some() {
            Strategy::Native
        } else if self.execer.is_some() {
            Strategy::Legacy
        } else {
            Strategy::Prepared
        }
    }

    /// The direct query interceptor, `None` when only the prepared path is
    /// left.
    pub(crate) fn query_interceptor(&self) -> Option<QueryInterceptor> {
        if let Some(queryer) = &self.queryer_context {
            let queryer = queryer.clone();
            return Some(QueryInterceptor::new(move |ctx, request: Request| {
                let queryer = queryer.clone();
                async move {
                    queryer
                        .query_context(&ctx, &request.query, &request.args)
                        .await
                }
            }));
        }
        let queryer = self.queryer.clone()?;
        Some(QueryInterceptor::new(move |ctx, request: Request| {
            let queryer = queryer.clone();
            async move {
                ctx.check()?;
                let values = named_value_to_value(&request.args)?;
                log::trace!("Legacy query {}", truncate_long!(request.query));
                queryer.query(&request.query, &values).await
            }
        }))
    }

    pub(crate) fn exec_interceptor(&self) -> Option<ExecInterceptor> {
        if let Some(execer) = &self.execer_context {
            let execer = execer.clone();
            return Some(ExecInterceptor::new(move |ctx, request: Request| {
                let execer = execer.clone();
                async move {
                    execer
                        .exec_context(&ctx, &request.query, &request.args)
                        .await
                }
            }));
        }
        let execer = self.execer.clone()?;
        Some(ExecInterceptor::new(move |ctx, request: Request| {
            let execer = execer.clone();
            async move {
                ctx.check()?;
                let values = named_value_to_value(&request.args)?;
                log::trace!("Legacy exec {}", truncate_long!(request.query));
                execer.exec(&request.query, &values).await
            }
        }))
    }
}

impl Debug for ConnCapabilities {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnCapabilities")
            .field("pinger", &self.pinger.is_some())
            .field("prepare_context", &self.prepare_context.is_some())
            .field("begin_tx", &self.begin_tx.is_some())
            .field("queryer_context", &self.queryer_context.is_some())
            .field("queryer", &self.queryer.is_some())
            .field("execer_context", &self.execer_context.is_some())
            .field("execer", &self.execer.is_some())
            .field("named_value_checker", &self.named_value_checker.is_some())
            .finish()
    }
}

/// Optional capabilities of a prepared statement, probed once.
#[derive(Clone)]
pub struct StmtCapabilities {
    pub query_context: Option<Arc<dyn StmtQueryContext>>,
    pub exec_context: Option<Arc<dyn StmtExecContext>>,
    pub named_value_checker: Option<Arc<dyn NamedValueChecker>>,
}

impl StmtCapabilities {
    pub fn probe(stmt: &Arc<dyn Stmt>) -> Self {
        Self {
            query_context: stmt.clone().as_query_context(),
            exec_context: stmt.clone().as_exec_context(),
            named_value_checker: stmt.clone().as_named_value_checker(),
        }
    }

    pub fn query_strategy(&self) -> Strategy {
        match self.query_context {
            Some(..) => Strategy::Native,
            None => Strategy::Unsupported,
        }
    }

    pub fn exec_strategy(&self) -> Strategy {
        match self.exec_context {
            Some(..) => Strategy::Native,
            None => Strategy::Unsupported,
        }
    }

    pub(crate) fn query_interceptor(&self) -> StmtQueryInterceptor {
        match &self.query_context {
            Some(stmt) => {
                let stmt = stmt.clone();
                StmtQueryInterceptor::new(move |ctx, args: Vec<NamedValue>| {
                    let stmt = stmt.clone();
                    async move { stmt.query_context(&ctx, &args).await }
                })
            }
            None => StmtQueryInterceptor::new(|_, _| async {
                Err::<Rows, Error>(DriverError::NotSupported("statement query context").into())
            }),
        }
    }

    pub(crate) fn exec_interceptor(&self) -> StmtExecInterceptor {
        match &self.exec_context {
            Some(stmt) => {
                let stmt = stmt.clone();
                StmtExecInterceptor::new(move |ctx, args: Vec<NamedValue>| {
                    let stmt = stmt.clone();
                    async move { stmt.exec_context(&ctx, &args).await }
                })
            }
            None => StmtExecInterceptor::new(|_, _| async {
                Err::<RowsAffected, Error>(
                    DriverError::NotSupported("statement exec context").into(),
                )
            }),
        }
    }
}

impl Debug for StmtCapabilities {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("StmtCapabilities")
            .field("query_context", &self.query_context.is_some())
            .field("exec_context", &self.exec_context.is_some())
            .field("named_value_checker", &self.named_value_checker.is_some())
            .finish()
    }
}
