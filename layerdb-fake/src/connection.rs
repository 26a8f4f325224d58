use crate::{
    Call, FakeStatement, FakeTransaction, Via,
    backend::{Backend, bump, from_values},
};
use layerdb_core::{
    Conn, ConnBeginTx, ConnPrepareContext, Context, Execer, ExecerContext, NamedValue,
    NamedValueChecker, Pinger, Queryer, QueryerContext, Result, Rows, RowsAffected, Stmt, Tx,
    TxOptions, Value, async_trait,
};
use std::sync::Arc;

pub struct FakeConnection {
    backend: Arc<Backend>,
}

impl FakeConnection {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }

    fn statement(&self, query: &str) -> Arc<dyn Stmt> {
        bump(&self.backend.counters.prepared);
        Arc::new(FakeStatement::new(self.backend.clone(), query))
    }

    fn transaction(&self, options: TxOptions) -> Result<Box<dyn Tx>> {
        self.backend.begin(options)?;
        Ok(Box::new(FakeTransaction::new(self.backend.clone())))
    }
}

#[async_trait]
impl Conn for FakeConnection {
    async fn prepare(&self, query: &str) -> Result<Arc<dyn Stmt>> {
        self.backend.record(Call::Prepare(query.into()));
        Ok(self.statement(query))
    }

    async fn close(&self) -> Result<()> {
        bump(&self.backend.counters.closed_connections);
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn Tx>> {
        self.transaction(TxOptions::default())
    }

    fn as_pinger(self: Arc<Self>) -> Option<Arc<dyn Pinger>> {
        if self.backend.capabilities.pinger {
            Some(self)
        } else {
            None
        }
    }

    fn as_prepare_context(self: Arc<Self>) -> Option<Arc<dyn ConnPrepareContext>> {
        if self.backend.capabilities.prepare_context {
            Some(self)
        } else {
            None
        }
    }

    fn as_begin_tx(self: Arc<Self>) -> Option<Arc<dyn ConnBeginTx>> {
        if self.backend.capabilities.begin_tx {
            Some(self)
        } else {
            None
        }
    }

    fn as_queryer_context(self: Arc<Self>) -> Option<Arc<dyn QueryerContext>> {
        if self.backend.capabilities.queryer_context {
            Some(self)
        } else {
            None
        }
    }

    fn as_queryer(self: Arc<Self>) -> Option<Arc<dyn Queryer>> {
        if self.backend.capabilities.queryer {
            Some(self)
        } else {
            None
        }
    }

    fn as_execer_context(self: Arc<Self>) -> Option<Arc<dyn ExecerContext>> {
        if self.backend.capabilities.execer_context {
            Some(self)
        } else {
            None
        }
    }

    fn as_execer(self: Arc<Self>) -> Option<Arc<dyn Execer>> {
        if self.backend.capabilities.execer {
            Some(self)
        } else {
            None
        }
    }

    fn as_named_value_checker(self: Arc<Self>) -> Option<Arc<dyn NamedValueChecker>> {
        if self.backend.capabilities.named_value_checker {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl Pinger for FakeConnection {
    async fn ping(&self, ctx: &Context) -> Result<()> {
        ctx.check()?;
        self.backend.ping()
    }
}

#[async_trait]
impl ConnPrepareContext for FakeConnection {
    async fn prepare_context(&self, ctx: &Context, query: &str) -> Result<Arc<dyn Stmt>> {
        ctx.check()?;
        self.backend.record(Call::Prepare(query.into()));
        Ok(self.statement(query))
    }
}

#[async_trait]
impl ConnBeginTx for FakeConnection {
    async fn begin_tx(&self, ctx: &Context, opts: TxOptions) -> Result<Box<dyn Tx>> {
        ctx.check()?;
        self.transaction(opts)
    }
}

#[async_trait]
impl QueryerContext for FakeConnection {
    async fn query_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<Rows> {
        ctx.check()?;
        self.backend.query(query, args.to_vec(), Via::Context)
    }
}

#[async_trait]
impl Queryer for FakeConnection {
    async fn query(&self, query: &str, args: &[Value]) -> Result<Rows> {
        self.backend.query(query, from_values(args), Via::Legacy)
    }
}

#[async_trait]
impl ExecerContext for FakeConnection {
    async fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<RowsAffected> {
        ctx.check()?;
        self.backend.exec(query, args.to_vec(), Via::Context)
    }
}

#[async_trait]
impl Execer for FakeConnection {
    async fn exec(&self, query: &str, args: &[Value]) -> Result<RowsAffected> {
        self.backend.exec(query, from_values(args), Via::Legacy)
    }
}

/// Accepts every value unchanged.
impl NamedValueChecker for FakeConnection {
    fn check_named_value(&self, _nv: &mut NamedValue) -> Result<()> {
        Ok(())
    }
}
