use crate::{
    Via,
    backend::{Backend, bump, from_values},
};
use layerdb_core::{
    Context, NamedValue, NamedValueChecker, Result, Rows, RowsAffected, Stmt, StmtExecContext,
    StmtQueryContext, Value, async_trait,
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

pub struct FakeStatement {
    backend: Arc<Backend>,
    query: String,
    closed: AtomicBool,
}

impl FakeStatement {
    pub(crate) fn new(backend: Arc<Backend>, query: &str) -> Self {
        Self {
            backend,
            query: query.into(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn query_text(&self) -> &str {
        &self.query
    }
}

#[async_trait]
impl Stmt for FakeStatement {
    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            bump(&self.backend.counters.closed_statements);
        }
        Ok(())
    }

    /// Number of `?` placeholders.
    fn num_input(&self) -> Option<usize> {
        Some(self.query.matches('?').count())
    }

    async fn query(&self, args: &[Value]) -> Result<Rows> {
        self.backend
            .query(&self.query, from_values(args), Via::StatementLegacy)
    }

    async fn exec(&self, args: &[Value]) -> Result<RowsAffected> {
        self.backend
            .exec(&self.query, from_values(args), Via::StatementLegacy)
    }

    fn as_query_context(self: Arc<Self>) -> Option<Arc<dyn StmtQueryContext>> {
        if self.backend.capabilities.stmt_query_context {
            Some(self)
        } else {
            None
        }
    }

    fn as_exec_context(self: Arc<Self>) -> Option<Arc<dyn StmtExecContext>> {
        if self.backend.capabilities.stmt_exec_context {
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
impl StmtQueryContext for FakeStatement {
    async fn query_context(&self, ctx: &Context, args: &[NamedValue]) -> Result<Rows> {
        ctx.check()?;
        self.backend.query(&self.query, args.to_vec(), Via::Statement)
    }
}

#[async_trait]
impl StmtExecContext for FakeStatement {
    async fn exec_context(&self, ctx: &Context, args: &[NamedValue]) -> Result<RowsAffected> {
        ctx.check()?;
        self.backend.exec(&self.query, args.to_vec(), Via::Statement)
    }
}

impl NamedValueChecker for FakeStatement {
    fn check_named_value(&self, _nv: &mut NamedValue) -> Result<()> {
        Ok(())
    }
}
