use crate::backend::{Backend, bump};
use layerdb_core::{Result, Tx, async_trait};
use std::sync::Arc;

pub struct FakeTransaction {
    backend: Arc<Backend>,
}

impl FakeTransaction {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tx for FakeTransaction {
    async fn commit(&self) -> Result<()> {
        bump(&self.backend.counters.commits);
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        bump(&self.backend.counters.rollbacks);
        Ok(())
    }
}
