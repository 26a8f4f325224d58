use crate::{
    BeginHook, Call, ExecHook, FakeCapabilities, FakeConnection, PingHook, QueryHook,
    backend::{Backend, bump, get},
};
use layerdb_core::{
    Conn, Connector, Context, Driver, DriverContext, NamedValue, Result, Rows, RowsAffected,
    TxOptions, async_trait,
};
use std::sync::Arc;

/// Deterministic in-process driver.
///
/// Every handle created from one driver shares the same backend: hooks,
/// recorded calls and counters.
///
/// ```rust,ignore
/// let driver = FakeDriver::new(FakeCapabilities::legacy())
///     .on_exec(|_query, args| Ok(RowsAffected::new(args.len() as u64)));
/// ```
#[derive(Clone)]
pub struct FakeDriver {
    pub(crate) backend: Arc<Backend>,
}

impl FakeDriver {
    pub fn new(capabilities: FakeCapabilities) -> Self {
        Self {
            backend: Arc::new(Backend::new(capabilities)),
        }
    }

    pub fn capabilities(&self) -> FakeCapabilities {
        self.backend.capabilities
    }

    pub fn on_ping(self, hook: impl Fn() -> Result<()> + Send + Sync + 'static) -> Self {
        let hook: PingHook = Arc::new(hook);
        self.backend.set_hooks(|h| h.ping = Some(hook));
        self
    }

    pub fn on_query(
        self,
        hook: impl Fn(&str, &[NamedValue]) -> Result<Rows> + Send + Sync + 'static,
    ) -> Self {
        let hook: QueryHook = Arc::new(hook);
        self.backend.set_hooks(|h| h.query = Some(hook));
        self
    }

    pub fn on_exec(
        self,
        hook: impl Fn(&str, &[NamedValue]) -> Result<RowsAffected> + Send + Sync + 'static,
    ) -> Self {
        let hook: ExecHook = Arc::new(hook);
        self.backend.set_hooks(|h| h.exec = Some(hook));
        self
    }

    pub fn on_begin(self, hook: impl Fn(TxOptions) -> Result<()> + Send + Sync + 'static) -> Self {
        let hook: BeginHook = Arc::new(hook);
        self.backend.set_hooks(|h| h.begin = Some(hook));
        self
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.backend.calls().clone()
    }

    /// Returns the calls received so far and forgets them.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.backend.calls())
    }

    /// Query and execute calls only, as `(query, args)`.
    pub fn statements(&self) -> Vec<(String, Vec<NamedValue>)> {
        self.backend
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::Query { query, args, .. } | Call::Exec { query, args, .. } => {
                    Some((query.clone(), args.clone()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn connections(&self) -> usize {
        get(&self.backend.counters.connections)
    }

    pub fn closed_connections(&self) -> usize {
        get(&self.backend.counters.closed_connections)
    }

    pub fn prepared(&self) -> usize {
        get(&self.backend.counters.prepared)
    }

    pub fn closed_statements(&self) -> usize {
        get(&self.backend.counters.closed_statements)
    }

    pub fn commits(&self) -> usize {
        get(&self.backend.counters.commits)
    }

    pub fn rollbacks(&self) -> usize {
        get(&self.backend.counters.rollbacks)
    }

    pub(crate) fn open_connection(&self, name: &str) -> FakeConnection {
        bump(&self.backend.counters.connections);
        log::debug!("Fake connection to `{}`", name);
        FakeConnection::new(self.backend.clone())
    }
}

impl Default for FakeDriver {
    fn default() -> Self {
        Self::new(FakeCapabilities::default())
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn open(&self, name: &str) -> Result<Arc<dyn Conn>> {
        self.backend.record(Call::Open(name.into()));
        Ok(Arc::new(self.open_connection(name)))
    }

    fn as_driver_context(self: Arc<Self>) -> Option<Arc<dyn DriverContext>> {
        if self.backend.capabilities.driver_context {
            Some(self)
        } else {
            None
        }
    }
}

impl DriverContext for FakeDriver {
    fn open_connector(&self, name: &str) -> Result<Arc<dyn Connector>> {
        Ok(Arc::new(FakeConnector {
            driver: self.clone(),
            name: name.into(),
        }))
    }
}

/// Connector of a [`FakeDriver`], bound to one name.
#[derive(Clone)]
pub struct FakeConnector {
    driver: FakeDriver,
    name: String,
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, ctx: &Context) -> Result<Arc<dyn Conn>> {
        ctx.check()?;
        self.driver.backend.record(Call::Connect(self.name.clone()));
        Ok(Arc::new(self.driver.open_connection(&self.name)))
    }

    fn driver(&self) -> Arc<dyn Driver> {
        Arc::new(self.driver.clone())
    }
}
