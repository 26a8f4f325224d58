mod exec;
mod middleware;
mod ping;
mod query;
mod statement;
mod transaction;

use crate::{
    exec::{exec_positional, exec_renamed},
    middleware::{middleware_order, middleware_short_circuit},
    ping::{ping, ping_failure},
    query::{query_idempotent, query_simple},
    statement::{statement_lifecycle, statement_middleware},
    transaction::{transaction_cancel_race, transaction_commit, transaction_options},
};
use layerdb::{Context, LayerConnection, LayerDriver, MiddlewareGroup, Strategy};
use layerdb_fake::{FakeCapabilities, FakeDriver, Via};
use log::LevelFilter;
use std::{
    env,
    sync::{Arc, Mutex},
};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs every scenario against a fake driver with the given capabilities.
///
/// The profile must at least support context-aware statements, the last
/// resort of every connection call.
pub async fn execute_tests(capabilities: FakeCapabilities) {
    query_simple(capabilities).await;
    query_idempotent(capabilities).await;
    exec_positional(capabilities).await;
    exec_renamed(capabilities).await;
    ping(capabilities).await;
    ping_failure(capabilities).await;
    statement_lifecycle(capabilities).await;
    statement_middleware(capabilities).await;
    transaction_commit(capabilities).await;
    transaction_options(capabilities).await;
    transaction_cancel_race(capabilities).await;
    middleware_order(capabilities).await;
    middleware_short_circuit(capabilities).await;
}

/// Wraps a fake driver and connects through the wrapper.
pub async fn connect(fake: &FakeDriver, middleware: MiddlewareGroup) -> LayerConnection {
    LayerDriver::new(Arc::new(fake.clone()))
        .with_middleware(middleware)
        .open_connector("fake://test")
        .expect("Could not open the connector")
        .connect(&Context::background())
        .await
        .expect("Could not connect")
}

/// The backend entry point a call resolved to `strategy` ends up in.
pub fn expected_via(strategy: Strategy) -> Via {
    match strategy {
        Strategy::Native => Via::Context,
        Strategy::Legacy => Via::Legacy,
        Strategy::Prepared | Strategy::Unsupported => Via::Statement,
    }
}

/// Ordered record of events, shared by the clones.
#[derive(Default, Clone, Debug)]
pub struct Markers(Arc<Mutex<Vec<String>>>);

impl Markers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, marker: impl Into<String>) {
        self.0
            .lock()
            .expect("Markers lock is poisoned")
            .push(marker.into());
    }

    pub fn get(&self) -> Vec<String> {
        self.0.lock().expect("Markers lock is poisoned").clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().expect("Markers lock is poisoned"))
    }
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
