use crate::{Conn, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Entry point of a database driver.
///
/// `open` is the legacy, context-less way of opening a connection by name.
/// Drivers that can parse their configuration once and reuse it expose
/// [`DriverContext`] through [`Driver::as_driver_context`].
#[async_trait]
pub trait Driver: Send + Sync {
    /// Open a new connection to the target identified by `name`.
    async fn open(&self, name: &str) -> Result<Arc<dyn Conn>>;

    fn as_driver_context(self: Arc<Self>) -> Option<Arc<dyn DriverContext>> {
        None
    }
}

/// Optional driver capability: build a reusable [`Connector`] for a name.
pub trait DriverContext: Send + Sync {
    fn open_connector(&self, name: &str) -> Result<Arc<dyn Connector>>;
}

/// A driver in a fixed configuration, able to create any number of
/// equivalent connections.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, ctx: &Context) -> Result<Arc<dyn Conn>>;

    /// The driver that created this connector.
    fn driver(&self) -> Arc<dyn Driver>;
}
