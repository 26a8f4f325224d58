use crate::{LayerConnection, LayerConnector, middleware::MiddlewareGroup};
use layerdb_core::{Conn, Connector, Driver, DriverContext, DriverError, Result, async_trait};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// Wraps a driver so that every connection it hands out runs the configured
/// middleware.
///
/// Connections are only obtained through [`LayerDriver::open_connector`], the
/// by-name [`Driver::open`] always fails with
/// [`DriverError::UpgradeRequired`].
///
/// ```rust,ignore
/// let driver = LayerDriver::new(Arc::new(PostgresDriver::new()))
///     .with_middleware(LoggingMiddleware::new().into_group());
/// let connector = driver.open_connector("postgres://localhost/app")?;
/// ```
#[derive(Clone)]
pub struct LayerDriver {
    target: Arc<dyn Driver>,
    middleware: MiddlewareGroup,
}

impl LayerDriver {
    pub fn new(target: Arc<dyn Driver>) -> Self {
        Self {
            target,
            middleware: MiddlewareGroup::default(),
        }
    }

    /// Adds the hooks of `middleware` inside the ones already configured.
    pub fn with_middleware(mut self, middleware: MiddlewareGroup) -> Self {
        self.middleware = self.middleware.merge(middleware);
        self
    }

    pub fn middleware(&self) -> &MiddlewareGroup {
        &self.middleware
    }

    /// The wrapped driver.
    pub fn target(&self) -> &Arc<dyn Driver> {
        &self.target
    }

    /// Connector for the target `name`.
    ///
    /// When the wrapped driver cannot build connectors, the returned one opens
    /// a new connection by name on every connect.
    pub fn open_connector(&self, name: &str) -> Result<LayerConnector> {
        let target = match self.target.clone().as_driver_context() {
            Some(driver) => Some(driver.open_connector(name)?),
            None => {
                log::debug!("Driver has no connector support, connecting by name");
                None
            }
        };
        Ok(LayerConnector::new(name, self.clone(), target))
    }

    /// Wraps a connection of the underlying driver.
    pub fn wrap(&self, connection: Arc<dyn Conn>) -> LayerConnection {
        LayerConnection::new(connection, self.middleware.clone())
    }
}

impl Debug for LayerDriver {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerDriver")
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Driver for LayerDriver {
    async fn open(&self, _name: &str) -> Result<Arc<dyn Conn>> {
        Err(DriverError::UpgradeRequired("Driver::open").into())
    }

    fn as_driver_context(self: Arc<Self>) -> Option<Arc<dyn DriverContext>> {
        Some(self)
    }
}

impl DriverContext for LayerDriver {
    fn open_connector(&self, name: &str) -> Result<Arc<dyn Connector>> {
        Ok(Arc::new(LayerDriver::open_connector(self, name)?))
    }
}
