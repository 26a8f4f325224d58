use crate::{LayerConnection, LayerDriver};
use layerdb_core::{Conn, Connector, Context, Driver, Result, async_trait};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// Creates middleware-wrapped connections to one named target.
///
/// Built by [`LayerDriver::open_connector`]. It either delegates to the
/// connector of the wrapped driver or, when the driver has none, opens the
/// target by name on every connect.
#[derive(Clone)]
pub struct LayerConnector {
    name: String,
    driver: LayerDriver,
    target: Option<Arc<dyn Connector>>,
}

impl LayerConnector {
    pub(crate) fn new(
        name: impl Into<String>,
        driver: LayerDriver,
        target: Option<Arc<dyn Connector>>,
    ) -> Self {
        Self {
            name: name.into(),
            driver,
            target,
        }
    }

    pub async fn connect(&self, ctx: &Context) -> Result<LayerConnection> {
        let connection = match &self.target {
            Some(connector) => connector.connect(ctx).await?,
            None => {
                ctx.check()?;
                log::trace!("Opening {} by name", self.name);
                self.driver.target().open(&self.name).await?
            }
        };
        Ok(self.driver.wrap(connection))
    }

    /// The wrapping driver.
    pub fn driver(&self) -> &LayerDriver {
        &self.driver
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when connections are opened by name.
    pub fn is_lazy(&self) -> bool {
        self.target.is_none()
    }
}

impl Debug for LayerConnector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerConnector")
            .field("name", &self.name)
            .field("lazy", &self.is_lazy())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Connector for LayerConnector {
    async fn connect(&self, ctx: &Context) -> Result<Arc<dyn Conn>> {
        Ok(Arc::new(LayerConnector::connect(self, ctx).await?))
    }

    fn driver(&self) -> Arc<dyn Driver> {
        Arc::new(self.driver.clone())
    }
}
