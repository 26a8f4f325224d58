//! Middleware layer for database drivers.
//!
//! `layerdb` wraps any driver implementing the [`layerdb_core`] contract and
//! runs a configurable chain of interceptors around connection queries,
//! connection executes and prepared statements. Optional driver capabilities
//! are detected once per handle, missing ones are emulated from the ones the
//! driver does implement.
//!
//! ```rust,ignore
//! let driver = LayerDriver::new(target).with_middleware(
//!     MiddlewareGroup::new().with_exec(Middleware::from_fn(|ctx, request, next| async move {
//!         log::info!("exec {}", request.query);
//!         next.call(ctx, request).await
//!     })),
//! );
//! let connection = driver.open_connector("db")?.connect(&Context::background()).await?;
//! ```

mod bind;
mod capability;
mod connection;
mod connector;
mod convert;
mod driver;
pub mod middleware;
mod statement;

pub use bind::*;
pub use capability::{ConnCapabilities, StmtCapabilities, Strategy};
pub use connection::*;
pub use connector::*;
pub use convert::*;
pub use driver::*;
pub use layerdb_core::*;
pub use middleware::{
    ExecInterceptor, ExecMiddleware, Interceptor, Middleware, MiddlewareFactory, MiddlewareGroup,
    QueryInterceptor, QueryMiddleware, Request, StmtExecInterceptor, StmtExecMiddleware,
    StmtExecMiddlewareFactory, StmtQueryInterceptor, StmtQueryMiddleware,
    StmtQueryMiddlewareFactory,
};
pub use statement::*;
