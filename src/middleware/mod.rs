//! Middleware system for driver call interception.
//!
//! There are three extension points, each with its own interceptor type:
//!
//! - **connection query**: [`QueryInterceptor`], request [`Request`], response [`Rows`]
//! - **connection execute**: [`ExecInterceptor`], request [`Request`], response [`RowsAffected`]
//! - **statement query/execute**: [`StmtQueryInterceptor`] and [`StmtExecInterceptor`],
//!   request `Vec<NamedValue>`
//!
//! A [`Middleware`] turns the next interceptor into a new one. Connection
//! middleware is built once per connection, statement middleware comes from a
//! [`MiddlewareFactory`] invoked with the query text of each prepared
//! statement. Chains keep the registration order: the first middleware is the
//! outermost one.
//!
//! # Example
//!
//! ```rust,ignore
//! use layerdb::middleware::{ExecMiddleware, LoggingMiddleware, MiddlewareGroup};
//!
//! let rename = ExecMiddleware::from_fn(|ctx, mut request, next| async move {
//!     request.args[0].name = "status".into();
//!     next.call(ctx, request).await
//! });
//! let group = LoggingMiddleware::new().into_group().with_exec(rename);
//! ```

mod chain;
mod group;
mod logging;
mod retry;
mod types;

pub use group::MiddlewareGroup;
pub use logging::{LoggingConfig, LoggingMiddleware};
pub use retry::{RetryConfig, retry, retry_factory};
pub use types::{Interceptor, Middleware, MiddlewareFactory, Request};

use layerdb_core::{NamedValue, Rows, RowsAffected};

pub type QueryInterceptor = Interceptor<Request, Rows>;
pub type ExecInterceptor = Interceptor<Request, RowsAffected>;
pub type StmtQueryInterceptor = Interceptor<Vec<NamedValue>, Rows>;
pub type StmtExecInterceptor = Interceptor<Vec<NamedValue>, RowsAffected>;

pub type QueryMiddleware = Middleware<Request, Rows>;
pub type ExecMiddleware = Middleware<Request, RowsAffected>;
pub type StmtQueryMiddleware = Middleware<Vec<NamedValue>, Rows>;
pub type StmtExecMiddleware = Middleware<Vec<NamedValue>, RowsAffected>;

pub type StmtQueryMiddlewareFactory = MiddlewareFactory<Vec<NamedValue>, Rows>;
pub type StmtExecMiddlewareFactory = MiddlewareFactory<Vec<NamedValue>, RowsAffected>;
