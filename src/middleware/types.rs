//! Core middleware types.

use futures::{FutureExt, future::BoxFuture};
use layerdb_core::{Context, NamedValue, Result, separated_by, truncate_long};
use std::{
    fmt::{self, Debug, Display, Formatter},
    future::Future,
    sync::Arc,
};

type InterceptorFn<Req, Res> =
    dyn Fn(Context, Req) -> BoxFuture<'static, Result<Res>> + Send + Sync;
type MiddlewareFn<Req, Res> = dyn Fn(Interceptor<Req, Res>) -> Interceptor<Req, Res> + Send + Sync;
type FactoryFn<Req, Res> = dyn Fn(&str) -> Result<Middleware<Req, Res>> + Send + Sync;

/// A connection level call: the query text and its arguments.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Request {
    pub query: String,
    pub args: Vec<NamedValue>,
}

impl Request {
    pub fn new(query: impl Into<String>, args: Vec<NamedValue>) -> Self {
        Self {
            query: query.into(),
            args,
        }
    }
}

impl Display for Request {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.query))?;
        if !self.args.is_empty() {
            write!(f, " [{}]", separated_by(&self.args, ", "))?;
        }
        Ok(())
    }
}

/// One link of a chain: takes the call context and a request, produces the
/// response.
///
/// Cloning is cheap, all clones share the same function.
pub struct Interceptor<Req, Res> {
    inner: Arc<InterceptorFn<Req, Res>>,
}

impl<Req, Res> Interceptor<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Context, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res>> + Send + 'static,
    {
        let inner: Arc<InterceptorFn<Req, Res>> =
            Arc::new(move |ctx, request| f(ctx, request).boxed());
        Self { inner }
    }

    pub fn call(&self, ctx: Context, request: Req) -> BoxFuture<'static, Result<Res>> {
        (self.inner)(ctx, request)
    }
}

impl<Req, Res> Clone for Interceptor<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Req, Res> Debug for Interceptor<Req, Res> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor").finish_non_exhaustive()
    }
}

/// Turns the next interceptor into a new one that wraps it.
///
/// The wrapper may rewrite the request, inspect or replace the response, or
/// return an error without calling `next` at all.
///
/// ```rust,ignore
/// let upper = QueryMiddleware::from_fn(|ctx, mut request: Request, next| async move {
///     request.query = request.query.to_uppercase();
///     next.call(ctx, request).await
/// });
/// ```
pub struct Middleware<Req, Res> {
    inner: Arc<MiddlewareFn<Req, Res>>,
}

impl<Req, Res> Middleware<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Interceptor<Req, Res>) -> Interceptor<Req, Res> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Middleware written as a single async function receiving `next`.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Context, Req, Interceptor<Req, Res>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res>> + Send + 'static,
    {
        let f = Arc::new(f);
        Self::new(move |next| {
            let f = f.clone();
            Interceptor::new(move |ctx, request| f(ctx, request, next.clone()))
        })
    }

    /// Returns `next` unchanged.
    pub fn identity() -> Self {
        Self::new(|next| next)
    }

    pub fn wrap(&self, next: Interceptor<Req, Res>) -> Interceptor<Req, Res> {
        (self.inner)(next)
    }
}

impl<Req, Res> Clone for Middleware<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Req, Res> Debug for Middleware<Req, Res> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware").finish_non_exhaustive()
    }
}

/// Builds a middleware for one prepared statement, given its query text.
///
/// Construction may fail, in which case the statement is not created.
pub struct MiddlewareFactory<Req, Res> {
    inner: Arc<FactoryFn<Req, Res>>,
}

impl<Req, Res> MiddlewareFactory<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<Middleware<Req, Res>> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// The same middleware for every statement.
    pub fn constant(middleware: Middleware<Req, Res>) -> Self {
        Self::new(move |_| Ok(middleware.clone()))
    }

    pub fn build(&self, query: &str) -> Result<Middleware<Req, Res>> {
        (self.inner)(query)
    }
}

impl<Req, Res> Clone for MiddlewareFactory<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Req, Res> Debug for MiddlewareFactory<Req, Res> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareFactory").finish_non_exhaustive()
    }
}
