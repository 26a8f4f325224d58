//! Chain composition.
//!
//! The first middleware of a chain is the outermost wrapper: for `[m1, m2]`
//! around `f`, a call runs `m1 → m2 → f` and the result unwinds `f → m2 → m1`.

use super::types::{Middleware, MiddlewareFactory};
use layerdb_core::Result;

impl<Req, Res> Middleware<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    /// Collapses the middlewares into one, the first being the outermost.
    /// An empty sequence gives the identity.
    pub fn chain<I>(middlewares: I) -> Self
    where
        I: IntoIterator<Item = Middleware<Req, Res>>,
    {
        let middlewares = middlewares.into_iter().collect::<Vec<_>>();
        match middlewares.len() {
            0 => Self::identity(),
            1 => middlewares.into_iter().next().unwrap_or_else(Self::identity),
            _ => Self::new(move |next| {
                middlewares
                    .iter()
                    .rev()
                    .fold(next, |next, middleware| middleware.wrap(next))
            }),
        }
    }

    /// `self` wrapping `inner`.
    pub fn then(self, inner: Middleware<Req, Res>) -> Self {
        Self::chain([self, inner])
    }
}

impl<Req, Res> FromIterator<Middleware<Req, Res>> for Middleware<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn from_iter<T: IntoIterator<Item = Middleware<Req, Res>>>(iter: T) -> Self {
        Self::chain(iter)
    }
}

impl<Req, Res> MiddlewareFactory<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    /// Collapses the factories into one. Building it invokes every factory with
    /// the query text in order and stops at the first error, later factories
    /// are not invoked.
    pub fn chain<I>(factories: I) -> Self
    where
        I: IntoIterator<Item = MiddlewareFactory<Req, Res>>,
    {
        let factories = factories.into_iter().collect::<Vec<_>>();
        Self::new(move |query| {
            let middlewares = factories
                .iter()
                .map(|factory| factory.build(query))
                .collect::<Result<Vec<_>>>()?;
            Ok(Middleware::chain(middlewares))
        })
    }

    /// `self` wrapping `inner`, for every statement.
    pub fn then(self, inner: MiddlewareFactory<Req, Res>) -> Self {
        Self::chain([self, inner])
    }
}

impl<Req, Res> FromIterator<MiddlewareFactory<Req, Res>> for MiddlewareFactory<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn from_iter<T: IntoIterator<Item = MiddlewareFactory<Req, Res>>>(iter: T) -> Self {
        Self::chain(iter)
    }
}
