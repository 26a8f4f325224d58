#[cfg(test)]
mod tests {
    use layerdb::{Context, Error, Interceptor, Middleware, MiddlewareFactory};
    use layerdb_tests::Markers;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    type Echo = Interceptor<String, String>;
    type EchoMiddleware = Middleware<String, String>;

    fn base(markers: &Markers) -> Echo {
        let markers = markers.clone();
        Echo::new(move |_, request: String| {
            let markers = markers.clone();
            async move {
                markers.push("f");
                Ok::<_, Error>(format!("f({})", request))
            }
        })
    }

    fn marking(markers: &Markers, name: &'static str) -> EchoMiddleware {
        let markers = markers.clone();
        EchoMiddleware::from_fn(move |ctx, request: String, next| {
            let markers = markers.clone();
            async move {
                markers.push(format!("{}-pre", name));
                let response = next.call(ctx, format!("{}({})", name, request)).await;
                markers.push(format!("{}-post", name));
                response
            }
        })
    }

    #[tokio::test]
    async fn chain_order() {
        let markers = Markers::new();
        let chain = EchoMiddleware::chain([
            marking(&markers, "m1"),
            marking(&markers, "m2"),
            marking(&markers, "m3"),
        ]);
        let response = chain
            .wrap(base(&markers))
            .call(Context::background(), "x".into())
            .await
            .expect("The chain failed");
        assert_eq!(response, "f(m3(m2(m1(x))))");
        assert_eq!(
            markers.take(),
            ["m1-pre", "m2-pre", "m3-pre", "f", "m3-post", "m2-post", "m1-post"]
        );
    }

    #[tokio::test]
    async fn chain_empty_is_identity() {
        let markers = Markers::new();
        let chain = EchoMiddleware::chain([]);
        let response = chain
            .wrap(base(&markers))
            .call(Context::background(), "x".into())
            .await
            .expect("The chain failed");
        assert_eq!(response, "f(x)");
        assert_eq!(markers.take(), ["f"]);
        let response = EchoMiddleware::identity()
            .wrap(base(&markers))
            .call(Context::background(), "y".into())
            .await
            .expect("The identity failed");
        assert_eq!(response, "f(y)");
    }

    #[tokio::test]
    async fn chain_collect_and_then() {
        let markers = Markers::new();
        let collected: EchoMiddleware = ["a", "b"]
            .into_iter()
            .map(|name| marking(&markers, name))
            .collect();
        let response = collected
            .wrap(base(&markers))
            .call(Context::background(), "x".into())
            .await
            .expect("The collected chain failed");
        assert_eq!(response, "f(b(a(x)))");

        let then = marking(&markers, "a").then(marking(&markers, "b"));
        let response = then
            .wrap(base(&markers))
            .call(Context::background(), "x".into())
            .await
            .expect("The chain built with then failed");
        assert_eq!(response, "f(b(a(x)))");
    }

    #[tokio::test]
    async fn short_circuit() {
        let markers = Markers::new();
        let deny = EchoMiddleware::from_fn(|_, request: String, _| async move {
            Err::<String, _>(Error::msg(format!("{} denied", request)))
        });
        let chain = EchoMiddleware::chain([marking(&markers, "m1"), deny, marking(&markers, "m3")]);
        let error = chain
            .wrap(base(&markers))
            .call(Context::background(), "x".into())
            .await
            .expect_err("The request should have been denied");
        assert_eq!(error.to_string(), "m1(x) denied");
        assert_eq!(markers.take(), ["m1-pre", "m1-post"]);
    }

    #[tokio::test]
    async fn factories_in_order() {
        let markers = Markers::new();
        let factory = |name: &'static str| {
            let markers = markers.clone();
            MiddlewareFactory::new(move |query: &str| {
                markers.push(format!("build {} for {}", name, query));
                Ok(marking(&markers, name))
            })
        };
        let chain = MiddlewareFactory::chain([factory("m1"), factory("m2")]);
        let middleware = chain.build("SELECT 1").expect("Could not build the middleware");
        assert_eq!(
            markers.take(),
            ["build m1 for SELECT 1", "build m2 for SELECT 1"]
        );
        let response = middleware
            .wrap(base(&markers))
            .call(Context::background(), "x".into())
            .await
            .expect("The built chain failed");
        assert_eq!(response, "f(m2(m1(x)))");
    }

    #[test]
    fn factories_fail_fast() {
        let invoked = Arc::new(AtomicUsize::new(0));
        let counting = {
            let invoked = invoked.clone();
            MiddlewareFactory::<String, String>::new(move |_| {
                invoked.fetch_add(1, Ordering::SeqCst);
                Ok(Middleware::identity())
            })
        };
        let failing = MiddlewareFactory::<String, String>::new(|query: &str| {
            Err(Error::msg(format!("cannot wrap {}", query)))
        });
        let chain = MiddlewareFactory::chain([counting.clone(), failing, counting]);
        let error = chain
            .build("DELETE FROM t")
            .expect_err("The failing factory must abort the chain");
        assert_eq!(error.to_string(), "cannot wrap DELETE FROM t");
        assert_eq!(invoked.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn constant_factory() {
        let markers = Markers::new();
        let factory = MiddlewareFactory::constant(marking(&markers, "c"));
        for query in ["SELECT 1", "SELECT 2"] {
            let response = factory
                .build(query)
                .expect("A constant factory cannot fail")
                .wrap(base(&markers))
                .call(Context::background(), "x".into())
                .await
                .expect("The constant middleware failed");
            assert_eq!(response, "f(c(x))");
        }
    }
}
