use crate::{Markers, connect};
use layerdb::{Context, Error, MiddlewareGroup, NamedValue, QueryMiddleware, Request, Rows};
use layerdb_fake::{FakeCapabilities, FakeDriver, echo};

fn marking(markers: &Markers, name: &'static str) -> QueryMiddleware {
    let markers = markers.clone();
    QueryMiddleware::from_fn(move |ctx, request: Request, next| {
        let markers = markers.clone();
        async move {
            markers.push(format!("{}-pre", name));
            let result = next.call(ctx, request).await;
            markers.push(format!("{}-post", name));
            result
        }
    })
}

pub async fn middleware_order(capabilities: FakeCapabilities) {
    let markers = Markers::new();
    let backend = markers.clone();
    let fake = FakeDriver::new(capabilities).on_query(move |_, args| {
        backend.push("f");
        Ok(echo(args))
    });
    let group = MiddlewareGroup::new()
        .with_query(marking(&markers, "m1"))
        .with_query(marking(&markers, "m2"));
    let connection = connect(&fake, group).await;

    connection
        .query_context(
            &Context::background(),
            "SELECT ?",
            vec![NamedValue::new(1, 1_i64)],
        )
        .await
        .expect("Query failed");
    assert_eq!(markers.take(), ["m1-pre", "m2-pre", "f", "m2-post", "m1-post"]);
}

pub async fn middleware_short_circuit(capabilities: FakeCapabilities) {
    let markers = Markers::new();
    let fake = FakeDriver::new(capabilities);
    let deny = QueryMiddleware::from_fn(|_, request: Request, _| async move {
        Err::<Rows, _>(Error::msg(format!("denied: {}", request.query)))
    });
    let group = MiddlewareGroup::new()
        .with_query(marking(&markers, "outer"))
        .with_query(deny)
        .with_query(marking(&markers, "inner"));
    let connection = connect(&fake, group).await;

    let error = connection
        .query_context(&Context::background(), "DROP TABLE users", vec![])
        .await
        .expect_err("The query should have been denied");
    assert_eq!(error.to_string(), "denied: DROP TABLE users");
    assert_eq!(markers.take(), ["outer-pre", "outer-post"]);
    assert!(fake.statements().is_empty());
    assert_eq!(fake.prepared(), 0);
}
