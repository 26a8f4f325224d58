use crate::connect;
use layerdb::{
    Context, DriverError, ExecMiddleware, MiddlewareGroup, NamedValue, RowsAffected, Strategy,
    Value, bind_values,
};
use layerdb_fake::{FakeCapabilities, FakeDriver};

const UPDATE: &str = "UPDATE users SET status = ? WHERE id = ?";

fn driver(capabilities: FakeCapabilities) -> FakeDriver {
    FakeDriver::new(capabilities).on_exec(|query, _args| {
        assert_eq!(query, UPDATE);
        Ok(RowsAffected::new(3))
    })
}

pub async fn exec_positional(capabilities: FakeCapabilities) {
    let fake = driver(capabilities);
    let connection = connect(&fake, MiddlewareGroup::new()).await;
    let args = bind_values(&connection, [Value::from("paid"), Value::from(100_i64)])
        .expect("Could not bind the arguments");

    let result = connection
        .exec_context(&Context::background(), UPDATE, args)
        .await
        .expect("Could not run the update");
    assert_eq!(result.rows_affected, 3);
    assert_eq!(
        fake.statements(),
        [(
            UPDATE.to_string(),
            vec![NamedValue::new(1, "paid"), NamedValue::new(2, 100_i64)]
        )]
    );
}

pub async fn exec_renamed(capabilities: FakeCapabilities) {
    let fake = driver(capabilities);
    let rename = ExecMiddleware::from_fn(|ctx, mut request, next| async move {
        for (arg, name) in request.args.iter_mut().zip(["status", "id"]) {
            arg.name = name.into();
        }
        next.call(ctx, request).await
    });
    let connection = connect(&fake, MiddlewareGroup::new().with_exec(rename)).await;
    let args = vec![NamedValue::new(1, "paid"), NamedValue::new(2, 100_i64)];

    let result = connection
        .exec_context(&Context::background(), UPDATE, args)
        .await;
    if connection.exec_strategy() == Strategy::Legacy {
        let error = result.expect_err("Named arguments cannot reach a legacy execute");
        assert_eq!(
            error.downcast_ref::<DriverError>(),
            Some(&DriverError::NamedParametersUnsupported)
        );
        assert!(fake.statements().is_empty());
        return;
    }
    let result = result.expect("Could not run the renamed update");
    assert_eq!(result.rows_affected, 3);
    assert_eq!(
        fake.statements(),
        [(
            UPDATE.to_string(),
            vec![
                NamedValue::named("status", 1, "paid"),
                NamedValue::named("id", 2, 100_i64),
            ]
        )]
    );
}
