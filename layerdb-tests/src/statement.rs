use crate::{Markers, connect};
use layerdb::{
    Context, DriverError, Error, Middleware, MiddlewareFactory, MiddlewareGroup, NamedValue,
    RowLabeled, Stmt, Strategy, Value, stream::TryStreamExt,
};
use layerdb_fake::{Call, FakeCapabilities, FakeDriver, Via};

pub async fn statement_lifecycle(capabilities: FakeCapabilities) {
    let fake = FakeDriver::new(capabilities);
    let connection = connect(&fake, MiddlewareGroup::new()).await;
    let ctx = Context::background();

    let statement = connection
        .prepare_context(&ctx, "SELECT * FROM users WHERE id = ?")
        .await
        .expect("Could not prepare");
    assert_eq!(statement.query_text(), "SELECT * FROM users WHERE id = ?");
    assert_eq!(statement.num_input(), Some(1));
    assert_eq!(statement.query_strategy(), Strategy::Native);
    assert_eq!(fake.prepared(), 1);

    let rows = statement
        .query_context(&ctx, vec![NamedValue::new(1, 5_i64)])
        .await
        .expect("Statement query failed")
        .try_collect::<Vec<RowLabeled>>()
        .await
        .expect("Could not read the rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_column("$1"), Some(&Value::Int64(Some(5))));
    let result = statement
        .exec_context(&ctx, vec![NamedValue::new(1, 5_i64)])
        .await
        .expect("Statement exec failed");
    assert_eq!(result.rows_affected, 1);
    assert!(fake.calls().iter().all(|c| match c {
        Call::Query { via, .. } | Call::Exec { via, .. } => *via == Via::Statement,
        _ => true,
    }));

    let error = Stmt::query(&statement, &[])
        .await
        .expect_err("The legacy statement query must be refused");
    assert!(matches!(
        error.downcast_ref::<DriverError>(),
        Some(DriverError::UpgradeRequired(..))
    ));

    statement.close().await.expect("Could not close");
    assert_eq!(fake.closed_statements(), 1);
}

pub async fn statement_middleware(capabilities: FakeCapabilities) {
    let fake = FakeDriver::new(capabilities);
    let markers = Markers::new();
    let seen = markers.clone();
    let factory = MiddlewareFactory::new(move |query: &str| {
        seen.push(format!("build {}", query));
        let seen = seen.clone();
        Ok(Middleware::from_fn(move |ctx, args: Vec<NamedValue>, next| {
            let seen = seen.clone();
            async move {
                seen.push(format!("exec {} args", args.len()));
                next.call(ctx, args).await
            }
        }))
    });
    let connection = connect(&fake, MiddlewareGroup::new().with_stmt_exec(factory)).await;
    let ctx = Context::background();

    let statement = connection
        .prepare_context(&ctx, "DELETE FROM users WHERE id = ?")
        .await
        .expect("Could not prepare");
    statement
        .exec_context(&ctx, vec![NamedValue::new(1, 7_i64)])
        .await
        .expect("Statement exec failed");
    assert_eq!(
        markers.take(),
        ["build DELETE FROM users WHERE id = ?", "exec 1 args"]
    );
    statement.close().await.expect("Could not close");

    let failing = MiddlewareFactory::new(|query: &str| {
        Err(Error::msg(format!("no middleware for {}", query)))
    });
    let connection = connect(&fake, MiddlewareGroup::new().with_stmt_query(failing)).await;
    let closed = fake.closed_statements();
    let error = connection
        .prepare_context(&ctx, "SELECT 1")
        .await
        .expect_err("A failing factory must abort the prepare");
    assert_eq!(error.to_string(), "no middleware for SELECT 1");
    assert_eq!(fake.closed_statements(), closed + 1);
}
