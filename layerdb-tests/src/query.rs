use crate::{connect, expected_via};
use layerdb::{Context, MiddlewareGroup, NamedValue, RowLabeled, Value, stream::TryStreamExt};
use layerdb_fake::{Call, FakeCapabilities, FakeDriver};

pub async fn query_simple(capabilities: FakeCapabilities) {
    let fake = FakeDriver::new(capabilities);
    let connection = connect(&fake, MiddlewareGroup::new()).await;
    fake.take_calls();

    let rows = connection
        .query_context(
            &Context::background(),
            "SELECT ?",
            vec![NamedValue::new(1, 1_i64)],
        )
        .await
        .expect("Could not run SELECT ?")
        .try_collect::<Vec<RowLabeled>>()
        .await
        .expect("Could not read the rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values(), [Value::Int64(Some(1))]);

    let query = fake
        .calls()
        .into_iter()
        .find(|c| matches!(c, Call::Query { .. }))
        .expect("The backend did not receive the query");
    assert_eq!(
        query,
        Call::Query {
            query: "SELECT ?".into(),
            args: vec![NamedValue {
                name: "".into(),
                ordinal: 1,
                value: Value::Int64(Some(1)),
            }],
            via: expected_via(connection.query_strategy()),
        }
    );
}

pub async fn query_idempotent(capabilities: FakeCapabilities) {
    let fake = FakeDriver::new(capabilities);
    let connection = connect(&fake, MiddlewareGroup::new()).await;
    let strategy = connection.query_strategy();
    let ctx = Context::background();
    let args = vec![NamedValue::new(1, "ann"), NamedValue::new(2, 31_i64)];

    let first = connection
        .query_context(&ctx, "SELECT name, age FROM people WHERE name = ? AND age = ?", args.clone())
        .await
        .expect("First query failed")
        .try_collect::<Vec<RowLabeled>>()
        .await
        .expect("Could not read the first rows");
    let second = connection
        .query_context(&ctx, "SELECT name, age FROM people WHERE name = ? AND age = ?", args)
        .await
        .expect("Second query failed")
        .try_collect::<Vec<RowLabeled>>()
        .await
        .expect("Could not read the second rows");
    assert_eq!(first, second);
    assert_eq!(connection.query_strategy(), strategy);

    let statements = fake.statements();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0], statements[1]);
}
