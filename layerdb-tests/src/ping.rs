use crate::connect;
use layerdb::{Context, Error, MiddlewareGroup, NamedValue, Rows};
use layerdb_fake::{Call, FakeCapabilities, FakeDriver};

pub async fn ping(capabilities: FakeCapabilities) {
    let fake = FakeDriver::new(capabilities);
    let connection = connect(&fake, MiddlewareGroup::new()).await;
    fake.take_calls();

    connection
        .ping(&Context::background())
        .await
        .expect("Ping failed");
    let calls = fake.calls();
    if capabilities.pinger {
        assert_eq!(calls, [Call::Ping]);
    } else {
        assert!(!calls.contains(&Call::Ping));
        let (query, args) = fake
            .statements()
            .pop()
            .expect("The ping did not reach the backend");
        assert_eq!(query, "SELECT ?");
        assert_eq!(args, [NamedValue::new(1, 1_i64)]);
    }
}

pub async fn ping_failure(capabilities: FakeCapabilities) {
    let fake = FakeDriver::new(capabilities)
        .on_ping(|| Err(Error::msg("server has gone away")))
        .on_query(|_, _| Err::<Rows, _>(Error::msg("server has gone away")));
    let connection = connect(&fake, MiddlewareGroup::new()).await;

    let error = connection
        .ping(&Context::background())
        .await
        .expect_err("Ping should fail");
    assert_eq!(error.to_string(), "server has gone away");
}
