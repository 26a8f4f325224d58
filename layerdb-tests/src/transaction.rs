use crate::connect;
use layerdb::{Context, ContextError, DriverError, IsolationLevel, MiddlewareGroup, TxOptions};
use layerdb_fake::{Call, FakeCapabilities, FakeDriver};

pub async fn transaction_commit(capabilities: FakeCapabilities) {
    let fake = FakeDriver::new(capabilities);
    let connection = connect(&fake, MiddlewareGroup::new()).await;

    let transaction = connection
        .begin_tx(&Context::background(), TxOptions::new())
        .await
        .expect("Could not begin a transaction");
    transaction
        .commit()
        .await
        .expect("Could not commit the transaction");
    assert_eq!(fake.commits(), 1);
    assert_eq!(fake.rollbacks(), 0);
    assert!(fake.calls().contains(&Call::Begin(TxOptions::new())));
}

pub async fn transaction_options(capabilities: FakeCapabilities) {
    let fake = FakeDriver::new(capabilities);
    let connection = connect(&fake, MiddlewareGroup::new()).await;
    let ctx = Context::background();
    let serializable = TxOptions::new().isolation(IsolationLevel::Serializable);
    let read_only = TxOptions::new().read_only(true);

    if capabilities.begin_tx {
        for options in [serializable, read_only] {
            let transaction = connection
                .begin_tx(&ctx, options)
                .await
                .expect("Could not begin a transaction with options");
            transaction.rollback().await.expect("Could not roll back");
            assert!(fake.calls().contains(&Call::Begin(options)));
        }
        return;
    }
    let error = connection
        .begin_tx(&ctx, serializable)
        .await
        .err()
        .expect("Isolation levels need native transactions");
    assert_eq!(
        error.downcast_ref::<DriverError>(),
        Some(&DriverError::IsolationLevelUnsupported(
            IsolationLevel::Serializable
        ))
    );
    let error = connection
        .begin_tx(&ctx, read_only)
        .await
        .err()
        .expect("Read only needs native transactions");
    assert_eq!(
        error.downcast_ref::<DriverError>(),
        Some(&DriverError::ReadOnlyUnsupported)
    );
    assert!(
        !fake.calls().iter().any(|c| matches!(c, Call::Begin(..))),
        "Rejected options must not reach the backend"
    );
}

pub async fn transaction_cancel_race(capabilities: FakeCapabilities) {
    let (ctx, token) = Context::cancellable();
    let fake = FakeDriver::new(capabilities).on_begin(move |_| {
        token.cancel();
        Ok(())
    });
    let connection = connect(&fake, MiddlewareGroup::new()).await;

    let result = connection.begin_tx(&ctx, TxOptions::new()).await;
    if capabilities.begin_tx {
        // The driver owns cancellation of its own transactions
        assert!(result.is_ok());
        assert_eq!(fake.rollbacks(), 0);
        return;
    }
    let error = result
        .err()
        .expect("A context canceled during begin must fail the begin");
    assert_eq!(
        error.downcast_ref::<ContextError>(),
        Some(&ContextError::Canceled)
    );
    assert_eq!(fake.rollbacks(), 1);
    assert_eq!(fake.commits(), 0);
}
