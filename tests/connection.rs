#[cfg(test)]
mod tests {
    use layerdb::{
        Conn, Context, ContextError, DriverError, Error, LayerConnection, Middleware,
        MiddlewareFactory, MiddlewareGroup, NamedValue, NamedValueChecker, QueryMiddleware,
        Request, Rows, Strategy, Value, stream::TryStreamExt,
    };
    use layerdb_fake::{Call, FakeCapabilities, FakeDriver, Via};
    use layerdb_tests::{Markers, connect, init_logs};
    use std::{fmt, sync::Arc};

    #[derive(Debug)]
    struct ServerError(u16);

    impl fmt::Display for ServerError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "server error {}", self.0)
        }
    }

    impl std::error::Error for ServerError {}

    #[tokio::test]
    async fn strategies() {
        init_logs();
        for (capabilities, query, exec) in [
            (FakeCapabilities::modern(), Strategy::Native, Strategy::Native),
            (FakeCapabilities::legacy(), Strategy::Legacy, Strategy::Legacy),
            (FakeCapabilities::minimal(), Strategy::Prepared, Strategy::Prepared),
            (
                FakeCapabilities {
                    execer_context: false,
                    ..FakeCapabilities::legacy()
                },
                Strategy::Legacy,
                Strategy::Legacy,
            ),
            (
                FakeCapabilities {
                    queryer_context: true,
                    ..FakeCapabilities::minimal()
                },
                Strategy::Native,
                Strategy::Prepared,
            ),
        ] {
            let fake = FakeDriver::new(capabilities);
            let connection = connect(&fake, MiddlewareGroup::new()).await;
            assert_eq!(connection.query_strategy(), query, "{:?}", capabilities);
            assert_eq!(connection.exec_strategy(), exec, "{:?}", capabilities);
        }
    }

    #[tokio::test]
    async fn legacy_rejects_named_arguments() {
        init_logs();
        let fake = FakeDriver::new(FakeCapabilities::legacy());
        let connection = connect(&fake, MiddlewareGroup::new()).await;
        fake.take_calls();

        let error = connection
            .query_context(
                &Context::background(),
                "SELECT * FROM users WHERE id = @id",
                vec![NamedValue::named("id", 1, 5_i64)],
            )
            .await
            .expect_err("Named arguments cannot reach a legacy query");
        assert_eq!(
            error.downcast_ref::<DriverError>(),
            Some(&DriverError::NamedParametersUnsupported)
        );
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn legacy_checks_cancellation() {
        init_logs();
        let fake = FakeDriver::new(FakeCapabilities::legacy());
        let connection = connect(&fake, MiddlewareGroup::new()).await;
        fake.take_calls();
        let (ctx, token) = Context::cancellable();
        token.cancel();

        let error = connection
            .exec_context(&ctx, "DELETE FROM users", vec![])
            .await
            .expect_err("A canceled context must stop a legacy execute");
        assert_eq!(
            error.downcast_ref::<ContextError>(),
            Some(&ContextError::Canceled)
        );
        let error = connection
            .prepare_context(&ctx, "DELETE FROM users")
            .await
            .expect_err("A canceled context must stop a legacy prepare");
        assert_eq!(
            error.downcast_ref::<ContextError>(),
            Some(&ContextError::Canceled)
        );
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn legacy_matches_native() {
        init_logs();
        let args = vec![NamedValue::new(1, "paid"), NamedValue::new(2, 100_i64)];
        let mut received = Vec::new();
        for capabilities in [FakeCapabilities::modern(), FakeCapabilities::legacy()] {
            let fake = FakeDriver::new(capabilities);
            let connection = connect(&fake, MiddlewareGroup::new()).await;
            let rows = connection
                .query_context(
                    &Context::background(),
                    "SELECT * FROM orders WHERE status = ? AND id = ?",
                    args.clone(),
                )
                .await
                .expect("Query failed")
                .try_collect::<Vec<_>>()
                .await
                .expect("Could not read the rows");
            received.push((fake.statements(), rows));
        }
        assert_eq!(received[0], received[1]);
    }

    #[tokio::test]
    async fn prepared_fallback_closes_the_statement() {
        init_logs();
        let fake = FakeDriver::new(FakeCapabilities::minimal());
        let connection = connect(&fake, MiddlewareGroup::new()).await;
        connection
            .exec_context(
                &Context::background(),
                "UPDATE t SET a = ?",
                vec![NamedValue::new(1, 1_i64)],
            )
            .await
            .expect("Could not run the update");
        assert_eq!(fake.prepared(), 1);
        assert_eq!(fake.closed_statements(), 1);

        let fake = FakeDriver::new(FakeCapabilities::minimal())
            .on_query(|_, _| Err::<Rows, _>(Error::new(ServerError(503))));
        let connection = connect(&fake, MiddlewareGroup::new()).await;
        let error = connection
            .query_context(&Context::background(), "SELECT 1", vec![])
            .await
            .expect_err("The backend error must come back");
        assert_eq!(
            error.downcast_ref::<ServerError>().map(|e| e.0),
            Some(503),
            "Upstream errors are returned unchanged"
        );
        assert_eq!(fake.prepared(), 1);
        assert_eq!(fake.closed_statements(), 1);
    }

    #[tokio::test]
    async fn prepared_fallback_runs_statement_middleware() {
        init_logs();
        let markers = Markers::new();
        let stmt_markers = markers.clone();
        let group = MiddlewareGroup::new()
            .with_query(QueryMiddleware::from_fn({
                let markers = markers.clone();
                move |ctx, request: Request, next| {
                    markers.push(format!("connection {}", request.query));
                    next.call(ctx, request)
                }
            }))
            .with_stmt_query(MiddlewareFactory::new(move |query: &str| {
                stmt_markers.push(format!("statement {}", query));
                Ok(Middleware::identity())
            }));
        let fake = FakeDriver::new(FakeCapabilities::minimal());
        let connection = connect(&fake, group).await;

        connection
            .query_context(&Context::background(), "SELECT 42", vec![])
            .await
            .expect("Query failed");
        assert_eq!(markers.take(), ["connection SELECT 42", "statement SELECT 42"]);
        assert!(fake.calls().contains(&Call::Query {
            query: "SELECT 42".into(),
            args: vec![],
            via: Via::Statement,
        }));
    }

    #[tokio::test]
    async fn statement_without_context_capabilities() {
        init_logs();
        let fake = FakeDriver::new(FakeCapabilities::none());
        let connection = connect(&fake, MiddlewareGroup::new()).await;
        let error = connection
            .query_context(&Context::background(), "SELECT 1", vec![])
            .await
            .expect_err("Nothing can run this query");
        assert_eq!(
            error.downcast_ref::<DriverError>(),
            Some(&DriverError::NotSupported("statement query context"))
        );
        assert_eq!(fake.closed_statements(), fake.prepared());
    }

    #[tokio::test]
    async fn ping_goes_through_query_middleware() {
        init_logs();
        let markers = Markers::new();
        let group = MiddlewareGroup::new().with_query(QueryMiddleware::from_fn({
            let markers = markers.clone();
            move |ctx, request: Request, next| {
                markers.push(format!("{} {}", request.query, request.args[0]));
                next.call(ctx, request)
            }
        }));
        let fake = FakeDriver::new(FakeCapabilities::legacy());
        let connection = connect(&fake, group).await;
        connection
            .ping(&Context::background())
            .await
            .expect("Ping failed");
        assert_eq!(markers.take(), ["SELECT ? $1=1"]);
    }

    #[tokio::test]
    async fn legacy_entry_points() {
        init_logs();
        let fake = FakeDriver::new(FakeCapabilities::modern());
        let connection = connect(&fake, MiddlewareGroup::new()).await;
        let error = Conn::prepare(&connection, "SELECT 1")
            .await
            .err()
            .expect("prepare must be refused");
        assert_eq!(
            error.downcast_ref::<DriverError>(),
            Some(&DriverError::UpgradeRequired("Conn::prepare"))
        );
        let error = Conn::begin(&connection)
            .await
            .err()
            .expect("begin must be refused");
        assert_eq!(
            error.downcast_ref::<DriverError>(),
            Some(&DriverError::UpgradeRequired("Conn::begin"))
        );
        connection.close().await.expect("Could not close");
        assert_eq!(fake.closed_connections(), 1);
    }

    #[tokio::test]
    async fn check_named_value() {
        init_logs();
        let modern = connect(&FakeDriver::new(FakeCapabilities::modern()), MiddlewareGroup::new()).await;
        let mut nv = NamedValue::new(1, 5_i32);
        modern
            .check_named_value(&mut nv)
            .expect("The driver checker failed");
        assert_eq!(nv.value, Value::Int32(Some(5)));

        let legacy = connect(&FakeDriver::new(FakeCapabilities::legacy()), MiddlewareGroup::new()).await;
        legacy
            .check_named_value(&mut nv)
            .expect("The default checker failed");
        assert_eq!(nv.value, Value::Int64(Some(5)));
    }

    #[tokio::test]
    async fn layers_stack() {
        init_logs();
        let markers = Markers::new();
        let marking = |name: &'static str| {
            let markers = markers.clone();
            MiddlewareGroup::new().with_exec(Middleware::from_fn(move |ctx, request: Request, next| {
                markers.push(name);
                next.call(ctx, request)
            }))
        };
        let fake = FakeDriver::new(FakeCapabilities::legacy());
        let inner = connect(&fake, marking("inner")).await;
        let outer = LayerConnection::new(Arc::new(inner), marking("outer"));
        assert_eq!(outer.exec_strategy(), Strategy::Native);
        assert_eq!(outer.query_strategy(), Strategy::Native);

        outer
            .exec_context(
                &Context::background(),
                "DELETE FROM t WHERE id = ?",
                vec![NamedValue::new(1, 1_i64)],
            )
            .await
            .expect("Exec failed");
        assert_eq!(markers.take(), ["outer", "inner"]);
        assert!(outer.check_named_value(&mut NamedValue::new(1, 1_u8)).is_ok());
        assert!(NamedValueChecker::check_named_value(&outer, &mut NamedValue::new(1, 1_u8)).is_ok());
    }
}
