#[cfg(test)]
mod tests {
    use layerdb::{Arg, Context, MiddlewareGroup, Value, bind_args, bind_values};
    use layerdb_fake::{FakeCapabilities, FakeDriver};
    use layerdb_tests::{connect, init_logs};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    #[tokio::test]
    async fn bind_with_the_connection_checker() {
        init_logs();
        let fake = FakeDriver::new(FakeCapabilities::legacy());
        let connection = connect(&fake, MiddlewareGroup::new()).await;
        let id = Uuid::from_str("5b6f1a9e-3c2d-4e8f-9a1b-2c3d4e5f6a7b").expect("Invalid uuid");

        let args = bind_values(
            &connection,
            [
                Value::from(id),
                Value::from(Decimal::new(1999, 2)),
                Value::from(date!(2025 - 03 - 01)),
                Value::from(7_u32),
                Value::from(Option::<i16>::None),
            ],
        )
        .expect("Could not bind");
        assert_eq!(
            args.iter().map(|a| a.value.clone()).collect::<Vec<_>>(),
            [
                Value::Varchar(Some("5b6f1a9e-3c2d-4e8f-9a1b-2c3d4e5f6a7b".into())),
                Value::Varchar(Some("19.99".into())),
                Value::TimestampWithTimezone(Some(datetime!(2025-03-01 0:00 UTC))),
                Value::Int64(Some(7)),
                Value::Null,
            ]
        );

        connection
            .exec_context(
                &Context::background(),
                "INSERT INTO payments VALUES (?, ?, ?, ?, ?)",
                args.clone(),
            )
            .await
            .expect("Insert failed");
        assert_eq!(fake.statements()[0].1, args);
    }

    #[tokio::test]
    async fn named_arguments_keep_their_names() {
        init_logs();
        let fake = FakeDriver::new(FakeCapabilities::modern());
        let connection = connect(&fake, MiddlewareGroup::new()).await;
        let args = bind_args(
            &connection,
            [Arg::named("amount", Decimal::new(5, 0)), Arg::value(true)],
        )
        .expect("Could not bind");
        assert_eq!(args[0].name, "amount");
        assert_eq!(args[1].ordinal, 2);
        assert_eq!(
            args[0].value,
            Value::Decimal(Some(Decimal::new(5, 0))),
            "The driver checker keeps the value as it is"
        );
    }
}
