#[cfg(test)]
mod tests {
    use layerdb::{
        Context, DriverError, Error, LayerStatement, Middleware, MiddlewareFactory, MiddlewareGroup,
        NamedValue, NamedValueChecker, Result, Row, Rows, RowsAffected, Stmt, StmtQueryContext,
        Strategy, Value, async_trait, stream::TryStreamExt,
    };
    use layerdb_tests::init_logs;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    /// Statement that only answers context-aware queries.
    #[derive(Default)]
    struct QueryOnly {
        closed: AtomicUsize,
    }

    #[async_trait]
    impl Stmt for QueryOnly {
        async fn close(&self) -> Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn num_input(&self) -> Option<usize> {
            None
        }

        async fn query(&self, _args: &[Value]) -> Result<Rows> {
            Ok(Rows::empty())
        }

        async fn exec(&self, _args: &[Value]) -> Result<RowsAffected> {
            Ok(RowsAffected::new(0))
        }

        fn as_query_context(self: Arc<Self>) -> Option<Arc<dyn StmtQueryContext>> {
            Some(self)
        }
    }

    #[async_trait]
    impl StmtQueryContext for QueryOnly {
        async fn query_context(&self, _ctx: &Context, args: &[NamedValue]) -> Result<Rows> {
            Ok(Rows::from_rows(
                vec!["count".to_string()],
                [Row::from([Value::Int64(Some(args.len() as i64))])],
            ))
        }
    }

    /// Stringifies every argument.
    struct Stringify;

    impl NamedValueChecker for Stringify {
        fn check_named_value(&self, nv: &mut NamedValue) -> Result<()> {
            nv.value = Value::Varchar(Some(nv.value.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn missing_exec_capability() {
        init_logs();
        let target = Arc::new(QueryOnly::default());
        let statement = LayerStatement::new(
            target.clone(),
            None,
            "SELECT count(*) FROM t WHERE a = ?",
            &MiddlewareGroup::new(),
        )
        .await
        .expect("Could not wrap the statement");
        assert_eq!(statement.query_strategy(), Strategy::Native);
        assert_eq!(statement.exec_strategy(), Strategy::Unsupported);
        assert_eq!(statement.num_input(), None);

        let rows = statement
            .query_context(&Context::background(), vec![NamedValue::new(1, 1_i64)])
            .await
            .expect("Query failed")
            .try_collect::<Vec<_>>()
            .await
            .expect("Could not read the rows");
        assert_eq!(rows[0].values(), [Value::Int64(Some(1))]);

        let error = statement
            .exec_context(&Context::background(), vec![])
            .await
            .expect_err("The statement cannot execute");
        assert_eq!(
            error.downcast_ref::<DriverError>(),
            Some(&DriverError::NotSupported("statement exec context"))
        );
        let error = Stmt::exec(&statement, &[])
            .await
            .expect_err("Legacy execute must be refused");
        assert_eq!(
            error.downcast_ref::<DriverError>(),
            Some(&DriverError::UpgradeRequired("Stmt::exec"))
        );

        statement.close().await.expect("Could not close");
        assert_eq!(target.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn checker_fallback() {
        init_logs();
        let group = MiddlewareGroup::new();
        let statement = LayerStatement::new(Arc::new(QueryOnly::default()), None, "SELECT ?", &group)
            .await
            .expect("Could not wrap the statement");
        let mut nv = NamedValue::new(1, 3_u16);
        statement
            .check_named_value(&mut nv)
            .expect("The default checker failed");
        assert_eq!(nv.value, Value::Int64(Some(3)));

        let statement = LayerStatement::new(
            Arc::new(QueryOnly::default()),
            Some(Arc::new(Stringify)),
            "SELECT ?",
            &group,
        )
        .await
        .expect("Could not wrap the statement");
        let mut nv = NamedValue::new(1, 3_u16);
        NamedValueChecker::check_named_value(&statement, &mut nv)
            .expect("The connection checker failed");
        assert_eq!(nv.value, Value::Varchar(Some("3".into())));
    }

    #[tokio::test]
    async fn factory_failure_closes_the_target() {
        init_logs();
        let target = Arc::new(QueryOnly::default());
        let group = MiddlewareGroup::new()
            .with_stmt_query(MiddlewareFactory::constant(Middleware::identity()))
            .with_stmt_exec(MiddlewareFactory::new(|query: &str| {
                Err(Error::msg(format!("refusing {}", query)))
            }));
        let error = LayerStatement::new(target.clone(), None, "TRUNCATE t", &group)
            .await
            .expect_err("The exec factory must abort the wrapping");
        assert_eq!(error.to_string(), "refusing TRUNCATE t");
        assert_eq!(target.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn wrapped_statement_is_a_statement() {
        init_logs();
        let inner = LayerStatement::new(
            Arc::new(QueryOnly::default()),
            None,
            "SELECT ?, ?",
            &MiddlewareGroup::new(),
        )
        .await
        .expect("Could not wrap the statement");
        let outer = LayerStatement::new(Arc::new(inner), None, "SELECT ?, ?", &MiddlewareGroup::new())
            .await
            .expect("Could not wrap the wrapped statement");
        assert_eq!(outer.query_strategy(), Strategy::Native);
        assert_eq!(outer.exec_strategy(), Strategy::Native);

        let rows = outer
            .query_context(
                &Context::background(),
                vec![NamedValue::new(1, 1_i64), NamedValue::new(2, 2_i64)],
            )
            .await
            .expect("Query failed")
            .try_collect::<Vec<_>>()
            .await
            .expect("Could not read the rows");
        assert_eq!(rows[0].get_column("count"), Some(&Value::Int64(Some(2))));
        let error = outer
            .exec_context(&Context::background(), vec![])
            .await
            .expect_err("The innermost statement cannot execute");
        assert_eq!(
            error.downcast_ref::<DriverError>(),
            Some(&DriverError::NotSupported("statement exec context"))
        );
    }
}
