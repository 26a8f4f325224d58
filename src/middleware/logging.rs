//! Logging middleware for query tracing.

use super::{
    ExecMiddleware, Middleware, MiddlewareFactory, MiddlewareGroup, QueryMiddleware, Request,
    StmtExecMiddlewareFactory, StmtQueryMiddlewareFactory,
};
use layerdb_core::{NamedValue, Result, Rows, RowsAffected, separated_by, truncate_long};
use log::Level;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

const TARGET: &str = "layerdb::query";

/// Configuration for the logging middleware.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level of the regular query lines.
    pub level: Level,
    /// Whether to log query parameters.
    pub log_params: bool,
    /// Queries slower than this are logged as warnings.
    pub slow_threshold: Duration,
    /// Maximum length of logged SQL.
    pub max_sql_length: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::Debug,
            log_params: false,
            slow_threshold: Duration::from_secs(1),
            max_sql_length: 500,
        }
    }
}

impl LoggingConfig {
    fn log_before(&self, kind: &str, query: &str, args: &[NamedValue]) {
        if self.log_params && !args.is_empty() {
            log::log!(
                target: TARGET,
                self.level,
                "Starting {} {} with [{}]",
                kind,
                truncate_long!(query, self.max_sql_length),
                separated_by(args, ", "),
            );
        } else {
            log::log!(
                target: TARGET,
                self.level,
                "Starting {} {}",
                kind,
                truncate_long!(query, self.max_sql_length),
            );
        }
    }

    fn log_after<Res: Summary>(
        &self,
        kind: &str,
        query: &str,
        elapsed: Duration,
        result: &Result<Res>,
    ) {
        match result {
            Ok(response) if elapsed >= self.slow_threshold => log::warn!(
                target: TARGET,
                "Slow {} ({:?}, threshold {:?}) {}: {}",
                kind,
                elapsed,
                self.slow_threshold,
                truncate_long!(query, self.max_sql_length),
                response.summary(),
            ),
            Ok(response) => log::log!(
                target: TARGET,
                self.level,
                "Completed {} in {:?}: {}",
                kind,
                elapsed,
                response.summary(),
            ),
            Err(error) => log::error!(
                target: TARGET,
                "Failed {} after {:?} {}: {:#}",
                kind,
                elapsed,
                truncate_long!(query, self.max_sql_length),
                error,
            ),
        }
    }
}

/// Short description of a response for the log line.
pub(crate) trait Summary {
    fn summary(&self) -> String;
}

impl Summary for Rows {
    fn summary(&self) -> String {
        format!("columns [{}]", self.columns().join(", "))
    }
}

impl Summary for RowsAffected {
    fn summary(&self) -> String {
        match self.last_affected_id {
            Some(id) => format!("{} rows affected, last id {}", self.rows_affected, id),
            None => format!("{} rows affected", self.rows_affected),
        }
    }
}

/// Middleware that logs every query and execute it sees, through the `log`
/// facade with target `layerdb::query`.
///
/// # Example
///
/// ```rust,ignore
/// use layerdb::middleware::LoggingMiddleware;
///
/// let group = LoggingMiddleware::new()
///     .with_level(log::Level::Info)
///     .with_params(true)
///     .with_slow_threshold(Duration::from_millis(200))
///     .into_group();
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    config: LoggingConfig,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LoggingConfig) -> Self {
        Self { config }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    pub fn with_params(mut self, enabled: bool) -> Self {
        self.config.log_params = enabled;
        self
    }

    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.config.slow_threshold = threshold;
        self
    }

    pub fn with_max_sql_length(mut self, length: usize) -> Self {
        self.config.max_sql_length = length;
        self
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    pub fn query(&self) -> QueryMiddleware {
        self.connection_level("query")
    }

    pub fn exec(&self) -> ExecMiddleware {
        self.connection_level("exec")
    }

    pub fn stmt_query(&self) -> StmtQueryMiddlewareFactory {
        self.statement_level("statement query")
    }

    pub fn stmt_exec(&self) -> StmtExecMiddlewareFactory {
        self.statement_level("statement exec")
    }

    /// All four hooks set.
    pub fn into_group(self) -> MiddlewareGroup {
        MiddlewareGroup::new()
            .with_query(self.query())
            .with_exec(self.exec())
            .with_stmt_query(self.stmt_query())
            .with_stmt_exec(self.stmt_exec())
    }

    fn connection_level<Res>(&self, kind: &'static str) -> Middleware<Request, Res>
    where
        Res: Summary + Send + 'static,
    {
        let config = Arc::new(self.config.clone());
        Middleware::from_fn(move |ctx, request: Request, next| {
            let config = config.clone();
            async move {
                let query = request.query.clone();
                config.log_before(kind, &query, &request.args);
                let started = Instant::now();
                let result = next.call(ctx, request).await;
                config.log_after(kind, &query, started.elapsed(), &result);
                result
            }
        })
    }

    fn statement_level<Res>(&self, kind: &'static str) -> MiddlewareFactory<Vec<NamedValue>, Res>
    where
        Res: Summary + Send + 'static,
    {
        let config = Arc::new(self.config.clone());
        MiddlewareFactory::new(move |query| {
            let config = config.clone();
            let query: Arc<str> = query.into();
            Ok(Middleware::from_fn(move |ctx, args: Vec<NamedValue>, next| {
                let config = config.clone();
                let query = query.clone();
                async move {
                    config.log_before(kind, &query, &args);
                    let started = Instant::now();
                    let result = next.call(ctx, args).await;
                    config.log_after(kind, &query, started.elapsed(), &result);
                    result
                }
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let middleware = LoggingMiddleware::new()
            .with_level(Level::Info)
            .with_params(true)
            .with_slow_threshold(Duration::from_millis(500));
        assert_eq!(middleware.config().level, Level::Info);
        assert!(middleware.config().log_params);
        assert_eq!(middleware.config().slow_threshold, Duration::from_millis(500));
    }

    #[test]
    fn group_sets_every_hook() {
        let group = LoggingMiddleware::new().into_group();
        assert!(group.query.is_some());
        assert!(group.exec.is_some());
        assert!(group.stmt_query.is_some());
        assert!(group.stmt_exec.is_some());
    }

    #[test]
    fn summaries() {
        assert_eq!(RowsAffected::new(3).summary(), "3 rows affected");
        assert_eq!(
            RowsAffected {
                rows_affected: 1,
                last_affected_id: Some(42)
            }
            .summary(),
            "1 rows affected, last id 42"
        );
        assert_eq!(
            Rows::from_rows(vec!["a".to_string(), "b".to_string()], Vec::new()).summary(),
            "columns [a, b]"
        );
    }
}
