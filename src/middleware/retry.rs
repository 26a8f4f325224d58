//! Retry middleware for automatic retry on transient failures.

use super::{Middleware, MiddlewareFactory};
use layerdb_core::{DriverError, Error, is_context_error};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
    time::Duration,
};

type RetryPredicate = dyn Fn(&Error) -> bool + Send + Sync;

/// Configuration for retry behavior.
#[derive(Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound of any delay.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    retry_on: Arc<RetryPredicate>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            retry_on: Arc::new(default_retry_on),
        }
    }
}

/// Anything but cancellation and the contract's own conditions, which would
/// fail the same way again.
fn default_retry_on(error: &Error) -> bool {
    !is_context_error(error) && error.downcast_ref::<DriverError>().is_none()
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Replace the predicate deciding which errors are retried.
    pub fn retry_on(mut self, predicate: impl Fn(&Error) -> bool + Send + Sync + 'static) -> Self {
        self.retry_on = Arc::new(predicate);
        self
    }

    pub fn should_retry(&self, error: &Error) -> bool {
        (self.retry_on)(error)
    }

    /// Delay before retry number `attempt` (starting at 0), never above
    /// `max_delay`. Multipliers below 1 (or NaN) keep the delay constant.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = self.backoff_multiplier.max(1.0);
        let delay = self.initial_delay.as_secs_f64() * multiplier.powi(attempt as i32);
        Duration::try_from_secs_f64(delay)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Debug for RetryConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_retries", &self.max_retries)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("backoff_multiplier", &self.backoff_multiplier)
            .finish_non_exhaustive()
    }
}

/// Middleware calling `next` again when it fails with a retryable error,
/// waiting between attempts.
///
/// Waiting honors the call context: a cancelled context ends the retries with
/// its own error.
///
/// ```rust,ignore
/// let group = MiddlewareGroup::new().with_exec(retry(
///     RetryConfig::new().max_retries(5).initial_delay(Duration::from_millis(50)),
/// ));
/// ```
pub fn retry<Req, Res>(config: RetryConfig) -> Middleware<Req, Res>
where
    Req: Clone + Send + 'static,
    Res: Send + 'static,
{
    let config = Arc::new(config);
    Middleware::from_fn(move |ctx, request: Req, next| {
        let config = config.clone();
        async move {
            let mut attempt = 0;
            loop {
                let error = match next.call(ctx.clone(), request.clone()).await {
                    Ok(response) => return Ok(response),
                    Err(error) => error,
                };
                if attempt >= config.max_retries || !config.should_retry(&error) {
                    return Err(error);
                }
                let delay = config.delay_for_attempt(attempt);
                attempt += 1;
                log::debug!(
                    "Retrying after {:?} (attempt {} of {}): {:#}",
                    delay,
                    attempt,
                    config.max_retries,
                    error
                );
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    reason = ctx.done() => return Err(reason.into()),
                }
            }
        }
    })
}

/// Statement-scoped retry: `policy` maps the query text of each prepared
/// statement to its retry configuration, `None` meaning no retry.
///
/// ```rust,ignore
/// let factory = retry_factory(|query| {
///     query.trim_start().starts_with("SELECT").then(|| RetryConfig::new().max_retries(2))
/// });
/// ```
pub fn retry_factory<Req, Res, P>(policy: P) -> MiddlewareFactory<Req, Res>
where
    Req: Clone + Send + 'static,
    Res: Send + 'static,
    P: Fn(&str) -> Option<RetryConfig> + Send + Sync + 'static,
{
    MiddlewareFactory::new(move |query| {
        Ok(match policy(query) {
            Some(config) => retry(config),
            None => Middleware::identity(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerdb_core::ContextError;

    #[test]
    fn delay_calculation() {
        let config = RetryConfig::new()
            .initial_delay(Duration::from_millis(100))
            .backoff_multiplier(2.0);
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
    }

    #[test]
    fn delay_max_cap() {
        let config = RetryConfig::new()
            .initial_delay(Duration::from_secs(1))
            .max_delay(Duration::from_secs(5))
            .backoff_multiplier(10.0);
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(5));
    }

    #[test]
    fn delay_without_cap() {
        let config = RetryConfig::new().max_delay(Duration::MAX);
        assert_eq!(config.delay_for_attempt(100), Duration::MAX);
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
    }

    #[test]
    fn delay_with_shrinking_multiplier() {
        let config = RetryConfig::new()
            .initial_delay(Duration::from_millis(100))
            .backoff_multiplier(-2.0);
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(5), Duration::from_millis(100));
        let config = config.backoff_multiplier(f64::NAN);
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(100));
    }

    #[test]
    fn default_predicate() {
        let config = RetryConfig::new();
        assert!(config.should_retry(&Error::msg("connection reset")));
        assert!(!config.should_retry(&ContextError::Canceled.into()));
        assert!(!config.should_retry(&DriverError::NamedParametersUnsupported.into()));
    }

    #[test]
    fn custom_predicate() {
        let config = RetryConfig::new().retry_on(|e| e.to_string().contains("deadlock"));
        assert!(config.should_retry(&Error::msg("deadlock detected")));
        assert!(!config.should_retry(&Error::msg("syntax error")));
    }
}
