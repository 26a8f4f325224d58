use crate::{ContextError, Result};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Call-scoped cancellation and deadline carrier, passed to every
/// context-aware operation.
///
/// A background context (the default) can never be cancelled. A context built
/// from a [`CancellationToken`] is cancelled when the token is, a context with a
/// deadline is done once the deadline passes.
///
/// ```rust
/// use layerdb_core::{Context, ContextError};
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// let ctx = Context::with_token(token.clone());
/// assert!(ctx.err().is_none());
/// token.cancel();
/// assert_eq!(ctx.err(), Some(ContextError::Canceled));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl Context {
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token: Some(token),
            deadline: None,
        }
    }

    /// New cancellable context, returns the token controlling it.
    pub fn cancellable() -> (Self, CancellationToken) {
        let token = CancellationToken::new();
        (Self::with_token(token.clone()), token)
    }

    /// Keeps the earliest deadline if one is already set.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Child context cancelled together with this one, but which can also be
    /// cancelled on its own.
    pub fn child(&self) -> (Self, CancellationToken) {
        let token = match &self.token {
            Some(token) => token.child_token(),
            None => CancellationToken::new(),
        };
        (
            Self {
                token: Some(token.clone()),
                deadline: self.deadline,
            },
            token,
        )
    }

    /// Whether this context can ever become done.
    pub fn is_cancellable(&self) -> bool {
        self.token.is_some() || self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The reason this context is done, `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Some(ContextError::Canceled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(ContextError::DeadlineExceeded);
        }
        None
    }

    /// `Err` with the context error when done.
    pub fn check(&self) -> Result<()> {
        match self.err() {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    /// Resolves once the context is done, never for a background context.
    pub async fn done(&self) -> ContextError {
        match (&self.token, self.deadline) {
            (Some(token), Some(deadline)) => {
                tokio::select! {
                    _ = token.cancelled() => ContextError::Canceled,
                    _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
                }
            }
            (Some(token), None) => {
                token.cancelled().await;
                ContextError::Canceled
            }
            (None, Some(deadline)) => {
                tokio::time::sleep_until(deadline).await;
                ContextError::DeadlineExceeded
            }
            (None, None) => std::future::pending().await,
        }
    }
}
