use crate::IsolationLevel;
use thiserror::Error;

/// Conditions raised by the driver contract itself rather than by a backend.
///
/// They travel inside [`crate::Error`] like any other error, use
/// `error.downcast_ref::<DriverError>()` to tell them apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// A legacy entry point that is permanently disabled, the context-aware
    /// variant must be used instead.
    #[error("{0} is not available, use the context-aware variant")]
    UpgradeRequired(&'static str),

    /// The wrapped handle does not expose the capability.
    #[error("driver does not support {0}")]
    NotSupported(&'static str),

    /// A named parameter reached a call path that only accepts positional values.
    #[error("named parameters are not supported")]
    NamedParametersUnsupported,

    #[error("isolation level {0:?} is not supported")]
    IsolationLevelUnsupported(IsolationLevel),

    #[error("read-only transactions are not supported")]
    ReadOnlyUnsupported,

    /// The value cannot be used as a query parameter.
    #[error("unsupported parameter value: {0}")]
    UnsupportedValue(String),
}

/// Reason a [`crate::Context`] is done.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// True when the error is a [`ContextError`].
pub fn is_context_error(error: &crate::Error) -> bool {
    error.downcast_ref::<ContextError>().is_some()
}
