//! Logging capability injected into the matcher.

use std::error::Error;
use std::fmt;

/// Diagnostic sink used by [`RequestMatcher`](crate::RequestMatcher).
///
/// Implementations must be safe to call from concurrent `match_request` calls.
pub trait Logger: Send + Sync + fmt::Debug {
    /// A recoverable problem, e.g. a mock that failed to evaluate.
    fn warn(&self, message: &str, error: &dyn Error);

    fn debug(&self, _message: &str) {}
}

/// Default logger, forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn warn(&self, message: &str, error: &dyn Error) {
        tracing::warn!(err = %error, "{}", message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
    }
}
