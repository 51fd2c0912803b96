//! Sink for non-fatal internal errors
//!
//! Hooks have no error channel back to the client for degraded-but-acceptable
//! outcomes, so they hand such errors to an [`ErrorReporter`] and carry on.

use std::sync::{Arc, Mutex};

use crate::error::ApiError;

/// Fire-and-forget destination for errors that must not abort a request
pub trait ErrorReporter: Send + Sync {
    fn report(&self, err: &ApiError);
}

/// Logs reported errors through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, err: &ApiError) {
        tracing::error!(error = %err, "unhandled internal error");
    }
}

/// Keeps reported errors in memory for later inspection
#[derive(Debug, Default, Clone)]
pub struct RecordingErrorReporter {
    errors: Arc<Mutex<Vec<ApiError>>>,
}

impl RecordingErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors reported so far, oldest first
    pub fn errors(&self) -> Vec<ApiError> {
        self.errors
            .lock()
            .map(|errors| errors.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.errors.lock().map(|errors| errors.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorReporter for RecordingErrorReporter {
    fn report(&self, err: &ApiError) {
        tracing::warn!(error = %err, "recording internal error");
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(err.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_reporter_shares_state_across_clones() {
        let reporter = RecordingErrorReporter::new();
        let clone = reporter.clone();
        clone.report(&ApiError::internal("allocation error: no shards"));

        assert_eq!(reporter.len(), 1);
        assert!(matches!(reporter.errors()[0], ApiError::Internal(_)));
    }

    #[test]
    fn test_tracing_reporter_does_not_panic() {
        TracingErrorReporter.report(&ApiError::internal("boom"));
    }
}
