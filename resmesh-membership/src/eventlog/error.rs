//! Event log error types.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Failure modes of the event log appender and its stores.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventLogError {
    /// The appender task is gone; no further appends are possible.
    #[error("event log appender is closed")]
    Closed,

    /// The durable store rejected a batch commit.
    ///
    /// Reported once per affected entry through
    /// [`AppenderHooks::on_commit_error`](super::AppenderHooks::on_commit_error),
    /// and returned to wait-flag callers of the failed batch.
    #[error("commit to {path:?} failed: {reason}")]
    Commit {
        /// Log path the batch targeted
        path: String,
        /// Store-reported reason
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_error_message() {
        let err = EventLogError::Commit {
            path: "resource.eventlog".to_string(),
            reason: "kvs unavailable".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("resource.eventlog"));
        assert!(text.contains("kvs unavailable"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EventLogError>();
    }
}
