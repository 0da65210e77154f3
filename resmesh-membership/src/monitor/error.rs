//! Monitor error types.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::eventlog::EventLogError;
use resmesh_idset::IdSetError;

/// Failure modes of the membership monitor and its RPC surface.
///
/// Parse and invalid-input errors are surfaced to the caller unchanged and
/// never mutate membership state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MonitorError {
    /// A leader-only request reached a follower.
    #[error("this RPC only works on rank 0")]
    NotLeader,

    /// Malformed request payload or out-of-range value.
    #[error("invalid request: {0}")]
    InvalidInput(String),

    /// Malformed idset string; carries the caller-facing detail.
    #[error(transparent)]
    Parse(#[from] IdSetError),

    /// Event log append failed.
    #[error(transparent)]
    EventLog(#[from] EventLogError),

    /// Invalid monitor configuration.
    #[error("invalid monitor configuration: {0}")]
    Config(String),

    /// A stream subscription named a group the source does not publish.
    #[error("unknown group {0:?}")]
    UnknownGroup(String),

    /// The monitor task is gone.
    #[error("monitor is shut down")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_leader_message_is_fixed() {
        assert_eq!(
            MonitorError::NotLeader.to_string(),
            "this RPC only works on rank 0"
        );
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let err = MonitorError::from(IdSetError::OutOfRange { id: 9, capacity: 4 });
        assert_eq!(err.to_string(), "id 9 is out of range for capacity 4");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MonitorError>();
    }
}
