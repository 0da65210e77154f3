//! Error types for idset construction, mutation, and parsing.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Errors produced by [`IdSet`](crate::IdSet) operations.
///
/// Parse errors carry the offending input and a reason phrased for the
/// caller: force-down style RPCs forward `to_string()` output verbatim as
/// the error text of their response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdSetError {
    /// An id at or beyond the set's fixed capacity was introduced.
    #[error("id {id} is out of range for capacity {capacity}")]
    OutOfRange {
        /// The offending id
        id: usize,
        /// The set's fixed universe size
        capacity: usize,
    },

    /// A range operation was given descending bounds.
    #[error("invalid range {lo}-{hi}: bounds are descending")]
    InvalidRange {
        /// Lower bound as given
        lo: usize,
        /// Upper bound as given
        hi: usize,
    },

    /// The input string does not match the idset grammar.
    ///
    /// Grammar: `ids := id ("," id)*` with `id := N | N "-" M` (M >= N).
    #[error("malformed idset {input:?}: {reason}")]
    Parse {
        /// The input that failed to parse
        input: String,
        /// What was wrong with it
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = IdSetError::OutOfRange { id: 9, capacity: 4 };
        assert_eq!(err.to_string(), "id 9 is out of range for capacity 4");
    }

    #[test]
    fn test_parse_message_carries_input() {
        let err = IdSetError::Parse {
            input: "1-".to_string(),
            reason: "missing range end".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("1-"));
        assert!(text.contains("missing range end"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IdSetError>();
    }
}
