//! Structured event entries.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Layer 3: Internal module imports
// (none)

/// One event in the durable log: a timestamp, a name, and a structured
/// context whose shape is event-specific.
///
/// # Examples
///
/// ```rust
/// use resmesh_membership::eventlog::EventEntry;
/// use serde_json::json;
///
/// let entry = EventEntry::new("online", json!({"idset": "0-3"}));
/// assert_eq!(entry.name, "online");
/// assert_eq!(entry.context_str("idset"), Some("0-3"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEntry {
    /// When the event was recorded
    pub timestamp: DateTime<Utc>,
    /// Event name, e.g. `online` or `restart`
    pub name: String,
    /// Event-specific structured context
    pub context: Value,
}

impl EventEntry {
    /// Create an entry stamped with the current time.
    pub fn new(name: impl Into<String>, context: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            name: name.into(),
            context,
        }
    }

    /// Convenience accessor for a string-valued context key.
    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_entry() {
        let entry = EventEntry::new("restart", json!({"ranks": "0-3"}));
        assert_eq!(entry.name, "restart");
        assert_eq!(entry.context_str("ranks"), Some("0-3"));
        assert_eq!(entry.context_str("missing"), None);
    }

    #[test]
    fn test_entry_round_trips_through_json() {
        let entry = EventEntry::new("offline", json!({"idset": "3"}));
        let text = serde_json::to_string(&entry).unwrap();
        let back: EventEntry = serde_json::from_str(&text).unwrap();
        assert_eq!(back, entry);
    }
}
