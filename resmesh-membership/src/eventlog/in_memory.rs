//! In-memory event log store for tests and single-process deployments.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::entry::EventEntry;
use super::error::EventLogError;
use super::traits::EventLogStore;

/// In-memory [`EventLogStore`] keyed by path.
///
/// Cheap clone via `Arc`; all clones share the same logs. Commit failures
/// can be injected for tests with
/// [`fail_next_commits`](InMemoryEventLog::fail_next_commits).
///
/// # Examples
///
/// ```rust
/// use resmesh_membership::eventlog::{EventEntry, EventLogStore, InMemoryEventLog};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryEventLog::new();
/// let entry = EventEntry::new("online", json!({"idset": "0"}));
/// store.commit("resource.eventlog", &[entry]).await?;
/// assert_eq!(store.len("resource.eventlog"), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventLog {
    inner: Arc<InMemoryEventLogInner>,
}

#[derive(Debug, Default)]
struct InMemoryEventLogInner {
    logs: DashMap<String, Vec<EventEntry>>,
    /// Remaining number of commits to fail (test support)
    fail_budget: AtomicUsize,
}

impl InMemoryEventLog {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries committed to `path`, in commit order.
    pub fn entries(&self, path: &str) -> Vec<EventEntry> {
        self.inner
            .logs
            .get(path)
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Event names committed to `path`, in commit order.
    pub fn event_names(&self, path: &str) -> Vec<String> {
        self.entries(path)
            .into_iter()
            .map(|entry| entry.name)
            .collect()
    }

    /// Number of entries committed to `path`.
    pub fn len(&self, path: &str) -> usize {
        self.inner.logs.get(path).map(|log| log.len()).unwrap_or(0)
    }

    /// True when nothing was committed to `path`.
    pub fn is_empty(&self, path: &str) -> bool {
        self.len(path) == 0
    }

    /// Make the next `n` commits fail without recording anything.
    pub fn fail_next_commits(&self, n: usize) {
        self.inner.fail_budget.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventLogStore for InMemoryEventLog {
    async fn commit(&self, path: &str, entries: &[EventEntry]) -> Result<(), EventLogError> {
        let remaining = self
            .inner
            .fail_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if remaining.is_ok() {
            return Err(EventLogError::Commit {
                path: path.to_string(),
                reason: "injected commit failure".to_string(),
            });
        }

        self.inner
            .logs
            .entry(path.to_string())
            .or_default()
            .extend_from_slice(entries);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_commit_appends_in_order() {
        let store = InMemoryEventLog::new();
        store
            .commit(
                "resource.eventlog",
                &[
                    EventEntry::new("restart", json!({})),
                    EventEntry::new("online", json!({"idset": "0-3"})),
                ],
            )
            .await
            .unwrap();

        assert_eq!(
            store.event_names("resource.eventlog"),
            vec!["restart", "online"]
        );
    }

    #[tokio::test]
    async fn test_paths_are_independent() {
        let store = InMemoryEventLog::new();
        store
            .commit("a", &[EventEntry::new("one", json!({}))])
            .await
            .unwrap();

        assert_eq!(store.len("a"), 1);
        assert!(store.is_empty("b"));
    }

    #[tokio::test]
    async fn test_clone_shares_logs() {
        let store = InMemoryEventLog::new();
        let clone = store.clone();
        store
            .commit("a", &[EventEntry::new("one", json!({}))])
            .await
            .unwrap();

        assert_eq!(clone.len("a"), 1);
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let store = InMemoryEventLog::new();
        store.fail_next_commits(1);

        let entry = EventEntry::new("one", json!({}));
        let err = store.commit("a", &[entry.clone()]).await.unwrap_err();
        assert!(matches!(err, EventLogError::Commit { .. }));
        assert!(store.is_empty("a"));

        // Budget exhausted: the next commit succeeds.
        store.commit("a", &[entry]).await.unwrap();
        assert_eq!(store.len("a"), 1);
    }
}
