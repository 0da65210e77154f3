//! Seams between the appender, its durable backing, and its observer.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::entry::EventEntry;
use super::error::EventLogError;

/// Durable backing for the event log.
///
/// In production this is the key-value store the instance persists to; the
/// crate ships [`InMemoryEventLog`](super::InMemoryEventLog) for tests and
/// single-process deployments.
///
/// Implementations must append `entries` to `path` atomically with respect
/// to other commits on the same path: a failed commit must not leave a
/// partial batch behind.
#[async_trait]
pub trait EventLogStore: Send + Sync + 'static {
    /// Append a batch of entries to the log at `path`.
    async fn commit(&self, path: &str, entries: &[EventEntry]) -> Result<(), EventLogError>;
}

/// Observer hooks for appender state transitions and commit failures.
///
/// All hooks default to no-ops, so implementations override only what they
/// observe. Hooks are invoked from the appender task; keep them brief.
pub trait AppenderHooks: Send + Sync + 'static {
    /// A batch now exists after the appender was idle.
    fn on_busy(&self) {}

    /// The append queue drained; the appender is idle again.
    fn on_idle(&self) {}

    /// `entry` failed to commit. Called once per entry of a failed batch;
    /// re-append to retry.
    fn on_commit_error(&self, entry: &EventEntry, error: &EventLogError) {
        let _ = (entry, error);
    }
}

/// Hooks implementation that observes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl AppenderHooks for NoopHooks {}
