//! Seam to the overlay's group membership streams.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use super::error::MonitorError;
use super::types::GroupUpdate;

/// Source of streaming group membership snapshots.
///
/// In production this wraps the overlay's `groups.get` streaming RPC; the
/// crate ships [`ChannelGroupSource`](super::ChannelGroupSource) for tests
/// and in-process wiring. Each subscription yields the group's full member
/// set whenever it changes; the monitor diffs consecutive snapshots.
#[async_trait]
pub trait GroupSource: Send + Sync + 'static {
    /// Open a streaming subscription to `group`.
    ///
    /// # Errors
    ///
    /// [`MonitorError::UnknownGroup`] when the source does not publish
    /// `group`.
    async fn subscribe(&self, group: &str) -> Result<mpsc::Receiver<GroupUpdate>, MonitorError>;
}
