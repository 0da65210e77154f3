//! Channel-backed group source for tests and in-process wiring.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use super::error::MonitorError;
use super::traits::GroupSource;
use super::types::GroupUpdate;

const GROUP_CHANNEL_CAPACITY: usize = 16;

/// [`GroupSource`] fed through plain channels.
///
/// Register the groups up front; each registration hands back the sender
/// end, and the matching subscription (taken once) gets the receiver.
///
/// # Examples
///
/// ```rust
/// use resmesh_membership::monitor::{ChannelGroupSource, GroupSource, GroupUpdate};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let groups = ChannelGroupSource::new();
/// let online = groups.register("broker.online");
///
/// let mut stream = groups.subscribe("broker.online").await?;
/// online.send(GroupUpdate::new("0-3")).await?;
/// assert_eq!(stream.recv().await, Some(GroupUpdate::new("0-3")));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChannelGroupSource {
    inner: Arc<Mutex<HashMap<String, mpsc::Receiver<GroupUpdate>>>>,
}

impl ChannelGroupSource {
    /// Create a source with no groups registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `group` and return the sender that feeds its snapshots.
    ///
    /// Registering a group again replaces the previous unclaimed
    /// subscription.
    pub fn register(&self, group: &str) -> mpsc::Sender<GroupUpdate> {
        let (tx, rx) = mpsc::channel(GROUP_CHANNEL_CAPACITY);
        self.inner.lock().insert(group.to_string(), rx);
        tx
    }
}

#[async_trait]
impl GroupSource for ChannelGroupSource {
    async fn subscribe(&self, group: &str) -> Result<mpsc::Receiver<GroupUpdate>, MonitorError> {
        self.inner
            .lock()
            .remove(group)
            .ok_or_else(|| MonitorError::UnknownGroup(group.to_string()))
    }
}
