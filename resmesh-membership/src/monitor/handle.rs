//! Public monitor handle and per-client request API.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tokio::sync::{mpsc, oneshot};

// Layer 3: Internal module imports
use super::config::MonitorConfig;
use super::error::MonitorError;
use super::service;
use super::traits::GroupSource;
use super::types::{MembershipStatus, MonitorRequest};
use crate::eventlog::BatchAppender;

/// Handle to a spawned membership monitor.
///
/// Cheap clone; all clones talk to the same task. Requests go through a
/// [`MonitorClient`] so deferred waitups can be culled per client on
/// disconnect.
///
/// # Examples
///
/// ```rust,no_run
/// use std::time::Duration;
///
/// use resmesh_membership::eventlog::{BatchAppender, InMemoryEventLog, NoopHooks};
/// use resmesh_membership::monitor::{
///     ChannelGroupSource, MembershipMonitor, MonitorConfig, ONLINE_GROUP, TORPID_GROUP,
/// };
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let appender = BatchAppender::spawn(
///     InMemoryEventLog::new(),
///     NoopHooks,
///     Duration::from_millis(5),
/// );
/// let groups = ChannelGroupSource::new();
/// let _online = groups.register(ONLINE_GROUP);
/// let _torpid = groups.register(TORPID_GROUP);
///
/// let config = MonitorConfig::builder().with_size(4).build()?;
/// let monitor = MembershipMonitor::spawn(config, groups, appender).await?;
///
/// let client = monitor.client();
/// let status = client.status().await?;
/// assert_eq!(status.size, 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MembershipMonitor {
    tx: mpsc::Sender<MonitorRequest>,
    next_client: Arc<AtomicU64>,
}

impl MembershipMonitor {
    /// Spawn the monitor for this rank.
    ///
    /// On the leader this subscribes to the configured group streams
    /// (unless forced up or in recovery mode) and posts the `restart`
    /// event before any other; followers only service requests, with the
    /// canonical leader-only rejection.
    ///
    /// # Errors
    ///
    /// Configuration validation, stream subscription, and restart-event
    /// posting errors; partial state is torn down on failure.
    pub async fn spawn<G: GroupSource>(
        config: MonitorConfig,
        groups: G,
        appender: BatchAppender,
    ) -> Result<Self, MonitorError> {
        let tx = service::start(config, groups, appender).await?;
        Ok(Self {
            tx,
            next_client: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Create a client connection with its own identity.
    pub fn client(&self) -> MonitorClient {
        MonitorClient {
            tx: self.tx.clone(),
            id: self.next_client.fetch_add(1, Ordering::Relaxed),
        }
    }
}

/// One client connection to the monitor.
///
/// Waitups deferred by this client are dropped when it disconnects.
#[derive(Debug)]
pub struct MonitorClient {
    tx: mpsc::Sender<MonitorRequest>,
    id: u64,
}

impl MonitorClient {
    /// Block until the online rank count equals `target`.
    ///
    /// Responds immediately when the count already matches; otherwise the
    /// response is deferred until a snapshot or force-down moves the count
    /// onto `target`. The success response is sent strictly after the
    /// events for that transition were posted. There is no timeout.
    ///
    /// # Errors
    ///
    /// [`MonitorError::NotLeader`] on followers,
    /// [`MonitorError::InvalidInput`] when `target` exceeds the instance
    /// size, [`MonitorError::Closed`] when the monitor is gone.
    pub async fn waitup(&self, target: usize) -> Result<(), MonitorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(MonitorRequest::Waitup {
            target,
            client: self.id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| MonitorError::Closed)?
    }

    /// Administratively mark `ranks` (an idset string) offline.
    ///
    /// # Errors
    ///
    /// [`MonitorError::Parse`] with caller-facing text for malformed
    /// `ranks`; [`MonitorError::NotLeader`] on followers.
    pub async fn force_down(&self, ranks: &str) -> Result<(), MonitorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(MonitorRequest::ForceDown {
            ranks: ranks.to_string(),
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| MonitorError::Closed)?
    }

    /// Report current membership, all sets encoded.
    ///
    /// # Errors
    ///
    /// [`MonitorError::NotLeader`] on followers.
    pub async fn status(&self) -> Result<MembershipStatus, MonitorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(MonitorRequest::Status { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| MonitorError::Closed)?
    }

    /// Tell the monitor this client is gone; its deferred waitups are
    /// cancelled without a response (their futures resolve with
    /// [`MonitorError::Closed`]).
    pub async fn disconnect(&self) -> Result<(), MonitorError> {
        self.send(MonitorRequest::Disconnect { client: self.id })
            .await
    }

    async fn send(&self, request: MonitorRequest) -> Result<(), MonitorError> {
        self.tx
            .send(request)
            .await
            .map_err(|_| MonitorError::Closed)
    }
}
