//! # resmesh-membership - Resource-membership core for the mesh broker
//!
//! Maintains an authoritative, eventually-consistent view of which broker
//! ranks are online, offline, torpid, or lost, and publishes every
//! transition to an append-only resource event log that schedulers and job
//! managers consume.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use resmesh_membership::eventlog::{BatchAppender, InMemoryEventLog, NoopHooks};
//! use resmesh_membership::monitor::{
//!     ChannelGroupSource, GroupUpdate, MembershipMonitor, MonitorConfig, ONLINE_GROUP,
//!     TORPID_GROUP,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryEventLog::new();
//! let appender = BatchAppender::spawn(store, NoopHooks, Duration::from_millis(5));
//!
//! let groups = ChannelGroupSource::new();
//! let online = groups.register(ONLINE_GROUP);
//! let _torpid = groups.register(TORPID_GROUP);
//!
//! let config = MonitorConfig::builder().with_size(4).build()?;
//! let monitor = MembershipMonitor::spawn(config, groups, appender).await?;
//!
//! // Overlay reports ranks 0-3 online; a client blocks until all four are up.
//! let client = monitor.client();
//! online.send(GroupUpdate::new("0-3")).await?;
//! client.waitup(4).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! ## Core Membership
//! - [`monitor`] - Group snapshot diffing, waitup/force-down/status requests
//! - [`eventlog`] - Batched, ordered append to the durable resource event log
//!
//! ## Deferral Primitive
//! - [`waitqueue`] - Reference-counted waits addable to multiple queues,
//!   with bulk wake and selective cancellation
//!
//! # Consistency Contract
//!
//! - Membership transitions appear on the event log in a total order per
//!   path; join events precede leave events for a single snapshot diff.
//! - Waitup responses are sent strictly after the `up` mutation (and its
//!   event posting) that satisfies them.
//! - A wait enqueued on several queues fires its callback at most once,
//!   however the queues are drained.

pub mod eventlog;
pub mod monitor;
pub mod waitqueue;

// Re-export commonly used types
pub use eventlog::{
    AppendFlag, AppenderHooks, BatchAppender, EventEntry, EventLogError, EventLogStore,
    InMemoryEventLog, NoopHooks,
};
pub use monitor::{
    ChannelGroupSource, GroupSource, GroupUpdate, MembershipMonitor, MembershipStatus,
    MonitorClient, MonitorConfig, MonitorError,
};
pub use waitqueue::{Wait, WaitQueue};
