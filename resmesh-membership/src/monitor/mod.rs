//! # Membership Monitor Module
//!
//! Tracks which ranks of the instance are online, torpid, and lost, and
//! publishes every transition to the resource event log.
//!
//! A monitor exists on every rank but is fully active only on the leader
//! (rank 0): the leader subscribes to the overlay's streaming group
//! snapshots, diffs them against its cached sets, posts join/leave events,
//! and answers waitup, force-down, and status requests. Followers answer
//! every leader-only request with a fixed error and mutate nothing.
//!
//! ## Rank state machine
//!
//! ```text
//!               snapshot adds it            snapshot removes it (while up)
//!   offline  ─────────────────────►  online  ─────────────────────►  lost
//!      ▲                                                              │
//!      └──────────── snapshot adds it (clears lost) ──────────────────┘
//! ```
//!
//! Torpid is an orthogonal flag: a rank may be up and torpid at once.

pub mod channels;
pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod traits;
pub mod types;

mod service;
mod state;

pub use channels::ChannelGroupSource;
pub use config::{MonitorConfig, MonitorConfigBuilder, ONLINE_GROUP, SDMON_ONLINE_GROUP, TORPID_GROUP};
pub use error::MonitorError;
pub use events::{
    EVENTLOG_PATH, EVENT_LIVELY, EVENT_OFFLINE, EVENT_ONLINE, EVENT_RESTART, EVENT_TORPID,
};
pub use handle::{MembershipMonitor, MonitorClient};
pub use traits::GroupSource;
pub use types::{GroupUpdate, MembershipStatus};
