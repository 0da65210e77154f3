//! Monitor request, snapshot, and status types.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

// Layer 3: Internal module imports
use super::error::MonitorError;

/// One streaming snapshot of a group's membership.
///
/// Carries the group's full member set as an idset string; the monitor
/// diffs successive snapshots itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupUpdate {
    /// Encoded idset of the group's current members
    pub members: String,
}

impl GroupUpdate {
    /// Create an update from an encoded member set.
    pub fn new(members: impl Into<String>) -> Self {
        Self {
            members: members.into(),
        }
    }
}

/// Point-in-time membership summary, all sets in encoded form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipStatus {
    /// Working universe size
    pub size: usize,
    /// Ranks currently online
    pub up: String,
    /// Ranks currently offline (complement of `up`)
    pub down: String,
    /// Ranks currently torpid
    pub torpid: String,
    /// Offline ranks that were online earlier in this session
    pub lost: String,
}

/// The two observed groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GroupKind {
    Online,
    Torpid,
}

impl GroupKind {
    /// `(join, leave)` event names for this group's diffs.
    pub(crate) fn event_names(self) -> (&'static str, &'static str) {
        match self {
            GroupKind::Online => (super::events::EVENT_ONLINE, super::events::EVENT_OFFLINE),
            GroupKind::Torpid => (super::events::EVENT_TORPID, super::events::EVENT_LIVELY),
        }
    }
}

/// Requests the monitor task services.
pub(crate) enum MonitorRequest {
    /// Block until the online count reaches `target` exactly.
    Waitup {
        target: usize,
        client: u64,
        reply: oneshot::Sender<Result<(), MonitorError>>,
    },
    /// Administratively mark `ranks` offline.
    ForceDown {
        ranks: String,
        reply: oneshot::Sender<Result<(), MonitorError>>,
    },
    /// Report current membership.
    Status {
        reply: oneshot::Sender<Result<MembershipStatus, MonitorError>>,
    },
    /// A client went away; drop its deferred waitups.
    Disconnect { client: u64 },
}
