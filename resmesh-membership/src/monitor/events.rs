//! Membership event schema on the resource event log.
//!
//! | name      | context keys                                |
//! |-----------|---------------------------------------------|
//! | `restart` | `ranks`, `online`, `nodelist` (all strings) |
//! | `online`  | `idset`                                     |
//! | `offline` | `idset`                                     |
//! | `torpid`  | `idset`                                     |
//! | `lively`  | `idset`                                     |
//!
//! Idset-valued keys carry the canonical run-length encoding.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde_json::json;

// Layer 3: Internal module imports
use crate::eventlog::EventEntry;
use resmesh_idset::IdSet;

/// Log path membership events are appended to.
pub const EVENTLOG_PATH: &str = "resource.eventlog";

/// First event of a fresh monitor: records the initial view.
pub const EVENT_RESTART: &str = "restart";

/// Ranks joined the online group.
pub const EVENT_ONLINE: &str = "online";

/// Ranks left the online group.
pub const EVENT_OFFLINE: &str = "offline";

/// Ranks joined the torpid group.
pub const EVENT_TORPID: &str = "torpid";

/// Ranks left the torpid group.
pub const EVENT_LIVELY: &str = "lively";

/// Build the restart event recording the initial `online` set, the full
/// rank universe, and the instance's host list.
pub(crate) fn restart_entry(ranks: &IdSet, online: &IdSet, nodelist: &str) -> EventEntry {
    EventEntry::new(
        EVENT_RESTART,
        json!({
            "ranks": ranks,
            "online": online,
            "nodelist": nodelist,
        }),
    )
}

/// Build a join/leave transition event carrying one idset.
pub(crate) fn transition_entry(name: &str, idset: &IdSet) -> EventEntry {
    EventEntry::new(name, json!({ "idset": idset }))
}
