//! Leader-side membership state and waitup bookkeeping.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use tokio::sync::oneshot;

// Layer 3: Internal module imports
use super::error::MonitorError;
use super::types::{GroupKind, MembershipStatus};
use crate::waitqueue::{Wait, WaitQueue};
use resmesh_idset::IdSet;

/// A deferred waitup request: who asked, and where the answer goes.
///
/// Carried as the waitqueue message so a disconnecting client's tickets
/// can be culled by predicate across every target-count queue.
pub(crate) struct WaitupTicket {
    pub(crate) client: u64,
    pub(crate) reply: oneshot::Sender<Result<(), MonitorError>>,
}

/// Monitor role: fully populated on the leader, empty on followers.
pub(crate) enum Role {
    Leader(Box<LeaderState>),
    Follower,
}

/// Membership sets and deferred waitups, leader rank only.
///
/// Invariants:
/// - `up` and the derived `down` partition `[0, size)`.
/// - `lost` holds only ranks that left `up` after having been in it; a
///   rank rejoining `up` leaves `lost`.
pub(crate) struct LeaderState {
    pub(crate) size: usize,
    pub(crate) up: IdSet,
    pub(crate) torpid: IdSet,
    pub(crate) lost: IdSet,
    /// Deferred waitups keyed by the online count they wait for.
    waiters: HashMap<usize, WaitQueue<WaitupTicket>>,
}

impl LeaderState {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            size,
            up: IdSet::new(size),
            torpid: IdSet::new(size),
            lost: IdSet::new(size),
            waiters: HashMap::new(),
        }
    }

    /// Mark the full rank range up (the force-up configuration).
    pub(crate) fn force_up(&mut self) {
        self.up = IdSet::full(self.size);
    }

    /// Offline ranks, derived from `up` so it can never drift.
    pub(crate) fn down(&self) -> IdSet {
        IdSet::full(self.size).difference(&self.up)
    }

    /// The cached set a group's snapshots diff against.
    pub(crate) fn cached(&self, kind: GroupKind) -> &IdSet {
        match kind {
            GroupKind::Online => &self.up,
            GroupKind::Torpid => &self.torpid,
        }
    }

    /// Commit a new group view; for the online group this also maintains
    /// `lost` from the diff that produced it.
    pub(crate) fn commit(&mut self, kind: GroupKind, new: IdSet, join: &IdSet, leave: &IdSet) {
        match kind {
            GroupKind::Online => {
                self.lost.union_with(leave);
                self.lost.subtract(join);
                self.up = new;
            }
            GroupKind::Torpid => {
                self.torpid = new;
            }
        }
    }

    /// Park a well-formed waitup ticket until the count is reached.
    pub(crate) fn defer_waitup(&mut self, target: usize, ticket: WaitupTicket) {
        let wait = Wait::with_message(ticket, |ticket: WaitupTicket| {
            let _ = ticket.reply.send(Ok(()));
        });
        self.waiters.entry(target).or_default().enqueue(wait);
    }

    /// Wake every waitup deferred on the current online count.
    ///
    /// Called after each `up` mutation, strictly after the events for that
    /// mutation were posted.
    pub(crate) fn notify_waitup(&mut self) {
        let count = self.up.count();
        if let Some(mut queue) = self.waiters.remove(&count) {
            queue.run();
        }
    }

    /// Drop a disconnected client's tickets from every queue.
    pub(crate) fn drop_client(&mut self, client: u64) {
        self.waiters.retain(|_, queue| {
            queue.cancel_matching(|ticket| ticket.client == client);
            !queue.is_empty()
        });
    }

    /// Number of deferred waitup tickets, across all target counts.
    pub(crate) fn deferred_waitups(&self) -> usize {
        self.waiters.values().map(WaitQueue::len).sum()
    }

    pub(crate) fn status(&self) -> MembershipStatus {
        MembershipStatus {
            size: self.size,
            up: self.up.encode(),
            down: self.down().encode(),
            torpid: self.torpid.encode(),
            lost: self.lost.encode(),
        }
    }
}

/// `(join, leave)` between a cached group view and a fresh snapshot.
pub(crate) fn diff(cached: &IdSet, new: &IdSet) -> (IdSet, IdSet) {
    (new.difference(cached), cached.difference(new))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decoded(s: &str, size: usize) -> IdSet {
        IdSet::decode(s, size).unwrap()
    }

    #[test]
    fn test_diff_join_and_leave() {
        let cached = decoded("0-2", 8);
        let new = decoded("1-3", 8);

        let (join, leave) = diff(&cached, &new);
        assert_eq!(join.encode(), "3");
        assert_eq!(leave.encode(), "0");
    }

    #[test]
    fn test_up_and_down_partition_the_universe() {
        let mut state = LeaderState::new(4);
        let new = decoded("0,2", 4);
        let (join, leave) = diff(&state.up, &new);
        state.commit(GroupKind::Online, new, &join, &leave);

        assert_eq!(state.up.encode(), "0,2");
        assert_eq!(state.down().encode(), "1,3");
        assert_eq!(state.up.count() + state.down().count(), 4);
        assert!(state.up.intersection(&state.down()).is_empty());
    }

    #[test]
    fn test_lost_tracks_online_to_offline_only() {
        let mut state = LeaderState::new(4);

        // Initial join: nothing lost.
        let new = decoded("0-3", 4);
        let (join, leave) = diff(&state.up, &new);
        state.commit(GroupKind::Online, new, &join, &leave);
        assert!(state.lost.is_empty());

        // Rank 3 drops while up: lost.
        let new = decoded("0-2", 4);
        let (join, leave) = diff(&state.up, &new);
        state.commit(GroupKind::Online, new, &join, &leave);
        assert_eq!(state.lost.encode(), "3");

        // Rank 3 rejoins: cleared from lost.
        let new = decoded("0-3", 4);
        let (join, leave) = diff(&state.up, &new);
        state.commit(GroupKind::Online, new, &join, &leave);
        assert!(state.lost.is_empty());
    }

    #[test]
    fn test_initially_offline_rank_is_not_lost() {
        let mut state = LeaderState::new(4);

        // Only 0-2 ever join; rank 3 was never up.
        let new = decoded("0-2", 4);
        let (join, leave) = diff(&state.up, &new);
        state.commit(GroupKind::Online, new, &join, &leave);

        assert!(state.lost.is_empty());
        assert!(state.down().test(3));
    }

    #[test]
    fn test_torpid_commit_leaves_lost_alone() {
        let mut state = LeaderState::new(4);
        let new = decoded("1", 4);
        let (join, leave) = diff(&state.torpid, &new);
        state.commit(GroupKind::Torpid, new, &join, &leave);

        assert_eq!(state.torpid.encode(), "1");
        assert!(state.lost.is_empty());
        assert!(state.up.is_empty()); // orthogonal to online
    }

    #[tokio::test]
    async fn test_notify_waitup_fires_matching_count_only() {
        let mut state = LeaderState::new(4);
        let (tx2, mut rx2) = oneshot::channel();
        let (tx3, mut rx3) = oneshot::channel();
        state.defer_waitup(2, WaitupTicket { client: 1, reply: tx2 });
        state.defer_waitup(3, WaitupTicket { client: 1, reply: tx3 });
        assert_eq!(state.deferred_waitups(), 2);

        state.up = decoded("0,2", 4);
        state.notify_waitup();

        assert_eq!(rx2.try_recv().unwrap(), Ok(()));
        assert!(rx3.try_recv().is_err()); // still parked
        assert_eq!(state.deferred_waitups(), 1);
    }

    #[tokio::test]
    async fn test_drop_client_culls_across_queues() {
        let mut state = LeaderState::new(4);
        let (tx_a, mut rx_a) = oneshot::channel();
        let (tx_b, mut rx_b) = oneshot::channel();
        let (tx_keep, mut rx_keep) = oneshot::channel();
        state.defer_waitup(2, WaitupTicket { client: 7, reply: tx_a });
        state.defer_waitup(3, WaitupTicket { client: 7, reply: tx_b });
        state.defer_waitup(3, WaitupTicket { client: 8, reply: tx_keep });

        state.drop_client(7);
        assert_eq!(state.deferred_waitups(), 1);

        // Culled tickets never answer; the survivor still does.
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_err());
        state.up = decoded("0-2", 4);
        state.notify_waitup();
        assert_eq!(rx_keep.try_recv().unwrap(), Ok(()));
    }
}
