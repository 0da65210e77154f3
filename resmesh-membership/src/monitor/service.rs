//! The monitor task: snapshot diffing and request servicing.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

// Layer 3: Internal module imports
use super::config::{MonitorConfig, TORPID_GROUP};
use super::error::MonitorError;
use super::events::{
    restart_entry, transition_entry, EVENTLOG_PATH, EVENT_OFFLINE, EVENT_ONLINE,
};
use super::state::{diff, LeaderState, Role, WaitupTicket};
use super::traits::GroupSource;
use super::types::{GroupKind, GroupUpdate, MembershipStatus, MonitorRequest};
use crate::eventlog::{AppendFlag, BatchAppender};
use resmesh_idset::IdSet;

const REQUEST_CHANNEL_CAPACITY: usize = 64;

/// Validate the configuration, initialize role state, post the restart
/// event, and spawn the monitor task. Returns the request channel.
///
/// On the leader the restart event is appended before the task starts, so
/// it is the first event a fresh monitor emits.
pub(crate) async fn start<G: GroupSource>(
    config: MonitorConfig,
    groups: G,
    appender: BatchAppender,
) -> Result<mpsc::Sender<MonitorRequest>, MonitorError> {
    config.validate()?;
    let (tx, rx) = mpsc::channel(REQUEST_CHANNEL_CAPACITY);

    let (role, online_rx, torpid_rx) = if config.is_leader() {
        let size = config.effective_size();
        let mut state = LeaderState::new(size);
        if config.force_up {
            state.force_up();
        }

        // Streams are only observed in a live instance: forced-up and
        // recovery-mode monitors publish the restart event and stop there.
        let (online_rx, torpid_rx) = if config.force_up || config.recovery_mode {
            (None, None)
        } else {
            let online_rx = groups.subscribe(config.online_group()).await?;
            let torpid_rx = groups.subscribe(TORPID_GROUP).await?;
            (Some(online_rx), Some(torpid_rx))
        };

        let ranks = IdSet::full(size);
        let nodelist = config.hostlist.clone().unwrap_or_default();
        appender
            .append_entry(
                AppendFlag::Async,
                EVENTLOG_PATH,
                restart_entry(&ranks, &state.up, &nodelist),
            )
            .await?;
        info!(size, online = %state.up, "membership monitor started on leader");

        (Role::Leader(Box::new(state)), online_rx, torpid_rx)
    } else {
        debug!(rank = config.rank, "membership monitor started on follower");
        (Role::Follower, None, None)
    };

    let task = MonitorTask {
        appender,
        role,
        rx,
        online_rx,
        torpid_rx,
    };
    tokio::spawn(task.run());
    Ok(tx)
}

struct MonitorTask {
    appender: BatchAppender,
    role: Role,
    rx: mpsc::Receiver<MonitorRequest>,
    online_rx: Option<mpsc::Receiver<GroupUpdate>>,
    torpid_rx: Option<mpsc::Receiver<GroupUpdate>>,
}

impl MonitorTask {
    async fn run(mut self) {
        loop {
            tokio::select! {
                request = self.rx.recv() => match request {
                    Some(request) => self.handle_request(request).await,
                    // All handles dropped: the monitor winds down.
                    None => break,
                },
                update = next_update(&mut self.online_rx), if self.online_rx.is_some() => {
                    match update {
                        Some(update) => {
                            self.handle_snapshot(GroupKind::Online, &update.members).await;
                        }
                        None => self.online_rx = None,
                    }
                },
                update = next_update(&mut self.torpid_rx), if self.torpid_rx.is_some() => {
                    match update {
                        Some(update) => {
                            self.handle_snapshot(GroupKind::Torpid, &update.members).await;
                        }
                        None => self.torpid_rx = None,
                    }
                },
            }
        }
    }

    async fn handle_request(&mut self, request: MonitorRequest) {
        match request {
            MonitorRequest::Waitup {
                target,
                client,
                reply,
            } => self.handle_waitup(target, client, reply),
            MonitorRequest::ForceDown { ranks, reply } => {
                let result = self.handle_force_down(&ranks).await;
                let _ = reply.send(result);
            }
            MonitorRequest::Status { reply } => {
                let _ = reply.send(self.handle_status());
            }
            MonitorRequest::Disconnect { client } => {
                if let Role::Leader(state) = &mut self.role {
                    state.drop_client(client);
                    debug!(
                        client,
                        deferred = state.deferred_waitups(),
                        "client disconnected"
                    );
                }
            }
        }
    }

    /// Diff one streaming snapshot against the cached group view.
    ///
    /// The cached set is committed only after the events are durably in
    /// the log; on any posting failure the snapshot is dropped and the
    /// next one re-diffs from the same base.
    async fn handle_snapshot(&mut self, kind: GroupKind, members: &str) {
        let Role::Leader(state) = &mut self.role else {
            return;
        };

        let new = match IdSet::decode(members, state.size) {
            Ok(new) => new,
            Err(error) => {
                warn!(%error, snapshot = members, "ignoring malformed group snapshot");
                return;
            }
        };

        let (join, leave) = diff(state.cached(kind), &new);
        let (join_name, leave_name) = kind.event_names();
        if let Err(error) =
            post_transitions(&self.appender, join_name, &join, leave_name, &leave).await
        {
            warn!(%error, "failed to post membership events, dropping snapshot");
            return;
        }
        if !join.is_empty() || !leave.is_empty() {
            debug!(join = %join, leave = %leave, ?kind, "membership changed");
        }

        state.commit(kind, new, &join, &leave);
        if kind == GroupKind::Online {
            state.notify_waitup();
        }
    }

    fn handle_waitup(
        &mut self,
        target: usize,
        client: u64,
        reply: oneshot::Sender<Result<(), MonitorError>>,
    ) {
        let Role::Leader(state) = &mut self.role else {
            let _ = reply.send(Err(MonitorError::NotLeader));
            return;
        };
        if target > state.size {
            let _ = reply.send(Err(MonitorError::InvalidInput(format!(
                "waitup count {target} exceeds instance size {}",
                state.size
            ))));
            return;
        }
        if state.up.count() == target {
            let _ = reply.send(Ok(()));
            return;
        }
        state.defer_waitup(target, WaitupTicket { client, reply });
    }

    /// Administratively remove ranks from the online set, posting the same
    /// join/leave events a snapshot transition would.
    async fn handle_force_down(&mut self, ranks: &str) -> Result<(), MonitorError> {
        let Role::Leader(state) = &mut self.role else {
            return Err(MonitorError::NotLeader);
        };

        let mut new_up = state.up.clone();
        new_up.subtract_decoded(ranks)?;

        let (join, leave) = diff(&state.up, &new_up);
        post_transitions(&self.appender, EVENT_ONLINE, &join, EVENT_OFFLINE, &leave).await?;
        info!(ranks, "forced ranks offline");

        state.commit(GroupKind::Online, new_up, &join, &leave);
        state.notify_waitup();
        Ok(())
    }

    fn handle_status(&self) -> Result<MembershipStatus, MonitorError> {
        match &self.role {
            Role::Leader(state) => Ok(state.status()),
            Role::Follower => Err(MonitorError::NotLeader),
        }
    }
}

/// Receive from an optional stream; a missing stream never yields.
async fn next_update(rx: &mut Option<mpsc::Receiver<GroupUpdate>>) -> Option<GroupUpdate> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending::<Option<GroupUpdate>>().await,
    }
}

/// Post a snapshot diff: the join event first, then the leave event, both
/// omitted when empty. Consumers thus see additions before removals, so a
/// rank briefly present in both events never looks absent.
///
/// Both appends carry the wait-for-commit flag: an `Ok` here means the
/// events are durably in the log, so callers can gate their cached-set
/// commit on it. A store failure surfaces as the commit error of the
/// containing batch and no rank state is mutated.
async fn post_transitions(
    appender: &BatchAppender,
    join_name: &str,
    join: &IdSet,
    leave_name: &str,
    leave: &IdSet,
) -> Result<(), MonitorError> {
    if !join.is_empty() {
        appender
            .append_entry(
                AppendFlag::Wait,
                EVENTLOG_PATH,
                transition_entry(join_name, join),
            )
            .await?;
    }
    if !leave.is_empty() {
        appender
            .append_entry(
                AppendFlag::Wait,
                EVENTLOG_PATH,
                transition_entry(leave_name, leave),
            )
            .await?;
    }
    Ok(())
}
