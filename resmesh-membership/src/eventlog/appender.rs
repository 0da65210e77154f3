//! Batched appender task with async and wait-for-commit append modes.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::warn;

// Layer 3: Internal module imports
use super::entry::EventEntry;
use super::error::EventLogError;
use super::traits::{AppenderHooks, EventLogStore};

/// Default quiet period before a batch commits.
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_millis(5);

/// How an append resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendFlag {
    /// Return as soon as the entry is queued.
    Async,
    /// Return once the containing batch has durably committed, or failed.
    Wait,
}

enum Op {
    Append {
        path: String,
        entry: EventEntry,
        notify: Option<oneshot::Sender<Result<(), EventLogError>>>,
    },
    Flush {
        done: oneshot::Sender<()>,
    },
    SetBatchTimeout(Duration),
}

/// Handle to a spawned appender task.
///
/// Cheap clone; all clones feed the same task. Entries appended to one
/// path commit in append order regardless of flag. When the last handle is
/// dropped the task drains what is pending, commits it, and exits.
///
/// # Examples
///
/// ```rust,no_run
/// use std::time::Duration;
///
/// use resmesh_membership::eventlog::{
///     AppendFlag, BatchAppender, InMemoryEventLog, NoopHooks,
/// };
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryEventLog::new();
/// let appender = BatchAppender::spawn(store, NoopHooks, Duration::from_millis(5));
///
/// // Fire-and-forget; commits with the batch.
/// appender
///     .append(AppendFlag::Async, "resource.eventlog", "online", json!({"idset": "0"}))
///     .await?;
///
/// // Blocks until the containing batch is durable.
/// appender
///     .append(AppendFlag::Wait, "resource.eventlog", "offline", json!({"idset": "0"}))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BatchAppender {
    tx: mpsc::UnboundedSender<Op>,
}

impl BatchAppender {
    /// Spawn the appender task over `store`, reporting to `hooks`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S, H>(store: S, hooks: H, batch_timeout: Duration) -> Self
    where
        S: EventLogStore,
        H: AppenderHooks,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(appender_task(store, hooks, rx, batch_timeout));
        Self { tx }
    }

    /// Append an event built from `name` and `context` to the log at
    /// `path`.
    ///
    /// # Errors
    ///
    /// [`EventLogError::Closed`] when the task is gone; with
    /// [`AppendFlag::Wait`], also the commit error of the containing batch.
    pub async fn append(
        &self,
        flag: AppendFlag,
        path: &str,
        name: &str,
        context: Value,
    ) -> Result<(), EventLogError> {
        self.append_entry(flag, path, EventEntry::new(name, context))
            .await
    }

    /// Append a pre-built entry to the log at `path`.
    pub async fn append_entry(
        &self,
        flag: AppendFlag,
        path: &str,
        entry: EventEntry,
    ) -> Result<(), EventLogError> {
        match flag {
            AppendFlag::Async => {
                self.send(Op::Append {
                    path: path.to_string(),
                    entry,
                    notify: None,
                })?;
                Ok(())
            }
            AppendFlag::Wait => {
                let (done_tx, done_rx) = oneshot::channel();
                self.send(Op::Append {
                    path: path.to_string(),
                    entry,
                    notify: Some(done_tx),
                })?;
                done_rx.await.map_err(|_| EventLogError::Closed)?
            }
        }
    }

    /// Commit everything pending immediately, without waiting for the
    /// quiet period. Resolves once the forced commit pass has finished;
    /// per-entry failures are still reported through the hooks.
    pub async fn flush(&self) -> Result<(), EventLogError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(Op::Flush { done: done_tx })?;
        done_rx.await.map_err(|_| EventLogError::Closed)
    }

    /// Retune the quiet period for subsequent batches.
    pub fn set_batch_timeout(&self, batch_timeout: Duration) -> Result<(), EventLogError> {
        self.send(Op::SetBatchTimeout(batch_timeout))
    }

    fn send(&self, op: Op) -> Result<(), EventLogError> {
        self.tx.send(op).map_err(|_| EventLogError::Closed)
    }
}

struct PendingEntry {
    path: String,
    entry: EventEntry,
    notify: Option<oneshot::Sender<Result<(), EventLogError>>>,
}

async fn appender_task<S, H>(
    store: S,
    hooks: H,
    mut rx: mpsc::UnboundedReceiver<Op>,
    mut batch_timeout: Duration,
) where
    S: EventLogStore,
    H: AppenderHooks,
{
    let mut pending: Vec<PendingEntry> = Vec::new();
    let mut deadline: Option<Instant> = None;
    let mut busy = false;

    loop {
        // A dummy deadline keeps the disabled branch well-formed.
        let sleep_until = deadline.unwrap_or_else(Instant::now);

        tokio::select! {
            op = rx.recv() => match op {
                Some(Op::Append { path, entry, notify }) => {
                    if !busy {
                        hooks.on_busy();
                        busy = true;
                    }
                    pending.push(PendingEntry { path, entry, notify });
                    deadline = Some(Instant::now() + batch_timeout);
                }
                Some(Op::Flush { done }) => {
                    commit_pending(&store, &hooks, &mut pending).await;
                    deadline = None;
                    if busy {
                        hooks.on_idle();
                        busy = false;
                    }
                    let _ = done.send(());
                }
                Some(Op::SetBatchTimeout(timeout)) => {
                    batch_timeout = timeout;
                }
                None => {
                    // Last handle dropped: drain, then exit.
                    commit_pending(&store, &hooks, &mut pending).await;
                    if busy {
                        hooks.on_idle();
                    }
                    break;
                }
            },
            _ = tokio::time::sleep_until(sleep_until), if deadline.is_some() => {
                commit_pending(&store, &hooks, &mut pending).await;
                deadline = None;
                if busy {
                    hooks.on_idle();
                    busy = false;
                }
            }
        }
    }
}

/// Commit everything pending as one batch per path, preserving per-path
/// append order. A failed path batch terminates only that path's entries;
/// other paths still commit.
async fn commit_pending<S, H>(store: &S, hooks: &H, pending: &mut Vec<PendingEntry>)
where
    S: EventLogStore,
    H: AppenderHooks,
{
    if pending.is_empty() {
        return;
    }

    // Group by path, preserving first-appearance order across groups and
    // append order within each group.
    let mut groups: Vec<(String, Vec<PendingEntry>)> = Vec::new();
    for item in pending.drain(..) {
        match groups.iter_mut().find(|(path, _)| *path == item.path) {
            Some((_, group)) => group.push(item),
            None => {
                let path = item.path.clone();
                groups.push((path, vec![item]));
            }
        }
    }

    for (path, group) in groups {
        let entries: Vec<EventEntry> = group.iter().map(|item| item.entry.clone()).collect();
        match store.commit(&path, &entries).await {
            Ok(()) => {
                for item in group {
                    if let Some(notify) = item.notify {
                        let _ = notify.send(Ok(()));
                    }
                }
            }
            Err(error) => {
                warn!(%path, %error, "event log batch commit failed");
                for item in group {
                    hooks.on_commit_error(&item.entry, &error);
                    if let Some(notify) = item.notify {
                        let _ = notify.send(Err(error.clone()));
                    }
                }
            }
        }
    }
}
