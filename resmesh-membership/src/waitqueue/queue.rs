//! Ordered queue of waits with bulk wake and selective cull.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::fmt;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::wait::Wait;

/// Ordered container of [`Wait`]s plus an exact message-bearing counter.
///
/// Invariant: `msg_count()` equals the number of queued waits created with
/// [`Wait::with_message`]. The counter is maintained on both the enqueue
/// and every dequeue path, including culls of already-cancelled waits.
pub struct WaitQueue<M> {
    items: VecDeque<Wait<M>>,
    msgs_on_queue: usize,
}

impl<M> WaitQueue<M> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
            msgs_on_queue: 0,
        }
    }

    /// Append `wait` and take one use on it.
    pub fn enqueue(&mut self, wait: Wait<M>) {
        wait.retain();
        if wait.has_message() {
            self.msgs_on_queue += 1;
        }
        self.items.push_back(wait);
    }

    /// Number of queued waits. O(1).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no waits are queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of queued message-bearing waits. O(1).
    pub fn msg_count(&self) -> usize {
        self.msgs_on_queue
    }

    /// Visit queued waits in insertion order without altering membership.
    pub fn iter(&self) -> impl Iterator<Item = &Wait<M>> {
        self.items.iter()
    }

    /// Release every wait currently queued; fire those on their last use.
    ///
    /// The whole queue is moved into a private batch up front, so waits
    /// enqueued by callbacks during the run land on the live queue and are
    /// not part of this run. Returns the number of callbacks that fired.
    pub fn run(&mut self) -> usize {
        let batch = std::mem::take(&mut self.items);
        let mut fired = 0;
        for wait in batch {
            if wait.has_message() {
                self.msgs_on_queue -= 1;
            }
            if wait.release() {
                fired += 1;
            }
        }
        fired
    }

    /// Cancel and unlink message-bearing waits whose message matches.
    ///
    /// Disarming the callback here means a later release from *another*
    /// queue holding the same wait cannot fire the handler. Returns the
    /// number of waits removed from this queue.
    pub fn cancel_matching(&mut self, pred: impl Fn(&M) -> bool) -> usize {
        let mut removed = 0;
        self.items.retain(|wait| {
            if wait.cancel_if(&pred) {
                removed += 1;
                wait.release();
                false
            } else {
                true
            }
        });
        self.msgs_on_queue -= removed;
        removed
    }
}

impl<M> Default for WaitQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for WaitQueue<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitQueue")
            .field("len", &self.items.len())
            .field("msgs_on_queue", &self.msgs_on_queue)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_wait(fired: &Arc<AtomicUsize>) -> Wait<String> {
        let counter = Arc::clone(fired);
        Wait::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn counting_msg_wait(msg: &str, fired: &Arc<AtomicUsize>) -> Wait<String> {
        let counter = Arc::clone(fired);
        Wait::with_message(msg.to_string(), move |_msg| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_enqueue_updates_counters() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut q = WaitQueue::new();

        q.enqueue(counting_wait(&fired));
        q.enqueue(counting_msg_wait("a", &fired));

        assert_eq!(q.len(), 2);
        assert_eq!(q.msg_count(), 1);
    }

    #[test]
    fn test_run_fires_single_queue_waits() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut q = WaitQueue::new();
        q.enqueue(counting_wait(&fired));
        q.enqueue(counting_wait(&fired));

        assert_eq!(q.run(), 2);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
        assert!(q.is_empty());
        assert_eq!(q.msg_count(), 0);
    }

    #[test]
    fn test_multi_queue_wait_fires_exactly_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let wait = counting_wait(&fired);

        let mut q1 = WaitQueue::new();
        let mut q2 = WaitQueue::new();
        q1.enqueue(wait.clone());
        q2.enqueue(wait.clone());
        assert_eq!(wait.usecount(), 2);

        assert_eq!(q1.run(), 0);
        assert_eq!(wait.usecount(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        assert_eq!(q2.run(), 1);
        assert_eq!(wait.usecount(), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cull_then_run_never_fires_handler() {
        let fired = Arc::new(AtomicUsize::new(0));
        let wait = counting_msg_wait("client-1", &fired);

        let mut q1 = WaitQueue::new();
        let mut q2 = WaitQueue::new();
        q1.enqueue(wait.clone());
        q2.enqueue(wait.clone());

        assert_eq!(q1.cancel_matching(|_| true), 1);
        assert!(q1.is_empty());
        assert_eq!(q1.msg_count(), 0);
        assert_eq!(wait.usecount(), 1);

        assert_eq!(q2.run(), 0);
        assert_eq!(wait.usecount(), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_matching_is_selective() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut q = WaitQueue::new();
        q.enqueue(counting_msg_wait("keep", &fired));
        q.enqueue(counting_msg_wait("drop", &fired));
        q.enqueue(counting_msg_wait("drop", &fired));

        assert_eq!(q.cancel_matching(|msg| msg == "drop"), 2);
        assert_eq!(q.len(), 1);
        assert_eq!(q.msg_count(), 1);

        // The surviving wait still fires.
        assert_eq!(q.run(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_matching_ignores_plain_waits() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut q = WaitQueue::new();
        q.enqueue(counting_wait(&fired));

        assert_eq!(q.cancel_matching(|_| true), 0);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_iter_preserves_insertion_order() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut q = WaitQueue::new();
        q.enqueue(counting_wait(&fired));
        q.enqueue(counting_msg_wait("a", &fired));

        let flags: Vec<bool> = q.iter().map(|w| w.has_message()).collect();
        assert_eq!(flags, vec![false, true]);
        assert_eq!(q.len(), 2); // unchanged
    }

    #[test]
    fn test_run_excludes_appends_made_during_run() {
        // A callback that re-arms another wait on the same queue must not
        // have that wait join the current run.
        let fired = Arc::new(AtomicUsize::new(0));
        let late = counting_wait(&fired);

        let q = Arc::new(parking_lot::Mutex::new(WaitQueue::new()));
        let q_in_cb = Arc::clone(&q);
        let late_in_cb = late.clone();
        let counter = Arc::clone(&fired);
        let first: Wait<String> = Wait::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            q_in_cb.lock().enqueue(late_in_cb.clone());
        });

        q.lock().enqueue(first);
        // Run on a drained copy: take the queue out of the mutex so the
        // callback can lock it to append.
        let mut held = std::mem::take(&mut *q.lock());
        assert_eq!(held.run(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // The late wait was appended to the shared queue, not run.
        assert_eq!(q.lock().len(), 1);
        assert_eq!(late.usecount(), 1);
    }
}
