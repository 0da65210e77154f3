//! Reference-counted deferred continuation with a dynamic callback shape.

// Layer 1: Standard library imports
use std::fmt;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
// (none)

/// The two callback shapes a wait can carry, plus the cancelled terminal.
///
/// Firing takes the tag and transitions to `Cancelled`, so a callback can
/// run at most once no matter how many queues release the wait.
enum Callback<M> {
    /// Fire-and-forget continuation.
    Plain(Box<dyn FnOnce() + Send>),
    /// Continuation that owns a message (typically the request being
    /// deferred) and hands it to the handler on fire.
    Handler {
        msg: M,
        handler: Box<dyn FnOnce(M) + Send>,
    },
    /// Cancelled, or already fired. Releases are silent from here on.
    Cancelled,
}

struct WaitInner<M> {
    callback: Callback<M>,
    /// Number of queue memberships. Enqueue increments, release
    /// decrements; reaching zero fires the callback.
    usecount: usize,
    errnum: Option<i32>,
    error_hook: Option<Box<dyn FnMut(i32) + Send>>,
}

/// A deferred continuation shared between the queues that hold it.
///
/// Created with use-count 0; each [`WaitQueue`](super::WaitQueue) it is
/// enqueued on holds one use. When the last queue releases it (bulk run or
/// cull), the callback fires exactly once - unless it was cancelled first,
/// in which case it never fires.
///
/// Cloning shares the same wait; it does not change the use-count.
pub struct Wait<M> {
    inner: Arc<Mutex<WaitInner<M>>>,
    has_message: bool,
}

impl<M> Clone for Wait<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            has_message: self.has_message,
        }
    }
}

impl<M> Wait<M> {
    /// Create a wait with a plain callback.
    pub fn new(callback: impl FnOnce() + Send + 'static) -> Self {
        Self::build(Callback::Plain(Box::new(callback)), false)
    }

    /// Create a wait that owns `msg` and hands it to `handler` on fire.
    ///
    /// The message is dropped when the wait is cancelled or fired,
    /// whichever comes first.
    pub fn with_message(msg: M, handler: impl FnOnce(M) + Send + 'static) -> Self {
        Self::build(
            Callback::Handler {
                msg,
                handler: Box::new(handler),
            },
            true,
        )
    }

    fn build(callback: Callback<M>, has_message: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(WaitInner {
                callback,
                usecount: 0,
                errnum: None,
                error_hook: None,
            })),
            has_message,
        }
    }

    /// Register an error hook, invoked synchronously by [`set_errnum`].
    ///
    /// [`set_errnum`]: Wait::set_errnum
    #[must_use]
    pub fn on_error(self, hook: impl FnMut(i32) + Send + 'static) -> Self {
        self.inner.lock().error_hook = Some(Box::new(hook));
        self
    }

    /// Whether this wait was created message-bearing.
    ///
    /// Fixed at creation and stable across cancellation, so queue message
    /// counters stay exact.
    pub fn has_message(&self) -> bool {
        self.has_message
    }

    /// Current number of queue memberships.
    pub fn usecount(&self) -> usize {
        self.inner.lock().usecount
    }

    /// Store an error number on the wait and invoke the error hook, if any.
    pub fn set_errnum(&self, errnum: i32) {
        let hook = {
            let mut inner = self.inner.lock();
            inner.errnum = Some(errnum);
            inner.error_hook.take()
        };
        // Invoke outside the lock; the hook may touch the wait.
        if let Some(mut hook) = hook {
            hook(errnum);
            self.inner.lock().error_hook = Some(hook);
        }
    }

    /// The last error number stored via [`set_errnum`](Wait::set_errnum).
    pub fn errnum(&self) -> Option<i32> {
        self.inner.lock().errnum
    }

    /// True once the callback has been cancelled or has already fired.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.inner.lock().callback, Callback::Cancelled)
    }

    /// Take one use (queue membership). Called on enqueue.
    pub(super) fn retain(&self) {
        self.inner.lock().usecount += 1;
    }

    /// Drop one use; fire the callback if this was the last.
    ///
    /// Returns true when a callback actually ran.
    pub(super) fn release(&self) -> bool {
        let fire = {
            let mut inner = self.inner.lock();
            debug_assert!(inner.usecount > 0, "wait released more often than retained");
            inner.usecount = inner.usecount.saturating_sub(1);
            if inner.usecount == 0 {
                std::mem::replace(&mut inner.callback, Callback::Cancelled)
            } else {
                Callback::Cancelled
            }
        };
        // Fire outside the lock; the callback may re-enter the queue.
        match fire {
            Callback::Plain(callback) => {
                callback();
                true
            }
            Callback::Handler { msg, handler } => {
                handler(msg);
                true
            }
            Callback::Cancelled => false,
        }
    }

    /// Cancel the callback if it is message-bearing and `pred` matches.
    ///
    /// Returns true when the wait was disarmed; later releases from other
    /// queues will then be silent.
    pub(super) fn cancel_if(&self, pred: &dyn Fn(&M) -> bool) -> bool {
        let mut inner = self.inner.lock();
        let matched = match &inner.callback {
            Callback::Handler { msg, .. } => pred(msg),
            _ => false,
        };
        if matched {
            inner.callback = Callback::Cancelled;
        }
        matched
    }
}

impl<M> fmt::Debug for Wait<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Wait")
            .field("usecount", &inner.usecount)
            .field("has_message", &self.has_message)
            .field(
                "cancelled",
                &matches!(inner.callback, Callback::Cancelled),
            )
            .finish()
    }
}
