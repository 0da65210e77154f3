//! # Waitqueue Module
//!
//! Reference-counted deferral primitive: a [`Wait`] parks a continuation
//! until every queue holding it has released its use, and a [`WaitQueue`]
//! wakes its entries in bulk or culls them selectively by message.
//!
//! ## Why reference-counted
//!
//! A single wait may represent "this request is blocked until any one of
//! these N conditions completes": it is enqueued on N queues and must fire
//! exactly once when the last queue releases it, or zero times when it is
//! cancelled because its client went away.
//!
//! ## Examples
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use resmesh_membership::waitqueue::{Wait, WaitQueue};
//!
//! let fired = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&fired);
//! let wait: Wait<()> = Wait::new(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! let mut q1 = WaitQueue::new();
//! let mut q2 = WaitQueue::new();
//! q1.enqueue(wait.clone());
//! q2.enqueue(wait);
//!
//! q1.run();
//! assert_eq!(fired.load(Ordering::SeqCst), 0); // one use remains
//! q2.run();
//! assert_eq!(fired.load(Ordering::SeqCst), 1); // last release fires once
//! ```

pub mod queue;
pub mod wait;

pub use queue::WaitQueue;
pub use wait::Wait;
