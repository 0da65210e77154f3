//! # Event Log Module
//!
//! Batched, ordered append of structured events to a durable, path-addressed
//! log. The durable backing stays behind the [`EventLogStore`] seam; the
//! [`BatchAppender`] coalesces entries into per-path batches and commits
//! them after a quiet period or an explicit flush.
//!
//! ## Guarantees
//! - Per-path FIFO: entries appended to one path commit in append order,
//!   whatever mix of [`AppendFlag::Async`] and [`AppendFlag::Wait`] was
//!   used. Cross-path ordering is unspecified.
//! - Commit failures are reported once per affected entry through
//!   [`AppenderHooks::on_commit_error`]; retrying is the hook's decision.

pub mod appender;
pub mod entry;
pub mod error;
pub mod in_memory;
pub mod traits;

pub use appender::{AppendFlag, BatchAppender, DEFAULT_BATCH_TIMEOUT};
pub use entry::EventEntry;
pub use error::EventLogError;
pub use in_memory::InMemoryEventLog;
pub use traits::{AppenderHooks, EventLogStore, NoopHooks};
