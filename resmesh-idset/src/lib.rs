//! # resmesh-idset - Compact rank sets with a canonical string form
//!
//! Fixed-universe sets of broker ranks (unsigned small integers) backed by
//! bit words, with the run-length string encoding the rest of the system
//! speaks: `"0-3,7"` means ranks 0, 1, 2, 3 and 7.
//!
//! # Quick Start
//!
//! ```rust
//! use resmesh_idset::IdSet;
//!
//! let mut up = IdSet::new(8);
//! up.set_range(0, 3)?;
//! up.set(7)?;
//! assert_eq!(up.encode(), "0-3,7");
//!
//! let parsed = IdSet::decode("0-3,7", 8)?;
//! assert_eq!(parsed, up);
//! # Ok::<(), resmesh_idset::IdSetError>(())
//! ```
//!
//! # Design
//!
//! - The universe `[0, capacity)` is fixed at construction; introducing a
//!   member at or beyond `capacity` is an [`IdSetError::OutOfRange`] error.
//! - `encode` is canonical: ascending, range-compressed, empty set encodes
//!   to the empty string. `decode` accepts the same grammar plus single ids
//!   and comma lists, and reports malformed input with caller-facing text.
//! - Set algebra (`union_with`, `subtract`, `difference`, `intersection`)
//!   operates word-wise and never allocates beyond the result set.

pub mod codec;
pub mod error;
pub mod set;

// Re-export commonly used types
pub use error::IdSetError;
pub use set::IdSet;
