//! Canonical run-length string form: encode, decode, decode-subtract.
//!
//! Grammar accepted by [`IdSet::decode`]:
//!
//! ```text
//! ids := id ("," id)*
//! id  := N | N "-" M     (M >= N)
//! ```
//!
//! The empty string is the empty set. [`IdSet::encode`] always produces the
//! canonical form: ascending, range-compressed, no whitespace.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use serde::{Serialize, Serializer};

// Layer 3: Internal module imports
use crate::error::IdSetError;
use crate::set::IdSet;

impl IdSet {
    /// Encode as the canonical run-length string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resmesh_idset::IdSet;
    ///
    /// let mut s = IdSet::new(10);
    /// s.set_range(0, 3)?;
    /// s.set(7)?;
    /// assert_eq!(s.encode(), "0-3,7");
    /// assert_eq!(IdSet::new(10).encode(), "");
    /// # Ok::<(), resmesh_idset::IdSetError>(())
    /// ```
    pub fn encode(&self) -> String {
        let mut out = String::new();
        let mut iter = self.iter().peekable();

        while let Some(lo) = iter.next() {
            let mut hi = lo;
            while iter.peek() == Some(&(hi + 1)) {
                hi += 1;
                iter.next();
            }
            if !out.is_empty() {
                out.push(',');
            }
            if hi == lo {
                out.push_str(&lo.to_string());
            } else {
                out.push_str(&format!("{lo}-{hi}"));
            }
        }
        out
    }

    /// Parse an idset string into a set with universe `[0, capacity)`.
    ///
    /// Accepts single ids, comma lists, and ranges; the empty string is the
    /// empty set. For any set `s`, `decode(s.encode(), s.capacity()) == s`.
    ///
    /// # Errors
    ///
    /// [`IdSetError::Parse`] for malformed input with a caller-facing
    /// reason, [`IdSetError::OutOfRange`] for ids at or beyond `capacity`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resmesh_idset::IdSet;
    ///
    /// let s = IdSet::decode("0-2,5", 8)?;
    /// assert_eq!(s.count(), 4);
    /// assert!(IdSet::decode("5-3", 8).is_err());
    /// # Ok::<(), resmesh_idset::IdSetError>(())
    /// ```
    pub fn decode(input: &str, capacity: usize) -> Result<IdSet, IdSetError> {
        let mut set = IdSet::new(capacity);
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(set);
        }

        for element in trimmed.split(',') {
            let element = element.trim();
            if element.is_empty() {
                return Err(parse_error(input, "empty element"));
            }
            match element.split_once('-') {
                None => {
                    let id = parse_id(input, element)?;
                    set.set(id)?;
                }
                Some((lo, hi)) => {
                    if lo.is_empty() {
                        return Err(parse_error(input, "missing range start"));
                    }
                    if hi.is_empty() {
                        return Err(parse_error(input, "missing range end"));
                    }
                    let lo = parse_id(input, lo)?;
                    let hi = parse_id(input, hi)?;
                    if hi < lo {
                        return Err(parse_error(
                            input,
                            &format!("descending range {lo}-{hi}"),
                        ));
                    }
                    set.set_range(lo, hi)?;
                }
            }
        }
        Ok(set)
    }

    /// Parse `input` and subtract the result from `self` in one step.
    ///
    /// On any error `self` is left unchanged and the error carries the
    /// caller-facing text; RPC handlers forward it verbatim.
    pub fn subtract_decoded(&mut self, input: &str) -> Result<(), IdSetError> {
        let parsed = IdSet::decode(input, self.capacity())?;
        self.subtract(&parsed);
        Ok(())
    }
}

fn parse_id(input: &str, token: &str) -> Result<usize, IdSetError> {
    token
        .parse::<usize>()
        .map_err(|_| parse_error(input, &format!("invalid id {token:?}")))
}

fn parse_error(input: &str, reason: &str) -> IdSetError {
    IdSetError::Parse {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for IdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl Serialize for IdSet {
    /// Serializes as the canonical encoded string, so event contexts embed
    /// sets directly.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}
