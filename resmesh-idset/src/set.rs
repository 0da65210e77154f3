//! Fixed-universe bit set over broker ranks.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::error::IdSetError;

const WORD_BITS: usize = 64;

/// Set of unsigned small integers over a fixed universe `[0, capacity)`.
///
/// Backed by `u64` words. Membership and count are cheap; algebra is
/// word-wise. The canonical string form lives in [`crate::codec`].
///
/// # Examples
///
/// ```rust
/// use resmesh_idset::IdSet;
///
/// let mut s = IdSet::new(16);
/// s.set(0)?;
/// s.set_range(4, 6)?;
/// assert_eq!(s.count(), 4);
/// assert!(s.test(5));
/// assert!(!s.test(7));
/// # Ok::<(), resmesh_idset::IdSetError>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct IdSet {
    words: Vec<u64>,
    capacity: usize,
}

impl IdSet {
    /// Create an empty set with the given universe size.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(WORD_BITS)],
            capacity,
        }
    }

    /// Create a set containing every id in `[0, capacity)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resmesh_idset::IdSet;
    ///
    /// let all = IdSet::full(4);
    /// assert_eq!(all.encode(), "0-3");
    /// ```
    pub fn full(capacity: usize) -> Self {
        let mut set = Self::new(capacity);
        for word in set.words.iter_mut() {
            *word = u64::MAX;
        }
        set.mask_tail();
        set
    }

    /// The fixed universe size.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Add `id` to the set.
    ///
    /// # Errors
    ///
    /// Returns [`IdSetError::OutOfRange`] if `id >= capacity`.
    pub fn set(&mut self, id: usize) -> Result<(), IdSetError> {
        self.check_range(id)?;
        self.words[id / WORD_BITS] |= 1 << (id % WORD_BITS);
        Ok(())
    }

    /// Remove `id` from the set.
    ///
    /// # Errors
    ///
    /// Returns [`IdSetError::OutOfRange`] if `id >= capacity`.
    pub fn clear(&mut self, id: usize) -> Result<(), IdSetError> {
        self.check_range(id)?;
        self.words[id / WORD_BITS] &= !(1 << (id % WORD_BITS));
        Ok(())
    }

    /// Membership test. Ids outside the universe are never members.
    pub fn test(&self, id: usize) -> bool {
        id < self.capacity && self.words[id / WORD_BITS] & (1 << (id % WORD_BITS)) != 0
    }

    /// Number of members.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True when the set has no members.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Add the inclusive range `[lo, hi]` to the set.
    ///
    /// # Errors
    ///
    /// Returns [`IdSetError::InvalidRange`] when `hi < lo`, or
    /// [`IdSetError::OutOfRange`] when `hi >= capacity`.
    pub fn set_range(&mut self, lo: usize, hi: usize) -> Result<(), IdSetError> {
        if hi < lo {
            return Err(IdSetError::InvalidRange { lo, hi });
        }
        self.check_range(hi)?;
        for id in lo..=hi {
            self.words[id / WORD_BITS] |= 1 << (id % WORD_BITS);
        }
        Ok(())
    }

    /// Add every member of `other` to `self` (in-place union).
    ///
    /// Members of `other` beyond this set's universe are ignored; the
    /// monitor only combines sets of one size.
    pub fn union_with(&mut self, other: &IdSet) {
        for (dst, src) in self.words.iter_mut().zip(other.words.iter()) {
            *dst |= *src;
        }
        self.mask_tail();
    }

    /// Remove every member of `other` from `self` (in-place subtraction).
    pub fn subtract(&mut self, other: &IdSet) {
        for (dst, src) in self.words.iter_mut().zip(other.words.iter()) {
            *dst &= !*src;
        }
    }

    /// `self \ other` as a new set with this set's universe.
    pub fn difference(&self, other: &IdSet) -> IdSet {
        let mut result = self.clone();
        result.subtract(other);
        result
    }

    /// `self ∩ other` as a new set with this set's universe.
    pub fn intersection(&self, other: &IdSet) -> IdSet {
        let mut result = self.clone();
        for (dst, src) in result.words.iter_mut().zip(other.words.iter()) {
            *dst &= *src;
        }
        let prefix = other.words.len().min(result.words.len());
        for word in result.words.iter_mut().skip(prefix) {
            *word = 0;
        }
        result
    }

    /// Iterate members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.capacity).filter(move |id| self.test(*id))
    }

    fn check_range(&self, id: usize) -> Result<(), IdSetError> {
        if id >= self.capacity {
            return Err(IdSetError::OutOfRange {
                id,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    // Bits beyond capacity in the last word must stay zero so count()
    // and equality see only the universe.
    fn mask_tail(&mut self) {
        let tail = self.capacity % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1 << tail) - 1;
            }
        }
    }
}

impl fmt::Debug for IdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdSet({:?}/{})", self.encode(), self.capacity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_set_is_empty() {
        let s = IdSet::new(10);
        assert!(s.is_empty());
        assert_eq!(s.count(), 0);
        assert_eq!(s.capacity(), 10);
    }

    #[test]
    fn test_set_clear_test() {
        let mut s = IdSet::new(10);
        s.set(3).unwrap();
        assert!(s.test(3));
        assert_eq!(s.count(), 1);

        s.clear(3).unwrap();
        assert!(!s.test(3));
        assert!(s.is_empty());
    }

    #[test]
    fn test_set_out_of_range() {
        let mut s = IdSet::new(4);
        let err = s.set(4).unwrap_err();
        assert_eq!(err, IdSetError::OutOfRange { id: 4, capacity: 4 });
        assert!(s.is_empty());
    }

    #[test]
    fn test_membership_beyond_universe() {
        let s = IdSet::full(4);
        assert!(!s.test(4));
        assert!(!s.test(1000));
    }

    #[test]
    fn test_full_masks_tail_bits() {
        // Capacity not word-aligned: count must stop at the universe.
        let s = IdSet::full(70);
        assert_eq!(s.count(), 70);
    }

    #[test]
    fn test_set_range_inclusive() {
        let mut s = IdSet::new(10);
        s.set_range(2, 5).unwrap();
        assert_eq!(s.count(), 4);
        assert!(s.test(2));
        assert!(s.test(5));
        assert!(!s.test(6));
    }

    #[test]
    fn test_set_range_descending() {
        let mut s = IdSet::new(10);
        let err = s.set_range(5, 2).unwrap_err();
        assert_eq!(err, IdSetError::InvalidRange { lo: 5, hi: 2 });
    }

    #[test]
    fn test_set_range_single_id() {
        let mut s = IdSet::new(10);
        s.set_range(7, 7).unwrap();
        assert_eq!(s.count(), 1);
        assert!(s.test(7));
    }

    #[test]
    fn test_union_with() {
        let mut a = IdSet::new(8);
        a.set_range(0, 2).unwrap();
        let mut b = IdSet::new(8);
        b.set_range(2, 4).unwrap();

        a.union_with(&b);
        assert_eq!(a.count(), 5);
        assert!(a.test(0) && a.test(4));
    }

    #[test]
    fn test_subtract() {
        let mut a = IdSet::full(8);
        let mut b = IdSet::new(8);
        b.set_range(0, 3).unwrap();

        a.subtract(&b);
        assert_eq!(a.count(), 4);
        assert!(!a.test(0));
        assert!(a.test(4));
    }

    #[test]
    fn test_difference_leaves_operands_unchanged() {
        let mut a = IdSet::full(8);
        a.clear(7).unwrap();
        let mut b = IdSet::new(8);
        b.set(0).unwrap();

        let d = a.difference(&b);
        assert!(!d.test(0));
        assert!(d.test(1));
        assert!(a.test(0)); // operand untouched
    }

    #[test]
    fn test_intersection() {
        let mut a = IdSet::new(8);
        a.set_range(0, 4).unwrap();
        let mut b = IdSet::new(8);
        b.set_range(3, 6).unwrap();

        let i = a.intersection(&b);
        assert_eq!(i.count(), 2);
        assert!(i.test(3) && i.test(4));
    }

    #[test]
    fn test_iter_ascending() {
        let mut s = IdSet::new(70);
        s.set(65).unwrap();
        s.set(1).unwrap();
        s.set(64).unwrap();

        let members: Vec<usize> = s.iter().collect();
        assert_eq!(members, vec![1, 64, 65]);
    }

    #[test]
    fn test_zero_capacity() {
        let s = IdSet::new(0);
        assert!(s.is_empty());
        assert!(!s.test(0));
    }
}
