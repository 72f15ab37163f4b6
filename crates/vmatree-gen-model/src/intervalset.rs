// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! IntervalSet: the reference model of occupied address regions.
//!
//! Invariants (always held):
//!    - intervals are sorted by `first()`
//!    - intervals are pairwise disjoint: `v[i].last() < v[i + 1].first()`
//!    - adjacent intervals are *not* coalesced; every entry is one VMA
//!
//! Complexity:
//!    - lookup, index_containing: `O(log n)`
//!    - insert_at, remove_at, insert, remove_containing: `O(n)`
//!    - gap_at, insert_window, adjust_window, replace_at: `O(1)`

use crate::err::IntervalSetError;
use core::ops::Deref;
use vmatree_gen_core::{AddrVariable, primitives::Interval};

/// A sorted collection of disjoint, closed `[first, last]` intervals.
///
/// Touching ranges are never merged: each inserted interval stays its own
/// entry, as in the VMA tree under test, so a `remove` or `adjust` always
/// addresses exactly one of the entries stored here.
///
/// Gaps between entries are never stored. They are derived on demand by
/// [`IntervalSet::gap_at`] and [`IntervalSet::gaps`], which treat the whole
/// domain of `A` as the address space.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntervalSet<A> {
    intervals: Vec<Interval<A>>,
}

impl<A: AddrVariable> IntervalSet<A> {
    /// Creates a new, empty `IntervalSet`.
    #[inline]
    pub fn new() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    /// Creates a new, empty `IntervalSet` with room for `capacity` intervals.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            intervals: Vec::with_capacity(capacity),
        }
    }

    /// Builds a set from intervals that are already sorted and disjoint.
    ///
    /// Returns `None` if the input violates the set invariants.
    pub fn from_sorted(intervals: Vec<Interval<A>>) -> Option<Self> {
        Self::are_invariants_held(&intervals).then_some(Self { intervals })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Returns a slice containing all intervals, sorted by address.
    #[inline]
    pub fn as_slice(&self) -> &[Interval<A>] {
        &self.intervals
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Interval<A>> {
        self.intervals.get(index).copied()
    }

    /// Finds the index of the first interval whose `last()` is `>= point`.
    ///
    /// This is the only interval that can contain `point`.
    #[inline]
    fn find_first_ending_at_or_after(&self, point: A) -> usize {
        self.intervals.partition_point(|interval| interval.last() < point)
    }

    /// Returns the index of the interval containing `point`, if any.
    #[inline]
    pub fn index_containing(&self, point: A) -> Option<usize> {
        let candidate = self.find_first_ending_at_or_after(point);
        self.intervals
            .get(candidate)
            .filter(|interval| interval.first() <= point)
            .map(|_| candidate)
    }

    /// Returns the unique interval containing `address`, or `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vmatree_gen_core::primitives::Interval;
    /// use vmatree_gen_model::intervalset::IntervalSet;
    ///
    /// let mut set = IntervalSet::new();
    /// set.insert(Interval::new(100u64, 200)).unwrap();
    /// assert_eq!(set.lookup(150), Some(Interval::new(100, 200)));
    /// assert_eq!(set.lookup(50), None);
    /// ```
    #[inline]
    pub fn lookup(&self, address: A) -> Option<Interval<A>> {
        self.index_containing(address).map(|i| self.intervals[i])
    }

    /// Returns the free range in front of the interval at `index`.
    ///
    /// `index == len()` addresses the tail after the last interval. The
    /// head gap starts at zero and the tail gap ends at `A::max_value()`.
    /// Returns `None` if `index > len()` or if the gap holds no address,
    /// which happens when two intervals touch.
    pub fn gap_at(&self, index: usize) -> Option<Interval<A>> {
        let len = self.intervals.len();
        if index > len {
            return None;
        }
        let first = match index {
            0 => A::zero(),
            _ => self.intervals[index - 1].last().checked_add(&A::one())?,
        };
        let last = if index == len {
            A::max_value()
        } else {
            self.intervals[index].first().checked_sub(&A::one())?
        };
        Interval::try_new(first, last)
    }

    /// Iterates over all non-empty gaps in ascending address order.
    ///
    /// The iterator is double-ended, so `gaps().rev()` walks from the top of
    /// the address space downwards.
    pub fn gaps(&self) -> impl DoubleEndedIterator<Item = Interval<A>> + '_ {
        (0..=self.intervals.len()).filter_map(move |index| self.gap_at(index))
    }

    /// Returns the range a new interval spliced in at `index` may occupy,
    /// restricted to `space`.
    ///
    /// Returns `None` if nothing fits there.
    #[inline]
    pub fn insert_window(&self, index: usize, space: Interval<A>) -> Option<Interval<A>> {
        self.gap_at(index)?.intersection(&space)
    }

    /// Returns the range the interval at `index` may be moved or resized
    /// to without touching its neighbours, restricted to `space`.
    ///
    /// The window always contains the interval's current bounds when those
    /// lie inside `space`.
    pub fn adjust_window(&self, index: usize, space: Interval<A>) -> Option<Interval<A>> {
        let len = self.intervals.len();
        if index >= len {
            return None;
        }
        let first = match index {
            0 => A::zero(),
            _ => self.intervals[index - 1].last().checked_add(&A::one())?,
        };
        let last = if index + 1 == len {
            A::max_value()
        } else {
            self.intervals[index + 1].first().checked_sub(&A::one())?
        };
        Interval::try_new(first, last)?.intersection(&space)
    }

    /// Splices `interval` in at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`. In debug builds also panics if the
    /// interval does not fit into the gap at `index`.
    #[inline]
    pub fn insert_at(&mut self, index: usize, interval: Interval<A>) {
        debug_assert!(
            self.gap_at(index)
                .is_some_and(|gap| gap.contains_interval(&interval)),
            "insert_at: {} does not fit at index {}",
            interval,
            index
        );
        self.intervals.insert(index, interval);
        debug_assert!(Self::are_invariants_held(&self.intervals));
    }

    /// Removes and returns the interval at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn remove_at(&mut self, index: usize) -> Interval<A> {
        self.intervals.remove(index)
    }

    /// Replaces the bounds of the interval at `index`, returning the old ones.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`. In debug builds also panics if the new
    /// bounds overlap a neighbour.
    #[inline]
    pub fn replace_at(&mut self, index: usize, interval: Interval<A>) -> Interval<A> {
        let old = std::mem::replace(&mut self.intervals[index], interval);
        debug_assert!(Self::are_invariants_held(&self.intervals));
        old
    }

    /// Inserts `interval` at its sorted position.
    ///
    /// Returns the index it was stored at, or an error naming the existing
    /// interval it would overlap.
    pub fn insert(&mut self, interval: Interval<A>) -> Result<usize, IntervalSetError<A>> {
        let index = self
            .intervals
            .partition_point(|existing| existing.first() < interval.first());
        let neighbours = index.checked_sub(1).into_iter().chain(Some(index));
        for neighbour in neighbours {
            if let Some(existing) = self.get(neighbour).filter(|e| e.overlaps(&interval)) {
                return Err(IntervalSetError::Overlap { interval, existing });
            }
        }
        self.insert_at(index, interval);
        Ok(index)
    }

    /// Removes the interval containing `point` as a whole.
    ///
    /// # Examples
    ///
    /// ```
    /// use vmatree_gen_core::primitives::Interval;
    /// use vmatree_gen_model::intervalset::IntervalSet;
    ///
    /// let mut set = IntervalSet::new();
    /// set.insert(Interval::new(0u64, 50)).unwrap();
    /// set.insert(Interval::new(100u64, 200)).unwrap();
    /// assert_eq!(set.remove_containing(30), Ok(Interval::new(0, 50)));
    /// assert_eq!(set.as_slice(), &[Interval::new(100, 200)]);
    /// ```
    pub fn remove_containing(&mut self, point: A) -> Result<Interval<A>, IntervalSetError<A>> {
        let index = self
            .index_containing(point)
            .ok_or(IntervalSetError::NotContained(point))?;
        Ok(self.remove_at(index))
    }

    /// Moves the interval containing `point` to `new_bounds`.
    ///
    /// The new bounds may overlap the interval's old bounds but not its
    /// neighbours. Returns the old bounds.
    pub fn adjust_containing(
        &mut self,
        point: A,
        new_bounds: Interval<A>,
    ) -> Result<Interval<A>, IntervalSetError<A>> {
        let index = self
            .index_containing(point)
            .ok_or(IntervalSetError::NotContained(point))?;
        let neighbours = index.checked_sub(1).into_iter().chain(Some(index + 1));
        for neighbour in neighbours {
            if let Some(existing) = self.get(neighbour).filter(|e| e.overlaps(&new_bounds)) {
                return Err(IntervalSetError::Overlap {
                    interval: new_bounds,
                    existing,
                });
            }
        }
        Ok(self.replace_at(index, new_bounds))
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    /// Checks that `intervals` is sorted and pairwise disjoint.
    pub fn are_invariants_held(intervals: &[Interval<A>]) -> bool {
        intervals.windows(2).all(|w| w[0].last() < w[1].first())
    }
}

impl<A> Deref for IntervalSet<A> {
    type Target = [Interval<A>];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.intervals
    }
}

impl<'a, A> IntoIterator for &'a IntervalSet<A> {
    type Item = &'a Interval<A>;
    type IntoIter = std::slice::Iter<'a, Interval<A>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type SetU = IntervalSet<u64>;

    #[inline]
    fn iv(a: u64, b: u64) -> Interval<u64> {
        Interval::new(a, b)
    }

    fn set(ivs: &[(u64, u64)]) -> SetU {
        SetU::from_sorted(ivs.iter().map(|&(a, b)| iv(a, b)).collect()).unwrap()
    }

    #[test]
    fn new_and_empty() {
        let s = SetU::new();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
        assert_eq!(s.as_slice(), &[]);
        assert_eq!(s.lookup(0), None);
    }

    #[test]
    fn from_sorted_rejects_overlap_and_disorder() {
        assert!(SetU::from_sorted(vec![iv(0, 5), iv(5, 9)]).is_none());
        assert!(SetU::from_sorted(vec![iv(10, 20), iv(0, 5)]).is_none());
        assert!(SetU::from_sorted(vec![iv(0, 5), iv(6, 9)]).is_some());
    }

    #[test]
    fn insert_then_lookup_scenario() {
        let mut s = SetU::new();
        assert_eq!(s.insert(iv(100, 200)), Ok(0));
        assert_eq!(s.as_slice(), &[iv(100, 200)]);
        assert_eq!(s.lookup(150), Some(iv(100, 200)));
        assert_eq!(s.lookup(100), Some(iv(100, 200)));
        assert_eq!(s.lookup(200), Some(iv(100, 200)));
        assert_eq!(s.lookup(50), None);
        assert_eq!(s.lookup(201), None);
    }

    #[test]
    fn insert_before_existing_scenario() {
        let mut s = set(&[(100, 200)]);
        assert_eq!(s.insert(iv(0, 50)), Ok(0));
        assert_eq!(s.as_slice(), &[iv(0, 50), iv(100, 200)]);
    }

    #[test]
    fn insert_adjacent_is_not_merged() {
        let mut s = set(&[(100, 200)]);
        assert_eq!(s.insert(iv(201, 300)), Ok(1));
        assert_eq!(s.insert(iv(50, 99)), Ok(0));
        assert_eq!(s.as_slice(), &[iv(50, 99), iv(100, 200), iv(201, 300)]);
    }

    #[test]
    fn insert_rejects_overlap() {
        let mut s = set(&[(100, 200), (300, 400)]);
        assert_eq!(
            s.insert(iv(150, 250)),
            Err(IntervalSetError::Overlap {
                interval: iv(150, 250),
                existing: iv(100, 200)
            })
        );
        assert_eq!(
            s.insert(iv(250, 300)),
            Err(IntervalSetError::Overlap {
                interval: iv(250, 300),
                existing: iv(300, 400)
            })
        );
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn remove_containing_scenario() {
        let mut s = set(&[(0, 50), (100, 200)]);
        assert_eq!(s.remove_containing(30), Ok(iv(0, 50)));
        assert_eq!(s.as_slice(), &[iv(100, 200)]);
        assert_eq!(
            s.remove_containing(30),
            Err(IntervalSetError::NotContained(30))
        );
    }

    #[test]
    fn adjust_containing_scenario() {
        let mut s = set(&[(100, 200)]);
        assert_eq!(s.adjust_containing(150, iv(120, 180)), Ok(iv(100, 200)));
        assert_eq!(s.as_slice(), &[iv(120, 180)]);
    }

    #[test]
    fn adjust_containing_rejects_neighbour_overlap() {
        let mut s = set(&[(0, 9), (20, 29), (40, 49)]);
        assert!(s.adjust_containing(25, iv(10, 39)).is_ok());
        assert!(matches!(
            s.adjust_containing(25, iv(5, 30)),
            Err(IntervalSetError::Overlap { existing, .. }) if existing == iv(0, 9)
        ));
        assert!(matches!(
            s.adjust_containing(25, iv(30, 40)),
            Err(IntervalSetError::Overlap { existing, .. }) if existing == iv(40, 49)
        ));
        assert_eq!(s.as_slice(), &[iv(0, 9), iv(10, 39), iv(40, 49)]);
    }

    #[test]
    fn gap_at_covers_head_middle_and_tail() {
        let s = set(&[(10, 19), (20, 29), (40, 49)]);
        assert_eq!(s.gap_at(0), Some(iv(0, 9)));
        assert_eq!(s.gap_at(1), None); // touching
        assert_eq!(s.gap_at(2), Some(iv(30, 39)));
        assert_eq!(s.gap_at(3), Some(iv(50, u64::MAX)));
        assert_eq!(s.gap_at(4), None);
    }

    #[test]
    fn gap_at_domain_edges() {
        let s = IntervalSet::from_sorted(vec![Interval::new(0u8, 3), Interval::new(200, u8::MAX)])
            .unwrap();
        assert_eq!(s.gap_at(0), None);
        assert_eq!(s.gap_at(1), Some(Interval::new(4, 199)));
        assert_eq!(s.gap_at(2), None);
    }

    #[test]
    fn gaps_forward_and_reverse() {
        let s = set(&[(10, 19), (20, 29), (40, 49)]);
        let forward: Vec<_> = s.gaps().collect();
        assert_eq!(forward, vec![iv(0, 9), iv(30, 39), iv(50, u64::MAX)]);
        let backward: Vec<_> = s.gaps().rev().collect();
        assert_eq!(backward, vec![iv(50, u64::MAX), iv(30, 39), iv(0, 9)]);
    }

    #[test]
    fn gaps_of_empty_set_is_whole_domain() {
        let s = SetU::new();
        assert_eq!(s.gaps().collect::<Vec<_>>(), vec![iv(0, u64::MAX)]);
    }

    #[test]
    fn insert_window_respects_space() {
        let space = iv(0, 9_999_999);
        let s = set(&[(100, 200)]);
        assert_eq!(s.insert_window(0, space), Some(iv(0, 99)));
        assert_eq!(s.insert_window(1, space), Some(iv(201, 9_999_999)));
        assert_eq!(s.insert_window(2, space), None);

        let full = set(&[(0, 5), (6, 9_999_999)]);
        assert_eq!(full.insert_window(0, space), None);
        assert_eq!(full.insert_window(1, space), None);
        assert_eq!(full.insert_window(2, space), None);
    }

    #[test]
    fn adjust_window_spans_between_neighbours() {
        let space = iv(0, 1000);
        let s = set(&[(10, 19), (30, 39), (50, 59)]);
        assert_eq!(s.adjust_window(0, space), Some(iv(0, 29)));
        assert_eq!(s.adjust_window(1, space), Some(iv(20, 49)));
        assert_eq!(s.adjust_window(2, space), Some(iv(40, 1000)));
        assert_eq!(s.adjust_window(3, space), None);
        for (i, current) in s.iter().enumerate() {
            assert!(s.adjust_window(i, space).unwrap().contains_interval(current));
        }
    }

    #[test]
    fn index_primitives_keep_invariants() {
        let mut s = SetU::new();
        s.insert_at(0, iv(50, 60));
        s.insert_at(0, iv(10, 20));
        s.insert_at(2, iv(61, 70));
        assert_eq!(s.as_slice(), &[iv(10, 20), iv(50, 60), iv(61, 70)]);
        assert_eq!(s.replace_at(1, iv(21, 55)), iv(50, 60));
        assert_eq!(s.remove_at(0), iv(10, 20));
        assert_eq!(s.as_slice(), &[iv(21, 55), iv(61, 70)]);
        assert!(SetU::are_invariants_held(&s));
    }

    #[test]
    fn deref_and_iter() {
        let s = set(&[(1, 2), (4, 6)]);
        let slice: &[Interval<u64>] = &s;
        assert_eq!(slice.len(), 2);
        let collected: Vec<_> = (&s).into_iter().copied().collect();
        assert_eq!(collected, vec![iv(1, 2), iv(4, 6)]);
    }
}
