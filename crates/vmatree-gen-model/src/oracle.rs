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

//! Free-region search over an [`IntervalSet`].
//!
//! The oracle answers the same question as the VMA tree's
//! `find_free_bottomup`/`find_free_topdown`: where does a block of `size`
//! addresses, aligned to `align`, fit between `low` and `high` without
//! touching any occupied interval. It does so by scanning the derived gaps
//! linearly, which is slow but obviously correct.

use crate::{err::FreeQueryError, intervalset::IntervalSet};
use serde::Serialize;
use std::fmt::Display;
use vmatree_gen_core::{
    AddrVariable,
    align::{align_down, align_up, is_power_of_two},
    primitives::Interval,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    BottomUp,
    TopDown,
}

impl Direction {
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Direction::BottomUp => "bottomup",
            Direction::TopDown => "topdown",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a top-down search without an upper bound is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnboundedTopDown {
    /// An unbounded region has no highest address; report no match.
    #[default]
    NoMatch,
    /// Treat the end of the address type as the upper bound.
    ///
    /// For `u64` this yields `2^64 - align_up(size, align)` when the tail is
    /// free, which is what a tree operating on the full machine word returns.
    AddressSpaceEnd,
}

/// The parameters of one free-region search.
///
/// `high` is inclusive; `None` means the search is not bounded above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeQuery<A> {
    size: A,
    align: A,
    low: A,
    high: Option<A>,
    direction: Direction,
}

impl<A: AddrVariable> FreeQuery<A> {
    /// Validates and creates a query.
    ///
    /// A bounded `high` below `low` is accepted: such a query has an empty
    /// window and never matches, which is a case the tree has to reject too.
    pub fn new(
        size: A,
        align: A,
        low: A,
        high: Option<A>,
        direction: Direction,
    ) -> Result<Self, FreeQueryError<A>> {
        if size.is_zero() {
            return Err(FreeQueryError::ZeroSize);
        }
        if !is_power_of_two(align) {
            return Err(FreeQueryError::AlignNotPowerOfTwo(align));
        }
        Ok(Self::from_parts(size, align, low, high, direction))
    }

    /// Creates a query from parameters already known to be valid.
    #[inline]
    pub(crate) fn from_parts(
        size: A,
        align: A,
        low: A,
        high: Option<A>,
        direction: Direction,
    ) -> Self {
        debug_assert!(!size.is_zero() && is_power_of_two(align));
        Self {
            size,
            align,
            low,
            high,
            direction,
        }
    }

    #[inline]
    pub fn size(&self) -> A {
        self.size
    }

    #[inline]
    pub fn align(&self) -> A {
        self.align
    }

    #[inline]
    pub fn low(&self) -> A {
        self.low
    }

    #[inline]
    pub fn high(&self) -> Option<A> {
        self.high
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `high`, or the all-ones sentinel if the query is unbounded.
    #[inline]
    pub fn high_or_sentinel(&self) -> A {
        self.high.unwrap_or_else(A::max_value)
    }

    /// The inclusive address window the block has to lie in, or `None` if
    /// `high < low`.
    #[inline]
    pub fn window(&self) -> Option<Interval<A>> {
        Interval::try_new(self.low, self.high_or_sentinel())
    }

    /// Lowest aligned start inside `gap` that fits the block.
    fn lowest_fit(&self, gap: Interval<A>, window: &Interval<A>) -> Option<A> {
        let gap = gap.intersection(window)?;
        let start = align_up(gap.first(), self.align)?;
        gap.fits_from(start, self.size).then_some(start)
    }

    /// Highest aligned start inside `gap` that fits the block.
    fn highest_fit(&self, gap: Interval<A>, window: &Interval<A>) -> Option<A> {
        let gap = gap.intersection(window)?;
        let top = gap.last().checked_sub(&(self.size - A::one()))?;
        let start = align_down(top, self.align);
        (start >= gap.first()).then_some(start)
    }
}

impl<A: Display> Display for FreeQuery<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FreeQuery {{ size: {}, align: {}, low: {}, high: ",
            self.size, self.align, self.low
        )?;
        match &self.high {
            Some(high) => write!(f, "{}", high)?,
            None => f.write_str("unbounded")?,
        }
        write!(f, ", direction: {} }}", self.direction)
    }
}

/// Ground truth for free-region searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreeRegionOracle {
    unbounded_top_down: UnboundedTopDown,
}

impl FreeRegionOracle {
    #[inline]
    pub fn new(unbounded_top_down: UnboundedTopDown) -> Self {
        Self { unbounded_top_down }
    }

    #[inline]
    pub fn unbounded_top_down(&self) -> UnboundedTopDown {
        self.unbounded_top_down
    }

    /// Finds the start address of a free block satisfying `query`.
    ///
    /// Bottom-up returns the lowest such address, top-down the highest.
    /// `None` means that no address in the query window satisfies all
    /// constraints, or that an unbounded top-down search was asked under
    /// [`UnboundedTopDown::NoMatch`].
    ///
    /// # Examples
    ///
    /// ```
    /// use vmatree_gen_model::intervalset::IntervalSet;
    /// use vmatree_gen_model::oracle::{Direction, FreeQuery, FreeRegionOracle};
    ///
    /// let set = IntervalSet::<u64>::new();
    /// let oracle = FreeRegionOracle::default();
    /// let up = FreeQuery::new(10, 1, 0, None, Direction::BottomUp).unwrap();
    /// let down = FreeQuery::new(10, 1, 0, None, Direction::TopDown).unwrap();
    /// assert_eq!(oracle.find_free(&set, &up), Some(0));
    /// assert_eq!(oracle.find_free(&set, &down), None);
    /// ```
    pub fn find_free<A: AddrVariable>(
        &self,
        set: &IntervalSet<A>,
        query: &FreeQuery<A>,
    ) -> Option<A> {
        let window = query.window()?;
        match query.direction() {
            Direction::BottomUp => set.gaps().find_map(|gap| query.lowest_fit(gap, &window)),
            Direction::TopDown => {
                if query.high().is_none() && self.unbounded_top_down == UnboundedTopDown::NoMatch
                {
                    return None;
                }
                set.gaps()
                    .rev()
                    .find_map(|gap| query.highest_fit(gap, &window))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn iv(a: u64, b: u64) -> Interval<u64> {
        Interval::new(a, b)
    }

    fn set(ivs: &[(u64, u64)]) -> IntervalSet<u64> {
        IntervalSet::from_sorted(ivs.iter().map(|&(a, b)| iv(a, b)).collect()).unwrap()
    }

    fn q(size: u64, align: u64, low: u64, high: Option<u64>, d: Direction) -> FreeQuery<u64> {
        FreeQuery::new(size, align, low, high, d).unwrap()
    }

    /// Exhaustive search over the whole `u8` domain.
    fn brute_force(set: &IntervalSet<u8>, query: &FreeQuery<u8>) -> Vec<u8> {
        let high = query.high_or_sentinel() as u16;
        (query.low() as u16..=high)
            .filter(|a| a % query.align() as u16 == 0)
            .filter(|a| a + query.size() as u16 - 1 <= high)
            .filter(|&a| {
                let block = Interval::new(a as u8, (a + query.size() as u16 - 1) as u8);
                set.iter().all(|occupied| !occupied.overlaps(&block))
            })
            .map(|a| a as u8)
            .collect()
    }

    fn random_set(rng: &mut ChaCha8Rng) -> IntervalSet<u8> {
        let mut s = IntervalSet::new();
        let space = Interval::new(0u8, u8::MAX);
        for _ in 0..rng.random_range(0..12) {
            let index = rng.random_range(0..=s.len());
            if let Some(window) = s.insert_window(index, space) {
                let a = rng.random_range(window.first()..=window.last());
                let b = rng.random_range(a..=window.last());
                s.insert_at(index, Interval::new(a, b));
            }
        }
        s
    }

    #[test]
    fn query_validation() {
        assert_eq!(
            FreeQuery::new(0u64, 1, 0, None, Direction::BottomUp),
            Err(FreeQueryError::ZeroSize)
        );
        assert_eq!(
            FreeQuery::new(1u64, 3, 0, None, Direction::BottomUp),
            Err(FreeQueryError::AlignNotPowerOfTwo(3))
        );
        assert!(FreeQuery::new(1u64, 1, 10, Some(10), Direction::TopDown).is_ok());
        let inverted = FreeQuery::new(1u64, 1, 10, Some(9), Direction::TopDown).unwrap();
        assert_eq!(inverted.window(), None);
    }

    #[test]
    fn inverted_window_never_matches() {
        let s = IntervalSet::<u64>::new();
        let oracle = FreeRegionOracle::new(UnboundedTopDown::AddressSpaceEnd);
        for d in [Direction::BottomUp, Direction::TopDown] {
            assert_eq!(oracle.find_free(&s, &q(1, 1, 10, Some(9), d)), None);
        }
    }

    #[test]
    fn empty_set_unbounded_scenarios() {
        let s = IntervalSet::<u64>::new();
        let oracle = FreeRegionOracle::default();
        assert_eq!(
            oracle.find_free(&s, &q(10, 1, 0, None, Direction::BottomUp)),
            Some(0)
        );
        assert_eq!(
            oracle.find_free(&s, &q(10, 1, 0, None, Direction::TopDown)),
            None
        );
    }

    #[test]
    fn unbounded_top_down_address_space_end_matches_wrapped_value() {
        let s = set(&[(100, 200)]);
        let oracle = FreeRegionOracle::new(UnboundedTopDown::AddressSpaceEnd);
        for (size, align) in [(10u64, 1u64), (4097, 4096), (1, 1 << 24), (999_999, 1 << 3)] {
            let got = oracle.find_free(&s, &q(size, align, 0, None, Direction::TopDown));
            let wrapped = 0u64.wrapping_sub(align_up(size, align).unwrap());
            assert_eq!(got, Some(wrapped));
        }
    }

    #[test]
    fn bottom_up_skips_too_small_gaps() {
        let s = set(&[(10, 19), (25, 29), (100, 199)]);
        let oracle = FreeRegionOracle::default();
        // [0, 9] fits 10, [20, 24] only 5, [30, 99] fits 70
        assert_eq!(
            oracle.find_free(&s, &q(10, 1, 0, None, Direction::BottomUp)),
            Some(0)
        );
        assert_eq!(
            oracle.find_free(&s, &q(11, 1, 0, None, Direction::BottomUp)),
            Some(30)
        );
        assert_eq!(
            oracle.find_free(&s, &q(71, 1, 0, None, Direction::BottomUp)),
            Some(200)
        );
    }

    #[test]
    fn bottom_up_respects_alignment_and_low() {
        let s = set(&[(10, 19), (100, 199)]);
        let oracle = FreeRegionOracle::default();
        assert_eq!(
            oracle.find_free(&s, &q(8, 16, 0, None, Direction::BottomUp)),
            Some(0)
        );
        assert_eq!(
            oracle.find_free(&s, &q(8, 16, 1, None, Direction::BottomUp)),
            Some(32)
        );
        assert_eq!(
            oracle.find_free(&s, &q(8, 64, 1, None, Direction::BottomUp)),
            Some(64)
        );
        assert_eq!(
            oracle.find_free(&s, &q(8, 128, 1, None, Direction::BottomUp)),
            Some(256)
        );
    }

    #[test]
    fn top_down_picks_highest_gap_below_high() {
        let s = set(&[(10, 19), (100, 199)]);
        let oracle = FreeRegionOracle::default();
        assert_eq!(
            oracle.find_free(&s, &q(10, 1, 0, Some(299), Direction::TopDown)),
            Some(290)
        );
        assert_eq!(
            oracle.find_free(&s, &q(10, 1, 0, Some(150), Direction::TopDown)),
            Some(90)
        );
        assert_eq!(
            oracle.find_free(&s, &q(10, 16, 0, Some(150), Direction::TopDown)),
            Some(80)
        );
        assert_eq!(
            oracle.find_free(&s, &q(81, 1, 0, Some(150), Direction::TopDown)),
            None
        );
    }

    #[test]
    fn bounded_high_is_inclusive() {
        let s = set(&[(100, 199)]);
        let oracle = FreeRegionOracle::default();
        // the block [90, 99] ends exactly at `high`
        assert_eq!(
            oracle.find_free(&s, &q(10, 1, 0, Some(99), Direction::TopDown)),
            Some(90)
        );
        assert_eq!(
            oracle.find_free(&s, &q(10, 1, 90, Some(99), Direction::BottomUp)),
            Some(90)
        );
        assert_eq!(
            oracle.find_free(&s, &q(10, 1, 91, Some(99), Direction::BottomUp)),
            None
        );
    }

    #[test]
    fn no_match_when_everything_is_occupied() {
        let s = set(&[(0, 49), (50, 1000)]);
        let oracle = FreeRegionOracle::default();
        for d in [Direction::BottomUp, Direction::TopDown] {
            assert_eq!(oracle.find_free(&s, &q(1, 1, 0, Some(1000), d)), None);
        }
    }

    #[test]
    fn agrees_with_brute_force_over_u8_domain() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);
        let oracles = [
            FreeRegionOracle::new(UnboundedTopDown::NoMatch),
            FreeRegionOracle::new(UnboundedTopDown::AddressSpaceEnd),
        ];
        for _ in 0..2_000 {
            let s = random_set(&mut rng);
            let size = rng.random_range(1..=64u8);
            let align = 1u8 << rng.random_range(0..=6u32);
            let low = rng.random_range(0..=u8::MAX);
            let high = if rng.random_bool(0.3) {
                None
            } else {
                Some(rng.random_range(low..=u8::MAX))
            };
            let candidates = brute_force(
                &s,
                &FreeQuery::new(size, align, low, high, Direction::BottomUp).unwrap(),
            );
            for oracle in &oracles {
                let up = FreeQuery::new(size, align, low, high, Direction::BottomUp).unwrap();
                let down = FreeQuery::new(size, align, low, high, Direction::TopDown).unwrap();
                assert_eq!(
                    oracle.find_free(&s, &up),
                    candidates.first().copied(),
                    "bottom-up {} on {:?}",
                    up,
                    s.as_slice()
                );
                let expected_down = match (high, oracle.unbounded_top_down()) {
                    (None, UnboundedTopDown::NoMatch) => None,
                    _ => candidates.last().copied(),
                };
                assert_eq!(
                    oracle.find_free(&s, &down),
                    expected_down,
                    "top-down {} on {:?}",
                    down,
                    s.as_slice()
                );
            }
        }
    }
}
