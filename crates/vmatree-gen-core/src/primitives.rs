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

//! # Core Primitives
//!
//! Closed address ranges used by the reference model and the free-region
//! oracle. Unlike the usual half-open ranges, an [`Interval`] here includes
//! both of its bounds, mirroring how a VMA records its `first` and `last`
//! mapped address.

use num_traits::{CheckedAdd, CheckedSub, One};
use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;

/// A closed interval `[first, last]`.
///
/// An interval always holds at least one value: `first <= last` is an
/// invariant established by [`Interval::new`].
///
/// # Examples
///
/// ```
/// use vmatree_gen_core::primitives::Interval;
/// let interval = Interval::new(100u64, 200);
/// assert_eq!(interval.first(), 100);
/// assert_eq!(interval.last(), 200);
/// assert!(interval.contains(100));
/// assert!(interval.contains(200));
/// assert!(!interval.contains(201));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interval<T> {
    first: T,
    last: T,
}

impl<T> Interval<T> {
    /// Creates a new closed interval `[first, last]`.
    ///
    /// The bounds are ordered before they are stored, so `Interval::new(5, 3)`
    /// is the same interval as `Interval::new(3, 5)`.
    ///
    /// # Panics
    ///
    /// Panics if `a` and `b` are not comparable.
    ///
    /// # Examples
    ///
    /// ```
    /// use vmatree_gen_core::primitives::Interval;
    ///
    /// let interval = Interval::new(5u32, 3);
    /// assert_eq!(interval.first(), 3);
    /// assert_eq!(interval.last(), 5);
    /// ```
    #[inline]
    pub fn new(a: T, b: T) -> Self
    where
        T: PartialOrd + Copy,
    {
        let ord = a
            .partial_cmp(&b)
            .expect("Interval::new: non-comparable bounds");
        let (first, last) = match ord {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };
        Self { first, last }
    }

    /// Creates a closed interval only if `first <= last`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vmatree_gen_core::primitives::Interval;
    ///
    /// assert!(Interval::try_new(1u64, 1).is_some());
    /// assert!(Interval::try_new(2u64, 1).is_none());
    /// ```
    #[inline]
    pub fn try_new(first: T, last: T) -> Option<Self>
    where
        T: PartialOrd,
    {
        (first <= last).then_some(Self { first, last })
    }

    /// Returns the lowest address of the interval.
    #[inline]
    pub fn first(&self) -> T
    where
        T: Copy,
    {
        self.first
    }

    /// Returns the highest address of the interval.
    #[inline]
    pub fn last(&self) -> T
    where
        T: Copy,
    {
        self.last
    }

    /// Returns `true` if `x` lies within `[first, last]`.
    #[inline]
    pub fn contains(&self, x: T) -> bool
    where
        T: PartialOrd,
    {
        self.first <= x && x <= self.last
    }

    /// Returns `true` if `other` lies entirely within `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vmatree_gen_core::primitives::Interval;
    ///
    /// let outer = Interval::new(0u64, 10);
    /// assert!(outer.contains_interval(&Interval::new(0, 10)));
    /// assert!(outer.contains_interval(&Interval::new(3, 4)));
    /// assert!(!outer.contains_interval(&Interval::new(3, 11)));
    /// ```
    #[inline]
    pub fn contains_interval(&self, other: &Self) -> bool
    where
        T: PartialOrd,
    {
        self.first <= other.first && other.last <= self.last
    }

    /// Returns `true` if the two intervals share at least one address.
    ///
    /// Adjacent intervals such as `[0, 4]` and `[5, 9]` do not overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use vmatree_gen_core::primitives::Interval;
    ///
    /// let a = Interval::new(0u64, 4);
    /// assert!(a.overlaps(&Interval::new(4, 9)));
    /// assert!(!a.overlaps(&Interval::new(5, 9)));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool
    where
        T: PartialOrd,
    {
        self.first <= other.last && other.first <= self.last
    }

    /// Returns the overlapping part of two intervals, if any.
    #[inline]
    pub fn intersection(&self, other: &Self) -> Option<Self>
    where
        T: Ord + Copy,
    {
        Self::try_new(self.first.max(other.first), self.last.min(other.last))
    }

    /// Returns the distance between the last and the first address.
    ///
    /// This is one less than the number of addresses the interval holds,
    /// which keeps the full address range `[0, T::MAX]` representable.
    #[inline]
    pub fn span(&self) -> T
    where
        T: Copy + CheckedSub,
    {
        // `first <= last` always holds, so this never underflows.
        self.last
            .checked_sub(&self.first)
            .unwrap_or_else(|| unreachable!("Interval invariant first <= last"))
    }

    /// Returns `true` if `size` consecutive addresses starting at `first`
    /// fit inside the interval.
    ///
    /// A `size` of zero never fits.
    #[inline]
    pub fn fits_from(&self, first: T, size: T) -> bool
    where
        T: Copy + Ord + CheckedAdd + CheckedSub + One,
    {
        if first < self.first || first > self.last {
            return false;
        }
        match size.checked_sub(&T::one()) {
            Some(extra) => self
                .last
                .checked_sub(&first)
                .is_some_and(|room| room >= extra),
            None => false,
        }
    }

    /// Returns an inclusive range over the same addresses.
    #[inline]
    pub fn to_range(&self) -> RangeInclusive<T>
    where
        T: Copy,
    {
        self.first..=self.last
    }
}

impl<T: fmt::Display> fmt::Display for Interval<T> {
    /// Formats the interval as `[first; last]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vmatree_gen_core::primitives::Interval;
    ///
    /// assert_eq!(format!("{}", Interval::new(1u64, 5)), "[1; 5]");
    /// ```
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}; {}]", self.first, self.last)
    }
}

impl<T: Copy + PartialOrd> From<RangeInclusive<T>> for Interval<T> {
    #[inline]
    fn from(r: RangeInclusive<T>) -> Self {
        Interval::new(*r.start(), *r.end())
    }
}
