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

//! Power-of-two alignment helpers.
//!
//! All helpers expect `align` to be a power of two. `align_up` is checked
//! because rounding up near the top of the address type can overflow.

use num_traits::{PrimInt, Unsigned};

/// Returns `true` if `x` is a non-zero power of two.
///
/// # Examples
///
/// ```
/// use vmatree_gen_core::align::is_power_of_two;
///
/// assert!(is_power_of_two(1u64));
/// assert!(is_power_of_two(4096u64));
/// assert!(!is_power_of_two(0u64));
/// assert!(!is_power_of_two(12u64));
/// ```
#[inline]
pub fn is_power_of_two<T>(x: T) -> bool
where
    T: PrimInt + Unsigned,
{
    x.count_ones() == 1
}

/// Rounds `x` down to the previous multiple of `align`.
///
/// # Examples
///
/// ```
/// use vmatree_gen_core::align::align_down;
///
/// assert_eq!(align_down(4097u64, 4096), 4096);
/// assert_eq!(align_down(4096u64, 4096), 4096);
/// assert_eq!(align_down(4095u64, 4096), 0);
/// ```
#[inline]
pub fn align_down<T>(x: T, align: T) -> T
where
    T: PrimInt + Unsigned,
{
    debug_assert!(is_power_of_two(align), "alignment must be a power of two");
    x & !(align - T::one())
}

/// Rounds `x` up to the next multiple of `align`.
///
/// Returns `None` if the rounded value does not fit into `T`.
///
/// # Examples
///
/// ```
/// use vmatree_gen_core::align::align_up;
///
/// assert_eq!(align_up(4097u64, 4096), Some(8192));
/// assert_eq!(align_up(4096u64, 4096), Some(4096));
/// assert_eq!(align_up(0u64, 4096), Some(0));
/// assert_eq!(align_up(u64::MAX, 2), None);
/// ```
#[inline]
pub fn align_up<T>(x: T, align: T) -> Option<T>
where
    T: PrimInt + Unsigned,
{
    debug_assert!(is_power_of_two(align), "alignment must be a power of two");
    x.checked_add(&(align - T::one()))
        .map(|bumped| align_down(bumped, align))
}
