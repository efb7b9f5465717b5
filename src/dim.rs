use core::fmt;

use crate::error::{ArrayError, Result};
use crate::int::IndexWidth;

/// One dimension of a regular array: an extent and the coordinate it starts at.
///
/// Invariants (checked by [`Dimension::new`]):
/// - `length >= 0` and `lower_bound >= 0`
/// - `lower_bound + length - 1` fits the index width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension<I: IndexWidth> {
    length: I,
    lower_bound: I,
}

/// Dimension of a 32-bit indexed array
pub type ArrayDimension = Dimension<i32>;

/// Dimension of a 64-bit indexed array
pub type ArrayLongDimension = Dimension<i64>;

impl<I: IndexWidth> Dimension<I> {
    /// Construct a dimension starting at `lower_bound`
    ///
    /// # Errors
    /// `InvalidArgument` if either value is negative or the upper bound
    /// would overflow `I`.
    pub fn new(length: I, lower_bound: I) -> Result<Self> {
        if length < I::zero() {
            return Err(ArrayError::invalid("length", format!("{length} is negative")));
        }
        if lower_bound < I::zero() {
            return Err(ArrayError::invalid(
                "lower_bound",
                format!("{lower_bound} is negative"),
            ));
        }
        if length > I::zero() && lower_bound.checked_add(&(length - I::one())).is_none() {
            return Err(ArrayError::invalid(
                "lower_bound",
                format!("{lower_bound} + {length} - 1 overflows the index width"),
            ));
        }
        Ok(Self {
            length,
            lower_bound,
        })
    }

    /// Used where the invariants were established by an earlier `new`
    pub(crate) fn new_unchecked(length: I, lower_bound: I) -> Self {
        Self {
            length,
            lower_bound,
        }
    }

    /// Construct a zero-based dimension
    pub fn with_length(length: I) -> Result<Self> {
        Self::new(length, I::zero())
    }

    #[inline(always)]
    pub fn length(&self) -> I {
        self.length
    }

    #[inline(always)]
    pub fn lower_bound(&self) -> I {
        self.lower_bound
    }

    /// Inclusive last coordinate; equals the lower bound when the dimension is empty
    #[inline]
    pub fn upper_bound(&self) -> I {
        if self.length > I::zero() {
            self.lower_bound + self.length - I::one()
        } else {
            self.lower_bound
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == I::zero()
    }

    /// Returns true if `index` is a coordinate of this dimension
    #[inline]
    pub fn contains(&self, index: I) -> bool {
        index >= self.lower_bound && index - self.lower_bound < self.length
    }
}

/// Display format:
/// - non-empty dimensions print the inclusive range `lb..=ub`
/// - empty dimensions print the empty range `lb..lb`
impl<I: IndexWidth> fmt::Display for Dimension<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "{}..{}", self.lower_bound, self.lower_bound)
        } else {
            write!(f, "{}..={}", self.lower_bound, self.upper_bound())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_based_dimension_works() {
        let d = ArrayDimension::with_length(4).unwrap();
        assert_eq!(d.length(), 4);
        assert_eq!(d.lower_bound(), 0);
        assert_eq!(d.upper_bound(), 3);
        assert_eq!(format!("{}", d), "0..=3");
    }

    #[test]
    fn lower_bound_shifts_range() {
        let d = ArrayDimension::new(4, 10).unwrap();
        assert_eq!(d.upper_bound(), 13);
        assert!(d.contains(10));
        assert!(d.contains(13));
        assert!(!d.contains(9));
        assert!(!d.contains(14));
    }

    #[test]
    fn empty_dimension() {
        let d = ArrayLongDimension::new(0, 7).unwrap();
        assert!(d.is_empty());
        assert_eq!(d.upper_bound(), 7);
        assert!(!d.contains(7));
        assert_eq!(format!("{}", d), "7..7");
    }

    #[test]
    fn rejects_negative_values() {
        assert!(matches!(
            ArrayDimension::new(-1, 0),
            Err(ArrayError::InvalidArgument { param: "length", .. })
        ));
        assert!(matches!(
            ArrayDimension::new(1, -3),
            Err(ArrayError::InvalidArgument { param: "lower_bound", .. })
        ));
    }

    #[test]
    fn rejects_overflowing_upper_bound() {
        assert!(ArrayDimension::new(1, i32::MAX).is_ok());
        assert!(ArrayDimension::new(2, i32::MAX).is_err());
        assert!(ArrayLongDimension::new(i64::MAX, 1).is_ok());
        assert!(ArrayLongDimension::new(i64::MAX, 2).is_err());
        // nothing is addressed, so any start is fine
        assert!(ArrayDimension::new(0, i32::MAX).is_ok());
    }

    #[test]
    fn structural_equality() {
        use std::collections::HashSet;

        let a = ArrayDimension::new(3, 1).unwrap();
        let b = ArrayDimension::new(3, 1).unwrap();
        let c = ArrayDimension::new(3, 0).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
