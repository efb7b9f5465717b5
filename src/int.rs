//! Integer domains an array can be addressed in.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use num_traits::{FromPrimitive, PrimInt, Signed, ToPrimitive};

use crate::error::{ArrayError, Result};

/// Signed index width shared by dimensions, infos, cursors and stores.
///
/// Implemented for `i32` (regular arrays) and `i64` (long arrays).
pub trait IndexWidth:
    PrimInt + Signed + FromPrimitive + ToPrimitive + Into<i128> + Debug + Display + Hash
{
    /// Whether a native store in this domain can carry non-zero lower bounds.
    const NATIVE_LOWER_BOUNDS: bool;

    /// Narrows an `i128` known to lie in this domain.
    #[inline]
    fn narrow(v: i128) -> Result<Self> {
        Self::from_i128(v).ok_or(ArrayError::InternalInvariant(
            "intermediate value left the index domain",
        ))
    }

    /// Converts a non-negative offset into a storage position.
    #[inline]
    fn to_position(self) -> Result<usize> {
        self.to_usize().ok_or(ArrayError::InternalInvariant(
            "offset does not fit a storage position",
        ))
    }

    #[inline(always)]
    fn wide(self) -> i128 {
        self.into()
    }
}

impl IndexWidth for i32 {
    const NATIVE_LOWER_BOUNDS: bool = true;
}

impl IndexWidth for i64 {
    const NATIVE_LOWER_BOUNDS: bool = false;
}
