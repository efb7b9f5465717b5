use crate::error::Result;
use crate::int::IndexWidth;
use crate::storage::{ArrayStorage, DenseArray};

/// Capability surface of an array shape: converts between flat offsets and
/// dimensional tuples and reads/writes elements of a caller-supplied store.
///
/// All operations are pure given the fixed dimensions of the implementor.
/// `zero_based` selects whether tuples are expressed from 0 in every
/// dimension or from each dimension's lower bound.
pub trait ArrayInfo {
    type Index: IndexWidth;

    fn rank(&self) -> usize;

    /// Total number of elements
    fn length(&self) -> Self::Index;

    /// Allocate a store of this shape filled with `fill`.
    ///
    /// # Errors
    /// `InvalidArgument` if the shape cannot be stored natively (non-zero
    /// lower bounds in the `i64` domain) or does not fit in memory.
    fn create_storage<T: Clone>(&self, fill: T) -> Result<DenseArray<T, Self::Index>>;

    /// Row-major flat offset of `dim_indices`.
    ///
    /// # Errors
    /// `InvalidArgument` on a tuple of the wrong arity, `IndexOutOfRange` on a
    /// coordinate outside its dimension.
    fn calc_flat_index(
        &self,
        zero_based: bool,
        dim_indices: &[Self::Index],
    ) -> Result<Self::Index>;

    /// Mixed-radix decomposition of `flat` into `dim_indices`.
    ///
    /// # Errors
    /// `IndexOutOfRange` unless `0 <= flat < length()`; `dim_indices` is left
    /// untouched on failure.
    fn calc_dim_indices(
        &self,
        flat: Self::Index,
        zero_based: bool,
        dim_indices: &mut [Self::Index],
    ) -> Result<()>;

    fn get_min_dim_indices(
        &self,
        zero_based: bool,
        dim_indices: &mut [Self::Index],
    ) -> Result<()>;

    fn get_max_dim_indices(
        &self,
        zero_based: bool,
        dim_indices: &mut [Self::Index],
    ) -> Result<()>;

    /// Odometer increment, last dimension fastest. Returns `true` when the
    /// tuple wrapped from the maximum back to the minimum.
    fn inc_dim_indices(
        &self,
        zero_based: bool,
        dim_indices: &mut [Self::Index],
    ) -> Result<bool>;

    /// Odometer decrement. Returns `true` when the tuple wrapped from the
    /// minimum back to the maximum.
    fn dec_dim_indices(
        &self,
        zero_based: bool,
        dim_indices: &mut [Self::Index],
    ) -> Result<bool>;

    /// Returns true if every coordinate lies within its dimension
    fn contains(&self, zero_based: bool, dim_indices: &[Self::Index]) -> bool {
        self.calc_flat_index(zero_based, dim_indices).is_ok()
    }

    /// Read the element at `dim_indices` from `storage`.
    ///
    /// With `as_ranges` the store only has to contain this shape's bounds
    /// (this info describes a window into it); otherwise its shape must match
    /// exactly.
    ///
    /// # Errors
    /// `InvalidArgument` on an incompatible store, plus the failures of
    /// [`ArrayInfo::calc_flat_index`].
    fn get_value<'s, T, S>(
        &self,
        storage: &'s S,
        as_ranges: bool,
        zero_based: bool,
        dim_indices: &[Self::Index],
    ) -> Result<&'s T>
    where
        S: ArrayStorage<T, Index = Self::Index> + ?Sized;

    /// Write `value` at `dim_indices` into `storage`; see [`ArrayInfo::get_value`].
    fn set_value<T, S>(
        &self,
        storage: &mut S,
        value: T,
        as_ranges: bool,
        zero_based: bool,
        dim_indices: &[Self::Index],
    ) -> Result<()>
    where
        S: ArrayStorage<T, Index = Self::Index> + ?Sized;
}
