use std::fmt;

use tracing::debug;

use crate::dim::Dimension;
use crate::error::{ArrayError, Result};
use crate::info::ArrayInfo;
use crate::int::IndexWidth;
use crate::storage::{ArrayStorage, DenseArray};

/// Shape of a regular (non-jagged) array with arbitrary per-dimension lower
/// bounds.
///
/// Everything is precomputed at construction: lengths, lower bounds
/// (`bases`), inclusive upper bounds and the row-major positional weights
/// (`factors`), so every conversion is a single O(rank) pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegularInfo<I: IndexWidth> {
    lengths: Vec<I>,
    bases: Vec<I>,
    upper_bounds: Vec<I>,
    factors: Vec<I>,
    length: I,
}

/// Regular array addressed with `i32` coordinates
pub type RegularArrayInfo = RegularInfo<i32>;

/// Regular array addressed with `i64` coordinates
pub type RegularArrayLongInfo = RegularInfo<i64>;

impl<I: IndexWidth> RegularInfo<I> {
    /// Zero-based array with the given extents
    ///
    /// # Errors
    /// `InvalidArgument` for an empty or negative length list, or when the
    /// element count overflows `I`.
    pub fn new(lengths: &[I]) -> Result<Self> {
        let dims = lengths
            .iter()
            .map(|&len| Dimension::with_length(len))
            .collect::<Result<Vec<_>>>()?;
        Self::from_dimensions(&dims)
    }

    /// Array with explicit lower bounds, given as parallel slices
    ///
    /// # Errors
    /// As [`RegularInfo::new`], plus `InvalidArgument` when the slices differ
    /// in length or a bound is invalid for its dimension.
    pub fn with_bounds(lengths: &[I], lower_bounds: &[I]) -> Result<Self> {
        if lengths.len() != lower_bounds.len() {
            return Err(ArrayError::invalid(
                "lower_bounds",
                format!(
                    "{} lower bounds given for {} lengths",
                    lower_bounds.len(),
                    lengths.len()
                ),
            ));
        }
        let dims = lengths
            .iter()
            .zip(lower_bounds)
            .map(|(&len, &lb)| Dimension::new(len, lb))
            .collect::<Result<Vec<_>>>()?;
        Self::from_dimensions(&dims)
    }

    /// # Errors
    /// `InvalidArgument` for an empty list or an element count that
    /// overflows `I`.
    pub fn from_dimensions(dims: &[Dimension<I>]) -> Result<Self> {
        if dims.is_empty() {
            return Err(ArrayError::invalid(
                "dims",
                "at least one dimension is required",
            ));
        }

        let lengths: Vec<I> = dims.iter().map(Dimension::length).collect();
        let (factors, length) = row_major_factors(&lengths).ok_or_else(|| {
            ArrayError::invalid("dims", "element count overflows the index width")
        })?;

        debug!(rank = dims.len(), length = %length, "regular array info built");

        Ok(Self {
            lengths,
            bases: dims.iter().map(Dimension::lower_bound).collect(),
            upper_bounds: dims.iter().map(Dimension::upper_bound).collect(),
            factors,
            length,
        })
    }

    /// Describe the shape of an existing store
    ///
    /// # Errors
    /// `InvalidArgument` if the store reports no dimensions or an
    /// inconsistent rank.
    pub fn from_storage<T, S>(storage: &S) -> Result<Self>
    where
        S: ArrayStorage<T, Index = I> + ?Sized,
    {
        let dims = (0..storage.rank())
            .map(|i| {
                storage.dimension(i).ok_or_else(|| {
                    ArrayError::invalid("storage", format!("dimension {i} is missing"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_dimensions(&dims)
    }

    pub fn get_length(&self, dimension: usize) -> Result<I> {
        lookup(&self.lengths, dimension)
    }

    pub fn get_lower_bound(&self, dimension: usize) -> Result<I> {
        lookup(&self.bases, dimension)
    }

    pub fn get_upper_bound(&self, dimension: usize) -> Result<I> {
        lookup(&self.upper_bounds, dimension)
    }

    pub fn get_factor(&self, dimension: usize) -> Result<I> {
        lookup(&self.factors, dimension)
    }

    pub fn lengths(&self) -> &[I] {
        &self.lengths
    }

    pub fn lower_bounds(&self) -> &[I] {
        &self.bases
    }

    pub fn upper_bounds(&self) -> &[I] {
        &self.upper_bounds
    }

    pub fn factors(&self) -> &[I] {
        &self.factors
    }

    pub fn dimensions(&self) -> Vec<Dimension<I>> {
        self.lengths
            .iter()
            .zip(&self.bases)
            .map(|(&len, &lb)| Dimension::new_unchecked(len, lb))
            .collect()
    }

    #[inline(always)]
    fn offset(&self, zero_based: bool, dim: usize) -> I {
        if zero_based {
            I::zero()
        } else {
            self.bases[dim]
        }
    }

    #[inline]
    fn max_coordinate(&self, zero_based: bool, dim: usize) -> I {
        if zero_based {
            self.upper_bounds[dim] - self.bases[dim]
        } else {
            self.upper_bounds[dim]
        }
    }

    /// Zero-based position of `index` within dimension `dim`
    fn relative(&self, zero_based: bool, dim: usize, index: I) -> Result<I> {
        let off = self.offset(zero_based, dim);
        if index < off || index - off >= self.lengths[dim] {
            return Err(ArrayError::out_of_range(
                "dim_indices",
                index,
                off,
                off.wide() + self.lengths[dim].wide(),
            ));
        }
        Ok(index - off)
    }

    fn check_tuple(&self, zero_based: bool, dim_indices: &[I]) -> Result<()> {
        ArrayError::check_rank("dim_indices", self.rank(), dim_indices.len())?;
        for (i, &d) in dim_indices.iter().enumerate() {
            self.relative(zero_based, i, d)?;
        }
        Ok(())
    }

    /// Exact match, or containment when `as_ranges` is set
    fn check_storage<T, S>(&self, storage: &S, as_ranges: bool) -> Result<()>
    where
        S: ArrayStorage<T, Index = I> + ?Sized,
    {
        if storage.rank() != self.rank() {
            return Err(ArrayError::invalid(
                "storage",
                format!("rank {} does not match {}", storage.rank(), self.rank()),
            ));
        }
        for i in 0..self.rank() {
            let dim = storage.dimension(i).ok_or_else(|| {
                ArrayError::invalid("storage", format!("dimension {i} is missing"))
            })?;
            let lo = dim.lower_bound().wide();
            let hi = lo + dim.length().wide();
            let want_lo = self.bases[i].wide();
            let want_hi = want_lo + self.lengths[i].wide();

            let compatible = if as_ranges {
                lo <= want_lo && want_hi <= hi
            } else {
                lo == want_lo && hi == want_hi
            };
            if !compatible {
                return Err(ArrayError::invalid(
                    "storage",
                    format!(
                        "dimension {i} spans {lo}..{hi}, expected {}{want_lo}..{want_hi}",
                        if as_ranges { "a range containing " } else { "" }
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Validated natural coordinates of `dim_indices` inside `storage`
    fn native_indices<T, S>(
        &self,
        storage: &S,
        as_ranges: bool,
        zero_based: bool,
        dim_indices: &[I],
    ) -> Result<Vec<I>>
    where
        S: ArrayStorage<T, Index = I> + ?Sized,
    {
        self.check_storage::<T, S>(storage, as_ranges)?;
        self.check_tuple(zero_based, dim_indices)?;
        Ok(if zero_based {
            dim_indices
                .iter()
                .zip(&self.bases)
                .map(|(&d, &lb)| d + lb)
                .collect()
        } else {
            dim_indices.to_vec()
        })
    }
}

impl<I: IndexWidth> ArrayInfo for RegularInfo<I> {
    type Index = I;

    #[inline(always)]
    fn rank(&self) -> usize {
        self.lengths.len()
    }

    #[inline(always)]
    fn length(&self) -> I {
        self.length
    }

    fn create_storage<T: Clone>(&self, fill: T) -> Result<DenseArray<T, I>> {
        DenseArray::new(&self.dimensions(), fill)
    }

    fn calc_flat_index(&self, zero_based: bool, dim_indices: &[I]) -> Result<I> {
        ArrayError::check_rank("dim_indices", self.rank(), dim_indices.len())?;
        let mut flat = I::zero();
        for (i, &d) in dim_indices.iter().enumerate() {
            flat = flat + self.relative(zero_based, i, d)? * self.factors[i];
        }
        Ok(flat)
    }

    fn calc_dim_indices(&self, flat: I, zero_based: bool, dim_indices: &mut [I]) -> Result<()> {
        ArrayError::check_rank("dim_indices", self.rank(), dim_indices.len())?;
        if flat < I::zero() || flat >= self.length {
            return Err(ArrayError::out_of_range("flat", flat, I::zero(), self.length));
        }

        // a non-empty array has no zero factor
        let mut rest = flat;
        for (i, out) in dim_indices.iter_mut().enumerate() {
            let f = self.factors[i];
            *out = rest / f + self.offset(zero_based, i);
            rest = rest % f;
        }
        Ok(())
    }

    fn get_min_dim_indices(&self, zero_based: bool, dim_indices: &mut [I]) -> Result<()> {
        ArrayError::check_rank("dim_indices", self.rank(), dim_indices.len())?;
        for (i, out) in dim_indices.iter_mut().enumerate() {
            *out = self.offset(zero_based, i);
        }
        Ok(())
    }

    fn get_max_dim_indices(&self, zero_based: bool, dim_indices: &mut [I]) -> Result<()> {
        ArrayError::check_rank("dim_indices", self.rank(), dim_indices.len())?;
        for (i, out) in dim_indices.iter_mut().enumerate() {
            *out = self.max_coordinate(zero_based, i);
        }
        Ok(())
    }

    fn inc_dim_indices(&self, zero_based: bool, dim_indices: &mut [I]) -> Result<bool> {
        self.check_tuple(zero_based, dim_indices)?;
        for j in (0..dim_indices.len()).rev() {
            let off = self.offset(zero_based, j);
            if dim_indices[j] - off + I::one() < self.lengths[j] {
                dim_indices[j] = dim_indices[j] + I::one();
                return Ok(false);
            }
            dim_indices[j] = off;
        }
        Ok(true)
    }

    fn dec_dim_indices(&self, zero_based: bool, dim_indices: &mut [I]) -> Result<bool> {
        self.check_tuple(zero_based, dim_indices)?;
        for j in (0..dim_indices.len()).rev() {
            if dim_indices[j] > self.offset(zero_based, j) {
                dim_indices[j] = dim_indices[j] - I::one();
                return Ok(false);
            }
            dim_indices[j] = self.max_coordinate(zero_based, j);
        }
        Ok(true)
    }

    fn contains(&self, zero_based: bool, dim_indices: &[I]) -> bool {
        self.check_tuple(zero_based, dim_indices).is_ok()
    }

    fn get_value<'s, T, S>(
        &self,
        storage: &'s S,
        as_ranges: bool,
        zero_based: bool,
        dim_indices: &[I],
    ) -> Result<&'s T>
    where
        S: ArrayStorage<T, Index = I> + ?Sized,
    {
        let native = self.native_indices::<T, S>(storage, as_ranges, zero_based, dim_indices)?;
        storage
            .get(&native)
            .ok_or(ArrayError::InternalInvariant("store rejected validated coordinates"))
    }

    fn set_value<T, S>(
        &self,
        storage: &mut S,
        value: T,
        as_ranges: bool,
        zero_based: bool,
        dim_indices: &[I],
    ) -> Result<()>
    where
        S: ArrayStorage<T, Index = I> + ?Sized,
    {
        let native = self.native_indices::<T, S>(storage, as_ranges, zero_based, dim_indices)?;
        let slot = storage
            .get_mut(&native)
            .ok_or(ArrayError::InternalInvariant("store rejected validated coordinates"))?;
        *slot = value;
        Ok(())
    }
}

impl<I: IndexWidth> fmt::Display for RegularInfo<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dimensions().iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, ")")
    }
}

/* ---------- factor helpers ---------- */

/// `factors[r-1] = 1`, `factors[i] = lengths[i+1] * factors[i+1]`; also
/// returns the element count. `None` on overflow.
fn row_major_factors<I: IndexWidth>(lengths: &[I]) -> Option<(Vec<I>, I)> {
    let mut factors = vec![I::zero(); lengths.len()];
    let mut acc = I::one();
    for i in (0..lengths.len()).rev() {
        factors[i] = acc;
        acc = acc.checked_mul(&lengths[i])?;
    }
    Some((factors, acc))
}

fn lookup<I: IndexWidth>(values: &[I], dimension: usize) -> Result<I> {
    values.get(dimension).copied().ok_or_else(|| {
        ArrayError::out_of_range("dimension", dimension as i128, 0i128, values.len() as i128)
    })
}
