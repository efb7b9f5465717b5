use std::fmt;

use num_traits::{One, Zero};
use tracing::trace;

use crate::error::{ArrayError, Result};
use crate::info::ArrayInfo;
use crate::int::IndexWidth;
use crate::regular::{RegularArrayInfo, RegularArrayLongInfo};
use crate::storage::ArrayStorage;

/// Which end of the array a new cursor starts at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    Lower,
    Upper,
}

/// Behaviour switches of an [`IndexCursor`]; everything is off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CursorOptions {
    /// Express tuples from 0 instead of each dimension's lower bound
    pub zero_based: bool,
    /// Treat the info as a window into a larger store
    pub as_ranges: bool,
    /// Fail moves that leave the array instead of wrapping around
    pub check_out: bool,
}

impl CursorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zero_based(mut self, zero_based: bool) -> Self {
        self.zero_based = zero_based;
        self
    }

    pub fn with_as_ranges(mut self, as_ranges: bool) -> Self {
        self.as_ranges = as_ranges;
        self
    }

    pub fn with_check_out(mut self, check_out: bool) -> Self {
        self.check_out = check_out;
        self
    }
}

/// Mutable position in an array: a flat index and the dimensional tuple
/// addressing the same element, kept consistent by every operation.
///
/// The cursor borrows its [`ArrayInfo`]; any number of cursors can share one
/// info. A failed operation leaves the cursor unchanged.
#[derive(Debug)]
pub struct IndexCursor<'a, A: ArrayInfo> {
    info: &'a A,
    flat_index: A::Index,
    dim_indices: Vec<A::Index>,
    zero_based: bool,
    as_ranges: bool,
    check_out: bool,
    carry: A::Index,
    wrapped: bool,
}

/// Cursor over a 32-bit indexed array
pub type ArrayIndex<'a> = IndexCursor<'a, RegularArrayInfo>;

/// Cursor over a 64-bit indexed array
pub type ArrayLongIndex<'a> = IndexCursor<'a, RegularArrayLongInfo>;

impl<A: ArrayInfo> Clone for IndexCursor<'_, A> {
    fn clone(&self) -> Self {
        Self {
            info: self.info,
            flat_index: self.flat_index,
            dim_indices: self.dim_indices.clone(),
            zero_based: self.zero_based,
            as_ranges: self.as_ranges,
            check_out: self.check_out,
            carry: self.carry,
            wrapped: self.wrapped,
        }
    }
}

impl<'a, A: ArrayInfo> IndexCursor<'a, A> {
    /// Cursor at the first (`Lower`) or last (`Upper`) element
    pub fn new(info: &'a A, zero_based: bool, bound: Bound) -> Result<Self> {
        Self::with_options(info, CursorOptions::new().with_zero_based(zero_based), bound)
    }

    pub fn with_options(info: &'a A, options: CursorOptions, bound: Bound) -> Result<Self> {
        let mut cursor = Self {
            info,
            flat_index: A::Index::zero(),
            dim_indices: vec![A::Index::zero(); info.rank()],
            zero_based: options.zero_based,
            as_ranges: options.as_ranges,
            check_out: options.check_out,
            carry: A::Index::zero(),
            wrapped: false,
        };
        match bound {
            Bound::Lower => cursor.set_min()?,
            Bound::Upper => cursor.set_max()?,
        }
        Ok(cursor)
    }

    pub fn info(&self) -> &'a A {
        self.info
    }

    pub fn rank(&self) -> usize {
        self.dim_indices.len()
    }

    pub fn length(&self) -> A::Index {
        self.info.length()
    }

    #[inline(always)]
    pub fn flat_index(&self) -> A::Index {
        self.flat_index
    }

    #[inline(always)]
    pub fn dim_indices(&self) -> &[A::Index] {
        &self.dim_indices
    }

    /// Signed excess of the most recent move past either end; 0 if it did not wrap
    #[inline(always)]
    pub fn carry(&self) -> A::Index {
        self.carry
    }

    /// Whether the most recent move wrapped around
    #[inline(always)]
    pub fn wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn zero_based(&self) -> bool {
        self.zero_based
    }

    pub fn as_ranges(&self) -> bool {
        self.as_ranges
    }

    pub fn check_out(&self) -> bool {
        self.check_out
    }

    pub fn options(&self) -> CursorOptions {
        CursorOptions {
            zero_based: self.zero_based,
            as_ranges: self.as_ranges,
            check_out: self.check_out,
        }
    }

    pub fn set_as_ranges(&mut self, as_ranges: bool) {
        self.as_ranges = as_ranges;
    }

    pub fn set_check_out(&mut self, check_out: bool) {
        self.check_out = check_out;
    }

    /// Switch the base convention, re-expressing the current tuple in it
    pub fn set_zero_based(&mut self, zero_based: bool) -> Result<()> {
        if zero_based == self.zero_based {
            return Ok(());
        }
        let mut bases = vec![A::Index::zero(); self.rank()];
        self.info.get_min_dim_indices(false, &mut bases)?;
        for (d, lb) in self.dim_indices.iter_mut().zip(bases) {
            *d = if zero_based { *d - lb } else { *d + lb };
        }
        self.zero_based = zero_based;
        Ok(())
    }

    /// Jump to `flat`.
    ///
    /// # Errors
    /// `IndexOutOfRange` unless `0 <= flat < length()`.
    pub fn set_flat_index(&mut self, flat: A::Index) -> Result<()> {
        if flat != self.flat_index || self.length() == A::Index::zero() {
            self.info
                .calc_dim_indices(flat, self.zero_based, &mut self.dim_indices)?;
            self.flat_index = flat;
        }
        self.reset_carry();
        Ok(())
    }

    /// Copy the current tuple into `out`
    pub fn get_dim_indices(&self, out: &mut [A::Index]) -> Result<()> {
        ArrayError::check_rank("dim_indices", self.rank(), out.len())?;
        out.copy_from_slice(&self.dim_indices);
        Ok(())
    }

    /// Jump to the element addressed by `dim_indices`.
    ///
    /// # Errors
    /// `InvalidArgument` on a tuple of the wrong arity, `IndexOutOfRange` on a
    /// coordinate outside its dimension.
    pub fn set_dim_indices(&mut self, dim_indices: &[A::Index]) -> Result<()> {
        let flat = self.info.calc_flat_index(self.zero_based, dim_indices)?;
        self.dim_indices.copy_from_slice(dim_indices);
        self.flat_index = flat;
        self.reset_carry();
        Ok(())
    }

    pub fn set_min(&mut self) -> Result<()> {
        self.info
            .get_min_dim_indices(self.zero_based, &mut self.dim_indices)?;
        self.flat_index = A::Index::zero();
        self.reset_carry();
        Ok(())
    }

    pub fn set_max(&mut self) -> Result<()> {
        self.info
            .get_max_dim_indices(self.zero_based, &mut self.dim_indices)?;
        let length = self.length();
        self.flat_index = if length > A::Index::zero() {
            length - A::Index::one()
        } else {
            A::Index::zero()
        };
        self.reset_carry();
        Ok(())
    }

    pub fn is_min(&self) -> bool {
        self.length() > A::Index::zero() && self.flat_index == A::Index::zero()
    }

    pub fn is_max(&self) -> bool {
        let length = self.length();
        length > A::Index::zero() && self.flat_index == length - A::Index::one()
    }

    /// Move forward by `delta` and return the carry.
    ///
    /// In wrap mode `delta` is reduced modulo `length()` only when its
    /// magnitude exceeds the length. A move by exactly `length()` wraps back to
    /// the same element, but larger multiples reduce to a zero step and do not
    /// count as a wrap. On length 5 from flat 0, `add(5)` wraps, `add(7)` lands
    /// on 2 without wrapping, and `add(10)` stays on 0 without wrapping.
    ///
    /// # Errors
    /// `OperationOutOfRange` on an empty array, or in `check_out` mode when
    /// the move would leave `0..length()`.
    pub fn add(&mut self, delta: A::Index) -> Result<A::Index> {
        self.shift("add", delta.wide())
    }

    /// Move backward by `delta`; see [`IndexCursor::add`].
    pub fn sub(&mut self, delta: A::Index) -> Result<A::Index> {
        self.shift("sub", -delta.wide())
    }

    /// Step to the next element; returns whether the cursor wrapped to the first one.
    pub fn inc(&mut self) -> Result<bool> {
        self.shift("inc", 1)?;
        Ok(self.wrapped)
    }

    /// Step to the previous element; returns whether the cursor wrapped to the last one.
    pub fn dec(&mut self) -> Result<bool> {
        self.shift("dec", -1)?;
        Ok(self.wrapped)
    }

    /// Read the element under the cursor
    pub fn get_value<'s, T, S>(&self, storage: &'s S) -> Result<&'s T>
    where
        S: ArrayStorage<T, Index = A::Index> + ?Sized,
    {
        self.info
            .get_value(storage, self.as_ranges, self.zero_based, &self.dim_indices)
    }

    /// Write the element under the cursor
    pub fn set_value<T, S>(&self, storage: &mut S, value: T) -> Result<()>
    where
        S: ArrayStorage<T, Index = A::Index> + ?Sized,
    {
        self.info.set_value(
            storage,
            value,
            self.as_ranges,
            self.zero_based,
            &self.dim_indices,
        )
    }

    fn reset_carry(&mut self) {
        self.carry = A::Index::zero();
        self.wrapped = false;
    }

    /// Shared body of every additive move.
    ///
    /// Arithmetic is done in `i128` so `flat + delta` cannot overflow before
    /// the range checks.
    fn shift(&mut self, op: &'static str, delta: i128) -> Result<A::Index> {
        let n = self.length().wide();
        let flat = self.flat_index.wide();
        let rejected = || ArrayError::OperationOutOfRange {
            op,
            flat,
            delta,
            length: n,
        };
        if n == 0 {
            return Err(rejected());
        }

        let (step, next, carry, wrapped) = if self.check_out {
            let raw = flat + delta;
            if raw < 0 || raw >= n {
                trace!(op, flat = %flat, delta = %delta, "strict move rejected");
                return Err(rejected());
            }
            (delta, raw, 0, false)
        } else {
            let step = if delta.abs() > n { delta % n } else { delta };
            let raw = flat + step;
            if raw >= n {
                (step, raw - n, raw - n, true)
            } else if raw < 0 {
                (step, raw + n, raw + 1, true)
            } else {
                (step, raw, 0, false)
            }
        };

        let next = A::Index::narrow(next)?;
        let carry = A::Index::narrow(carry)?;
        match step {
            0 => {}
            1 => {
                let overflow = self
                    .info
                    .inc_dim_indices(self.zero_based, &mut self.dim_indices)?;
                debug_assert_eq!(overflow, wrapped);
            }
            -1 => {
                let overflow = self
                    .info
                    .dec_dim_indices(self.zero_based, &mut self.dim_indices)?;
                debug_assert_eq!(overflow, wrapped);
            }
            _ => self
                .info
                .calc_dim_indices(next, self.zero_based, &mut self.dim_indices)?,
        }

        if wrapped {
            trace!(op, from = %self.flat_index, to = %next, carry = %carry, "cursor wrapped");
        }
        self.flat_index = next;
        self.carry = carry;
        self.wrapped = wrapped;
        Ok(carry)
    }
}

impl<A: ArrayInfo> fmt::Display for IndexCursor<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dim_indices.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, ")")
    }
}

macro_rules! cursor_into_flat {
    ($t:ty) => {
        impl<A: ArrayInfo<Index = $t>> From<&IndexCursor<'_, A>> for $t {
            #[inline(always)]
            fn from(cursor: &IndexCursor<'_, A>) -> $t {
                cursor.flat_index
            }
        }
    };
}

cursor_into_flat!(i32);
cursor_into_flat!(i64);


#[cfg(test)]
mod randomized_cursor {
    use super::*;
    use rand::Rng;

    /// Walks a wrap-mode move one element at a time and returns the expected
    /// (flat, carry, wrapped). The carry counts the signed unit steps taken
    /// after crossing the end.
    fn walk(flat: i64, delta: i64, n: i64) -> (i64, i64, bool) {
        let reduced = if delta.abs() > n { delta % n } else { delta };
        let dir = reduced.signum();
        let mut pos = flat;
        let mut after_crossing: Option<i64> = None;
        for _ in 0..reduced.abs() {
            pos += dir;
            if let Some(steps) = after_crossing {
                after_crossing = Some(steps + 1);
            } else if !(0..n).contains(&pos) {
                pos = pos.rem_euclid(n);
                after_crossing = Some(0);
            }
        }
        (pos, dir * after_crossing.unwrap_or(0), after_crossing.is_some())
    }

    fn random_long_info(rng: &mut impl Rng) -> RegularArrayLongInfo {
        let rank = rng.random_range(1..4);
        let lengths: Vec<i64> = (0..rank).map(|_| rng.random_range(1..5)).collect();
        let bases: Vec<i64> = (0..rank).map(|_| rng.random_range(0..50)).collect();
        RegularArrayLongInfo::with_bounds(&lengths, &bases).unwrap()
    }

    #[test]
    fn walk_agrees_with_euclidean_remainder() {
        for n in 1..7 {
            for flat in 0..n {
                for delta in -3 * n..=3 * n {
                    let (pos, carry, wrapped) = walk(flat, delta, n);
                    assert_eq!(pos, (flat + delta).rem_euclid(n));
                    if delta.abs() <= n {
                        assert_eq!(wrapped, !(0..n).contains(&(flat + delta)));
                    }
                    if !wrapped {
                        assert_eq!(carry, 0);
                    }
                }
            }
        }
    }

    #[test]
    fn cursor_add_matches_walk() {
        let mut rng = rand::rng();

        for _ in 0..100 {
            let info = random_long_info(&mut rng);
            let n = info.length();

            let zero_based = rng.random_bool(0.5);
            let mut c = ArrayLongIndex::new(&info, zero_based, Bound::Lower).unwrap();
            let mut expected = vec![0; info.rank()];

            for _ in 0..50 {
                let flat = c.flat_index();
                let delta = rng.random_range(-3 * n..=3 * n);
                let (want, carry, wrapped) = walk(flat, delta, n);

                assert_eq!(c.add(delta).unwrap(), carry);
                assert_eq!(c.flat_index(), want);
                assert_eq!(c.wrapped(), wrapped);

                info.calc_dim_indices(want, zero_based, &mut expected).unwrap();
                assert_eq!(c.dim_indices(), expected.as_slice());
            }
        }
    }

    #[test]
    fn cursor_sub_matches_walk() {
        let mut rng = rand::rng();

        for _ in 0..100 {
            let info = random_long_info(&mut rng);
            let n = info.length();

            let zero_based = rng.random_bool(0.5);
            let mut c = ArrayLongIndex::new(&info, zero_based, Bound::Upper).unwrap();
            let mut expected = vec![0; info.rank()];

            for _ in 0..50 {
                let flat = c.flat_index();
                let delta = rng.random_range(-3 * n..=3 * n);
                let (want, carry, wrapped) = walk(flat, -delta, n);

                assert_eq!(c.sub(delta).unwrap(), carry);
                assert_eq!(c.flat_index(), want);
                assert_eq!(c.wrapped(), wrapped);

                info.calc_dim_indices(want, zero_based, &mut expected).unwrap();
                assert_eq!(c.dim_indices(), expected.as_slice());
            }
        }
    }

    #[test]
    fn strict_never_moves_out() {
        let mut rng = rand::rng();
        let info = RegularArrayLongInfo::new(&[3, 4]).unwrap();
        let options = CursorOptions::new().with_check_out(true);
        let mut c = ArrayLongIndex::with_options(&info, options, Bound::Lower).unwrap();

        for _ in 0..500 {
            let before = c.clone();
            let delta = rng.random_range(-15..=15);
            let target = before.flat_index() + delta;
            match c.add(delta) {
                Ok(carry) => {
                    assert_eq!(carry, 0);
                    assert_eq!(c.flat_index(), target);
                }
                Err(ArrayError::OperationOutOfRange { .. }) => {
                    assert!(!(0..12).contains(&target));
                    assert_eq!(c.flat_index(), before.flat_index());
                    assert_eq!(c.dim_indices(), before.dim_indices());
                }
                Err(e) => panic!("unexpected error {e}"),
            }
        }
    }
}
