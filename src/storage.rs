use tracing::debug;

use crate::dim::Dimension;
use crate::error::{ArrayError, Result};
use crate::int::IndexWidth;

/* ========================= ArrayStorage ========================= */

/// Backing store addressed by natural (lower-bound relative) coordinates.
///
/// Infos and cursors never own element memory; they validate coordinates and
/// then read or write through this trait.
pub trait ArrayStorage<T> {
    type Index: IndexWidth;

    fn rank(&self) -> usize;

    /// Extent and lower bound of dimension `dim`, `None` if `dim >= rank()`
    fn dimension(&self, dim: usize) -> Option<Dimension<Self::Index>>;

    fn get(&self, indices: &[Self::Index]) -> Option<&T>;

    fn get_mut(&mut self, indices: &[Self::Index]) -> Option<&mut T>;
}

/* ========================= DenseArray ========================= */

/// Row-major `Vec<T>` store with per-dimension lower bounds.
///
/// In domains without native lower bounds (`i64`) every dimension must start
/// at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseArray<T, I: IndexWidth> {
    data: Vec<T>,
    dims: Vec<Dimension<I>>,
    strides: Vec<usize>,
}

impl<T: Clone, I: IndexWidth> DenseArray<T, I> {
    /// Allocate a store of the given shape with every element set to `fill`
    ///
    /// # Errors
    /// `InvalidArgument` for an empty shape, a non-zero lower bound in a
    /// domain that cannot represent one, or a size that overflows `usize`.
    pub fn new(dims: &[Dimension<I>], fill: T) -> Result<Self> {
        let (strides, len) = Self::layout(dims)?;
        debug!(rank = dims.len(), len, "allocating dense array");
        Ok(Self {
            data: vec![fill; len],
            dims: dims.to_vec(),
            strides,
        })
    }
}

impl<T, I: IndexWidth> DenseArray<T, I> {
    /// Wrap existing row-major `data` in the given shape
    ///
    /// # Errors
    /// As [`DenseArray::new`], plus `InvalidArgument` if `data` does not hold
    /// exactly one element per coordinate.
    pub fn from_vec(dims: &[Dimension<I>], data: Vec<T>) -> Result<Self> {
        let (strides, len) = Self::layout(dims)?;
        if data.len() != len {
            return Err(ArrayError::invalid(
                "data",
                format!("shape holds {len} elements, got {}", data.len()),
            ));
        }
        Ok(Self {
            data,
            dims: dims.to_vec(),
            strides,
        })
    }

    fn layout(dims: &[Dimension<I>]) -> Result<(Vec<usize>, usize)> {
        if dims.is_empty() {
            return Err(ArrayError::invalid("dims", "at least one dimension is required"));
        }
        if !I::NATIVE_LOWER_BOUNDS {
            if let Some(d) = dims.iter().find(|d| d.lower_bound() != I::zero()) {
                return Err(ArrayError::invalid(
                    "dims",
                    format!("lower bound {} cannot be stored natively", d.lower_bound()),
                ));
            }
        }

        let mut strides = vec![0; dims.len()];
        let mut acc: usize = 1;
        for i in (0..dims.len()).rev() {
            strides[i] = acc;
            acc = acc
                .checked_mul(dims[i].length().to_position()?)
                .ok_or_else(|| ArrayError::invalid("dims", "element count overflows usize"))?;
        }
        Ok((strides, acc))
    }

    fn position(&self, indices: &[I]) -> Option<usize> {
        if indices.len() != self.dims.len() {
            return None;
        }
        let mut pos = 0;
        for ((d, st), &idx) in self.dims.iter().zip(&self.strides).zip(indices) {
            if !d.contains(idx) {
                return None;
            }
            pos += (idx - d.lower_bound()).to_usize()? * st;
        }
        Some(pos)
    }

    pub fn dimensions(&self) -> &[Dimension<I>] {
        &self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T, I: IndexWidth> ArrayStorage<T> for DenseArray<T, I> {
    type Index = I;

    fn rank(&self) -> usize {
        self.dims.len()
    }

    fn dimension(&self, dim: usize) -> Option<Dimension<I>> {
        self.dims.get(dim).copied()
    }

    fn get(&self, indices: &[I]) -> Option<&T> {
        let pos = self.position(indices)?;
        self.data.get(pos)
    }

    fn get_mut(&mut self, indices: &[I]) -> Option<&mut T> {
        let pos = self.position(indices)?;
        self.data.get_mut(pos)
    }
}

/* ========================= Tests ========================= */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dim::{ArrayDimension, ArrayLongDimension};

    fn dims(shape: &[(i32, i32)]) -> Vec<ArrayDimension> {
        shape
            .iter()
            .map(|&(len, lb)| ArrayDimension::new(len, lb).unwrap())
            .collect()
    }

    #[test]
    fn dense_create_and_index() {
        let a = DenseArray::from_vec(&dims(&[(2, 0), (3, 0)]), (0..6).collect::<Vec<i32>>())
            .unwrap();

        assert_eq!(a.rank(), 2);
        assert_eq!(a.len(), 6);
        assert_eq!(a.get(&[0, 0]), Some(&0));
        assert_eq!(a.get(&[1, 2]), Some(&5));
        assert_eq!(a.get(&[2, 0]), None);
        assert_eq!(a.get(&[0]), None);
    }

    #[test]
    fn dense_honours_lower_bounds() {
        let mut a = DenseArray::new(&dims(&[(3, 1), (2, 5)]), 0u8).unwrap();
        *a.get_mut(&[3, 6]).unwrap() = 9;

        assert_eq!(a.as_slice(), &[0, 0, 0, 0, 0, 9]);
        assert_eq!(a.get(&[0, 5]), None);
        assert_eq!(a.dimension(1), Some(ArrayDimension::new(2, 5).unwrap()));
        assert_eq!(a.dimension(2), None);
    }

    #[test]
    fn long_domain_rejects_lower_bounds() {
        let shifted = [ArrayLongDimension::new(4, 1).unwrap()];
        assert!(matches!(
            DenseArray::new(&shifted, 0.0f32),
            Err(ArrayError::InvalidArgument { param: "dims", .. })
        ));

        let plain = [ArrayLongDimension::with_length(4).unwrap()];
        assert_eq!(DenseArray::new(&plain, 0.0f32).unwrap().len(), 4);
    }

    #[test]
    fn shape_mismatch_rejected() {
        assert!(DenseArray::from_vec(&dims(&[(2, 0)]), vec![1, 2, 3]).is_err());
        assert!(DenseArray::<i32, i32>::new(&[], 0).is_err());
    }

    #[test]
    fn empty_dimension_has_no_elements() {
        let mut a = DenseArray::new(&dims(&[(3, 0), (0, 0)]), 1u16).unwrap();
        assert!(a.is_empty());
        assert_eq!(a.get(&[0, 0]), None);
        assert_eq!(a.get_mut(&[0, 0]), None);
    }
}
