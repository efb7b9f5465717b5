use num_traits::Zero;

use crate::info::ArrayInfo;

/// Walks every dimensional tuple of an array in row-major order, from the
/// minimum tuple to the maximum one.
pub struct DimIndicesIter<'a, A: ArrayInfo> {
    info: &'a A,
    zero_based: bool,
    current: Vec<A::Index>,
    done: bool,
}

impl<'a, A: ArrayInfo> DimIndicesIter<'a, A> {
    pub fn new(info: &'a A, zero_based: bool) -> Self {
        let mut current = vec![A::Index::zero(); info.rank()];
        // an empty array has no tuples to visit
        let done = info.length() == A::Index::zero()
            || info.get_min_dim_indices(zero_based, &mut current).is_err();
        Self {
            info,
            zero_based,
            current,
            done,
        }
    }
}

impl<A: ArrayInfo> Iterator for DimIndicesIter<'_, A> {
    type Item = Vec<A::Index>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current.clone();

        // stop once the odometer rolls over to the minimum again
        let rolled = self.info.inc_dim_indices(self.zero_based, &mut self.current);
        debug_assert!(rolled.is_ok(), "tuple left its array: {rolled:?}");
        if matches!(rolled, Ok(true)) {
            self.done = true;
        }

        Some(result)
    }
}

#[test]
fn test_iter_2d_zero_based() {
    let info = crate::regular::RegularArrayInfo::new(&[2, 3]).unwrap();

    let tuples: Vec<_> = DimIndicesIter::new(&info, true).collect();

    assert_eq!(tuples.len(), 6);
    assert_eq!(tuples[0], vec![0, 0]);
    assert_eq!(tuples[1], vec![0, 1]);
    assert_eq!(tuples[3], vec![1, 0]);
    assert_eq!(tuples[5], vec![1, 2]);
}

#[test]
fn test_iter_follows_flat_order() {
    // 3D with lower bounds: 2 x 2 x 3 starting at (4, 0, 7)
    let info = crate::regular::RegularArrayLongInfo::with_bounds(&[2, 2, 3], &[4, 0, 7]).unwrap();

    for (flat, tuple) in DimIndicesIter::new(&info, false).enumerate() {
        assert_eq!(info.calc_flat_index(false, &tuple).unwrap(), flat as i64);
    }
    assert_eq!(DimIndicesIter::new(&info, false).count(), 12);
    assert_eq!(DimIndicesIter::new(&info, false).last(), Some(vec![5, 1, 9]));
}

#[test]
fn test_iter_empty_array() {
    let info = crate::regular::RegularArrayInfo::new(&[4, 0, 2]).unwrap();

    assert_eq!(DimIndicesIter::new(&info, true).next(), None);
}

#[test]
fn test_iter_visits_each_tuple_once() {
    let info = crate::regular::RegularArrayInfo::with_bounds(&[3, 1, 2], &[-2, 5, 0]).unwrap();

    let tuples: Vec<_> = DimIndicesIter::new(&info, false).collect();

    assert_eq!(tuples.len(), info.length() as usize);
    assert_eq!(tuples.first(), Some(&vec![-2, 5, 0]));
    assert_eq!(tuples.last(), Some(&vec![0, 5, 1]));
    for pair in tuples.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}
