//! Small numeric helpers shared by the solver, the eigenvector search and
//! the plane fit.

use crate::dense::{DenseMatrix, DenseVector};

/// Absolute tolerance for "numerically zero" pivots and residuals.
pub const EPSILON: f64 = 1e-10;

#[inline]
pub(crate) fn is_negligible(value: f64) -> bool {
    value.abs() <= EPSILON
}

/// Entry with the largest absolute value as `(row, col, |value|)`.
///
/// Scans row by row; on ties the first entry found wins. Returns `None` for
/// an empty matrix.
pub fn largest_abs_entry<M: DenseMatrix>(m: &M) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for r in 0..m.row_count() {
        for c in 0..m.col_count() {
            let v = m.entry(r, c).abs();
            match best {
                Some((_, _, b)) if v <= b => {}
                _ => best = Some((r, c, v)),
            }
        }
    }
    best
}

/// Squared Euclidean distance between two vectors of equal dimension.
pub fn squared_distance<V: DenseVector>(a: &V, b: &V) -> f64 {
    debug_assert_eq!(a.dimension(), b.dimension());
    (0..a.dimension())
        .map(|i| {
            let d = a.entry(i) - b.entry(i);
            d * d
        })
        .sum()
}

/// Matrix–vector product `m · v`.
pub(crate) fn mat_vec<M: DenseMatrix, V: DenseVector>(m: &M, v: &V) -> V {
    debug_assert_eq!(m.col_count(), v.dimension());
    let mut out = V::zeros(m.row_count());
    for r in 0..m.row_count() {
        let s = (0..m.col_count()).map(|c| m.entry(r, c) * v.entry(c)).sum();
        out.set_entry(r, s);
    }
    out
}

/// Normalize `v` in place unless its norm is zero or not finite.
///
/// Returns `false` (leaving `v` untouched) when the vector cannot be
/// normalized.
pub(crate) fn try_normalize<V: DenseVector>(v: &mut V) -> bool {
    let n = v.euclidean_norm();
    if !n.is_finite() || n == 0.0 {
        return false;
    }
    v.normalize_in_place();
    true
}

#[inline]
pub(crate) fn dot<V: DenseVector>(a: &V, b: &V) -> f64 {
    (0..a.dimension()).map(|i| a.entry(i) * b.entry(i)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{PlainVector, RowMajorMatrix};
    use approx::assert_relative_eq;

    #[test]
    fn test_largest_abs_entry_prefers_magnitude() {
        let m = RowMajorMatrix::from_rows(&[&[1.0, -7.0], &[3.0, 6.5]]);
        assert_eq!(largest_abs_entry(&m), Some((0, 1, 7.0)));
    }

    #[test]
    fn test_largest_abs_entry_tie_keeps_first() {
        let m = RowMajorMatrix::from_rows(&[&[2.0, -2.0], &[2.0, 1.0]]);
        assert_eq!(largest_abs_entry(&m), Some((0, 0, 2.0)));
    }

    #[test]
    fn test_largest_abs_entry_empty() {
        let m = RowMajorMatrix::zeros(0, 0);
        assert_eq!(largest_abs_entry(&m), None);
    }

    #[test]
    fn test_squared_distance() {
        let a = PlainVector(vec![1.0, 2.0, 3.0]);
        let b = PlainVector(vec![2.0, 0.0, 3.0]);
        assert_relative_eq!(squared_distance(&a, &b), 5.0);
        assert_eq!(squared_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_mat_vec() {
        let m = RowMajorMatrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0], &[0.0, -1.0]]);
        let v = PlainVector(vec![1.0, 1.0]);
        let out: PlainVector = mat_vec(&m, &v);
        assert_eq!(out.0, vec![3.0, 7.0, -1.0]);
    }

    #[test]
    fn test_try_normalize_zero_vector() {
        let mut v = PlainVector(vec![0.0, 0.0]);
        assert!(!try_normalize(&mut v));
        assert_eq!(v.0, vec![0.0, 0.0]);

        let mut w = PlainVector(vec![0.0, 2.0]);
        assert!(try_normalize(&mut w));
        assert_eq!(w.0, vec![0.0, 1.0]);
    }
}
