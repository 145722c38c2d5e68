//! Least-squares plane fitting for 3D point clouds.
//!
//! The normal is the least-variance direction of the point scatter. Rather
//! than searching for the smallest eigenvalue of the scatter matrix `S`
//! directly, `S` is inverted and the *dominant* eigenvector of `S⁻¹` is
//! taken with [`dominant_eigenvector`]; the two coincide.
//!
//! Degenerate clouds:
//! - fewer than [`MIN_POINTS`] points, coincident points or collinear points
//!   give `None` (no unique plane);
//! - exactly coplanar points make `det(S) == 0`; the normal is then read off
//!   the adjugate of `S`, whose rows are parallel to its null vector.

use nalgebra::{DMatrix, DVector, Point3, Vector3};

use crate::config::PowerIterationConfig;
use crate::dense::{DenseMatrix, DenseVector};
use crate::eigen::dominant_eigenvector;
use crate::numeric::{largest_abs_entry, EPSILON};
use crate::plane::Plane;

/// Minimum number of points for a plane fit.
pub const MIN_POINTS: usize = 3;

// ── Error type ───────────────────────────────────────────────────────────

/// Malformed input to the plane fit.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// Convergence limit is negative or not finite.
    InvalidConvergenceLimit(f64),
    /// A point has a NaN or infinite coordinate.
    NonFinitePoint {
        /// Index of the first offending point.
        index: usize,
    },
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConvergenceLimit(v) => write!(f, "invalid convergence limit: {}", v),
            Self::NonFinitePoint { index } => write!(f, "non-finite coordinate in point {}", index),
        }
    }
}

impl std::error::Error for FitError {}

// ── Building blocks ──────────────────────────────────────────────────────

/// Arithmetic mean of `points`; `None` when empty.
pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Symmetric 3×3 scatter matrix of the deviations from `center`.
pub fn scatter_matrix<M: DenseMatrix>(points: &[Point3<f64>], center: &Point3<f64>) -> M {
    let (mut sxx, mut sxy, mut sxz, mut syy, mut syz, mut szz) = (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    for p in points {
        let d = p - center;
        sxx += d.x * d.x;
        sxy += d.x * d.y;
        sxz += d.x * d.z;
        syy += d.y * d.y;
        syz += d.y * d.z;
        szz += d.z * d.z;
    }

    let mut s = M::zeros(3, 3);
    for (r, c, v) in [
        (0, 0, sxx),
        (0, 1, sxy),
        (0, 2, sxz),
        (1, 1, syy),
        (1, 2, syz),
        (2, 2, szz),
    ] {
        s.set_entry(r, c, v);
        s.set_entry(c, r, v);
    }
    s
}

/// Row of the adjugate of a 3×3 matrix with the largest norm.
///
/// For a rank-2 matrix every non-zero adjugate row spans the null space.
/// Returns `None` when all rows are negligible relative to the matrix scale
/// (rank ≤ 1).
fn dominant_adjugate_row<M: DenseMatrix>(m: &M) -> Option<Vector3<f64>> {
    let (_, _, scale) = largest_abs_entry(m)?;
    if scale == 0.0 {
        return None;
    }
    let a = |r: usize, c: usize| m.entry(r, c);
    let rows = [
        Vector3::new(
            a(1, 1) * a(2, 2) - a(1, 2) * a(2, 1),
            -(a(1, 0) * a(2, 2) - a(1, 2) * a(2, 0)),
            a(1, 0) * a(2, 1) - a(1, 1) * a(2, 0),
        ),
        Vector3::new(
            -(a(0, 1) * a(2, 2) - a(0, 2) * a(2, 1)),
            a(0, 0) * a(2, 2) - a(0, 2) * a(2, 0),
            -(a(0, 0) * a(2, 1) - a(0, 1) * a(2, 0)),
        ),
        Vector3::new(
            a(0, 1) * a(1, 2) - a(0, 2) * a(1, 1),
            -(a(0, 0) * a(1, 2) - a(0, 2) * a(1, 0)),
            a(0, 0) * a(1, 1) - a(0, 1) * a(1, 0),
        ),
    ];

    let best = rows
        .into_iter()
        .max_by(|x, y| x.norm_squared().total_cmp(&y.norm_squared()))?;
    if best.norm() <= EPSILON * scale * scale {
        return None;
    }
    Some(best)
}

fn check_points(points: &[Point3<f64>]) -> Result<(), FitError> {
    match points
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
    {
        Some(index) => Err(FitError::NonFinitePoint { index }),
        None => Ok(()),
    }
}

// ── Fitting ──────────────────────────────────────────────────────────────

/// Fit a least-squares plane using the capability-trait types `M` / `V`.
///
/// Returns `Ok(None)` for point sets that do not determine a unique plane.
/// The plane origin is the centroid; the normal sign is arbitrary.
pub fn fit_plane_with<M: DenseMatrix, V: DenseVector>(
    points: &[Point3<f64>],
    max_iterations: usize,
    convergence_limit: f64,
) -> Result<Option<Plane>, FitError> {
    if PowerIterationConfig::new(max_iterations, convergence_limit)
        .validate()
        .is_err()
    {
        return Err(FitError::InvalidConvergenceLimit(convergence_limit));
    }
    check_points(points)?;

    if points.len() < MIN_POINTS {
        tracing::debug!(n = points.len(), "too few points for a plane fit");
        return Ok(None);
    }
    let Some(center) = centroid(points) else {
        return Ok(None);
    };
    let s: M = scatter_matrix(points, &center);

    // Rank ≤ 1: coincident or collinear points, the normal is ambiguous.
    let Some(adjugate_row) = dominant_adjugate_row(&s) else {
        tracing::debug!(n = points.len(), "degenerate scatter, points coincide or are collinear");
        return Ok(None);
    };

    if s.det() == 0.0 {
        tracing::debug!("singular scatter of coplanar points, using adjugate null vector");
        return Ok(Plane::from_point_normal(center, adjugate_row));
    }

    let Some(s_inv) = s.invert() else {
        tracing::warn!("scatter inverse failed despite non-zero determinant");
        return Ok(None);
    };

    let estimate = match dominant_eigenvector::<M, V>(&s_inv, max_iterations, convergence_limit) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("normal estimation failed: {}", e);
            return Ok(None);
        }
    };
    tracing::debug!(
        iterations = estimate.iterations,
        converged = estimate.converged,
        "plane normal estimated"
    );

    let v = &estimate.vector;
    let normal = Vector3::new(v.entry(0), v.entry(1), v.entry(2));
    Ok(Plane::from_point_normal(center, normal))
}

/// Fit a least-squares plane to `points`.
///
/// `max_iterations` and `convergence_limit` bound the power iteration that
/// finds the normal. Fewer than three points, coincident points and
/// collinear points give `Ok(None)`.
pub fn fit_plane(
    points: &[Point3<f64>],
    max_iterations: usize,
    convergence_limit: f64,
) -> Result<Option<Plane>, FitError> {
    fit_plane_with::<DMatrix<f64>, DVector<f64>>(points, max_iterations, convergence_limit)
}

/// [`fit_plane`] with iteration parameters taken from a config.
pub fn fit_plane_with_config(
    points: &[Point3<f64>],
    config: &PowerIterationConfig,
) -> Result<Option<Plane>, FitError> {
    fit_plane(points, config.max_iterations, config.convergence_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{PlainVector, RowMajorMatrix};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::prelude::*;

    fn unit_square() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ]
    }

    /// Points near z = 0.3 x − 0.2 y + 1 with small vertical noise.
    fn noisy_tilted_plane(seed: u64, n: usize, noise: f64) -> Vec<Point3<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                let x: f64 = rng.gen_range(-5.0..5.0);
                let y: f64 = rng.gen_range(-5.0..5.0);
                let z = 0.3 * x - 0.2 * y + 1.0 + rng.gen_range(-noise..noise);
                Point3::new(x, y, z)
            })
            .collect()
    }

    fn tilted_normal() -> Vector3<f64> {
        Vector3::new(-0.3, 0.2, 1.0).normalize()
    }

    #[test]
    fn test_exact_plane_z0() {
        let plane = fit_plane(&unit_square(), 100, 1e-12).unwrap().expect("plane");
        assert_relative_eq!(plane.origin, Point3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(plane.normal.dot(&Vector3::z()).abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_noisy_tilted_plane() {
        let pts = noisy_tilted_plane(11, 200, 1e-3);
        let plane = fit_plane(&pts, 100, 1e-14).unwrap().expect("plane");
        assert_abs_diff_eq!(plane.normal.dot(&tilted_normal()).abs(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(plane.normal.norm(), 1.0, epsilon = 1e-12);
        assert!(plane.rms_distance(&pts).unwrap() < 1e-3);
        assert_relative_eq!(plane.origin, centroid(&pts).unwrap());
    }

    #[test]
    fn test_matches_smallest_symmetric_eigenvector() {
        let pts = noisy_tilted_plane(3, 50, 0.5);
        let plane = fit_plane(&pts, 200, 1e-15).unwrap().expect("plane");

        let c = centroid(&pts).unwrap();
        let s: DMatrix<f64> = scatter_matrix(&pts, &c);
        let eig = nalgebra::SymmetricEigen::new(s);
        let min_idx = eig.eigenvalues.imin();
        let reference = Vector3::new(
            eig.eigenvectors[(0, min_idx)],
            eig.eigenvectors[(1, min_idx)],
            eig.eigenvectors[(2, min_idx)],
        );
        assert_abs_diff_eq!(plane.normal.dot(&reference).abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_too_few_points() {
        assert_eq!(fit_plane(&[], 100, 1e-12).unwrap(), None);
        let two = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0)];
        assert_eq!(fit_plane(&two, 100, 1e-12).unwrap(), None);
    }

    #[test]
    fn test_collinear_points() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        ];
        assert_eq!(fit_plane(&pts, 100, 1e-12).unwrap(), None);

        // Inexact spacing: the determinant need not vanish exactly.
        let pts: Vec<_> = (0..5)
            .map(|i| {
                let t = 0.1 * i as f64;
                Point3::new(0.3 + t, 0.7 - 2.0 * t, 0.1 + 0.5 * t)
            })
            .collect();
        assert_eq!(fit_plane(&pts, 100, 1e-12).unwrap(), None);
    }

    #[test]
    fn test_coincident_points() {
        let pts = [Point3::new(1.0, 2.0, 3.0); 4];
        assert_eq!(fit_plane(&pts, 100, 1e-12).unwrap(), None);
    }

    #[test]
    fn test_idempotent() {
        let pts = noisy_tilted_plane(5, 40, 0.05);
        let a = fit_plane(&pts, 100, 1e-12).unwrap().unwrap();
        let b = fit_plane(&pts, 100, 1e-12).unwrap().unwrap();
        assert_abs_diff_eq!(a.normal.dot(&b.normal).abs(), 1.0, epsilon = 1e-12);
        assert_eq!(a.origin, b.origin);
    }

    #[test]
    fn test_storage_order_independent() {
        let pts = noisy_tilted_plane(9, 30, 0.01);
        let a = fit_plane(&pts, 100, 1e-14).unwrap().unwrap();
        let b = fit_plane_with::<RowMajorMatrix, PlainVector>(&pts, 100, 1e-14)
            .unwrap()
            .unwrap();
        assert_abs_diff_eq!(a.normal.dot(&b.normal).abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(
            fit_plane(&unit_square(), 100, -1.0).unwrap_err(),
            FitError::InvalidConvergenceLimit(-1.0)
        );
        let mut pts = unit_square();
        pts[2].y = f64::NAN;
        assert_eq!(
            fit_plane(&pts, 100, 1e-12).unwrap_err(),
            FitError::NonFinitePoint { index: 2 }
        );
    }

    #[test]
    fn test_scatter_matrix_symmetric() {
        let pts = noisy_tilted_plane(1, 10, 0.1);
        let c = centroid(&pts).unwrap();
        let s: RowMajorMatrix = scatter_matrix(&pts, &c);
        for r in 0..3 {
            for col in 0..3 {
                assert_eq!(s.entry(r, col), s.entry(col, r));
            }
        }
    }

    #[test]
    fn test_with_config() {
        let pts = noisy_tilted_plane(2, 25, 1e-4);
        let plane = fit_plane_with_config(&pts, &PowerIterationConfig::default())
            .unwrap()
            .unwrap();
        assert_abs_diff_eq!(plane.normal.dot(&tilted_normal()).abs(), 1.0, epsilon = 1e-4);
    }
}
