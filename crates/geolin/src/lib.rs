//! geolin — small dense linear-algebra kernel for 3D geometry.
//!
//! Two numerical tools, both meant for the small dense systems typical of
//! geometry code (3×3, 4×4, modest least-squares problems):
//!
//! 1. **Linear solver** – Gaussian elimination with partial pivoting,
//!    tolerant of near-singular pivots, reporting unsolvable systems as
//!    `None` instead of returning garbage.
//! 2. **Plane fit** – least-squares plane through a point cloud. The normal
//!    is the dominant eigenvector of the inverted scatter matrix, found by
//!    amplified power iteration.
//!
//! # Matrix backend
//! The algorithms are generic over [`DenseMatrix`] / [`DenseVector`];
//! `nalgebra::DMatrix<f64>` and `nalgebra::DVector<f64>` implement them.
//! Convenience entry points such as [`fit_plane`] use the nalgebra types.
//!
//! # Example
//! ```
//! use geolin::{fit_plane, solve_vector};
//! use nalgebra::{DMatrix, DVector, Point3};
//!
//! let a = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]);
//! let b = DVector::from_vec(vec![2.0, 3.0]);
//! let x = solve_vector(&a, &b).unwrap().expect("solvable");
//! assert!((x[0] - 3.0).abs() < 1e-12);
//!
//! let points = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//! ];
//! let plane = fit_plane(&points, 100, 1e-12).unwrap().expect("plane");
//! assert!((plane.normal.z.abs() - 1.0).abs() < 1e-12);
//! ```

mod config;
mod dense;
mod eigen;
mod fit;
mod numeric;
mod plane;
mod solver;

#[cfg(test)]
mod test_utils;

pub use config::PowerIterationConfig;
pub use dense::{DenseMatrix, DenseVector};
pub use eigen::{
    dominant_eigenvector, dominant_eigenvector_with_config, rayleigh_quotient, EigenError,
    EigenEstimate, PowerIteration,
};
pub use fit::{
    centroid, fit_plane, fit_plane_with, fit_plane_with_config, scatter_matrix, FitError,
    MIN_POINTS,
};
pub use numeric::{largest_abs_entry, squared_distance, EPSILON};
pub use plane::Plane;
pub use solver::{residual_norm, solve, solve_into, solve_vector, solve_vector_into, SolveError};
