//! Capability traits over the dense matrix/vector collaborator.
//!
//! The solvers never name a concrete matrix type. They are generic over
//! [`DenseMatrix`] and [`DenseVector`], so the caller picks the backing
//! implementation through type parameters. Implementations for
//! `nalgebra::DMatrix<f64>` / `nalgebra::DVector<f64>` are provided.
//!
//! Only index-based access and the listed arithmetic are used by the core;
//! no storage order is assumed.

use nalgebra::{DMatrix, DVector};

/// Dense, mutable `rows × cols` grid of `f64` with fixed dimensions.
pub trait DenseMatrix: Clone {
    /// Zero-filled matrix of the given shape.
    fn zeros(rows: usize, cols: usize) -> Self;

    fn row_count(&self) -> usize;

    fn col_count(&self) -> usize;

    /// Entry at `(row, col)`. Indices are 0-based and must be in bounds.
    fn entry(&self, row: usize, col: usize) -> f64;

    fn set_entry(&mut self, row: usize, col: usize, value: f64);

    /// Matrix product `self · rhs`.
    fn matmul(&self, rhs: &Self) -> Self;

    /// Every entry multiplied by `factor`.
    fn scaled(&self, factor: f64) -> Self;

    /// Determinant. Square matrices only.
    fn det(&self) -> f64;

    /// Inverse, or `None` when the collaborator reports a singular matrix.
    fn invert(&self) -> Option<Self>;

    fn is_square(&self) -> bool {
        self.row_count() == self.col_count()
    }

    fn all_finite(&self) -> bool {
        (0..self.row_count())
            .all(|r| (0..self.col_count()).all(|c| self.entry(r, c).is_finite()))
    }
}

/// Fixed-dimension sequence of `f64`.
pub trait DenseVector: Clone {
    /// Zero-filled vector of the given dimension.
    fn zeros(dim: usize) -> Self;

    fn dimension(&self) -> usize;

    fn entry(&self, index: usize) -> f64;

    fn set_entry(&mut self, index: usize, value: f64);

    /// Euclidean norm.
    fn euclidean_norm(&self) -> f64 {
        (0..self.dimension())
            .map(|i| {
                let v = self.entry(i);
                v * v
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Divide every component by the Euclidean norm.
    ///
    /// No zero-norm protection: a zero vector turns into NaNs. Callers that
    /// can produce a zero vector must check the norm first.
    fn normalize_in_place(&mut self) {
        let n = self.euclidean_norm();
        for i in 0..self.dimension() {
            let v = self.entry(i);
            self.set_entry(i, v / n);
        }
    }

    fn all_finite(&self) -> bool {
        (0..self.dimension()).all(|i| self.entry(i).is_finite())
    }
}

// ── nalgebra ─────────────────────────────────────────────────────────────

impl DenseMatrix for DMatrix<f64> {
    fn zeros(rows: usize, cols: usize) -> Self {
        DMatrix::from_element(rows, cols, 0.0)
    }

    fn row_count(&self) -> usize {
        self.nrows()
    }

    fn col_count(&self) -> usize {
        self.ncols()
    }

    fn entry(&self, row: usize, col: usize) -> f64 {
        self[(row, col)]
    }

    fn set_entry(&mut self, row: usize, col: usize, value: f64) {
        self[(row, col)] = value;
    }

    fn matmul(&self, rhs: &Self) -> Self {
        self * rhs
    }

    fn scaled(&self, factor: f64) -> Self {
        self * factor
    }

    fn det(&self) -> f64 {
        self.determinant()
    }

    fn invert(&self) -> Option<Self> {
        self.clone().try_inverse()
    }
}

impl DenseVector for DVector<f64> {
    fn zeros(dim: usize) -> Self {
        DVector::from_element(dim, 0.0)
    }

    fn dimension(&self) -> usize {
        self.nrows()
    }

    fn entry(&self, index: usize) -> f64 {
        self[index]
    }

    fn set_entry(&mut self, index: usize, value: f64) {
        self[index] = value;
    }

    fn euclidean_norm(&self) -> f64 {
        self.norm()
    }
}
