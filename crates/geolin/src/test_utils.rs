//! Shared test utilities.
//!
//! [`RowMajorMatrix`] / [`PlainVector`] are deliberately minimal trait
//! implementations with their own storage layout and a cofactor-based
//! determinant/inverse, so tests can check that the solvers only go through
//! the capability traits.

use crate::dense::{DenseMatrix, DenseVector};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RowMajorMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl RowMajorMatrix {
    pub(crate) fn from_rows(rows: &[&[f64]]) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for r in rows {
            assert_eq!(r.len(), cols, "ragged rows");
            data.extend_from_slice(r);
        }
        Self {
            rows: rows.len(),
            cols,
            data,
        }
    }

    fn minor(&self, skip_row: usize, skip_col: usize) -> Self {
        let mut data = Vec::with_capacity((self.rows - 1) * (self.cols - 1));
        for r in (0..self.rows).filter(|&r| r != skip_row) {
            for c in (0..self.cols).filter(|&c| c != skip_col) {
                data.push(self.entry(r, c));
            }
        }
        Self {
            rows: self.rows - 1,
            cols: self.cols - 1,
            data,
        }
    }
}

impl DenseMatrix for RowMajorMatrix {
    fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    fn row_count(&self) -> usize {
        self.rows
    }

    fn col_count(&self) -> usize {
        self.cols
    }

    fn entry(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.data[row * self.cols + col]
    }

    fn set_entry(&mut self, row: usize, col: usize, value: f64) {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.data[row * self.cols + col] = value;
    }

    fn matmul(&self, rhs: &Self) -> Self {
        assert_eq!(self.cols, rhs.rows);
        let mut out = Self::zeros(self.rows, rhs.cols);
        for r in 0..self.rows {
            for c in 0..rhs.cols {
                let v = (0..self.cols).map(|k| self.entry(r, k) * rhs.entry(k, c)).sum();
                out.set_entry(r, c, v);
            }
        }
        out
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| v * factor).collect(),
        }
    }

    fn det(&self) -> f64 {
        assert!(self.is_square());
        match self.rows {
            0 => 1.0,
            1 => self.data[0],
            n => (0..n)
                .map(|c| {
                    let sign = if c % 2 == 0 { 1.0 } else { -1.0 };
                    sign * self.entry(0, c) * self.minor(0, c).det()
                })
                .sum(),
        }
    }

    fn invert(&self) -> Option<Self> {
        let det = self.det();
        if det == 0.0 {
            return None;
        }
        let n = self.rows;
        if n == 1 {
            return Some(Self::from_rows(&[&[1.0 / det]]));
        }
        let mut out = Self::zeros(n, n);
        for r in 0..n {
            for c in 0..n {
                let sign = if (r + c) % 2 == 0 { 1.0 } else { -1.0 };
                // Adjugate is the transposed cofactor matrix.
                out.set_entry(c, r, sign * self.minor(r, c).det() / det);
            }
        }
        Some(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlainVector(pub(crate) Vec<f64>);

impl DenseVector for PlainVector {
    fn zeros(dim: usize) -> Self {
        Self(vec![0.0; dim])
    }

    fn dimension(&self) -> usize {
        self.0.len()
    }

    fn entry(&self, index: usize) -> f64 {
        self.0[index]
    }

    fn set_entry(&mut self, index: usize, value: f64) {
        self.0[index] = value;
    }
}
