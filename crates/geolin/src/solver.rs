//! Gaussian elimination with partial pivoting for `A · x = b`.
//!
//! Near-zero pivots (|p| ≤ [`EPSILON`](crate::EPSILON)) do not abort the
//! solve: the column is skipped and its unknown becomes a free variable (set
//! to 0), while the pivot search for the next column starts from the same row. Every row left
//! without a pivot must then be satisfied by the solution within
//! [`EPSILON`](crate::EPSILON); otherwise the system has no solution.
//!
//! "No solution" is an ordinary outcome (`Ok(None)` / `Ok(false)`); only
//! malformed input is an error.

use crate::dense::{DenseMatrix, DenseVector};
use crate::numeric::{is_negligible, mat_vec};

// ── Error type ───────────────────────────────────────────────────────────

/// Malformed input to the linear solver.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The coefficient matrix has no rows or no columns.
    EmptySystem,
    /// Fewer equations than unknowns.
    Underdetermined {
        /// Rows of the coefficient matrix.
        rows: usize,
        /// Columns of the coefficient matrix.
        cols: usize,
    },
    /// Right-hand side row count differs from the coefficient matrix.
    RhsRowMismatch {
        /// Rows of the coefficient matrix.
        expected: usize,
        /// Rows (or dimension) of the right-hand side.
        got: usize,
    },
    /// Preallocated solution container has the wrong shape.
    SolutionShapeMismatch {
        /// Required `(rows, cols)`.
        expected: (usize, usize),
        /// Provided `(rows, cols)`.
        got: (usize, usize),
    },
    /// NaN or infinite value in the coefficients or the right-hand side.
    NonFiniteInput,
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySystem => write!(f, "empty linear system"),
            Self::Underdetermined { rows, cols } => {
                write!(f, "under-determined system: {} equations, {} unknowns", rows, cols)
            }
            Self::RhsRowMismatch { expected, got } => {
                write!(f, "right-hand side has {} rows, expected {}", got, expected)
            }
            Self::SolutionShapeMismatch { expected, got } => write!(
                f,
                "solution container is {}x{}, expected {}x{}",
                got.0, got.1, expected.0, expected.1
            ),
            Self::NonFiniteInput => write!(f, "non-finite value in linear system"),
        }
    }
}

impl std::error::Error for SolveError {}

// ── Augmented system ─────────────────────────────────────────────────────

/// `[A | B]` in row-major scratch storage, owned by a single solve call.
struct AugmentedSystem {
    rows: usize,
    cols: usize,
    rhs_cols: usize,
    data: Vec<f64>,
}

impl AugmentedSystem {
    fn new<M: DenseMatrix>(a: &M, rhs_cols: usize, rhs: impl Fn(usize, usize) -> f64) -> Self {
        let rows = a.row_count();
        let cols = a.col_count();
        let mut data = Vec::with_capacity(rows * (cols + rhs_cols));
        for r in 0..rows {
            data.extend((0..cols).map(|c| a.entry(r, c)));
            data.extend((0..rhs_cols).map(|k| rhs(r, k)));
        }
        Self {
            rows,
            cols,
            rhs_cols,
            data,
        }
    }

    #[inline]
    fn width(&self) -> usize {
        self.cols + self.rhs_cols
    }

    #[inline]
    fn at(&self, r: usize, c: usize) -> f64 {
        self.data[r * self.width() + c]
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let w = self.width();
        let (lo, hi) = (a.min(b), a.max(b));
        let (head, tail) = self.data.split_at_mut(hi * w);
        head[lo * w..(lo + 1) * w].swap_with_slice(&mut tail[..w]);
    }

    /// Row in `start..rows` with the largest |value| in column `col`.
    /// Only a strictly larger magnitude replaces the current choice.
    fn pivot_row(&self, col: usize, start: usize) -> usize {
        let mut best_row = start;
        let mut best = self.at(start, col).abs();
        for r in start + 1..self.rows {
            let v = self.at(r, col).abs();
            if v > best {
                best = v;
                best_row = r;
            }
        }
        best_row
    }

    /// Reduce to row-echelon form.
    ///
    /// Returns the pivot column of each pivot row; pivot row `i` is row `i`.
    /// A column whose best candidate is negligible gets no pivot row, and the
    /// next column is searched from the same row.
    fn forward_eliminate(&mut self) -> Vec<usize> {
        let w = self.width();
        let mut pivot_cols = Vec::with_capacity(self.cols);
        for p in 0..self.cols {
            let row = pivot_cols.len();
            if row == self.rows {
                break;
            }
            let pr = self.pivot_row(p, row);
            if pr != row {
                tracing::trace!(pivot_col = p, from_row = pr, to_row = row, "pivot row swap");
                self.swap_rows(row, pr);
            }

            let pivot = self.at(row, p);
            if is_negligible(pivot) {
                tracing::debug!(pivot_col = p, pivot, "near-zero pivot, column skipped");
                continue;
            }

            for r in row + 1..self.rows {
                let factor = self.at(r, p) / pivot;
                if factor == 0.0 {
                    continue;
                }
                for c in p..w {
                    let v = self.at(row, c);
                    self.data[r * w + c] -= factor * v;
                }
                self.data[r * w + p] = 0.0;
            }
            pivot_cols.push(p);
        }
        pivot_cols
    }

    /// Solve for right-hand side column `k` after elimination.
    ///
    /// Unknowns without a pivot are free and set to 0.
    fn back_substitute(&self, pivot_cols: &[usize], k: usize) -> Vec<f64> {
        let rhs = self.cols + k;
        let mut x = vec![0.0; self.cols];
        for (i, &p) in pivot_cols.iter().enumerate().rev() {
            let sum: f64 = (p + 1..self.cols).map(|j| self.at(i, j) * x[j]).sum();
            x[p] = (self.at(i, rhs) - sum) / self.at(i, p);
        }
        x
    }

    /// Rows without a pivot must hold for `x`.
    fn redundant_rows_hold(&self, first_free_row: usize, x: &[f64], k: usize) -> bool {
        let rhs = self.cols + k;
        (first_free_row..self.rows).all(|i| {
            let lhs: f64 = (0..self.cols).map(|j| self.at(i, j) * x[j]).sum();
            let mismatch = lhs - self.at(i, rhs);
            let ok = is_negligible(mismatch);
            if !ok {
                tracing::debug!(row = i, mismatch, "unpivoted row violated, no solution");
            }
            ok
        })
    }

    /// Full solve: one solution column per right-hand side column.
    fn solve(mut self) -> Option<Vec<Vec<f64>>> {
        let pivot_cols = self.forward_eliminate();
        (0..self.rhs_cols)
            .map(|k| {
                let x = self.back_substitute(&pivot_cols, k);
                self.redundant_rows_hold(pivot_cols.len(), &x, k).then_some(x)
            })
            .collect()
    }
}

// ── Validation ───────────────────────────────────────────────────────────

fn validate_system<M: DenseMatrix>(a: &M, rhs_rows: usize) -> Result<(), SolveError> {
    let (rows, cols) = (a.row_count(), a.col_count());
    if rows == 0 || cols == 0 {
        return Err(SolveError::EmptySystem);
    }
    if rows < cols {
        return Err(SolveError::Underdetermined { rows, cols });
    }
    if rhs_rows != rows {
        return Err(SolveError::RhsRowMismatch {
            expected: rows,
            got: rhs_rows,
        });
    }
    if !a.all_finite() {
        return Err(SolveError::NonFiniteInput);
    }
    Ok(())
}

fn solve_matrix_columns<M: DenseMatrix>(a: &M, b: &M) -> Result<Option<Vec<Vec<f64>>>, SolveError> {
    validate_system(a, b.row_count())?;
    if !b.all_finite() {
        return Err(SolveError::NonFiniteInput);
    }
    let system = AugmentedSystem::new(a, b.col_count(), |r, k| b.entry(r, k));
    Ok(system.solve())
}

fn solve_vector_column<M: DenseMatrix, V: DenseVector>(
    a: &M,
    b: &V,
) -> Result<Option<Vec<f64>>, SolveError> {
    validate_system(a, b.dimension())?;
    if !b.all_finite() {
        return Err(SolveError::NonFiniteInput);
    }
    let system = AugmentedSystem::new(a, 1, |r, _| b.entry(r));
    Ok(system.solve().and_then(|mut cols| cols.pop()))
}

// ── Public entry points ──────────────────────────────────────────────────

/// Solve `A · X = B` for a matrix right-hand side.
///
/// `A` is `rows × cols` with `rows ≥ cols`, `B` is `rows × k`; each column of
/// `B` is solved independently and the result is `cols × k`. Returns
/// `Ok(None)` when any column has no solution.
pub fn solve<M: DenseMatrix>(a: &M, b: &M) -> Result<Option<M>, SolveError> {
    let Some(columns) = solve_matrix_columns(a, b)? else {
        return Ok(None);
    };
    let mut x = M::zeros(a.col_count(), b.col_count());
    write_columns(&mut x, &columns);
    Ok(Some(x))
}

/// Solve `A · X = B` into a caller-provided `cols × k` matrix.
///
/// Returns `Ok(false)` when the system has no solution; `x` is then left
/// unchanged.
pub fn solve_into<M: DenseMatrix>(a: &M, b: &M, x: &mut M) -> Result<bool, SolveError> {
    let expected = (a.col_count(), b.col_count());
    let got = (x.row_count(), x.col_count());
    if expected != got {
        return Err(SolveError::SolutionShapeMismatch { expected, got });
    }
    let Some(columns) = solve_matrix_columns(a, b)? else {
        return Ok(false);
    };
    write_columns(x, &columns);
    Ok(true)
}

/// Solve `A · x = b` for a vector right-hand side.
pub fn solve_vector<M: DenseMatrix, V: DenseVector>(a: &M, b: &V) -> Result<Option<V>, SolveError> {
    Ok(solve_vector_column(a, b)?.map(|values| {
        let mut x = V::zeros(values.len());
        for (i, v) in values.into_iter().enumerate() {
            x.set_entry(i, v);
        }
        x
    }))
}

/// Solve `A · x = b` into a caller-provided vector of dimension `cols`.
///
/// Returns `Ok(false)` when the system has no solution; `x` is then left
/// unchanged.
pub fn solve_vector_into<M: DenseMatrix, V: DenseVector>(
    a: &M,
    b: &V,
    x: &mut V,
) -> Result<bool, SolveError> {
    if x.dimension() != a.col_count() {
        return Err(SolveError::SolutionShapeMismatch {
            expected: (a.col_count(), 1),
            got: (x.dimension(), 1),
        });
    }
    let Some(values) = solve_vector_column(a, b)? else {
        return Ok(false);
    };
    for (i, v) in values.into_iter().enumerate() {
        x.set_entry(i, v);
    }
    Ok(true)
}

/// Euclidean norm of the residual `A · x − b`.
pub fn residual_norm<M: DenseMatrix, V: DenseVector>(a: &M, x: &V, b: &V) -> f64 {
    let ax: V = mat_vec(a, x);
    (0..b.dimension())
        .map(|i| {
            let d = ax.entry(i) - b.entry(i);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

fn write_columns<M: DenseMatrix>(x: &mut M, columns: &[Vec<f64>]) {
    for (k, column) in columns.iter().enumerate() {
        for (i, &v) in column.iter().enumerate() {
            x.set_entry(i, k, v);
        }
    }
}
