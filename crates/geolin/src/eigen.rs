//! Dominant eigenvector by amplified power iteration.
//!
//! The input is scaled by its largest absolute entry and raised to the 8th
//! power with three squarings before iterating. The even power makes every
//! eigenvalue non-negative, so iterates do not flip sign, and it widens the
//! gap between the dominant eigenvalue and the rest.
//!
//! Intended for small symmetric matrices (3×3 scatter inverses in
//! [`crate::fit`]); symmetry is assumed, not checked.

use crate::config::PowerIterationConfig;
use crate::dense::{DenseMatrix, DenseVector};
use crate::numeric::{dot, largest_abs_entry, mat_vec, squared_distance, try_normalize};

// ── Error type ───────────────────────────────────────────────────────────

/// Failures of the dominant-eigenvector search.
#[derive(Debug, Clone, PartialEq)]
pub enum EigenError {
    /// Input matrix is not square.
    NotSquare {
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
    },
    /// Input matrix has no entries.
    EmptyMatrix,
    /// Convergence limit is negative or not finite.
    InvalidConvergenceLimit(f64),
    /// Input matrix contains NaN or infinite entries.
    NonFiniteInput,
    /// All entries are zero; there is no dominant direction.
    ZeroMatrix,
    /// An iterate collapsed to the zero vector and cannot be normalized.
    VanishingIterate {
        /// Step at which the collapse happened (1-based).
        iteration: usize,
    },
}

impl std::fmt::Display for EigenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSquare { rows, cols } => {
                write!(f, "matrix must be square, got {}x{}", rows, cols)
            }
            Self::EmptyMatrix => write!(f, "empty matrix"),
            Self::InvalidConvergenceLimit(v) => write!(f, "invalid convergence limit: {}", v),
            Self::NonFiniteInput => write!(f, "non-finite matrix entry"),
            Self::ZeroMatrix => write!(f, "zero matrix has no dominant eigenvector"),
            Self::VanishingIterate { iteration } => {
                write!(f, "iterate vanished at step {}", iteration)
            }
        }
    }
}

impl std::error::Error for EigenError {}

// ── Result ───────────────────────────────────────────────────────────────

/// Best estimate of the dominant eigenvector.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenEstimate<V> {
    /// Unit-length eigenvector estimate.
    pub vector: V,
    /// Number of power-iteration steps performed.
    pub iterations: usize,
    /// `true` when the step distance fell below the convergence limit;
    /// `false` when the iteration budget ran out first.
    pub converged: bool,
    /// Squared distance between the last two iterates (`INFINITY` when no
    /// step was taken).
    pub last_step: f64,
}

// ── Power iteration ──────────────────────────────────────────────────────

/// Stepwise power iteration over the amplified matrix.
///
/// [`dominant_eigenvector`] drives this to completion; it is public so
/// callers can observe every step. As an [`Iterator`] it yields the squared
/// distance of each step and ends after the first error.
#[derive(Debug, Clone)]
pub struct PowerIteration<M, V> {
    amplified: M,
    current: V,
    steps: usize,
    vanished: bool,
}

impl<M: DenseMatrix, V: DenseVector> PowerIteration<M, V> {
    /// Validate `m`, scale it by its largest absolute entry, raise it to the
    /// 8th power and start from the normalized all-ones vector.
    pub fn new(m: &M) -> Result<Self, EigenError> {
        let (rows, cols) = (m.row_count(), m.col_count());
        if rows != cols {
            return Err(EigenError::NotSquare { rows, cols });
        }
        if rows == 0 {
            return Err(EigenError::EmptyMatrix);
        }
        if !m.all_finite() {
            return Err(EigenError::NonFiniteInput);
        }
        let (_, _, largest) = largest_abs_entry(m).ok_or(EigenError::EmptyMatrix)?;
        if largest == 0.0 {
            return Err(EigenError::ZeroMatrix);
        }

        let scaled = m.scaled(1.0 / largest);
        let m2 = scaled.matmul(&scaled);
        let m4 = m2.matmul(&m2);
        let amplified = m4.matmul(&m4);

        let mut current = V::zeros(rows);
        for i in 0..rows {
            current.set_entry(i, 1.0);
        }
        current.normalize_in_place();

        Ok(Self {
            amplified,
            current,
            steps: 0,
            vanished: false,
        })
    }

    /// Apply the amplified matrix once and renormalize.
    ///
    /// Returns the squared distance between the previous and the new iterate.
    pub fn step(&mut self) -> Result<f64, EigenError> {
        let mut next: V = mat_vec(&self.amplified, &self.current);
        self.steps += 1;
        if !try_normalize(&mut next) {
            self.vanished = true;
            return Err(EigenError::VanishingIterate {
                iteration: self.steps,
            });
        }
        let dist = squared_distance(&next, &self.current);
        self.current = next;
        Ok(dist)
    }

    /// Current unit iterate.
    pub fn current(&self) -> &V {
        &self.current
    }

    /// Steps taken so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn into_vector(self) -> V {
        self.current
    }
}

impl<M: DenseMatrix, V: DenseVector> Iterator for PowerIteration<M, V> {
    type Item = Result<f64, EigenError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.vanished {
            return None;
        }
        Some(self.step())
    }
}

/// Approximate the eigenvector of `m` belonging to its largest-magnitude
/// eigenvalue.
///
/// Iterates until the squared step distance drops below `convergence_limit`
/// or `max_iterations` steps have run. Running out of iterations is not an
/// error: the last iterate is returned with `converged == false`.
pub fn dominant_eigenvector<M: DenseMatrix, V: DenseVector>(
    m: &M,
    max_iterations: usize,
    convergence_limit: f64,
) -> Result<EigenEstimate<V>, EigenError> {
    PowerIterationConfig::new(max_iterations, convergence_limit).validate()?;

    let mut iteration = PowerIteration::<M, V>::new(m)?;
    let mut last_step = f64::INFINITY;
    let mut converged = false;

    while iteration.steps() < max_iterations {
        last_step = iteration.step()?;
        tracing::trace!(step = iteration.steps(), dist_sq = last_step, "power iteration");
        if last_step < convergence_limit {
            converged = true;
            break;
        }
    }

    let iterations = iteration.steps();
    if !converged {
        tracing::debug!(
            iterations,
            last_step,
            convergence_limit,
            "power iteration exhausted without converging"
        );
    }

    Ok(EigenEstimate {
        vector: iteration.into_vector(),
        iterations,
        converged,
        last_step,
    })
}

/// [`dominant_eigenvector`] with parameters taken from a config.
pub fn dominant_eigenvector_with_config<M: DenseMatrix, V: DenseVector>(
    m: &M,
    config: &PowerIterationConfig,
) -> Result<EigenEstimate<V>, EigenError> {
    dominant_eigenvector(m, config.max_iterations, config.convergence_limit)
}

/// Rayleigh quotient `vᵀ M v / vᵀ v`: the eigenvalue estimate for `v`.
///
/// NaN for a zero vector.
pub fn rayleigh_quotient<M: DenseMatrix, V: DenseVector>(m: &M, v: &V) -> f64 {
    let mv: V = mat_vec(m, v);
    dot(v, &mv) / dot(v, v)
}
