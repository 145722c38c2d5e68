//! Iteration parameters for the power-iteration stage.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::eigen::EigenError;

/// Stopping rule for power iteration.
///
/// Missing JSON fields fall back to [`PowerIterationConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerIterationConfig {
    /// Upper bound on power-iteration steps. `0` returns the start vector.
    pub max_iterations: usize,
    /// Iteration stops once the squared distance between successive unit
    /// iterates drops below this value.
    pub convergence_limit: f64,
}

impl Default for PowerIterationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            convergence_limit: 1e-12,
        }
    }
}

impl PowerIterationConfig {
    pub fn new(max_iterations: usize, convergence_limit: f64) -> Self {
        Self {
            max_iterations,
            convergence_limit,
        }
    }

    /// Reject a negative or non-finite convergence limit.
    pub fn validate(&self) -> Result<(), EigenError> {
        if !self.convergence_limit.is_finite() || self.convergence_limit < 0.0 {
            return Err(EigenError::InvalidConvergenceLimit(self.convergence_limit));
        }
        Ok(())
    }

    /// Load from a JSON file and validate.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }
}
