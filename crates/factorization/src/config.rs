//! Training hyperparameters for implicit-feedback ALS.

use crate::error::{FactorizationError, Result};
use serde::{Deserialize, Serialize};

/// Confidence scale: an observed weight `w` becomes confidence `1 + alpha * w`.
pub const DEFAULT_ALPHA: f32 = 1.0;
/// Embedding dimensionality
pub const DEFAULT_FACTORS: usize = 10;
/// Full user+item sweeps
pub const DEFAULT_ITERATIONS: usize = 15;
/// L2 penalty added to the diagonal of every per-entity system. Must be
/// strictly positive: with fewer observed items than factors the unpenalized
/// system is singular and has no Cholesky factorization.
pub const DEFAULT_REGULARIZATION: f32 = 0.01;
/// Seed for factor initialisation
pub const DEFAULT_SEED: u64 = 42;

/// Hyperparameters for one training run. Fixed once training starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlsConfig {
    pub factors: usize,
    pub iterations: usize,
    pub regularization: f32,
    pub alpha: f32,
    pub seed: u64,
}

impl AlsConfig {
    pub fn new() -> Self {
        Self {
            factors: DEFAULT_FACTORS,
            iterations: DEFAULT_ITERATIONS,
            regularization: DEFAULT_REGULARIZATION,
            alpha: DEFAULT_ALPHA,
            seed: DEFAULT_SEED,
        }
    }

    /// Configure the embedding dimensionality (default: 10)
    pub fn with_factors(mut self, factors: usize) -> Self {
        self.factors = factors;
        self
    }

    /// Configure the number of ALS rounds (default: 15)
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Configure the regularization strength, must be > 0 (default: 0.01)
    pub fn with_regularization(mut self, regularization: f32) -> Self {
        self.regularization = regularization;
        self
    }

    /// Configure the confidence scale (default: 1.0)
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Configure the initialisation seed (default: 42)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.factors == 0 {
            return Err(FactorizationError::InvalidConfig(
                "factors must be at least 1".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(FactorizationError::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        if !self.regularization.is_finite() || self.regularization <= 0.0 {
            return Err(FactorizationError::InvalidConfig(format!(
                "regularization must be a positive number, got {}",
                self.regularization
            )));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(FactorizationError::InvalidConfig(format!(
                "alpha must be a non-negative number, got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

impl Default for AlsConfig {
    fn default() -> Self {
        Self::new()
    }
}
