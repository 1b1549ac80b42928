//! Error types for the factorization crate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactorizationError {
    /// Hyperparameters that cannot produce a model
    #[error("Invalid ALS configuration: {0}")]
    InvalidConfig(String),

    /// A user index outside the trained range
    #[error("User index {index} out of range for model with {num_users} users")]
    InvalidUserIndex { index: usize, num_users: usize },

    /// A per-entity least-squares system was not positive definite
    #[error("Least-squares solve failed for {side} {index}")]
    Solver { side: &'static str, index: usize },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, FactorizationError>;
