//! # Factorization Crate
//!
//! Implicit-feedback matrix factorization via alternating least squares.
//!
//! ## Components
//!
//! - **config**: `AlsConfig` hyperparameters and their defaults
//! - **als**: `train`, the parallel ALS solver
//! - **model**: `FactorizationModel`, scoring and top-N recommendation
//! - **error**: `FactorizationError`
//!
//! ## Example Usage
//!
//! ```ignore
//! use factorization::{train, AlsConfig};
//! use std::collections::HashSet;
//!
//! let model = train(&matrix, &AlsConfig::new().with_factors(10).with_iterations(15))?;
//! let seen: HashSet<usize> = matrix.row(user_idx).unwrap().indices.iter().copied().collect();
//! let top = model.recommend(user_idx, &seen, 3)?;
//! ```

pub mod als;
pub mod config;
pub mod error;
pub mod model;

// Re-export main types
pub use als::train;
pub use config::{AlsConfig, DEFAULT_ALPHA};
pub use error::{FactorizationError, Result};
pub use model::FactorizationModel;
