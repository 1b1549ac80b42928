//! # Interactions Crate
//!
//! Turns a stream of `InteractionRecord`s into the dense-indexed sparse
//! matrix that the factorization engine trains on.
//!
//! ## Components
//!
//! - **codec**: `IdentifierCodec`, external id <-> dense index
//! - **matrix**: `InteractionMatrix` (CSR) and `InteractionMatrixBuilder`
//! - **error**: `InteractionError`
//!
//! ## Example Usage
//!
//! ```ignore
//! use interactions::InteractionData;
//!
//! let data = InteractionData::fit(&records)?;
//! let user_idx = data.users.encode(42)?;
//! let history = data.matrix.row(user_idx);
//! ```

pub mod codec;
pub mod error;
pub mod matrix;

// Re-export main types
pub use codec::IdentifierCodec;
pub use error::{InteractionError, Result};
pub use matrix::{InteractionData, InteractionMatrix, InteractionMatrixBuilder, RowView};
