//! Error types for the interactions crate.

use thiserror::Error;

/// Errors raised while encoding identifiers or building the matrix.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InteractionError {
    /// An identifier that was not present when the codec was fitted
    #[error("Unknown identifier: {id}")]
    UnknownIdentifier { id: i64 },

    /// A dense index outside `[0, len)`
    #[error("Index {index} out of range for codec of size {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Negative or non-finite interaction weight
    #[error("Invalid weight {weight} for user {user_id}, item {item_id}")]
    InvalidWeight {
        user_id: i64,
        item_id: i64,
        weight: f32,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, InteractionError>;
