//! Core domain types for implicit-feedback interaction data.
//!
//! Everything upstream of the recommender speaks in terms of these types:
//! - Type aliases for external identifiers (UserId, ItemId)
//! - InteractionRecord, one (user, item, weight) row
//! - DatasetSummary, cheap counts used for startup logging

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================
// External identifiers are arbitrary integers owned by the upstream system.
// They are sparse and must never be used to index a matrix directly.

/// Externally visible user identifier
pub type UserId = i64;

/// Externally visible item identifier
pub type ItemId = i64;

// =============================================================================
// Interaction Records
// =============================================================================

/// A single implicit-feedback observation.
///
/// `weight` is a non-negative strength: an aggregated purchase count, or 1.0
/// for a binary like event. Records are immutable once read; several records
/// for the same (user, item) pair are summed when the matrix is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub weight: f32,
}

impl InteractionRecord {
    pub fn new(user_id: UserId, item_id: ItemId, weight: f32) -> Self {
        Self {
            user_id,
            item_id,
            weight,
        }
    }

    /// A binary like event (weight 1.0)
    pub fn like(user_id: UserId, item_id: ItemId) -> Self {
        Self::new(user_id, item_id, 1.0)
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Counts describing a loaded record stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub records: usize,
    pub distinct_users: usize,
    pub distinct_items: usize,
    /// Distinct (user, item) pairs after aggregation
    pub distinct_pairs: usize,
}
