//! Bidirectional mapping between external identifiers and dense indices.
//!
//! Matrix and factorization code needs contiguous indices `0..k`, while the
//! outside world uses arbitrary sparse integers. `IdentifierCodec` assigns
//! indices in ascending identifier order, so the same input multiset always
//! yields the same mapping and index order agrees with identifier order.

use crate::error::{InteractionError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentifierCodec {
    /// Distinct identifiers, sorted ascending. Position == dense index.
    classes: Vec<i64>,
}

impl IdentifierCodec {
    /// Fit a codec on a sequence of identifiers (duplicates allowed).
    pub fn fit<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let mut classes: Vec<i64> = ids.into_iter().collect();
        classes.sort_unstable();
        classes.dedup();
        Self { classes }
    }

    /// Dense index for `id`, or `UnknownIdentifier` if it was not fitted.
    pub fn encode(&self, id: i64) -> Result<usize> {
        self.classes
            .binary_search(&id)
            .map_err(|_| InteractionError::UnknownIdentifier { id })
    }

    /// External identifier for `index`, or `IndexOutOfRange`.
    pub fn decode(&self, index: usize) -> Result<i64> {
        self.classes
            .get(index)
            .copied()
            .ok_or(InteractionError::IndexOutOfRange {
                index,
                len: self.classes.len(),
            })
    }

    /// Decode a batch of indices, failing on the first bad one.
    pub fn decode_many(&self, indices: &[usize]) -> Result<Vec<i64>> {
        indices.iter().map(|&index| self.decode(index)).collect()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.classes.binary_search(&id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Fitted identifiers in index order
    pub fn ids(&self) -> &[i64] {
        &self.classes
    }
}
