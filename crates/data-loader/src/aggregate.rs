//! Aggregation helpers over raw record streams.
//!
//! Upstream exports are usually pre-aggregated per (user, item), but nothing
//! guarantees it. These helpers sum duplicates and compute summary counts.

use crate::types::*;
use std::collections::{BTreeMap, HashSet};

/// Sum the weights of records that share a (user, item) pair.
///
/// Output is ordered by (user_id, item_id) so it is deterministic regardless
/// of input order.
pub fn aggregate(records: &[InteractionRecord]) -> Vec<InteractionRecord> {
    let mut totals: BTreeMap<(UserId, ItemId), f32> = BTreeMap::new();
    for record in records {
        *totals.entry((record.user_id, record.item_id)).or_insert(0.0) += record.weight;
    }

    totals
        .into_iter()
        .map(|((user_id, item_id), weight)| InteractionRecord::new(user_id, item_id, weight))
        .collect()
}

/// Count records, distinct users, distinct items and distinct pairs.
pub fn summarize(records: &[InteractionRecord]) -> DatasetSummary {
    let mut users = HashSet::new();
    let mut items = HashSet::new();

    for record in records {
        users.insert(record.user_id);
        items.insert(record.item_id);
    }

    DatasetSummary {
        records: records.len(),
        distinct_users: users.len(),
        distinct_items: items.len(),
        distinct_pairs: aggregate(records).len(),
    }
}
