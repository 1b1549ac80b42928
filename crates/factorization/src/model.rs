//! Trained latent-factor model and top-N scoring.
//!
//! `score(u, i) = dot(user_factors[u], item_factors[i])`. The model is
//! read-only once trained, so any number of threads may call `recommend`
//! concurrently; every intermediate buffer is local to the call.

use crate::error::{FactorizationError, Result};
use nalgebra::DMatrix;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::instrument;

#[derive(Debug, Clone, PartialEq)]
pub struct FactorizationModel {
    /// num_users × factors
    user_factors: DMatrix<f32>,
    /// num_items × factors
    item_factors: DMatrix<f32>,
}

impl FactorizationModel {
    pub(crate) fn from_factors(user_factors: DMatrix<f32>, item_factors: DMatrix<f32>) -> Self {
        debug_assert_eq!(user_factors.ncols(), item_factors.ncols());
        Self {
            user_factors,
            item_factors,
        }
    }

    pub fn num_users(&self) -> usize {
        self.user_factors.nrows()
    }

    pub fn num_items(&self) -> usize {
        self.item_factors.nrows()
    }

    pub fn factors(&self) -> usize {
        self.user_factors.ncols()
    }

    /// Latent vector of one user
    pub fn user_factors(&self, user_idx: usize) -> Result<Vec<f32>> {
        self.check_user(user_idx)?;
        Ok(self.user_factors.row(user_idx).iter().copied().collect())
    }

    /// Latent vector of one item, `None` when out of range
    pub fn item_factors(&self, item_idx: usize) -> Option<Vec<f32>> {
        (item_idx < self.num_items())
            .then(|| self.item_factors.row(item_idx).iter().copied().collect())
    }

    /// Predicted preference of a user for a single item.
    pub fn score(&self, user_idx: usize, item_idx: usize) -> Result<Option<f32>> {
        self.check_user(user_idx)?;
        if item_idx >= self.num_items() {
            return Ok(None);
        }
        Ok(Some(
            self.user_factors
                .row(user_idx)
                .dot(&self.item_factors.row(item_idx)),
        ))
    }

    /// Top `n` items for a user, excluding `excluded`.
    ///
    /// Results are ordered by descending score, ties broken by ascending item
    /// index. Fewer than `n` eligible items means all of them are returned.
    #[instrument(skip(self, excluded), fields(excluded = excluded.len()))]
    pub fn recommend(
        &self,
        user_idx: usize,
        excluded: &HashSet<usize>,
        n: usize,
    ) -> Result<Vec<(usize, f32)>> {
        self.check_user(user_idx)?;
        if n == 0 {
            return Ok(Vec::new());
        }

        let user = self.user_factors.row(user_idx);
        let mut scored: Vec<(usize, f32)> = (0..self.num_items())
            .filter(|item_idx| !excluded.contains(item_idx))
            .map(|item_idx| (item_idx, user.dot(&self.item_factors.row(item_idx))))
            .collect();

        if n < scored.len() {
            scored.select_nth_unstable_by(n - 1, rank_order);
            scored.truncate(n);
        }
        scored.sort_unstable_by(rank_order);

        Ok(scored)
    }

    fn check_user(&self, user_idx: usize) -> Result<()> {
        if user_idx >= self.num_users() {
            return Err(FactorizationError::InvalidUserIndex {
                index: user_idx,
                num_users: self.num_users(),
            });
        }
        Ok(())
    }
}

/// Descending score, then ascending item index.
fn rank_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2 users, 4 items, 2 factors, scores chosen by hand
    fn hand_model() -> FactorizationModel {
        let users = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let items = DMatrix::from_row_slice(
            4,
            2,
            &[
                0.9, 0.1, // item 0
                0.5, 0.5, // item 1
                0.5, 0.2, // item 2
                0.1, 0.8, // item 3
            ],
        );
        FactorizationModel::from_factors(users, items)
    }

    #[test]
    fn test_recommend_orders_by_score() {
        let model = hand_model();
        let recs = model.recommend(0, &HashSet::new(), 4).unwrap();

        let order: Vec<usize> = recs.iter().map(|(i, _)| *i).collect();
        // item 1 and item 2 tie at 0.5 for user 0, lower index first
        assert_eq!(order, vec![0, 1, 2, 3]);
        assert!(recs.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_recommend_excludes_items() {
        let model = hand_model();
        let excluded: HashSet<usize> = [0, 1].into_iter().collect();
        let recs = model.recommend(0, &excluded, 10).unwrap();

        assert_eq!(recs.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_recommend_truncates() {
        let model = hand_model();
        let recs = model.recommend(1, &HashSet::new(), 2).unwrap();

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].0, 3);
        assert_eq!(recs[1].0, 1);
        assert!((recs[0].1 - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_recommend_zero_and_everything_excluded() {
        let model = hand_model();
        assert!(model.recommend(0, &HashSet::new(), 0).unwrap().is_empty());

        let all: HashSet<usize> = (0..4).collect();
        assert!(model.recommend(0, &all, 3).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_user_index() {
        let model = hand_model();
        let err = model.recommend(2, &HashSet::new(), 1).unwrap_err();
        assert_eq!(
            err,
            FactorizationError::InvalidUserIndex {
                index: 2,
                num_users: 2
            }
        );
        assert!(model.user_factors(5).is_err());
    }

    #[test]
    fn test_score_matches_dot_product() {
        let model = hand_model();
        assert!((model.score(1, 2).unwrap().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(model.score(1, 9).unwrap(), None);
        assert_eq!(model.item_factors(3), Some(vec![0.1, 0.8]));
        assert_eq!(model.item_factors(4), None);
    }
}
