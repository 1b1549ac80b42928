//! # Recommendation Service
//!
//! This module owns the trained state and answers recommendation queries:
//!
//! Startup (`initialize`), run exactly once:
//! 1. Fit the user and item codecs on the record stream
//! 2. Build the sparse interaction matrix
//! 3. Train the ALS model
//!
//! Per request (`recommend`):
//! 1. Validate `top_n`
//! 2. Check the user was seen in training
//! 3. Encode, slice the user's row as the exclusion set, score
//! 4. Decode item indices back to external identifiers
//!
//! The service is immutable after `initialize`, so it is shared across
//! request handlers as `Arc<RecommendationService>` with no locking.

use std::collections::HashSet;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use data_loader::{InteractionRecord, ItemId, UserId};
use factorization::{AlsConfig, FactorizationError, FactorizationModel};
use interactions::{InteractionData, InteractionError};

/// One recommended item as exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: ItemId,
    /// Raw model score, never rounded here
    pub score: f32,
}

/// Sizes of the trained state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    pub users: usize,
    pub items: usize,
    pub interactions: usize,
    pub factors: usize,
}

/// Failures that abort startup. The service never serves a partial model.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("No interaction records to train on")]
    EmptyDataset,

    #[error("Failed to build interaction matrix: {0}")]
    Interactions(#[from] InteractionError),

    #[error("Failed to train model: {0}")]
    Training(#[from] FactorizationError),
}

/// Request-time failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    #[error("User {user_id} not found in training data")]
    UnknownUser { user_id: UserId },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Codec and model disagree. Indicates a bug, not bad input.
    #[error("Internal consistency failure: {0}")]
    Internal(String),
}

/// Caller-facing category of a `RecommendError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    BadRequest,
    Unavailable,
}

impl RecommendError {
    pub fn class(&self) -> ErrorClass {
        match self {
            RecommendError::UnknownUser { .. } => ErrorClass::NotFound,
            RecommendError::InvalidArgument(_) => ErrorClass::BadRequest,
            RecommendError::Internal(_) => ErrorClass::Unavailable,
        }
    }
}

impl From<InteractionError> for RecommendError {
    fn from(err: InteractionError) -> Self {
        error!("Codec failure while serving a request: {}", err);
        RecommendError::Internal(err.to_string())
    }
}

impl From<FactorizationError> for RecommendError {
    fn from(err: FactorizationError) -> Self {
        error!("Model failure while serving a request: {}", err);
        RecommendError::Internal(err.to_string())
    }
}

/// Trained codecs, matrix and model, built once at startup.
#[derive(Debug)]
pub struct RecommendationService {
    data: InteractionData,
    model: FactorizationModel,
    config: AlsConfig,
}

impl RecommendationService {
    /// Run the full fit → build → train pipeline.
    ///
    /// # Arguments
    /// * `records` - The complete interaction dataset
    /// * `config` - ALS hyperparameters, fixed for the lifetime of the model
    #[instrument(skip(records, config), fields(records = records.len()))]
    pub fn initialize(
        records: &[InteractionRecord],
        config: AlsConfig,
    ) -> Result<Self, InitError> {
        let start_time = Instant::now();

        if records.is_empty() {
            return Err(InitError::EmptyDataset);
        }

        let data = InteractionData::fit(records)?;
        info!(
            "Built interaction matrix: {} users x {} items, {} non-zeros",
            data.users.len(),
            data.items.len(),
            data.matrix.nnz()
        );

        let model = factorization::train(&data.matrix, &config)?;

        info!(
            "Recommendation service initialized in {:.2?}",
            start_time.elapsed()
        );
        Ok(Self {
            data,
            model,
            config,
        })
    }

    /// Main entry point: top `top_n` items for an external user id.
    ///
    /// # Returns
    /// Recommendations sorted by score (highest first), never including an
    /// item the user already interacted with.
    #[instrument(skip(self))]
    pub fn recommend(
        &self,
        user_id: UserId,
        top_n: i64,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        if top_n <= 0 {
            return Err(RecommendError::InvalidArgument(format!(
                "top_n must be positive, got {}",
                top_n
            )));
        }
        if !self.data.users.contains(user_id) {
            return Err(RecommendError::UnknownUser { user_id });
        }

        let user_idx = self.data.users.encode(user_id)?;
        let excluded = self.interacted_items(user_idx)?;
        debug!(
            "User {} -> index {}, {} items excluded",
            user_id,
            user_idx,
            excluded.len()
        );

        let n = usize::try_from(top_n).unwrap_or(usize::MAX);
        let ranked = self.model.recommend(user_idx, &excluded, n)?;

        let recommendations = ranked
            .into_iter()
            .map(|(item_idx, score)| -> Result<Recommendation, RecommendError> {
                Ok(Recommendation {
                    id: self.data.items.decode(item_idx)?,
                    score,
                })
            })
            .collect::<Result<Vec<_>, RecommendError>>()?;

        debug!(
            "Returning {} recommendations for user {}",
            recommendations.len(),
            user_id
        );
        Ok(recommendations)
    }

    /// Items a user interacted with, with their aggregated weights.
    pub fn history(&self, user_id: UserId) -> Result<Vec<(ItemId, f32)>, RecommendError> {
        if !self.data.users.contains(user_id) {
            return Err(RecommendError::UnknownUser { user_id });
        }
        let user_idx = self.data.users.encode(user_id)?;
        let row = self
            .data
            .matrix
            .row(user_idx)
            .ok_or_else(|| RecommendError::Internal(format!("no matrix row for user index {}", user_idx)))?;

        row.iter()
            .map(|(item_idx, weight)| -> Result<(ItemId, f32), RecommendError> {
                Ok((self.data.items.decode(item_idx)?, weight))
            })
            .collect()
    }

    /// External ids of every user seen in training, ascending
    pub fn user_ids(&self) -> &[UserId] {
        self.data.users.ids()
    }

    pub fn data(&self) -> &InteractionData {
        &self.data
    }

    pub fn config(&self) -> &AlsConfig {
        &self.config
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            users: self.data.users.len(),
            items: self.data.items.len(),
            interactions: self.data.matrix.nnz(),
            factors: self.model.factors(),
        }
    }

    fn interacted_items(&self, user_idx: usize) -> Result<HashSet<usize>, RecommendError> {
        self.data
            .matrix
            .row(user_idx)
            .map(|row| row.indices.iter().copied().collect())
            .ok_or_else(|| {
                error!("User index {} has no matrix row", user_idx);
                RecommendError::Internal(format!("no matrix row for user index {}", user_idx))
            })
    }
}
