//! Command-line and environment configuration.
//!
//! The argument groups here are flattened into both the `server` binary and
//! the `recs` CLI so the two accept identical flags.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use data_loader::{summarize, InteractionRecord, SourceKind};
use factorization::AlsConfig;
use factorization::config::{
    DEFAULT_ALPHA, DEFAULT_FACTORS, DEFAULT_ITERATIONS, DEFAULT_REGULARIZATION, DEFAULT_SEED,
};

use crate::http::DEFAULT_TOP_N;
use crate::service::RecommendationService;

/// Where the interaction records come from
#[derive(Debug, Clone, Args)]
pub struct DataArgs {
    /// Data provider: "synthetic" or "file"
    #[arg(long, env = "RECS_DATA_SOURCE", default_value = "synthetic")]
    pub data_source: String,

    /// Path to a delimited interaction file (required for "file")
    #[arg(long, env = "RECS_DATA_PATH")]
    pub data_path: Option<PathBuf>,

    /// Field delimiter of the interaction file
    #[arg(long, env = "RECS_DELIMITER", default_value = ",")]
    pub delimiter: char,
}

impl DataArgs {
    pub fn source_kind(&self) -> data_loader::Result<SourceKind> {
        SourceKind::from_parts(&self.data_source, self.data_path.clone(), self.delimiter)
    }

    /// Load every record from the configured provider.
    pub fn load_records(&self) -> Result<Vec<InteractionRecord>> {
        let source = self
            .source_kind()
            .context("Invalid data source configuration")?
            .open();
        info!("Loading interactions from {} source", source.name());

        let records = source.load().context("Failed to load interaction records")?;
        let summary = summarize(&records);
        info!(
            "Loaded {} records: {} users, {} items, {} distinct pairs",
            summary.records, summary.distinct_users, summary.distinct_items, summary.distinct_pairs
        );
        if summary.distinct_pairs < summary.records {
            info!(
                "{} duplicate (user, item) records will be summed",
                summary.records - summary.distinct_pairs
            );
        }
        Ok(records)
    }
}

/// ALS hyperparameters
#[derive(Debug, Clone, Args)]
pub struct AlsArgs {
    /// Embedding dimensionality
    #[arg(long, env = "RECS_FACTORS", default_value_t = DEFAULT_FACTORS)]
    pub factors: usize,

    /// Number of ALS rounds
    #[arg(long, env = "RECS_ITERATIONS", default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// L2 regularization strength, must be greater than zero
    #[arg(long, env = "RECS_REGULARIZATION", default_value_t = DEFAULT_REGULARIZATION)]
    pub regularization: f32,

    /// Confidence scale (confidence = 1 + alpha * weight)
    #[arg(long, env = "RECS_ALPHA", default_value_t = DEFAULT_ALPHA)]
    pub alpha: f32,

    /// Seed for factor initialisation
    #[arg(long, env = "RECS_SEED", default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

impl AlsArgs {
    pub fn to_config(&self) -> AlsConfig {
        AlsConfig::new()
            .with_factors(self.factors)
            .with_iterations(self.iterations)
            .with_regularization(self.regularization)
            .with_alpha(self.alpha)
            .with_seed(self.seed)
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Args)]
pub struct HttpArgs {
    /// Address to listen on
    #[arg(long, env = "RECS_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Origin allowed by CORS; any origin when unset
    #[arg(long, env = "FRONTEND_APP_URL")]
    pub allowed_origin: Option<String>,

    /// top_n used when a request does not specify one
    #[arg(long, env = "RECS_DEFAULT_TOP_N", default_value_t = DEFAULT_TOP_N)]
    pub default_top_n: i64,
}

/// Load records and run the startup pipeline.
///
/// Any failure here is fatal: the caller must not start serving.
pub fn build_service(data: &DataArgs, als: &AlsArgs) -> Result<RecommendationService> {
    let records = data.load_records()?;
    RecommendationService::initialize(&records, als.to_config())
        .context("Failed to initialize recommendation service")
}
