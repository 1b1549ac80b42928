//! HTTP server for the recommendation engine.
//!
//! Loads interactions, trains the model, then serves `/recommend` until
//! interrupted. Training happens before the listener is bound, so requests
//! are never answered by a half-built model.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use server::{build_service, AlsArgs, DataArgs, HttpArgs};

/// Serve top-N recommendations from implicit feedback
#[derive(Parser)]
#[command(name = "server")]
struct ServerCli {
    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    als: AlsArgs,

    #[command(flatten)]
    http: HttpArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = ServerCli::parse();
    info!("Starting recommendation server");

    // Training is CPU-bound and must finish before we accept traffic
    let (data, als) = (cli.data.clone(), cli.als.clone());
    let service = tokio::task::spawn_blocking(move || build_service(&data, &als))
        .await
        .context("Training task panicked")??;
    info!("Model ready: {:?}", service.stats());

    server::http::serve(Arc::new(service), &cli.http).await
}
