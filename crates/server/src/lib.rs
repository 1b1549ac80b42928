//! Server crate for the implicit-feedback recommendation engine.
//!
//! This crate wires the pipeline together:
//! - `service`: `RecommendationService`, startup training and per-request scoring
//! - `http`: axum routes exposing `recommend` over HTTP
//! - `config`: clap argument groups shared with the CLI

pub mod config;
pub mod http;
pub mod service;

pub use config::{build_service, AlsArgs, DataArgs, HttpArgs};
pub use service::{
    ErrorClass, InitError, Recommendation, RecommendError, RecommendationService, ServiceStats,
};
