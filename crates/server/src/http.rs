//! HTTP surface of the recommendation service.
//!
//! Routes:
//! - `GET /recommend?user_id=<int>&top_n=<int>` → `[{"id": .., "score": ..}]`
//! - `GET /health` → service stats
//!
//! Error classes map to status codes: not found → 404, bad request → 400,
//! unavailable → 503. Error bodies are `{"error": "<message>"}`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use data_loader::UserId;

use crate::config::HttpArgs;
use crate::service::{ErrorClass, RecommendError, Recommendation, RecommendationService, ServiceStats};

/// top_n applied when the query string omits it
pub const DEFAULT_TOP_N: i64 = 3;

/// Shared handler state. Cloning only bumps the `Arc`.
#[derive(Clone)]
pub struct AppState {
    service: Arc<RecommendationService>,
    default_top_n: i64,
}

impl AppState {
    pub fn new(service: Arc<RecommendationService>) -> Self {
        Self {
            service,
            default_top_n: DEFAULT_TOP_N,
        }
    }

    /// Configure the default top_n (default: 3)
    pub fn with_default_top_n(mut self, default_top_n: i64) -> Self {
        self.default_top_n = default_top_n;
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub user_id: UserId,
    pub top_n: Option<i64>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(flatten)]
    stats: ServiceStats,
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        let status = match err.class() {
            ErrorClass::NotFound => StatusCode::NOT_FOUND,
            ErrorClass::BadRequest => StatusCode::BAD_REQUEST,
            ErrorClass::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Build the router with CORS and request tracing.
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/recommend", get(recommend))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS policy: one allowed origin with credentials, or anything when unset.
pub fn cors_layer(allowed_origin: Option<HeaderValue>) -> CorsLayer {
    match allowed_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request()),
        None => CorsLayer::permissive(),
    }
}

async fn recommend(
    State(state): State<AppState>,
    query: Result<Query<RecommendQuery>, QueryRejection>,
) -> Result<Json<Vec<Recommendation>>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError {
        status: StatusCode::BAD_REQUEST,
        message: rejection.body_text(),
    })?;
    let top_n = query.top_n.unwrap_or(state.default_top_n);
    let service = state.service.clone();

    // Scoring is CPU-bound; keep it off the async workers
    let recommendations = tokio::task::spawn_blocking(move || service.recommend(query.user_id, top_n))
        .await
        .map_err(|e| {
            error!("Recommendation task failed: {}", e);
            ApiError {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "recommendation task failed".to_string(),
            }
        })??;

    Ok(Json(recommendations))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok",
        stats: state.service.stats(),
    };
    (StatusCode::OK, Json(response))
}

/// Serve an initialized service until Ctrl-C.
pub async fn serve(service: Arc<RecommendationService>, http: &HttpArgs) -> Result<()> {
    let origin = http
        .allowed_origin
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()
        .context("Invalid allowed origin")?;

    let state = AppState::new(service).with_default_top_n(http.default_top_n);
    let app = create_router(state, cors_layer(origin));

    let listener = tokio::net::TcpListener::bind(http.bind)
        .await
        .with_context(|| format!("Failed to bind {}", http.bind))?;
    info!("Listening on http://{}", http.bind);
    info!("Recommendation endpoint: http://{}/recommend?user_id=1&top_n=3", http.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}
