use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Version of the rule engine stamped on reports.
    pub sdrf_pipelines_version: String,
    /// Whether ontology term checks can run.
    pub ontology_validation_available: bool,
}

/// Service banner returned at the root path.
#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub health: &'static str,
    pub templates: &'static str,
}

/// GET /health -- returns service and rule engine status.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        sdrf_pipelines_version: state.engine.version().to_string(),
        ontology_validation_available: state.engine.ontology_available(),
    })
}

/// GET / -- points callers at the other endpoints.
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "SDRF Validator API",
        health: "/health",
        templates: "/templates",
    })
}

/// Mount the root banner and health check routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}
