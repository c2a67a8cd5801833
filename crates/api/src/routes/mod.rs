pub mod health;
pub mod templates;
pub mod validation;

use axum::Router;

use crate::state::AppState;

/// Build the service route tree.
///
/// ```text
/// /                   service banner
/// /health             health check
/// /templates          template catalog
/// /validate           multipart upload validation
/// /validate/text      raw body validation
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(templates::router())
        .merge(validation::router())
}
