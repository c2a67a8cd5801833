//! Route definitions for the `/validate` resources.

use axum::routing::post;
use axum::Router;

use crate::handlers::validation;
use crate::state::AppState;

/// ```text
/// POST   /validate         -> validate_upload  (multipart, ?template, ?skip_ontology)
/// POST   /validate/text    -> validate_text    (raw body, same query)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/validate", post(validation::validate_upload))
        .route("/validate/text", post(validation::validate_text))
}
