//! Handlers for the `/validate` resources.
//!
//! Both endpoints funnel into [`run_validation`]: normalize the payload on
//! the blocking pool, aggregate across the requested templates, assemble
//! the external report.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::header::CONTENT_LENGTH;
use axum::http::HeaderMap;
use axum::Json;
use axum_extra::extract::{Query, WithRejection};
use sdrf_core::aggregator::Aggregator;
use sdrf_core::engine::EngineOptions;
use sdrf_core::error::ValidationError;
use sdrf_core::payload::{self, UploadedPayload};
use sdrf_core::report::{self, ValidationReport};

use crate::error::{AppError, AppResult};
use crate::query::ValidateParams;
use crate::state::AppState;

/// Multipart field carrying the SDRF file.
pub const FILE_FIELD: &str = "file";

/// POST /validate
///
/// Validate an uploaded SDRF file (plain or gzipped TSV) against one or
/// more templates.
pub async fn validate_upload(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<ValidateParams>, AppError>,
    WithRejection(mut multipart, _): WithRejection<Multipart, AppError>,
) -> AppResult<Json<ValidationReport>> {
    let payload = read_file_field(&mut multipart, state.config.max_file_size).await?;
    let report = run_validation(&state, payload, &params).await?;
    Ok(Json(report))
}

/// POST /validate/text
///
/// Validate SDRF content sent as the raw request body. Gzipped bodies are
/// accepted too; compression is detected from the content.
pub async fn validate_text(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<ValidateParams>, AppError>,
    headers: HeaderMap,
    WithRejection(body, _): WithRejection<Bytes, AppError>,
) -> AppResult<Json<ValidationReport>> {
    let mut payload = UploadedPayload::new(body.to_vec());
    if let Some(declared) = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
    {
        payload = payload.with_declared_size(declared);
    }

    let report = run_validation(&state, payload, &params).await?;
    Ok(Json(report))
}

/// Read the `file` field, failing as soon as it grows past `max_size`.
async fn read_file_field(
    multipart: &mut Multipart,
    max_size: u64,
) -> AppResult<UploadedPayload> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if (bytes.len() + chunk.len()) as u64 > max_size {
                return Err(ValidationError::PayloadTooLarge { limit: max_size }.into());
            }
            bytes.extend_from_slice(&chunk);
        }
        tracing::debug!(
            file_name = field.file_name().unwrap_or(""),
            size = bytes.len(),
            "Received upload"
        );
        return Ok(UploadedPayload::new(bytes));
    }

    Err(AppError::BadRequest(format!(
        "Multipart field '{FILE_FIELD}' is required"
    )))
}

async fn run_validation(
    state: &AppState,
    payload: UploadedPayload,
    params: &ValidateParams,
) -> AppResult<ValidationReport> {
    let max_size = state.config.max_file_size;
    let table = tokio::task::spawn_blocking(move || payload::normalize(payload, max_size))
        .await
        .map_err(|e| AppError::InternalError(format!("Normalization task failed: {e}")))??;

    let options = EngineOptions {
        skip_ontology: params
            .skip_ontology
            .unwrap_or(state.config.default_skip_ontology),
        use_cache_only: params.use_ols_cache_only,
    };

    let aggregated = Aggregator::new(state.registry, Arc::clone(&state.engine))
        .aggregate(Arc::new(table), &params.template, options)
        .await?;

    Ok(report::assemble(&aggregated))
}
