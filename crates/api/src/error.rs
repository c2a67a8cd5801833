use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::QueryRejection;
use sdrf_core::error::ValidationError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`ValidationError`] for failures of the validation pipeline and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce consistent
/// JSON error responses, disjoint from the report body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A failure from `sdrf_core` (input, request shape, or engine stage).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The multipart body could not be read.
    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    /// The request is not a multipart request or has no boundary.
    #[error("Invalid multipart request: {0}")]
    MultipartRequest(#[from] MultipartRejection),

    /// The query string does not match the expected parameters.
    #[error("Invalid query string: {0}")]
    Query(#[from] QueryRejection),

    /// The request body could not be buffered (including over-limit bodies).
    #[error("Invalid request body: {0}")]
    Body(#[from] BytesRejection),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(err) => classify_validation_error(err),

            AppError::Multipart(err) => {
                let status = err.status();
                (status, rejection_code(status, "INVALID_MULTIPART"), err.body_text())
            }
            AppError::MultipartRequest(rejection) => {
                let status = rejection.status();
                (status, rejection_code(status, "INVALID_MULTIPART"), rejection.body_text())
            }
            AppError::Query(rejection) => {
                let status = rejection.status();
                (status, rejection_code(status, "BAD_REQUEST"), rejection.body_text())
            }
            AppError::Body(rejection) => {
                let status = rejection.status();
                (status, rejection_code(status, "BAD_REQUEST"), rejection.body_text())
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Extractor rejections keep axum's status; an over-limit body always
/// carries `PAYLOAD_TOO_LARGE`.
fn rejection_code(status: StatusCode, fallback: &'static str) -> &'static str {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        "PAYLOAD_TOO_LARGE"
    } else {
        fallback
    }
}

/// Classify a validation error into an HTTP status, error code, and message.
///
/// - Input and request-shape failures map to 4xx with the error's message.
/// - Engine failures map to 500; they say validation could not be performed,
///   never that the file is invalid.
/// - Cancellation maps to 503.
fn classify_validation_error(err: &ValidationError) -> (StatusCode, &'static str, String) {
    let status = match err {
        ValidationError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        _ if err.is_client_error() => StatusCode::BAD_REQUEST,
        ValidationError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ValidationError::RuleEngine(failure) => {
            tracing::error!(
                template = %failure.template,
                error = %failure.message,
                "Rule engine failure"
            );
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.code(), err.to_string())
}
