#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use flate2::write::GzEncoder;
use flate2::Compression;
use http_body_util::BodyExt;
use sdrf_core::engine::{RuleEngine, SdrfRuleEngine};
use tower::ServiceExt;

use sdrf_api::config::{LogFormat, ServerConfig};
use sdrf_api::router::build_app_router;
use sdrf_api::state::AppState;

/// Boundary used by [`post_multipart`].
pub const BOUNDARY: &str = "sdrf-test-boundary";

/// Minimal SDRF table that passes the default template.
pub const MINIMAL_SDRF: &str = "source name\tcharacteristics[organism]\tcharacteristics[organism part]\tcharacteristics[biological replicate]\tassay name\ttechnology type\tcomment[technical replicate]\tcomment[data file]\tcomment[fraction identifier]\tcomment[label]\tcomment[instrument]
sample_1\tHomo sapiens\tbrain\t1\trun_1\tproteomic profiling by mass spectrometry\t1\tfile1.raw\t1\tlabel free sample\tQ Exactive
sample_2\tHomo sapiens\tliver\t1\trun_2\tproteomic profiling by mass spectrometry\t1\tfile2.raw\t1\tlabel free sample\tQ Exactive
";

/// Build a test `ServerConfig` with safe defaults.
///
/// Allows any origin and keeps the production 10 MiB file limit.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        max_file_size: 10 * 1024 * 1024,
        default_skip_ontology: false,
        log_format: LogFormat::Text,
        root_path: String::new(),
    }
}

/// Build the full application router backed by the built-in rule engine.
pub fn build_test_app() -> Router {
    build_test_app_with(test_config(), Arc::new(SdrfRuleEngine::new()))
}

/// Build the full application router with a custom config and engine.
///
/// Goes through [`build_app_router`] so tests exercise the same middleware
/// stack (CORS, request ID, timeout, tracing, panic recovery) as production.
pub fn build_test_app_with(config: ServerConfig, engine: Arc<dyn RuleEngine>) -> Router {
    let state = AppState::new(config.clone(), engine);
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a raw body.
pub async fn post_bytes(app: Router, uri: &str, body: impl Into<Vec<u8>>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "text/tab-separated-values")
        .body(Body::from(body.into()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a multipart body with a single part named `field`.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    field: &str,
    file_name: &str,
    contents: &[u8],
) -> Response<Body> {
    let mut body = Vec::new();
    write!(
        body,
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .unwrap();
    body.extend_from_slice(contents);
    write!(body, "\r\n--{BOUNDARY}--\r\n").unwrap();

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}
