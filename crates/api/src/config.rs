use sdrf_core::payload::DEFAULT_MAX_SIZE;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`). In-flight template
    /// evaluations are aborted when it fires.
    pub request_timeout_secs: u64,
    /// Maximum upload size in bytes, compressed or decompressed (default: 10 MiB).
    pub max_file_size: u64,
    /// Whether ontology checks are skipped when a request does not say.
    pub default_skip_ontology: bool,
    pub log_format: LogFormat,
    /// Path prefix all routes are nested under (for ingress sub-paths).
    pub root_path: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default    |
    /// |-------------------------|------------|
    /// | `HOST`                  | `0.0.0.0`  |
    /// | `PORT`                  | `5000`     |
    /// | `CORS_ORIGINS`          | `*`        |
    /// | `REQUEST_TIMEOUT_SECS`  | `60`       |
    /// | `MAX_FILE_SIZE`         | `10485760` |
    /// | `DEFAULT_SKIP_ONTOLOGY` | `false`    |
    /// | `LOG_FORMAT`            | `text`     |
    /// | `ROOT_PATH`             | (empty)    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_file_size: u64 = std::env::var("MAX_FILE_SIZE")
            .map(|v| v.parse().expect("MAX_FILE_SIZE must be a valid u64"))
            .unwrap_or(DEFAULT_MAX_SIZE);

        let default_skip_ontology: bool = std::env::var("DEFAULT_SKIP_ONTOLOGY")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("DEFAULT_SKIP_ONTOLOGY must be true or false");

        let log_format = match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let root_path = normalize_root_path(&std::env::var("ROOT_PATH").unwrap_or_default());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_file_size,
            default_skip_ontology,
            log_format,
            root_path,
        }
    }

    /// Whether CORS should accept any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

/// `"api/"` becomes `"/api"`; `"/"` and `""` become `""` (no prefix).
pub fn normalize_root_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
