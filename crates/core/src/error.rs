/// Failure reported by a rule engine while evaluating one template.
///
/// Carries an opaque diagnostic message. Never converted into a report
/// issue: a failed evaluation aborts the whole validation request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed for template {template}: {message}")]
pub struct RuleEngineFailure {
    pub template: String,
    pub message: String,
}

impl RuleEngineFailure {
    pub fn new(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            message: message.into(),
        }
    }
}

/// Every way a validation request can fail before a report is produced.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large. Maximum size is {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Failed to decompress file: {0}")]
    Decompression(String),

    #[error("Failed to decode file as UTF-8: {0}")]
    UnsupportedEncoding(String),

    #[error("Empty file uploaded")]
    EmptyPayload,

    #[error("Unknown template: {}. Use /templates to see available templates.", .0.join(", "))]
    UnknownTemplate(Vec<String>),

    #[error("At least one template must be requested")]
    NoTemplatesRequested,

    #[error(transparent)]
    RuleEngine(#[from] RuleEngineFailure),

    #[error("Validation was cancelled before all templates completed")]
    Cancelled,
}

impl ValidationError {
    /// Stable machine-readable code for this failure category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::Decompression(_) => "DECOMPRESSION_ERROR",
            Self::UnsupportedEncoding(_) => "UNSUPPORTED_ENCODING",
            Self::EmptyPayload => "EMPTY_PAYLOAD",
            Self::UnknownTemplate(_) => "UNKNOWN_TEMPLATE",
            Self::NoTemplatesRequested => "NO_TEMPLATES_REQUESTED",
            Self::RuleEngine(_) => "RULE_ENGINE_FAILURE",
            Self::Cancelled => "VALIDATION_CANCELLED",
        }
    }

    /// Whether the caller's input (rather than the service) caused the failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::RuleEngine(_) | Self::Cancelled)
    }
}
