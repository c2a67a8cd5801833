//! Query parameter types for the validation endpoints.

use serde::Deserialize;

/// Template used when a request names none.
pub const DEFAULT_TEMPLATE: &str = "default";

/// `?template=a&template=b&skip_ontology=&use_ols_cache_only=`
///
/// `template` may repeat; parsed with `axum_extra::extract::Query` so
/// repeated keys collect into the vector.
#[derive(Debug, Deserialize)]
pub struct ValidateParams {
    #[serde(default = "default_templates")]
    pub template: Vec<String>,
    /// Falls back to `DEFAULT_SKIP_ONTOLOGY` when absent.
    pub skip_ontology: Option<bool>,
    #[serde(default = "default_true")]
    pub use_ols_cache_only: bool,
}

fn default_templates() -> Vec<String> {
    vec![DEFAULT_TEMPLATE.to_string()]
}

fn default_true() -> bool {
    true
}
