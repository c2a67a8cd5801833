//! Handler for the `/templates` resource.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// One entry of the template catalog.
#[derive(Debug, Serialize)]
pub struct TemplateInfo {
    pub name: &'static str,
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TemplatesResponse {
    pub templates: Vec<TemplateInfo>,
    /// Alias (including legacy names) to canonical template name.
    pub legacy_mappings: BTreeMap<&'static str, &'static str>,
}

/// GET /templates
///
/// List every template accepted by the validation endpoints, sorted by name.
pub async fn list_templates(State(state): State<AppState>) -> Json<TemplatesResponse> {
    let mut templates: Vec<TemplateInfo> = state
        .registry
        .list_all()
        .iter()
        .map(|t| TemplateInfo {
            name: t.id,
            display_name: t.display_name,
            aliases: t.aliases,
            description: t.description,
            version: t.version,
        })
        .collect();
    templates.sort_by_key(|t| t.name);

    Json(TemplatesResponse {
        templates,
        legacy_mappings: state.registry.legacy_mappings(),
    })
}
