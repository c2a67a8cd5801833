use std::sync::Arc;

use sdrf_core::engine::RuleEngine;
use sdrf_core::registry::TemplateRegistry;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or `'static`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (limits and defaults used by handlers).
    pub config: Arc<ServerConfig>,
    /// Rule engine used for every template evaluation.
    pub engine: Arc<dyn RuleEngine>,
    /// Read-only template catalog.
    pub registry: &'static TemplateRegistry,
}

impl AppState {
    pub fn new(config: ServerConfig, engine: Arc<dyn RuleEngine>) -> Self {
        Self {
            config: Arc::new(config),
            engine,
            registry: TemplateRegistry::global(),
        }
    }
}
