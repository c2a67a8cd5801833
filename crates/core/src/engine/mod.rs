//! Rule engine boundary.
//!
//! The aggregator only sees the [`RuleEngine`] trait. [`SdrfRuleEngine`] is
//! the built-in implementation backed by the static rule sets in [`rules`].

pub mod evaluator;
pub mod rules;
pub mod table;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RuleEngineFailure;
use crate::issue::ValidationIssue;
use crate::payload::NormalizedTable;
use crate::registry::TemplateDescriptor;

pub use evaluator::SdrfRuleEngine;

/// Per-request switches passed to every engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Skip ontology-term checks entirely (no lookups, no ontology issues).
    pub skip_ontology: bool,
    /// Restrict ontology lookups to locally cached terms. The built-in
    /// engine only ever resolves terms from its local tables, so it behaves
    /// as cache-only whatever this says; engines with a remote lookup
    /// honor it.
    pub use_cache_only: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            skip_ontology: false,
            use_cache_only: true,
        }
    }
}

/// A versioned engine that evaluates one template against one table.
///
/// Implementations must be deterministic: the same template, table, and
/// options always produce the same issues in the same order (table-level
/// issues first, then row order, then column order).
#[async_trait]
pub trait RuleEngine: Send + Sync {
    /// Version string stamped on every report produced with this engine.
    fn version(&self) -> &str;

    /// Whether ontology checks can run at all.
    fn ontology_available(&self) -> bool {
        false
    }

    async fn invoke(
        &self,
        template: &TemplateDescriptor,
        table: Arc<NormalizedTable>,
        options: EngineOptions,
    ) -> Result<Vec<ValidationIssue>, RuleEngineFailure>;
}
