//! Multi-template validation: resolve, fan out, merge.
//!
//! One task per distinct template runs on the tokio runtime. Results are
//! slotted by request position, so the merged report never depends on
//! which task finishes first. The first engine failure aborts the
//! remaining tasks and fails the whole request.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::engine::{EngineOptions, RuleEngine};
use crate::error::{RuleEngineFailure, ValidationError};
use crate::issue::ValidationIssue;
use crate::payload::NormalizedTable;
use crate::registry::{TemplateDescriptor, TemplateRegistry};
use crate::report::AggregatedReport;

/// Validates tables against templates from a registry using one engine.
#[derive(Clone)]
pub struct Aggregator<'r> {
    registry: &'r TemplateRegistry,
    engine: Arc<dyn RuleEngine>,
}

impl<'r> Aggregator<'r> {
    pub fn new(registry: &'r TemplateRegistry, engine: Arc<dyn RuleEngine>) -> Self {
        Self { registry, engine }
    }

    /// Resolve requested identifiers to distinct templates, keeping the
    /// order of first request. Fails if the list is empty or if any
    /// identifier is unknown (all unknown identifiers are reported).
    pub fn resolve(
        &self,
        requested: &[String],
    ) -> Result<Vec<TemplateDescriptor>, ValidationError> {
        if requested.is_empty() {
            return Err(ValidationError::NoTemplatesRequested);
        }

        let mut resolved: Vec<TemplateDescriptor> = Vec::with_capacity(requested.len());
        let mut unknown: Vec<String> = Vec::new();
        for identifier in requested {
            match self.registry.resolve(identifier) {
                Some(template) => {
                    if !resolved.iter().any(|r| r.id == template.id) {
                        resolved.push(template.clone());
                    }
                }
                None => {
                    if !unknown.contains(identifier) {
                        unknown.push(identifier.clone());
                    }
                }
            }
        }

        if unknown.is_empty() {
            Ok(resolved)
        } else {
            Err(ValidationError::UnknownTemplate(unknown))
        }
    }

    pub async fn aggregate(
        &self,
        table: Arc<NormalizedTable>,
        requested: &[String],
        options: EngineOptions,
    ) -> Result<AggregatedReport, ValidationError> {
        self.aggregate_until_cancelled(table, requested, options, &CancellationToken::new())
            .await
    }

    /// Like [`aggregate`](Self::aggregate), but gives up with
    /// [`ValidationError::Cancelled`] as soon as `cancel` fires. Dropping
    /// the returned future also aborts every in-flight invocation.
    pub async fn aggregate_until_cancelled(
        &self,
        table: Arc<NormalizedTable>,
        requested: &[String],
        mut options: EngineOptions,
        cancel: &CancellationToken,
    ) -> Result<AggregatedReport, ValidationError> {
        let templates = self.resolve(requested)?;

        if !options.skip_ontology && !self.engine.ontology_available() {
            tracing::warn!(
                "Ontology validation requested but the rule engine cannot resolve terms; \
                 skipping ontology checks"
            );
            options.skip_ontology = true;
        }

        let ids: Vec<&str> = templates.iter().map(|t| t.id).collect();
        tracing::info!(
            templates = ?ids,
            rows = table.row_count(),
            skip_ontology = options.skip_ontology,
            "Validating table"
        );

        let results = self.run_all(&templates, table, options, cancel).await?;
        let report = AggregatedReport::from_template_results(
            ids.into_iter().zip(results),
            self.engine.version(),
        );

        tracing::info!(
            valid = report.is_valid(),
            error_count = report.error_count(),
            warning_count = report.warning_count(),
            "Validation complete"
        );
        Ok(report)
    }

    /// Run every template concurrently and return issue lists in template order.
    async fn run_all(
        &self,
        templates: &[TemplateDescriptor],
        table: Arc<NormalizedTable>,
        options: EngineOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<Vec<ValidationIssue>>, ValidationError> {
        let mut tasks = JoinSet::new();
        for (index, template) in templates.iter().cloned().enumerate() {
            let engine = Arc::clone(&self.engine);
            let table = Arc::clone(&table);
            tasks.spawn(async move {
                let outcome = AssertUnwindSafe(engine.invoke(&template, table, options))
                    .catch_unwind()
                    .await;
                let result = outcome.unwrap_or_else(|panic| {
                    Err(RuleEngineFailure::new(
                        template.id,
                        format!("Rule engine panicked: {}", panic_message(&*panic)),
                    ))
                });
                (index, result)
            });
        }

        let mut slots: Vec<Option<Vec<ValidationIssue>>> = vec![None; templates.len()];
        loop {
            let joined = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tasks.abort_all();
                    tracing::warn!("Validation cancelled, in-flight templates aborted");
                    return Err(ValidationError::Cancelled);
                }
                joined = tasks.join_next() => joined,
            };

            match joined {
                None => break,
                Some(Ok((index, Ok(issues)))) => slots[index] = Some(issues),
                Some(Ok((index, Err(failure)))) => {
                    tasks.abort_all();
                    tracing::error!(
                        template = templates[index].id,
                        error = %failure.message,
                        "Rule engine failed, aborting remaining templates"
                    );
                    return Err(failure.into());
                }
                Some(Err(join_error)) => {
                    tasks.abort_all();
                    if join_error.is_cancelled() {
                        return Err(ValidationError::Cancelled);
                    }
                    return Err(RuleEngineFailure::new("unknown", join_error.to_string()).into());
                }
            }
        }

        Ok(slots.into_iter().map(Option::unwrap_or_default).collect())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
