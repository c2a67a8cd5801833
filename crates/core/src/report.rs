//! Aggregated report and its stable external representation.

use serde::{Deserialize, Serialize};

use crate::issue::{Severity, ValidationIssue};

/// Merged outcome of validating one table against every requested template.
///
/// Constructed only through [`AggregatedReport::from_template_results`], which
/// keeps counts and validity consistent with the issue lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedReport {
    valid: bool,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
    templates_used: Vec<String>,
    engine_version: String,
}

impl AggregatedReport {
    /// Merge per-template issue lists, in the order given.
    ///
    /// Each issue is stamped with the template it was produced for, then
    /// routed to errors or warnings without changing relative order.
    /// Identical issues from different templates are all kept.
    pub fn from_template_results<'a, I>(results: I, engine_version: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (&'a str, Vec<ValidationIssue>)>,
    {
        let mut templates_used = Vec::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for (template, issues) in results {
            templates_used.push(template.to_string());
            for mut issue in issues {
                issue.template = template.to_string();
                match issue.severity {
                    Severity::Error => errors.push(issue),
                    Severity::Warning => warnings.push(issue),
                }
            }
        }

        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
            templates_used,
            engine_version: engine_version.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn templates_used(&self) -> &[String] {
        &self.templates_used
    }

    pub fn engine_version(&self) -> &str {
        &self.engine_version
    }
}

/// One issue as returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEntry {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
    pub row: Option<u32>,
    pub column: Option<String>,
}

/// Response body of the validation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<IssueEntry>,
    pub warnings: Vec<IssueEntry>,
    pub error_count: usize,
    pub warning_count: usize,
    pub templates_used: Vec<String>,
    pub sdrf_pipelines_version: String,
}

/// Map an aggregated report onto the external schema. No reordering or
/// filtering happens here.
pub fn assemble(report: &AggregatedReport) -> ValidationReport {
    ValidationReport {
        valid: report.is_valid(),
        errors: report.errors().iter().map(entry).collect(),
        warnings: report.warnings().iter().map(entry).collect(),
        error_count: report.error_count(),
        warning_count: report.warning_count(),
        templates_used: report.templates_used().to_vec(),
        sdrf_pipelines_version: report.engine_version().to_string(),
    }
}

fn entry(issue: &ValidationIssue) -> IssueEntry {
    IssueEntry {
        severity: issue.severity,
        message: issue.message.clone(),
        row: issue.row,
        column: issue.column.clone(),
    }
}
