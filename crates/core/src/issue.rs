//! Validation issue types shared by rule engines, the aggregator, and reports.

use serde::{Deserialize, Serialize};

/// Whether an issue makes the file invalid or is informational.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
}

/// A single finding produced by a rule engine for one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
    /// 1-based data row (the header is not counted).
    pub row: Option<u32>,
    pub column: Option<String>,
    /// Canonical identifier of the template that produced this issue.
    pub template: String,
}

impl ValidationIssue {
    pub fn error(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, template, message)
    }

    pub fn warning(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, template, message)
    }

    fn new(severity: Severity, template: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            row: None,
            column: None,
            template: template.into(),
        }
    }

    pub fn at_row(mut self, row: u32) -> Self {
        self.row = Some(row);
        self
    }

    pub fn in_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
