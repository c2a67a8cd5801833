//! Built-in SDRF rule engine. Pure logic apart from running on the
//! blocking pool; no network access.

use std::sync::Arc;

use async_trait::async_trait;

use super::rules::{self, FieldRule, RuleKind};
use super::table::SdrfTable;
use super::{EngineOptions, RuleEngine};
use crate::error::RuleEngineFailure;
use crate::issue::ValidationIssue;
use crate::payload::NormalizedTable;
use crate::registry::TemplateDescriptor;

/// Version reported as `sdrf_pipelines_version` in every report.
pub const ENGINE_VERSION: &str = concat!("sdrf-rs-", env!("CARGO_PKG_VERSION"));

/// Rule engine backed by the static rule sets in [`rules`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SdrfRuleEngine;

impl SdrfRuleEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RuleEngine for SdrfRuleEngine {
    fn version(&self) -> &str {
        ENGINE_VERSION
    }

    fn ontology_available(&self) -> bool {
        true
    }

    async fn invoke(
        &self,
        template: &TemplateDescriptor,
        table: Arc<NormalizedTable>,
        options: EngineOptions,
    ) -> Result<Vec<ValidationIssue>, RuleEngineFailure> {
        let template = template.clone();
        let template_id = template.id;
        tokio::task::spawn_blocking(move || evaluate(&template, &table, options))
            .await
            .map_err(|e| {
                RuleEngineFailure::new(template_id, format!("Evaluation task failed: {e}"))
            })?
    }
}

/// Evaluate one template against a table.
///
/// Issue order: header-level issues first, then each data row in turn,
/// cells in header order.
pub fn evaluate(
    template: &TemplateDescriptor,
    table: &NormalizedTable,
    options: EngineOptions,
) -> Result<Vec<ValidationIssue>, RuleEngineFailure> {
    let sdrf = SdrfTable::parse(table.text()).map_err(|e| {
        RuleEngineFailure::new(template.id, format!("Failed to parse SDRF file: {e}"))
    })?;

    let active: Vec<&FieldRule> = rules::rule_set(template.handle)
        .iter()
        .filter(|rule| !(options.skip_ontology && rule.is_ontology()))
        .collect();

    let mut issues = check_header(template, &sdrf, &active);

    // Rules grouped by the header position they apply to.
    let mut by_column: Vec<Vec<&FieldRule>> = vec![Vec::new(); sdrf.headers.len()];
    for &rule in &active {
        if let Some(index) = sdrf.column_index(rule.column) {
            by_column[index].push(rule);
        }
    }

    for (row_index, row) in sdrf.rows.iter().enumerate() {
        let row_number = u32::try_from(row_index + 1).unwrap_or(u32::MAX);
        if row.len() != sdrf.headers.len() {
            issues.push(
                ValidationIssue::error(
                    template.id,
                    format!(
                        "Row has {} values but the header has {} columns",
                        row.len(),
                        sdrf.headers.len()
                    ),
                )
                .at_row(row_number),
            );
        }

        for (column_index, value) in row.iter().enumerate().take(sdrf.headers.len()) {
            let column = &sdrf.headers[column_index];
            for rule in &by_column[column_index] {
                if let Some(message) = check_cell(template, rule, column, value) {
                    issues.push(
                        ValidationIssue::error(template.id, message)
                            .at_row(row_number)
                            .in_column(column.as_str()),
                    );
                }
            }
            if rules::is_reserved(value) && value.chars().any(char::is_uppercase) {
                issues.push(
                    ValidationIssue::warning(
                        template.id,
                        format!(
                            "Reserved word '{value}' in column '{column}' should be \
                             written in lower case"
                        ),
                    )
                    .at_row(row_number)
                    .in_column(column.as_str()),
                );
            }
        }
    }

    tracing::debug!(
        template = template.id,
        rows = sdrf.rows.len(),
        skip_ontology = options.skip_ontology,
        cache_only = options.use_cache_only,
        issues = issues.len(),
        "Template evaluated"
    );
    Ok(issues)
}

fn check_header(
    template: &TemplateDescriptor,
    sdrf: &SdrfTable,
    active: &[&FieldRule],
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (index, header) in sdrf.headers.iter().enumerate() {
        let first = sdrf.column_index(header);
        if first != Some(index) && !rules::is_repeatable(header) {
            // Report a repeated column once, at its second occurrence.
            let earlier = sdrf.headers[..index]
                .iter()
                .filter(|h| h.eq_ignore_ascii_case(header))
                .count();
            if earlier == 1 {
                issues.push(
                    ValidationIssue::error(
                        template.id,
                        format!("Column '{header}' appears more than once"),
                    )
                    .in_column(header.as_str()),
                );
            }
        }
    }

    for rule in active {
        if sdrf.has_column(rule.column) {
            continue;
        }
        match rule.kind {
            RuleKind::Required => issues.push(
                ValidationIssue::error(
                    template.id,
                    format!("Required column '{}' is missing", rule.column),
                )
                .in_column(rule.column),
            ),
            RuleKind::Recommended => issues.push(
                ValidationIssue::warning(
                    template.id,
                    format!("Recommended column '{}' is missing", rule.column),
                )
                .in_column(rule.column),
            ),
            _ => {}
        }
    }

    if sdrf.rows.is_empty() {
        issues.push(ValidationIssue::warning(
            template.id,
            "SDRF file contains no data rows",
        ));
    }

    issues
}

/// Apply one rule to one cell. Returns the error message on violation.
fn check_cell(
    template: &TemplateDescriptor,
    rule: &FieldRule,
    column: &str,
    value: &str,
) -> Option<String> {
    if value.is_empty() {
        return matches!(rule.kind, RuleKind::Required)
            .then(|| format!("Empty value in required column '{column}'"));
    }
    if rules::is_reserved(value) {
        return None;
    }

    match &rule.kind {
        RuleKind::Required | RuleKind::Recommended => None,
        RuleKind::Pattern { regex, expected } => (!regex.is_match(value))
            .then(|| format!("Value '{value}' in column '{column}' must be {expected}")),
        RuleKind::OneOf(allowed) => (!allowed.iter().any(|a| a.eq_ignore_ascii_case(value)))
            .then(|| {
                format!(
                    "Value '{value}' in column '{column}' is not one of: {}",
                    allowed.join(", ")
                )
            }),
        RuleKind::Equals(expected) => (!expected.eq_ignore_ascii_case(value)).then(|| {
            format!(
                "Value '{value}' in column '{column}' must be '{expected}' for template {}",
                template.id
            )
        }),
        RuleKind::Excludes(forbidden) => forbidden.eq_ignore_ascii_case(value).then(|| {
            format!(
                "Value '{value}' in column '{column}' is not allowed for template {}",
                template.id
            )
        }),
        RuleKind::OntologyTerm(ontology) => (!ontology.resolves(value)).then(|| {
            format!(
                "Term '{value}' in column '{column}' was not found in ontology {}",
                ontology.name()
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;
    use crate::registry::TemplateRegistry;

    const HEADER: &str = "source name\tcharacteristics[organism]\tcharacteristics[organism part]\tcharacteristics[biological replicate]\tassay name\ttechnology type\tcomment[technical replicate]\tcomment[data file]\tcomment[fraction identifier]\tcomment[label]\tcomment[instrument]";
    const ROW: &str = "sample_1\thomo sapiens\tbrain\t1\trun_1\tproteomic profiling by mass spectrometry\t1\tfile1.raw\t1\tlabel free sample\tQ Exactive";

    fn template(id: &str) -> &'static TemplateDescriptor {
        TemplateRegistry::global().resolve(id).unwrap()
    }

    fn run(id: &str, text: &str, options: EngineOptions) -> Vec<ValidationIssue> {
        evaluate(template(id), &NormalizedTable::from_text(text), options).unwrap()
    }

    fn complete_table() -> String {
        format!("{HEADER}\n{ROW}\n")
    }

    #[test]
    fn complete_table_has_no_issues() {
        assert!(run("default", &complete_table(), EngineOptions::default()).is_empty());
    }

    #[test]
    fn missing_required_column_is_a_row_less_error() {
        let header = HEADER.replace("\tcomment[instrument]", "");
        let row = ROW.replace("\tQ Exactive", "");
        let text = format!("{header}\n{row}\n");
        let issues = run("default", &text, EngineOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].row, None);
        assert_eq!(issues[0].column.as_deref(), Some("comment[instrument]"));
        assert_eq!(issues[0].message, "Required column 'comment[instrument]' is missing");
    }

    #[test]
    fn header_only_table_warns_about_no_rows() {
        let issues = run("default", HEADER, EngineOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].message, "SDRF file contains no data rows");
    }

    #[test]
    fn unknown_organism_is_reported_unless_ontology_skipped() {
        let text = complete_table().replace("homo sapiens", "homo sapien");
        let issues = run("default", &text, EngineOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row, Some(1));
        assert!(issues[0].message.contains("NCBITaxon"));

        let skipped = EngineOptions {
            skip_ontology: true,
            ..EngineOptions::default()
        };
        assert!(run("default", &text, skipped).is_empty());
    }

    #[test]
    fn issues_follow_row_then_column_order() {
        let bad_row = ROW
            .replace("\t1\tfile1.raw\t1\t", "\tx\tdir/file1.raw\ty\t")
            .replace("brain", "");
        let text = format!("{HEADER}\n{bad_row}\n{bad_row}\n");
        let issues = run("default", &text, EngineOptions::default());
        let located: Vec<_> = issues
            .iter()
            .map(|i| (i.row.unwrap(), i.column.clone().unwrap()))
            .collect();
        let per_row = [
            "characteristics[organism part]",
            "comment[technical replicate]",
            "comment[data file]",
            "comment[fraction identifier]",
        ];
        let expected: Vec<_> = [1, 2]
            .into_iter()
            .flat_map(|row| per_row.iter().map(move |c| (row, c.to_string())))
            .collect();
        assert_eq!(located, expected);
    }

    #[test]
    fn ragged_row_is_reported() {
        let text = format!("{HEADER}\nsample_1\thomo sapiens\n");
        let issues = run("default", &text, EngineOptions::default());
        assert_eq!(
            issues[0].message,
            "Row has 2 values but the header has 11 columns"
        );
        assert_eq!(issues[0].row, Some(1));
        assert_eq!(issues[0].column, None);
    }

    #[test]
    fn duplicate_plain_column_is_an_error() {
        let text = format!("{HEADER}\tassay name\n{ROW}\trun_1\n");
        let issues = run("default", &text, EngineOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Column 'assay name' appears more than once");
    }

    #[test]
    fn reserved_word_casing_is_a_warning() {
        let text = complete_table().replace("brain", "Not Available");
        let issues = run("default", &text, EngineOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].column.as_deref(), Some("characteristics[organism part]"));
    }

    #[test]
    fn human_template_requires_extra_columns() {
        let issues = run("human", &complete_table(), EngineOptions::default());
        let missing: Vec<_> = issues.iter().filter_map(|i| i.column.as_deref()).collect();
        assert_eq!(
            missing,
            [
                "characteristics[age]",
                "characteristics[sex]",
                "characteristics[disease]",
                "characteristics[developmental stage]",
            ]
        );
        assert!(issues.iter().all(|i| i.template == "human"));
    }

    #[test]
    fn vertebrates_reject_human_samples() {
        let header = format!(
            "{HEADER}\tcharacteristics[developmental stage]\t\
             characteristics[strain/breed]\tcharacteristics[sex]"
        );
        let text = format!("{header}\n{ROW}\tadult\tC57BL/6\tmale\n");
        let issues = run("vertebrates", &text, EngineOptions::default());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("not allowed for template vertebrates"));
    }

    #[test]
    fn empty_required_value_is_reported_at_its_row() {
        let text = format!("{HEADER}\n{ROW}\n{}\n", ROW.replace("run_1", ""));
        let issues = run("default", &text, EngineOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].row, Some(2));
        assert_eq!(issues[0].column.as_deref(), Some("assay name"));
        assert_eq!(issues[0].message, "Empty value in required column 'assay name'");
    }

    #[test]
    fn technology_type_must_be_an_allowed_value() {
        let text = complete_table().replace("proteomic profiling by mass spectrometry", "rna-seq");
        let issues = run("default", &text, EngineOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].column.as_deref(), Some("technology type"));
        assert_eq!(
            issues[0].message,
            "Value 'rna-seq' in column 'technology type' is not one of: \
             proteomic profiling by mass spectrometry"
        );
    }

    fn human_table() -> String {
        format!(
            "{HEADER}\tcharacteristics[age]\tcharacteristics[sex]\t\
             characteristics[disease]\tcharacteristics[developmental stage]\n\
             {ROW}\t40Y\tfemale\tnormal\tadult\n"
        )
    }

    #[test]
    fn complete_human_table_has_no_issues() {
        assert!(run("human", &human_table(), EngineOptions::default()).is_empty());
    }

    #[test]
    fn human_sex_must_be_an_allowed_value() {
        let text = human_table().replace("\tfemale\t", "\tF\t");
        let issues = run("human", &text, EngineOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Value 'F' in column 'characteristics[sex]' is not one of: \
             male, female, intersex, unknown"
        );
    }

    #[test]
    fn human_template_requires_homo_sapiens() {
        let text = human_table().replace("homo sapiens", "mus musculus");
        let issues = run("human", &text, EngineOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row, Some(1));
        assert_eq!(
            issues[0].message,
            "Value 'mus musculus' in column 'characteristics[organism]' must be \
             'homo sapiens' for template human"
        );
    }

    #[test]
    fn human_age_must_match_age_pattern() {
        for age in ["30Y6M", "20Y-30Y", "1Y2M3D"] {
            let text = human_table().replace("\t40Y\t", &format!("\t{age}\t"));
            assert!(run("human", &text, EngineOptions::default()).is_empty(), "{age}");
        }

        let text = human_table().replace("\t40Y\t", "\tforty\t");
        let issues = run("human", &text, EngineOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].column.as_deref(), Some("characteristics[age]"));
        assert_eq!(
            issues[0].message,
            "Value 'forty' in column 'characteristics[age]' must be \
             an age such as 40Y, 30Y6M or 20Y-30Y"
        );
    }

    #[test]
    fn evaluation_is_deterministic() {
        let text = complete_table().replace("1\tfile1.raw", "one\tfile1.raw");
        let first = run("human", &text, EngineOptions::default());
        let second = run("human", &text, EngineOptions::default());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn invoke_runs_on_the_blocking_pool() {
        let engine = SdrfRuleEngine::new();
        let table = Arc::new(NormalizedTable::from_text(complete_table()));
        let issues = engine
            .invoke(template("default"), table, EngineOptions::default())
            .await
            .unwrap();
        assert!(issues.is_empty());
        assert!(engine.ontology_available());
        assert!(engine.version().starts_with("sdrf-rs-"));
    }
}
