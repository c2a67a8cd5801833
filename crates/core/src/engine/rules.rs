//! Built-in SDRF rule sets, one per template handle.
//!
//! Every template extends the `default` (MS proteomics) rules with its own
//! column requirements. Rule sets are compiled once and shared.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::registry::TemplateHandle;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const SOURCE_NAME: &str = "source name";
pub const ORGANISM: &str = "characteristics[organism]";
pub const ORGANISM_PART: &str = "characteristics[organism part]";
pub const ASSAY_NAME: &str = "assay name";
pub const DATA_FILE: &str = "comment[data file]";
pub const FRACTION_IDENTIFIER: &str = "comment[fraction identifier]";
pub const LABEL: &str = "comment[label]";
pub const INSTRUMENT: &str = "comment[instrument]";
pub const BIOLOGICAL_REPLICATE: &str = "characteristics[biological replicate]";
pub const TECHNICAL_REPLICATE: &str = "comment[technical replicate]";
pub const TECHNOLOGY_TYPE: &str = "technology type";
pub const AGE: &str = "characteristics[age]";
pub const SEX: &str = "characteristics[sex]";
pub const DISEASE: &str = "characteristics[disease]";
pub const DEVELOPMENTAL_STAGE: &str = "characteristics[developmental stage]";
pub const STRAIN: &str = "characteristics[strain/breed]";
pub const CELL_TYPE: &str = "characteristics[cell type]";
pub const CELL_LINE: &str = "characteristics[cell line]";
pub const GENOTYPE: &str = "characteristics[genotype]";

/// Values accepted in place of a real annotation in any column.
pub const RESERVED_VALUES: &[&str] = &["not available", "not applicable"];

/// Column prefixes that may legitimately repeat in a header.
pub const REPEATABLE_PREFIXES: &[&str] = &["characteristics[", "comment[", "factor value["];

/// Organism names resolvable without a remote ontology service.
pub const KNOWN_ORGANISMS: &[&str] = &[
    "homo sapiens",
    "mus musculus",
    "rattus norvegicus",
    "danio rerio",
    "gallus gallus",
    "bos taurus",
    "sus scrofa",
    "ovis aries",
    "macaca mulatta",
    "drosophila melanogaster",
    "caenorhabditis elegans",
    "saccharomyces cerevisiae",
    "schizosaccharomyces pombe",
    "escherichia coli",
    "arabidopsis thaliana",
    "oryza sativa",
    "zea mays",
    "triticum aestivum",
    "glycine max",
    "solanum lycopersicum",
];

// ---------------------------------------------------------------------------
// Rule types
// ---------------------------------------------------------------------------

/// Ontology a column's terms are checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ontology {
    NcbiTaxon,
    Uberon,
    CellOntology,
    Efo,
}

impl Ontology {
    pub fn name(self) -> &'static str {
        match self {
            Self::NcbiTaxon => "NCBITaxon",
            Self::Uberon => "UBERON",
            Self::CellOntology => "CL",
            Self::Efo => "EFO",
        }
    }

    /// Whether `term` resolves locally. Organisms must be in the known list;
    /// other terms must at least be words rather than bare numbers.
    pub fn resolves(self, term: &str) -> bool {
        match self {
            Self::NcbiTaxon => KNOWN_ORGANISMS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(term)),
            Self::Uberon | Self::CellOntology | Self::Efo => {
                term.chars().any(char::is_alphabetic)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Column must exist and every value must be non-empty.
    Required,
    /// Missing column yields a warning.
    Recommended,
    Pattern { regex: Regex, expected: &'static str },
    OneOf(&'static [&'static str]),
    Equals(&'static str),
    Excludes(&'static str),
    OntologyTerm(Ontology),
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub column: &'static str,
    pub kind: RuleKind,
}

impl FieldRule {
    fn new(column: &'static str, kind: RuleKind) -> Self {
        Self { column, kind }
    }

    /// Whether this rule depends on ontology resolution.
    pub fn is_ontology(&self) -> bool {
        matches!(self.kind, RuleKind::OntologyTerm(_))
    }
}

pub fn is_reserved(value: &str) -> bool {
    RESERVED_VALUES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(value))
}

pub fn is_repeatable(column: &str) -> bool {
    let lower = column.to_ascii_lowercase();
    REPEATABLE_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

// ---------------------------------------------------------------------------
// Rule sets
// ---------------------------------------------------------------------------

static RULE_SETS: LazyLock<HashMap<TemplateHandle, Vec<FieldRule>>> = LazyLock::new(|| {
    [
        TemplateHandle::MsProteomics,
        TemplateHandle::Human,
        TemplateHandle::Vertebrates,
        TemplateHandle::Invertebrates,
        TemplateHandle::Plants,
        TemplateHandle::CellLines,
    ]
    .into_iter()
    .map(|handle| (handle, build_rule_set(handle)))
    .collect()
});

/// Rules applied for a template handle, in evaluation order.
pub fn rule_set(handle: TemplateHandle) -> &'static [FieldRule] {
    RULE_SETS.get(&handle).map(Vec::as_slice).unwrap_or_default()
}

fn pattern(pattern: &str, expected: &'static str) -> RuleKind {
    RuleKind::Pattern {
        regex: Regex::new(pattern).expect("valid regex"),
        expected,
    }
}

fn build_rule_set(handle: TemplateHandle) -> Vec<FieldRule> {
    use RuleKind::{Equals, Excludes, OneOf, OntologyTerm, Recommended, Required};

    let mut rules: Vec<FieldRule> = [
        SOURCE_NAME,
        ORGANISM,
        ORGANISM_PART,
        ASSAY_NAME,
        DATA_FILE,
        FRACTION_IDENTIFIER,
        LABEL,
        INSTRUMENT,
    ]
    .into_iter()
    .map(|column| FieldRule::new(column, Required))
    .collect();

    rules.extend([
        FieldRule::new(BIOLOGICAL_REPLICATE, Recommended),
        FieldRule::new(TECHNICAL_REPLICATE, Recommended),
        FieldRule::new(TECHNOLOGY_TYPE, Recommended),
        FieldRule::new(FRACTION_IDENTIFIER, pattern(r"^\d+$", "a positive integer")),
        FieldRule::new(BIOLOGICAL_REPLICATE, pattern(r"^\d+$", "a positive integer")),
        FieldRule::new(TECHNICAL_REPLICATE, pattern(r"^\d+$", "a positive integer")),
        FieldRule::new(
            DATA_FILE,
            pattern(r"^[^/\\]+$", "a file name without directory components"),
        ),
        FieldRule::new(
            TECHNOLOGY_TYPE,
            OneOf(&["proteomic profiling by mass spectrometry"]),
        ),
        FieldRule::new(ORGANISM, OntologyTerm(Ontology::NcbiTaxon)),
        FieldRule::new(ORGANISM_PART, OntologyTerm(Ontology::Uberon)),
    ]);

    match handle {
        TemplateHandle::MsProteomics => {}
        TemplateHandle::Human => rules.extend([
            FieldRule::new(AGE, Required),
            FieldRule::new(SEX, Required),
            FieldRule::new(DISEASE, Required),
            FieldRule::new(DEVELOPMENTAL_STAGE, Required),
            FieldRule::new(ORGANISM, Equals("homo sapiens")),
            FieldRule::new(
                AGE,
                pattern(
                    r"^\d+Y(\d+M)?(\d+D)?(-\d+Y(\d+M)?(\d+D)?)?$",
                    "an age such as 40Y, 30Y6M or 20Y-30Y",
                ),
            ),
            FieldRule::new(SEX, OneOf(&["male", "female", "intersex", "unknown"])),
            FieldRule::new(DISEASE, OntologyTerm(Ontology::Efo)),
        ]),
        TemplateHandle::Vertebrates => rules.extend([
            FieldRule::new(DEVELOPMENTAL_STAGE, Required),
            FieldRule::new(STRAIN, Recommended),
            FieldRule::new(SEX, Recommended),
            FieldRule::new(ORGANISM, Excludes("homo sapiens")),
        ]),
        TemplateHandle::Invertebrates => rules.extend([
            FieldRule::new(DEVELOPMENTAL_STAGE, Required),
            FieldRule::new(STRAIN, Recommended),
        ]),
        TemplateHandle::Plants => rules.extend([
            FieldRule::new(DEVELOPMENTAL_STAGE, Required),
            FieldRule::new(GENOTYPE, Recommended),
        ]),
        TemplateHandle::CellLines => rules.extend([
            FieldRule::new(CELL_TYPE, Required),
            FieldRule::new(CELL_LINE, Required),
            FieldRule::new(DISEASE, Recommended),
            FieldRule::new(CELL_TYPE, OntologyTerm(Ontology::CellOntology)),
        ]),
    }

    rules
}
