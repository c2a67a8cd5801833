//! Template registry: the fixed catalog of validation templates.
//!
//! Built once from [`TEMPLATE_DEFINITIONS`] and never mutated afterwards.
//! Lookups are case-insensitive and accept any alias of a template.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Rule-engine configuration selected by a template.
///
/// Opaque to the aggregator; each [`RuleEngine`](crate::engine::RuleEngine)
/// decides what rule set a handle stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateHandle {
    MsProteomics,
    Human,
    Vertebrates,
    Invertebrates,
    Plants,
    CellLines,
}

/// A validation template as exposed to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    /// Canonical identifier reported in `templates_used`.
    pub id: &'static str,
    /// Alternative (including legacy) names that resolve to this template.
    pub aliases: &'static [&'static str],
    pub display_name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub handle: TemplateHandle,
}

// ---------------------------------------------------------------------------
// Static catalog
// ---------------------------------------------------------------------------

/// The built-in catalog, in listing order.
pub const TEMPLATE_DEFINITIONS: &[TemplateDescriptor] = &[
    TemplateDescriptor {
        id: "default",
        aliases: &["ms-proteomics", "ms_proteomics"],
        display_name: "MS proteomics",
        description: "Standard mass spectrometry proteomics SDRF template",
        version: "1.0.0",
        handle: TemplateHandle::MsProteomics,
    },
    TemplateDescriptor {
        id: "human",
        aliases: &["homo-sapiens"],
        display_name: "Human",
        description: "Human samples: adds age, sex, disease and developmental stage",
        version: "1.0.0",
        handle: TemplateHandle::Human,
    },
    TemplateDescriptor {
        id: "vertebrates",
        aliases: &["nonhuman-vertebrates"],
        display_name: "Vertebrates",
        description: "Non-human vertebrate organisms",
        version: "1.0.0",
        handle: TemplateHandle::Vertebrates,
    },
    TemplateDescriptor {
        id: "invertebrates",
        aliases: &["nonvertebrates"],
        display_name: "Invertebrates",
        description: "Invertebrate organisms",
        version: "1.0.0",
        handle: TemplateHandle::Invertebrates,
    },
    TemplateDescriptor {
        id: "plants",
        aliases: &["plant"],
        display_name: "Plants",
        description: "Plant-specific fields",
        version: "1.0.0",
        handle: TemplateHandle::Plants,
    },
    TemplateDescriptor {
        id: "cell-lines",
        aliases: &["cell_lines", "cell-line"],
        display_name: "Cell lines",
        description: "Cell line experiments",
        version: "1.0.0",
        handle: TemplateHandle::CellLines,
    },
];

static GLOBAL: LazyLock<TemplateRegistry> =
    LazyLock::new(|| TemplateRegistry::new(TEMPLATE_DEFINITIONS.to_vec()));

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Read-only lookup table from identifiers and aliases to templates.
#[derive(Debug)]
pub struct TemplateRegistry {
    templates: Vec<TemplateDescriptor>,
    index: HashMap<String, usize>,
}

impl TemplateRegistry {
    /// Build a registry from definitions. Later definitions never override
    /// a name already claimed by an earlier one.
    pub fn new(templates: Vec<TemplateDescriptor>) -> Self {
        let mut index = HashMap::new();
        for (position, template) in templates.iter().enumerate() {
            let names = std::iter::once(template.id).chain(template.aliases.iter().copied());
            for name in names {
                index.entry(lookup_key(name)).or_insert(position);
            }
        }
        Self { templates, index }
    }

    /// The process-wide registry of built-in templates.
    pub fn global() -> &'static TemplateRegistry {
        &GLOBAL
    }

    /// Look up a template by identifier or alias. Returns `None` when unknown.
    pub fn resolve(&self, identifier: &str) -> Option<&TemplateDescriptor> {
        self.index
            .get(&lookup_key(identifier))
            .map(|&position| &self.templates[position])
    }

    /// All templates in catalog order.
    pub fn list_all(&self) -> &[TemplateDescriptor] {
        &self.templates
    }

    /// Alias to canonical identifier, for every alias in the catalog.
    pub fn legacy_mappings(&self) -> BTreeMap<&'static str, &'static str> {
        self.templates
            .iter()
            .flat_map(|t| t.aliases.iter().map(move |alias| (*alias, t.id)))
            .collect()
    }
}

fn lookup_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
