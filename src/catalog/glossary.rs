//! Business glossary: colloquial term to canonical term rewriting.

use serde::{Deserialize, Serialize};

/// A one-directional substitution from a business term to its canonical
/// technical term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub canonical: String,
}

/// Ordered collection of glossary entries.
///
/// Entries are applied in insertion order, so overlapping terms resolve the
/// same way on every call. Replacement is plain substring substitution over
/// lowercased text; there is no tokenization or longest-match priority.
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
}

impl Glossary {
    pub fn new(entries: Vec<GlossaryEntry>) -> Self {
        Self { entries }
    }

    /// The built-in glossary used when no configuration overrides it.
    pub fn builtin() -> Self {
        let pairs = [
            ("customers", "users"),
            ("purchases", "transactions"),
            ("sales", "revenue"),
            ("registrations", "signups"),
            ("conversions", "conversion_rate"),
        ];
        Self::new(
            pairs
                .iter()
                .map(|(term, canonical)| GlossaryEntry {
                    term: (*term).into(),
                    canonical: (*canonical).into(),
                })
                .collect(),
        )
    }

    /// All entries in application order.
    pub fn iter(&self) -> impl Iterator<Item = &GlossaryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowercase the text and replace every occurrence of each business term
    /// with its canonical term. No matches leaves the lowercased input
    /// unchanged; this never fails.
    pub fn normalize(&self, text: &str) -> String {
        let mut normalized = text.to_lowercase();
        for entry in &self.entries {
            normalized = normalized.replace(entry.term.as_str(), &entry.canonical);
        }
        normalized
    }
}
