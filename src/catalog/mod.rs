//! Metric catalog: the static mapping from metric identifier to definition.
//!
//! The catalog is read-only, process-wide configuration. Definitions are
//! scanned in insertion order, which makes metric resolution deterministic
//! for a given question and catalog. Matching is substring containment on
//! the id and display name, not tokenization; that trade-off is preserved
//! from the reference behavior and exercised in the test suite.

pub mod glossary;

pub use glossary::{Glossary, GlossaryEntry};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named, pre-defined aggregation over a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// Unique identifier, e.g. `active_users`.
    pub id: String,
    /// Human-readable display name, e.g. `Active Users`.
    pub name: String,
    /// What the metric measures.
    pub description: String,
    /// Aggregation SQL expression, opaque to the core.
    pub expression: String,
    /// Source table the metric is computed from.
    pub table: String,
    /// Base filter predicate, may be empty.
    #[serde(default)]
    pub filter: String,
    /// Display unit, e.g. `users`, `dollars`, `percent`.
    pub unit: String,
}

/// Ordered, immutable collection of metric definitions.
#[derive(Debug, Clone, Default)]
pub struct MetricCatalog {
    metrics: Vec<MetricDefinition>,
    index: HashMap<String, usize>,
}

impl MetricCatalog {
    /// Build a catalog from an ordered list of definitions.
    ///
    /// Later definitions with a duplicate id replace earlier ones in the
    /// index but keep the original scan position.
    pub fn new(metrics: Vec<MetricDefinition>) -> Self {
        let index = metrics
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        Self { metrics, index }
    }

    /// The built-in catalog used when no configuration overrides it.
    pub fn builtin() -> Self {
        Self::new(vec![
            MetricDefinition {
                id: "active_users".into(),
                name: "Active Users".into(),
                description: "Unique users who logged in at least once in the time period".into(),
                expression: "COUNT(DISTINCT user_id)".into(),
                table: "analytics.user_events".into(),
                filter: "event_type = 'login'".into(),
                unit: "users".into(),
            },
            MetricDefinition {
                id: "revenue".into(),
                name: "Total Revenue".into(),
                description: "Sum of all completed transaction amounts".into(),
                expression: "SUM(amount)".into(),
                table: "analytics.transactions".into(),
                filter: "status = 'completed'".into(),
                unit: "dollars".into(),
            },
            MetricDefinition {
                id: "conversion_rate".into(),
                name: "Conversion Rate".into(),
                description: "Percentage of visitors who completed a purchase".into(),
                expression: "COUNT(DISTINCT CASE WHEN purchased = true THEN user_id END) \
                             * 100.0 / COUNT(DISTINCT user_id)"
                    .into(),
                table: "analytics.user_sessions".into(),
                filter: String::new(),
                unit: "percent".into(),
            },
            MetricDefinition {
                id: "signups".into(),
                name: "New Signups".into(),
                description: "Count of new user registrations".into(),
                expression: "COUNT(DISTINCT user_id)".into(),
                table: "analytics.signups".into(),
                filter: String::new(),
                unit: "users".into(),
            },
        ])
    }

    /// Look up a metric by id.
    pub fn get(&self, id: &str) -> Option<&MetricDefinition> {
        self.index.get(id).map(|&i| &self.metrics[i])
    }

    /// Whether the catalog contains a metric id.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All definitions in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.metrics.iter()
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Scan normalized question text for metric mentions.
    ///
    /// A metric matches when its id or lowercased display name appears as a
    /// substring of the text. Returns ids in catalog scan order; an empty
    /// result means the question is unparseable, which is a valid outcome,
    /// not an error.
    pub fn resolve(&self, normalized_text: &str) -> Vec<String> {
        self.metrics
            .iter()
            .filter(|m| {
                normalized_text.contains(m.id.as_str())
                    || normalized_text.contains(&m.name.to_lowercase())
            })
            .map(|m| m.id.clone())
            .collect()
    }

    /// Fuzzy "did you mean" lookup: up to 3 display names whose id or name
    /// contains the query as a substring. Empty when nothing matches.
    pub fn find_similar(&self, query: &str) -> Vec<String> {
        let query = query.to_lowercase();
        self.metrics
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&query) || m.id.contains(&query))
            .map(|m| m.name.clone())
            .take(3)
            .collect()
    }
}
