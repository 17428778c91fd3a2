//! Query synthesis: metric definition + time window + optional filters and
//! grouping, assembled into a structured query.
//!
//! Predicate ordering is fixed at [metric base filter, date filter, extra
//! filter] so identical inputs always render byte-identical SQL. That
//! determinism is the contract callers (and the history log) rely on.

use crate::catalog::MetricDefinition;
use crate::parse::TimeWindow;
use serde::{Deserialize, Serialize};

/// A synthesized query, held structured until rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use = "builders have no effect until rendered"]
pub struct SynthesizedQuery {
    /// SELECT list expression (group-by columns prefixed when grouping).
    pub select: String,
    /// Source table.
    pub table: String,
    /// WHERE predicates, AND-combined in insertion order.
    pub predicates: Vec<String>,
    /// Optional GROUP BY expression, appended verbatim.
    pub group_by: Option<String>,
}

impl SynthesizedQuery {
    /// Render to SQL text. Deterministic: the same structure always
    /// produces the same bytes.
    pub fn render(&self) -> String {
        let mut sql = format!("SELECT {}\nFROM {}", self.select, self.table);
        if !self.predicates.is_empty() {
            sql.push_str("\nWHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }
        if let Some(group_by) = &self.group_by {
            sql.push_str("\nGROUP BY ");
            sql.push_str(group_by);
        }
        sql
    }
}

/// Synthesize a query for a metric over a time window.
///
/// `extra_filter` and `group_by` are passed through verbatim when
/// non-empty. Callers resolve the metric first; an unresolved metric is
/// reported by the caller as `UnresolvedMetric` or `UnknownMetric`
/// depending on how the request arrived.
pub fn synthesize(
    metric: &MetricDefinition,
    window: &TimeWindow,
    extra_filter: &str,
    group_by: &str,
) -> SynthesizedQuery {
    let select = if group_by.is_empty() {
        metric.expression.clone()
    } else {
        format!("{}, {}", group_by, metric.expression)
    };

    let mut predicates = Vec::new();
    if !metric.filter.is_empty() {
        predicates.push(metric.filter.clone());
    }
    predicates.push(window.predicate.clone());
    if !extra_filter.is_empty() {
        predicates.push(extra_filter.to_string());
    }

    SynthesizedQuery {
        select,
        table: metric.table.clone(),
        predicates,
        group_by: (!group_by.is_empty()).then(|| group_by.to_string()),
    }
}
