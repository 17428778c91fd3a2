//! Static, rule-based query linting.
//!
//! Every rule runs on every call; findings are data, never errors, and only
//! issues affect the verdict. Rules scan raw query text for keywords, so a
//! keyword inside a string literal or comment can false-positive. That is
//! accepted for a linter-grade tool and documented in the test suite.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Column names treated as evidence of a date filter.
const DATE_COLUMNS: [&str; 4] = ["event_date", "created_at", "timestamp", "date"];

/// Aggregate functions checked for the missing-GROUP-BY recommendation.
const AGGREGATES: [&str; 5] = ["COUNT", "SUM", "AVG", "MIN", "MAX"];

/// Findings from linting one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ValidationReport {
    /// Problems that block execution.
    pub issues: Vec<String>,
    /// Likely-performance problems; never fail the verdict.
    pub warnings: Vec<String>,
    /// Good-practice nudges; never fail the verdict.
    pub recommendations: Vec<String>,
}

impl ValidationReport {
    /// Pass iff no issues. Warnings and recommendations do not count.
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }
}

// Serialized by hand so the derived verdict travels with the findings.
impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationReport", 4)?;
        state.serialize_field("issues", &self.issues)?;
        state.serialize_field("warnings", &self.warnings)?;
        state.serialize_field("recommendations", &self.recommendations)?;
        state.serialize_field("passed", &self.passed())?;
        state.end()
    }
}

/// Lint a query string, synthesized or externally authored.
pub fn validate(sql: &str) -> ValidationReport {
    let mut report = ValidationReport::default();
    let upper = sql.to_uppercase();
    let lower = sql.to_lowercase();

    if !sql.trim().to_uppercase().starts_with("SELECT") {
        report.issues.push("Query must start with SELECT".into());
    }
    if !upper.contains("FROM") {
        report.issues.push("Query missing FROM clause".into());
    }

    if upper.contains("SELECT *") {
        report
            .warnings
            .push("SELECT * can be slow - specify only needed columns".into());
    }
    if !upper.contains("WHERE") {
        report
            .warnings
            .push("No WHERE clause - query will scan entire table".into());
    }

    if !DATE_COLUMNS.iter().any(|col| lower.contains(col)) {
        report
            .recommendations
            .push("Consider adding a date filter to improve performance".into());
    }

    let has_aggregate = AGGREGATES.iter().any(|agg| upper.contains(agg));
    if has_aggregate && !upper.contains("GROUP BY") {
        report
            .recommendations
            .push("Using aggregation without GROUP BY - result will be a single row".into());
    }

    report
}
