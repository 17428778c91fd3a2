//! Statistical interpretation of query results.
//!
//! The baseline is derived deterministically from the metric id and the
//! observed value; it stands in for a real previous-period query. The
//! contract worth keeping is determinism, not statistical validity: the
//! same (value, metric) pair always produces the same context, so
//! explanations are reproducible.

pub mod quality;

pub use quality::{assess_quality, QualityReport};

use crate::catalog::MetricDefinition;
use crate::error::{EngineError, EngineResult};
use crate::exec::text_hash;
use serde::{Deserialize, Serialize};

/// Which way the value moved against the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Increase => write!(f, "increase"),
            Direction::Decrease => write!(f, "decrease"),
        }
    }
}

/// Significance classification for a percent change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Significant,
    WithinNormalVariance,
}

impl std::fmt::Display for Significance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Significance::Significant => write!(f, "Significant"),
            Significance::WithinNormalVariance => write!(f, "Within normal variance"),
        }
    }
}

/// Baseline comparison for one result value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainContext {
    /// The observed value.
    pub value: f64,
    /// Deterministic previous-period stand-in.
    pub baseline: f64,
    /// `(value - baseline) / baseline * 100`; 0 when the baseline is 0.
    pub change_pct: f64,
    pub direction: Direction,
    pub significance: Significance,
}

/// Parse a user-supplied result value, tolerating thousands separators.
pub fn parse_result_value(raw: &str) -> EngineResult<f64> {
    raw.replace(',', "")
        .trim()
        .parse::<f64>()
        .map_err(|_| EngineError::UnparseableValue(raw.to_string()))
}

/// Deterministic previous-period baseline for a metric value.
pub fn baseline_for(metric_id: &str, value: f64) -> f64 {
    value * 0.9 + (text_hash(metric_id) % 200) as f64
}

/// Compute the baseline comparison for a result value.
pub fn explain_value(metric: &MetricDefinition, value: f64) -> ExplainContext {
    let baseline = baseline_for(&metric.id, value);
    let change_pct = if baseline == 0.0 {
        0.0
    } else {
        (value - baseline) / baseline * 100.0
    };

    let direction = if change_pct > 0.0 {
        Direction::Increase
    } else {
        Direction::Decrease
    };
    let significance = if change_pct.abs() > 10.0 {
        Significance::Significant
    } else {
        Significance::WithinNormalVariance
    };

    ExplainContext {
        value,
        baseline,
        change_pct,
        direction,
        significance,
    }
}

/// Threshold-driven interpretation text for a computed context.
pub fn interpret(metric: &MetricDefinition, ctx: &ExplainContext) -> String {
    let mut text = format!(
        "The current {} of {:.0} {} represents a {:.1}% {} compared to the baseline of {:.0} {}.",
        metric.name.to_lowercase(),
        ctx.value,
        metric.unit,
        ctx.change_pct.abs(),
        ctx.direction,
        ctx.baseline,
        metric.unit,
    );

    if ctx.change_pct.abs() > 15.0 {
        text.push_str("\n\nThis is a notable change that may warrant investigation.");
    } else if ctx.change_pct.abs() < 5.0 {
        text.push_str("\n\nThis change is within normal variance and likely not significant.");
    }

    text
}

/// Threshold-driven recommended actions for a computed context.
pub fn recommend_actions(ctx: &ExplainContext) -> Vec<String> {
    if ctx.change_pct.abs() > 15.0 {
        vec![
            "Investigate root causes of significant change".into(),
            "Compare to other related metrics".into(),
            "Check for data quality issues or tracking changes".into(),
            "Review recent product/marketing changes".into(),
        ]
    } else {
        vec![
            "Continue monitoring trends".into(),
            "No immediate action required".into(),
        ]
    }
}
