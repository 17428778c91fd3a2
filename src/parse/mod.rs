//! Natural-language question parsing.
//!
//! Parsing is keyword and pattern based by design: glossary terms are
//! rewritten to canonical vocabulary, the catalog is scanned for metric
//! mentions, and a time-period phrase is detected with an ordered regex
//! cascade. There is no tokenizer and no model; a metric matches even as a
//! fragment of a larger word, which is a deliberate simplicity/precision
//! trade-off carried over from the reference behavior.

pub mod time;

pub use time::{detect_time_phrase, resolve_time_period, TimeWindow, DEFAULT_TIME_PERIOD};

use crate::catalog::{Glossary, MetricCatalog};
use serde::{Deserialize, Serialize};

/// The outcome of parsing a question: which metrics were mentioned, in
/// catalog scan order, and which time-period phrase applies.
///
/// Zero matched metrics is a valid result and signals an unparseable
/// question to the caller; it is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuestion {
    /// The question exactly as asked.
    pub question: String,
    /// Matched metric ids, catalog scan order. Every id exists in the
    /// catalog that produced this value.
    pub metrics: Vec<String>,
    /// Detected (or defaulted) time-period phrase.
    pub time_period: String,
}

impl ParsedQuestion {
    /// The first matched metric, if any.
    pub fn primary_metric(&self) -> Option<&str> {
        self.metrics.first().map(String::as_str)
    }
}

/// Parse a natural-language question against a catalog and glossary.
pub fn parse_question(
    question: &str,
    catalog: &MetricCatalog,
    glossary: &Glossary,
) -> ParsedQuestion {
    let normalized = glossary.normalize(question);
    let metrics = catalog.resolve(&normalized);
    let time_period = detect_time_phrase(&normalized);

    tracing::debug!(
        question,
        matched = metrics.len(),
        time_period = %time_period,
        "parsed question"
    );

    ParsedQuestion {
        question: question.to_string(),
        metrics,
        time_period,
    }
}
