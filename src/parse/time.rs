//! Time window resolution: free-form phrase to a SQL date predicate.
//!
//! The resolver is an ordered cascade with the first match winning, and it
//! never fails: unrecognized phrases silently degrade to a 7-day window.
//! That makes it lossy; callers must treat the returned predicate, not the
//! original phrase, as the source of truth for what was actually queried.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default phrase used across the crate when no time period is given.
pub const DEFAULT_TIME_PERIOD: &str = "last 7 days";

// Literal "last N days" / "past N weeks" only. "past N days" and
// "last N weeks" are unrecognized and degrade to the default window.
static LAST_N_DAYS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"last\s+(\d+)\s+days?").expect("valid regex"));
static PAST_N_WEEKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"past\s+(\d+)\s+weeks?").expect("valid regex"));

/// A resolved time window: the originating phrase plus the canonical
/// filter predicate derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub phrase: String,
    pub predicate: String,
}

fn days_predicate(days: u64) -> String {
    format!("event_date >= CURRENT_DATE - INTERVAL '{} days'", days)
}

/// Resolve a free-form time-period phrase to a SQL predicate.
///
/// Cascade, first match wins:
/// 1. `last N days`
/// 2. `past N weeks` (converted to `N*7` days)
/// 3. `this month` (truncate to month boundary)
/// 4. `last month` (previous calendar month range)
/// 5. fallback: 7-day window
pub fn resolve_time_period(phrase: &str) -> TimeWindow {
    let lower = phrase.to_lowercase();

    let predicate = if let Some(caps) = LAST_N_DAYS.captures(&lower) {
        let days: u64 = caps[1].parse().unwrap_or(7);
        days_predicate(days)
    } else if let Some(caps) = PAST_N_WEEKS.captures(&lower) {
        let weeks: u64 = caps[1].parse().unwrap_or(1);
        days_predicate(weeks * 7)
    } else if lower.contains("this month") {
        "event_date >= DATE_TRUNC('month', CURRENT_DATE)".to_string()
    } else if lower.contains("last month") {
        "event_date >= DATE_TRUNC('month', CURRENT_DATE - INTERVAL '1 month') \
         AND event_date < DATE_TRUNC('month', CURRENT_DATE)"
            .to_string()
    } else {
        days_predicate(7)
    };

    TimeWindow {
        phrase: phrase.to_string(),
        predicate,
    }
}

/// Detect a time-period phrase inside normalized question text.
///
/// Returns the canonical phrase a caller would pass to
/// [`resolve_time_period`]. Ordered cascade; defaults to
/// [`DEFAULT_TIME_PERIOD`] when nothing matches.
pub fn detect_time_phrase(normalized_text: &str) -> String {
    static LAST_MONTH: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"last\s+month").expect("valid regex"));
    static THIS_MONTH: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"this\s+month").expect("valid regex"));
    static LAST_WEEK: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"last\s+week").expect("valid regex"));

    if let Some(caps) = LAST_N_DAYS.captures(normalized_text) {
        return format!("last {} days", &caps[1]);
    }
    if let Some(caps) = PAST_N_WEEKS.captures(normalized_text) {
        let weeks: u64 = caps[1].parse().unwrap_or(1);
        return format!("last {} days", weeks * 7);
    }
    if LAST_MONTH.is_match(normalized_text) {
        return "last 30 days".to_string();
    }
    if THIS_MONTH.is_match(normalized_text) {
        return "this month".to_string();
    }
    if LAST_WEEK.is_match(normalized_text) {
        return "last 7 days".to_string();
    }
    DEFAULT_TIME_PERIOD.to_string()
}
