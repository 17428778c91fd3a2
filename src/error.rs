//! Crate-wide error taxonomy.
//!
//! Every variant here is recoverable: callers get a structured error back
//! and decide how to report it. Validation findings are data
//! ([`crate::sql::ValidationReport`]), never errors. The only conditions
//! that abort startup are config and store open failures.

use crate::config::SettingsError;
use crate::history::StoreError;

/// Errors produced by the insight engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No metric could be identified in a natural-language question.
    #[error("no metric identified in question: {0:?}")]
    UnresolvedMetric(String),

    /// An explicitly named metric is not in the catalog.
    #[error("metric '{0}' not found in catalog")]
    UnknownMetric(String),

    /// A result value could not be parsed as a number.
    #[error("could not parse result value: {0:?}")]
    UnparseableValue(String),

    /// A timestamp argument was not valid RFC 3339.
    #[error("invalid RFC 3339 timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// History/template store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A history/template operation was requested but no store is
    /// configured.
    #[error("no history store configured")]
    StoreUnavailable,

    /// Configuration failure.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

pub type EngineResult<T> = Result<T, EngineError>;
