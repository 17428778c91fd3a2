//! Query history and template storage port.
//!
//! The core treats history writes as fire-and-forget side effects with no
//! read-after-write dependency inside a request; the engine logs store
//! failures and moves on. Template name collisions surface as
//! [`StoreError::DuplicateTemplate`], a recoverable condition the caller
//! reports.

mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors from the history/template store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to determine data directory")]
    NoDataDir,

    #[error("Template '{0}' already exists")]
    DuplicateTemplate(String),

    #[error("Template '{0}' not found")]
    TemplateNotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One executed question, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub question: String,
    pub time_period: String,
    pub sql: String,
    pub result: Option<f64>,
    pub metric_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Composite data quality score at execution time, 0-100.
    pub quality_score: Option<u32>,
}

/// A saved, named, reusable query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Slugified name, unique key.
    pub id: String,
    pub name: String,
    pub sql: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub run_count: u64,
}

/// Filters applied to history reads. The default filters nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryFilter {
    /// Only entries recorded for this metric.
    pub metric_id: Option<String>,
    /// Only entries at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Only entries at or before this instant.
    pub until: Option<DateTime<Utc>>,
}

/// Serialization format for history exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Serialize history records for export.
///
/// JSON is a pretty-printed array; CSV has a header row derived from the
/// record fields, with empty cells for absent optional values.
pub fn export_records(records: &[QueryRecord], format: ExportFormat) -> StoreResult<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for record in records {
                writer.serialize(record)?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| StoreError::Io(e.into_error()))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Aggregates over the history log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_queries: u64,
    /// `(metric_id, count)` pairs, descending by count, at most 5.
    pub most_used_metrics: Vec<(String, u64)>,
    pub avg_quality_score: Option<f64>,
}

/// Slugify a template name into its unique id.
pub fn template_id(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Storage port for history rows and templates.
///
/// Implementations are synchronous; the engine calls them inline and never
/// retries. The default backend is [`SqliteStore`].
pub trait InsightStore: Send + Sync {
    /// Append a query to the history log.
    fn record_query(&self, record: &QueryRecord) -> StoreResult<i64>;

    /// Most recent history entries, newest first.
    fn recent_queries(&self, limit: usize) -> StoreResult<Vec<QueryRecord>>;

    /// History entries matching the filter, newest first.
    fn filtered_queries(&self, filter: &HistoryFilter, limit: usize)
        -> StoreResult<Vec<QueryRecord>>;

    /// History entries whose question or SQL contains the term, newest
    /// first.
    fn search_queries(&self, term: &str, limit: usize) -> StoreResult<Vec<QueryRecord>>;

    /// Aggregate statistics over the log.
    fn statistics(&self) -> StoreResult<HistoryStats>;

    /// Delete history entries, optionally only those older than a cutoff.
    /// Returns the number deleted.
    fn clear_history(&self, older_than_days: Option<u32>) -> StoreResult<usize>;

    /// Save a new template. Fails with [`StoreError::DuplicateTemplate`]
    /// when the slugified name already exists; the stored template is left
    /// untouched in that case.
    fn save_template(&self, template: &Template) -> StoreResult<()>;

    fn get_template(&self, id: &str) -> StoreResult<Option<Template>>;

    /// All templates ordered by name.
    fn list_templates(&self) -> StoreResult<Vec<Template>>;

    /// Delete a template. Returns whether it existed.
    fn delete_template(&self, id: &str) -> StoreResult<bool>;

    /// Bump a template's run count and touch its updated_at.
    fn increment_run_count(&self, id: &str) -> StoreResult<()>;
}
