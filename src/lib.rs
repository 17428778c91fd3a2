//! # Glean
//!
//! Translate natural-language analytics questions into parameterized,
//! auditable SQL queries, then explain the resulting numbers with
//! historical context and data-quality signals.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Question Text                         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [catalog::Glossary]
//! ┌─────────────────────────────────────────────────────────┐
//! │           Normalized Text (canonical vocabulary)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [parse + catalog::MetricCatalog]
//! ┌─────────────────────────────────────────────────────────┐
//! │        ParsedQuestion (metrics + time window)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::synth]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SynthesizedQuery                        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [exec::QueryExecutor]
//! ┌─────────────────────────────────────────────────────────┐
//! │      Result Value → [explain] → [report] Text            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog and glossary are read-only, process-wide configuration,
//! safe for unsynchronized concurrent reads. The only shared mutable state
//! is the history/template store behind the [`history::InsightStore`]
//! port, which the engine treats as a fire-and-forget side effect.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod explain;
pub mod history;
pub mod parse;
pub mod report;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{Glossary, GlossaryEntry, MetricCatalog, MetricDefinition};
    pub use crate::engine::{Answer, Comparison, Explanation, InsightEngine};
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::exec::{QueryExecutor, SimulatedExecutor};
    pub use crate::explain::{Direction, ExplainContext, QualityReport, Significance};
    pub use crate::history::{
        ExportFormat, HistoryFilter, InsightStore, QueryRecord, SqliteStore, Template,
    };
    pub use crate::parse::{ParsedQuestion, TimeWindow, DEFAULT_TIME_PERIOD};
    pub use crate::sql::{SynthesizedQuery, ValidationReport};
}

// Also export the engine at the crate root for convenience
pub use engine::InsightEngine;
pub use error::{EngineError, EngineResult};
