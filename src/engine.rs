//! High-level orchestration: the full question-to-explanation pipeline.
//!
//! [`InsightEngine`] owns its collaborators explicitly: the metric catalog
//! and glossary are immutable injected configuration, execution goes
//! through the [`QueryExecutor`] seam, and history/templates go through the
//! optional [`InsightStore`] port. Every operation is synchronous and
//! stateless per call; history writes are fire-and-forget.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::catalog::{Glossary, MetricCatalog, MetricDefinition};
use crate::error::{EngineError, EngineResult};
use crate::exec::{QueryExecutor, SimulatedExecutor};
use crate::explain::{
    assess_quality, explain_value, interpret, parse_result_value, recommend_actions,
    ExplainContext, QualityReport,
};
use crate::history::{
    export_records, template_id, ExportFormat, HistoryFilter, InsightStore, QueryRecord,
    StoreError, Template,
};
use crate::parse::{parse_question, resolve_time_period, ParsedQuestion, TimeWindow};
use crate::sql::{synthesize, validate, SynthesizedQuery, ValidationReport};

/// A fully answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub time_period: String,
    pub metric: MetricDefinition,
    pub sql: String,
    pub value: f64,
    pub quality: QualityReport,
    pub followups: Vec<String>,
}

/// An explained result value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub metric: MetricDefinition,
    pub time_period: String,
    pub context: ExplainContext,
    pub interpretation: String,
    pub actions: Vec<String>,
    pub quality: QualityReport,
}

/// A side-by-side comparison of two metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub time_period: String,
    pub left: MetricDefinition,
    pub right: MetricDefinition,
    pub left_value: f64,
    pub right_value: f64,
}

impl Comparison {
    /// Ratio of left to right; 0 when the right value is 0.
    pub fn ratio(&self) -> f64 {
        if self.right_value == 0.0 {
            0.0
        } else {
            self.left_value / self.right_value
        }
    }
}

/// The question-to-query-to-explanation engine.
pub struct InsightEngine {
    catalog: MetricCatalog,
    glossary: Glossary,
    executor: Box<dyn QueryExecutor>,
    store: Option<Box<dyn InsightStore>>,
}

impl InsightEngine {
    /// Engine over the built-in catalog and glossary, simulated execution,
    /// no persistence.
    pub fn new() -> Self {
        Self::with_catalog(MetricCatalog::builtin(), Glossary::builtin())
    }

    /// Engine over an explicit catalog and glossary.
    pub fn with_catalog(catalog: MetricCatalog, glossary: Glossary) -> Self {
        Self {
            catalog,
            glossary,
            executor: Box::new(SimulatedExecutor),
            store: None,
        }
    }

    /// Substitute the execution backend.
    pub fn with_executor(mut self, executor: Box<dyn QueryExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Attach a history/template store.
    pub fn with_store(mut self, store: Box<dyn InsightStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Parse a question without running it. Zero matched metrics is a
    /// valid outcome, not an error.
    pub fn resolve_question(&self, question: &str, time_period: Option<&str>) -> ParsedQuestion {
        let mut parsed = parse_question(question, &self.catalog, &self.glossary);
        if let Some(period) = time_period {
            parsed.time_period = period.to_string();
        }
        parsed
    }

    /// Resolve a free-form time-period phrase. Never fails; unrecognized
    /// phrases degrade to a 7-day window.
    pub fn resolve_time_window(&self, time_period: &str) -> TimeWindow {
        resolve_time_period(time_period)
    }

    /// Full pipeline: parse, synthesize, execute, assess, record.
    pub fn ask(&self, question: &str, time_period: Option<&str>) -> EngineResult<Answer> {
        let parsed = self.resolve_question(question, time_period);
        let metric_id = parsed
            .primary_metric()
            .ok_or_else(|| EngineError::UnresolvedMetric(question.to_string()))?;
        // resolve() only returns catalog ids, so the lookup cannot miss.
        let metric = self
            .catalog
            .get(metric_id)
            .ok_or_else(|| EngineError::UnknownMetric(metric_id.to_string()))?;

        let window = resolve_time_period(&parsed.time_period);
        let query = synthesize(metric, &window, "", "");
        let sql = query.render();
        let value = self.executor.execute(&sql);
        let quality = assess_quality(&metric.id, &parsed.time_period);
        let followups = self.followups_for(metric);

        self.record(QueryRecord {
            question: question.to_string(),
            time_period: parsed.time_period.clone(),
            sql: sql.clone(),
            result: Some(value),
            metric_id: Some(metric.id.clone()),
            timestamp: Utc::now(),
            quality_score: Some(quality.score()),
        });

        Ok(Answer {
            question: question.to_string(),
            time_period: parsed.time_period,
            metric: metric.clone(),
            sql,
            value,
            quality,
            followups,
        })
    }

    /// Synthesize a query for an explicitly named metric.
    pub fn generate_query(
        &self,
        metric_id: &str,
        time_period: &str,
        extra_filter: &str,
        group_by: &str,
    ) -> EngineResult<SynthesizedQuery> {
        let metric = self
            .catalog
            .get(metric_id)
            .ok_or_else(|| EngineError::UnknownMetric(metric_id.to_string()))?;
        let window = resolve_time_period(time_period);
        Ok(synthesize(metric, &window, extra_filter, group_by))
    }

    /// Lint a query string. Findings are data; this never fails.
    pub fn validate_query(&self, sql: &str) -> ValidationReport {
        validate(sql)
    }

    /// Execute a query through the configured executor.
    pub fn execute(&self, sql: &str) -> f64 {
        self.executor.execute(sql)
    }

    /// Explain a result value with baseline comparison and quality context.
    pub fn explain_result(
        &self,
        result_value: &str,
        metric_id: &str,
        time_period: &str,
    ) -> EngineResult<Explanation> {
        let metric = self
            .catalog
            .get(metric_id)
            .ok_or_else(|| EngineError::UnknownMetric(metric_id.to_string()))?;
        let value = parse_result_value(result_value)?;

        let context = explain_value(metric, value);
        Ok(Explanation {
            interpretation: interpret(metric, &context),
            actions: recommend_actions(&context),
            quality: assess_quality(metric_id, time_period),
            metric: metric.clone(),
            time_period: time_period.to_string(),
            context,
        })
    }

    /// Compare two metrics for the same time period. Bypasses NL parsing.
    pub fn compare_metrics(
        &self,
        left_id: &str,
        right_id: &str,
        time_period: &str,
    ) -> EngineResult<Comparison> {
        let left = self
            .catalog
            .get(left_id)
            .ok_or_else(|| EngineError::UnknownMetric(left_id.to_string()))?;
        let right = self
            .catalog
            .get(right_id)
            .ok_or_else(|| EngineError::UnknownMetric(right_id.to_string()))?;

        let left_value = self
            .executor
            .execute(&format!("SELECT {} FROM {}", left.expression, left.table));
        let right_value = self
            .executor
            .execute(&format!("SELECT {} FROM {}", right.expression, right.table));

        Ok(Comparison {
            time_period: time_period.to_string(),
            left: left.clone(),
            right: right.clone(),
            left_value,
            right_value,
        })
    }

    /// Assess data quality for a metric.
    pub fn check_data_quality(
        &self,
        metric_id: &str,
        time_period: &str,
    ) -> EngineResult<QualityReport> {
        if !self.catalog.contains(metric_id) {
            return Err(EngineError::UnknownMetric(metric_id.to_string()));
        }
        Ok(assess_quality(metric_id, time_period))
    }

    /// "Did you mean" lookup, at most 3 display names.
    pub fn find_similar(&self, query: &str) -> Vec<String> {
        self.catalog.find_similar(query)
    }

    /// Follow-up suggestions for a question.
    pub fn suggest_followups(&self, question: &str) -> EngineResult<Vec<String>> {
        let parsed = self.resolve_question(question, None);
        let metric_id = parsed
            .primary_metric()
            .ok_or_else(|| EngineError::UnresolvedMetric(question.to_string()))?;
        let metric = self
            .catalog
            .get(metric_id)
            .ok_or_else(|| EngineError::UnknownMetric(metric_id.to_string()))?;
        Ok(self.followups_for(metric))
    }

    fn followups_for(&self, metric: &MetricDefinition) -> Vec<String> {
        let name = metric.name.to_lowercase();
        let mut suggestions = vec![
            format!("What was {} for the previous period?", name),
            format!("Show me {} broken down by day", name),
            format!("Compare {} to the same period last year", name),
        ];
        match metric.id.as_str() {
            "active_users" => {
                suggestions.push("What's the conversion rate for these users?".into())
            }
            "revenue" => suggestions.push("What's the average transaction value?".into()),
            _ => {}
        }
        suggestions
    }

    /// Save a named template. Fails with `DuplicateTemplate` on a name
    /// collision; the first SQL is retained.
    pub fn save_template(
        &self,
        name: &str,
        sql: &str,
        description: &str,
    ) -> EngineResult<Template> {
        let store = self.store_or_err()?;
        let now = Utc::now();
        let template = Template {
            id: template_id(name),
            name: name.to_string(),
            sql: sql.to_string(),
            description: description.to_string(),
            created_at: now,
            updated_at: now,
            run_count: 0,
        };
        store.save_template(&template)?;
        Ok(template)
    }

    /// All stored templates, ordered by name.
    pub fn list_templates(&self) -> EngineResult<Vec<Template>> {
        Ok(self.store_or_err()?.list_templates()?)
    }

    /// Delete a template by name or id. Returns whether it existed.
    pub fn delete_template(&self, name: &str) -> EngineResult<bool> {
        Ok(self.store_or_err()?.delete_template(&template_id(name))?)
    }

    /// Run a stored template: bump its run count, then execute its SQL.
    pub fn run_template(&self, name: &str) -> EngineResult<(Template, f64)> {
        let store = self.store_or_err()?;
        let id = template_id(name);
        let template = store
            .get_template(&id)?
            .ok_or(StoreError::TemplateNotFound(id.clone()))?;
        store.increment_run_count(&id)?;
        let value = self.executor.execute(&template.sql);
        Ok((template, value))
    }

    /// Recent history entries, newest first.
    pub fn recent_history(&self, limit: usize) -> EngineResult<Vec<QueryRecord>> {
        Ok(self.store_or_err()?.recent_queries(limit)?)
    }

    /// History entries matching a search term.
    pub fn search_history(&self, term: &str, limit: usize) -> EngineResult<Vec<QueryRecord>> {
        Ok(self.store_or_err()?.search_queries(term, limit)?)
    }

    /// History entries matching optional metric and date filters, newest
    /// first.
    pub fn filtered_history(
        &self,
        filter: &HistoryFilter,
        limit: usize,
    ) -> EngineResult<Vec<QueryRecord>> {
        Ok(self.store_or_err()?.filtered_queries(filter, limit)?)
    }

    /// Export matching history entries to a file as JSON or CSV. Returns
    /// the number of records written.
    pub fn export_history(
        &self,
        path: &std::path::Path,
        format: ExportFormat,
        filter: &HistoryFilter,
        limit: usize,
    ) -> EngineResult<usize> {
        let records = self.store_or_err()?.filtered_queries(filter, limit)?;
        let data = export_records(&records, format)?;
        std::fs::write(path, data).map_err(StoreError::from)?;
        tracing::info!(path = %path.display(), count = records.len(), "exported query history");
        Ok(records.len())
    }

    /// Aggregate history statistics.
    pub fn history_statistics(&self) -> EngineResult<crate::history::HistoryStats> {
        Ok(self.store_or_err()?.statistics()?)
    }

    /// Clear history, optionally only entries older than a cutoff.
    pub fn clear_history(&self, older_than_days: Option<u32>) -> EngineResult<usize> {
        Ok(self.store_or_err()?.clear_history(older_than_days)?)
    }

    fn store_or_err(&self) -> EngineResult<&dyn InsightStore> {
        self.store
            .as_deref()
            .ok_or(EngineError::StoreUnavailable)
    }

    /// Fire-and-forget history write. Store failures are logged, never
    /// propagated, and there is no read-after-write dependency within a
    /// request.
    fn record(&self, record: QueryRecord) {
        if let Some(store) = &self.store {
            if let Err(e) = store.record_query(&record) {
                tracing::warn!(error = %e, "failed to record query history");
            }
        }
    }
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}
