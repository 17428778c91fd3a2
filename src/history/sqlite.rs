//! SQLite-backed history and template store.
//!
//! The default database lives at `~/.glean/history.db`. Timestamps are
//! stored as RFC 3339 text so rows stay readable with any SQLite shell.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    HistoryFilter, HistoryStats, InsightStore, QueryRecord, StoreError, StoreResult, Template,
};

/// SQLite-backed [`InsightStore`].
pub struct SqliteStore {
    conn: std::sync::Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the store at the default location
    /// (`~/.glean/history.db`).
    pub fn open_default() -> StoreResult<Self> {
        let base = dirs::home_dir().ok_or(StoreError::NoDataDir)?;
        Self::open(base.join(".glean").join("history.db"))
    }

    /// Open or create the store at a specific path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        let store = Self {
            conn: std::sync::Mutex::new(conn),
        };
        store.init()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: std::sync::Mutex::new(conn),
        };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> StoreResult<()> {
        let conn = self.lock();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS query_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                time_period TEXT NOT NULL,
                sql_query TEXT NOT NULL,
                result_value REAL,
                metric_id TEXT,
                timestamp TEXT NOT NULL,
                quality_score INTEGER
            );

            CREATE TABLE IF NOT EXISTS query_templates (
                template_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                sql_query TEXT NOT NULL,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                run_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_history_timestamp
                ON query_history(timestamp);
            CREATE INDEX IF NOT EXISTS idx_history_metric
                ON query_history(metric_id);
            ",
        )?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned mutex means a panic mid-statement; propagating the
        // panic is the only sound option.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<QueryRecord> {
    let ts: String = row.get("timestamp")?;
    Ok(QueryRecord {
        question: row.get("question")?,
        time_period: row.get("time_period")?,
        sql: row.get("sql_query")?,
        result: row.get("result_value")?,
        metric_id: row.get("metric_id")?,
        timestamp: parse_timestamp(&ts),
        quality_score: row.get::<_, Option<i64>>("quality_score")?.map(|v| v as u32),
    })
}

fn template_from_row(row: &Row<'_>) -> rusqlite::Result<Template> {
    let created: String = row.get("created_at")?;
    let updated: String = row.get("updated_at")?;
    Ok(Template {
        id: row.get("template_id")?,
        name: row.get("name")?,
        sql: row.get("sql_query")?,
        description: row.get("description")?,
        created_at: parse_timestamp(&created),
        updated_at: parse_timestamp(&updated),
        run_count: row.get::<_, i64>("run_count")? as u64,
    })
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl InsightStore for SqliteStore {
    fn record_query(&self, record: &QueryRecord) -> StoreResult<i64> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO query_history
             (question, time_period, sql_query, result_value, metric_id, timestamp, quality_score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.question,
                record.time_period,
                record.sql,
                record.result,
                record.metric_id,
                record.timestamp.to_rfc3339(),
                record.quality_score.map(|v| v as i64),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn recent_queries(&self, limit: usize) -> StoreResult<Vec<QueryRecord>> {
        self.filtered_queries(&HistoryFilter::default(), limit)
    }

    fn filtered_queries(
        &self,
        filter: &HistoryFilter,
        limit: usize,
    ) -> StoreResult<Vec<QueryRecord>> {
        let mut sql = String::from("SELECT * FROM query_history WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(metric_id) = &filter.metric_id {
            sql.push_str(" AND metric_id = ?");
            params.push(Box::new(metric_id.clone()));
        }
        if let Some(since) = &filter.since {
            sql.push_str(" AND timestamp >= ?");
            params.push(Box::new(since.to_rfc3339()));
        }
        if let Some(until) = &filter.until {
            sql.push_str(" AND timestamp <= ?");
            params.push(Box::new(until.to_rfc3339()));
        }
        sql.push_str(" ORDER BY timestamp DESC, id DESC LIMIT ?");
        params.push(Box::new(limit as i64));

        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), record_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn search_queries(&self, term: &str, limit: usize) -> StoreResult<Vec<QueryRecord>> {
        let pattern = format!("%{}%", term);
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT * FROM query_history
             WHERE question LIKE ?1 OR sql_query LIKE ?1
             ORDER BY timestamp DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![pattern, limit as i64], record_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn statistics(&self) -> StoreResult<HistoryStats> {
        let conn = self.lock();
        let total: i64 =
            conn.query_row("SELECT COUNT(*) FROM query_history", [], |row| row.get(0))?;

        let mut stmt = conn.prepare(
            "SELECT metric_id, COUNT(*) AS n FROM query_history
             WHERE metric_id IS NOT NULL
             GROUP BY metric_id ORDER BY n DESC LIMIT 5",
        )?;
        let most_used = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let avg_quality: Option<f64> = conn.query_row(
            "SELECT AVG(quality_score) FROM query_history WHERE quality_score IS NOT NULL",
            [],
            |row| row.get(0),
        )?;

        Ok(HistoryStats {
            total_queries: total as u64,
            most_used_metrics: most_used,
            avg_quality_score: avg_quality,
        })
    }

    fn clear_history(&self, older_than_days: Option<u32>) -> StoreResult<usize> {
        let conn = self.lock();
        let deleted = match older_than_days {
            Some(days) => {
                let cutoff = (Utc::now() - Duration::days(days as i64)).to_rfc3339();
                conn.execute("DELETE FROM query_history WHERE timestamp < ?1", [cutoff])?
            }
            None => conn.execute("DELETE FROM query_history", [])?,
        };
        Ok(deleted)
    }

    fn save_template(&self, template: &Template) -> StoreResult<()> {
        let conn = self.lock();
        let exists: Option<String> = conn
            .query_row(
                "SELECT template_id FROM query_templates WHERE template_id = ?1",
                [&template.id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(StoreError::DuplicateTemplate(template.name.clone()));
        }

        conn.execute(
            "INSERT INTO query_templates
             (template_id, name, sql_query, description, created_at, updated_at, run_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                template.id,
                template.name,
                template.sql,
                template.description,
                template.created_at.to_rfc3339(),
                template.updated_at.to_rfc3339(),
                template.run_count as i64,
            ],
        )?;
        Ok(())
    }

    fn get_template(&self, id: &str) -> StoreResult<Option<Template>> {
        let conn = self.lock();
        let template = conn
            .query_row(
                "SELECT * FROM query_templates WHERE template_id = ?1",
                [id],
                template_from_row,
            )
            .optional()?;
        Ok(template)
    }

    fn list_templates(&self) -> StoreResult<Vec<Template>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT * FROM query_templates ORDER BY name")?;
        let rows = stmt.query_map([], template_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn delete_template(&self, id: &str) -> StoreResult<bool> {
        let conn = self.lock();
        let deleted = conn.execute("DELETE FROM query_templates WHERE template_id = ?1", [id])?;
        Ok(deleted > 0)
    }

    fn increment_run_count(&self, id: &str) -> StoreResult<()> {
        let conn = self.lock();
        let updated = conn.execute(
            "UPDATE query_templates
             SET run_count = run_count + 1, updated_at = ?1
             WHERE template_id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(StoreError::TemplateNotFound(id.to_string()));
        }
        Ok(())
    }
}
