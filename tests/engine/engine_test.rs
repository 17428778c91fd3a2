use glean::engine::InsightEngine;
use glean::error::EngineError;
use glean::history::{ExportFormat, HistoryFilter, InsightStore, QueryRecord, SqliteStore};
use glean::report;

fn stored_engine() -> InsightEngine {
    InsightEngine::new().with_store(Box::new(SqliteStore::open_in_memory().unwrap()))
}

#[test]
fn test_ask_end_to_end() {
    let engine = InsightEngine::new();
    let answer = engine.ask("How many active users last week?", None).unwrap();

    assert_eq!(answer.metric.id, "active_users");
    assert_eq!(answer.time_period, "last 7 days");
    assert!(answer.sql.starts_with("SELECT COUNT(DISTINCT user_id)\nFROM analytics.user_events"));
    assert!(answer.sql.contains("event_date >= CURRENT_DATE - INTERVAL '7 days'"));
    assert_eq!(answer.quality.score(), 100);
    assert!(!answer.followups.is_empty());
}

#[test]
fn test_ask_glossary_routing() {
    let engine = InsightEngine::new();
    // "sales" routes to revenue through the glossary.
    let answer = engine.ask("How were sales this month?", None).unwrap();
    assert_eq!(answer.metric.id, "revenue");
    assert_eq!(answer.time_period, "this month");
    assert!(answer.sql.contains("DATE_TRUNC('month', CURRENT_DATE)"));
}

#[test]
fn test_ask_period_override() {
    let engine = InsightEngine::new();
    let answer = engine
        .ask("How many signups?", Some("last 90 days"))
        .unwrap();
    assert_eq!(answer.time_period, "last 90 days");
    assert!(answer.sql.contains("INTERVAL '90 days'"));
}

#[test]
fn test_ask_unresolved_question_is_recoverable() {
    let engine = InsightEngine::new();
    let err = engine
        .ask("What is our churn rate this quarter?", None)
        .unwrap_err();
    match err {
        EngineError::UnresolvedMetric(question) => {
            assert!(question.contains("churn"));
        }
        other => panic!("expected UnresolvedMetric, got {:?}", other),
    }
}

#[test]
fn test_answers_are_deterministic() {
    let engine = InsightEngine::new();
    let a = engine.ask("revenue last 30 days", None).unwrap();
    let b = engine.ask("revenue last 30 days", None).unwrap();
    assert_eq!(a.sql, b.sql);
    assert_eq!(a.value, b.value);
}

#[test]
fn test_engine_execute_matches_answer_value() {
    let engine = InsightEngine::new();
    let answer = engine.ask("active users last week", None).unwrap();
    assert_eq!(engine.execute(&answer.sql), answer.value);
}

#[test]
fn test_generate_query_scenario() {
    let engine = InsightEngine::new();
    let query = engine
        .generate_query("revenue", "this month", "country = 'US'", "date")
        .unwrap();
    let sql = query.render();

    assert!(sql.starts_with("SELECT date, SUM(amount)\nFROM analytics.transactions"));
    let where_clause = sql
        .lines()
        .find(|l| l.starts_with("WHERE"))
        .expect("WHERE clause");
    assert_eq!(
        where_clause,
        "WHERE status = 'completed' AND event_date >= DATE_TRUNC('month', CURRENT_DATE) AND country = 'US'"
    );
    assert!(sql.ends_with("GROUP BY date"));
}

#[test]
fn test_validate_generated_query_passes() {
    let engine = InsightEngine::new();
    let query = engine
        .generate_query("active_users", "last 7 days", "", "")
        .unwrap();
    let report = engine.validate_query(&query.render());
    assert!(report.passed());
    assert!(report.issues.is_empty());
}

#[test]
fn test_compare_metrics() {
    let engine = InsightEngine::new();
    let cmp = engine
        .compare_metrics("revenue", "active_users", "last 7 days")
        .unwrap();
    assert_eq!(cmp.left.id, "revenue");
    assert_eq!(cmp.right.id, "active_users");
    if cmp.right_value != 0.0 {
        assert!((cmp.ratio() - cmp.left_value / cmp.right_value).abs() < 1e-9);
    }

    let err = engine
        .compare_metrics("revenue", "churn", "last 7 days")
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownMetric(id) if id == "churn"));
}

#[test]
fn test_ask_records_history() {
    let engine = stored_engine();
    engine.ask("How many active users last week?", None).unwrap();
    engine.ask("revenue this month", None).unwrap();

    let recent = engine.recent_history(10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].metric_id.as_deref(), Some("revenue"));
    assert_eq!(recent[1].metric_id.as_deref(), Some("active_users"));
    assert!(recent[0].result.is_some());

    let stats = engine.history_statistics().unwrap();
    assert_eq!(stats.total_queries, 2);
}

#[test]
fn test_filtered_history_by_metric() {
    let engine = stored_engine();
    engine.ask("active users last week", None).unwrap();
    engine.ask("revenue this month", None).unwrap();

    let filter = HistoryFilter {
        metric_id: Some("revenue".to_string()),
        ..Default::default()
    };
    let matched = engine.filtered_history(&filter, 10).unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].metric_id.as_deref(), Some("revenue"));
}

#[test]
fn test_export_history_writes_json_file() {
    let engine = stored_engine();
    engine.ask("active users last week", None).unwrap();
    engine.ask("revenue this month", None).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let count = engine
        .export_history(&path, ExportFormat::Json, &HistoryFilter::default(), 100)
        .unwrap();
    assert_eq!(count, 2);

    let exported: Vec<QueryRecord> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[0].metric_id.as_deref(), Some("revenue"));
}

#[test]
fn test_export_history_writes_csv_file() {
    let engine = stored_engine();
    engine.ask("active users last week", None).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.csv");
    let filter = HistoryFilter {
        metric_id: Some("active_users".to_string()),
        ..Default::default()
    };
    let count = engine
        .export_history(&path, ExportFormat::Csv, &filter, 100)
        .unwrap();
    assert_eq!(count, 1);

    // The multi-line SQL field is quoted, so assert on content rather
    // than physical line count.
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("question,"));
    assert!(contents.contains("active_users"));
    assert!(contents.contains("active users last week"));
}

#[test]
fn test_failed_resolution_leaves_no_history() {
    let engine = stored_engine();
    assert!(engine.ask("meaning of life", None).is_err());
    assert!(engine.recent_history(10).unwrap().is_empty());
}

#[test]
fn test_template_lifecycle_through_engine() {
    let engine = stored_engine();
    let saved = engine
        .save_template(
            "Weekly Revenue",
            "SELECT SUM(amount) FROM analytics.transactions",
            "weekly revenue rollup",
        )
        .unwrap();
    assert_eq!(saved.id, "weekly_revenue");

    let (ran, value) = engine.run_template("Weekly Revenue").unwrap();
    assert_eq!(ran.id, "weekly_revenue");
    assert_eq!(
        value,
        engine.execute("SELECT SUM(amount) FROM analytics.transactions")
    );

    // Run count was bumped by the run above.
    let listed = engine.list_templates().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].run_count, 1);

    assert!(engine.delete_template("Weekly Revenue").unwrap());
    assert!(engine.list_templates().unwrap().is_empty());
}

#[test]
fn test_history_ops_without_store() {
    let engine = InsightEngine::new();
    assert!(matches!(
        engine.recent_history(10).unwrap_err(),
        EngineError::StoreUnavailable
    ));
    assert!(matches!(
        engine.save_template("a", "SELECT 1", "").unwrap_err(),
        EngineError::StoreUnavailable
    ));
}

#[test]
fn test_store_trait_is_engine_compatible() {
    // The engine only sees the trait object; any InsightStore works.
    let store: Box<dyn InsightStore> = Box::new(SqliteStore::open_in_memory().unwrap());
    let engine = InsightEngine::new().with_store(store);
    assert!(engine.recent_history(5).unwrap().is_empty());
}

#[test]
fn test_report_formatting_smoke() {
    let engine = InsightEngine::new();
    let answer = engine.ask("active users last week", None).unwrap();
    let text = report::format_answer(&answer);
    assert!(text.contains("Active Users"));
    assert!(text.contains("last 7 days"));
    assert!(text.contains(&answer.sql));
}
