use glean::catalog::MetricCatalog;
use glean::parse::resolve_time_period;
use glean::sql::synthesize;

#[test]
fn test_revenue_this_month_scenario() {
    let catalog = MetricCatalog::builtin();
    let metric = catalog.get("revenue").unwrap();
    let window = resolve_time_period("this month");

    let sql = synthesize(metric, &window, "country = 'US'", "date").render();

    assert!(sql.starts_with("SELECT date, SUM(amount)"));
    assert!(sql.contains("FROM analytics.transactions"));
    assert!(sql.contains("status = 'completed'"));
    assert!(sql.contains("event_date >= DATE_TRUNC('month', CURRENT_DATE)"));
    assert!(sql.contains("country = 'US'"));
    assert!(sql.ends_with("GROUP BY date"));
}

#[test]
fn test_where_predicates_and_joined_in_fixed_order() {
    let catalog = MetricCatalog::builtin();
    let metric = catalog.get("active_users").unwrap();
    let window = resolve_time_period("last 7 days");

    let sql = synthesize(metric, &window, "country = 'US'", "").render();
    let where_clause = sql.split("\nWHERE ").nth(1).unwrap();
    assert_eq!(
        where_clause,
        "event_type = 'login' AND \
         event_date >= CURRENT_DATE - INTERVAL '7 days' AND \
         country = 'US'"
    );
}

#[test]
fn test_empty_base_filter_is_omitted() {
    let catalog = MetricCatalog::builtin();
    let metric = catalog.get("conversion_rate").unwrap();
    let window = resolve_time_period("last 7 days");

    let query = synthesize(metric, &window, "", "");
    assert_eq!(query.predicates.len(), 1);
    assert!(query.predicates[0].starts_with("event_date >="));
}

#[test]
fn test_byte_identical_across_calls() {
    let catalog = MetricCatalog::builtin();
    let metric = catalog.get("revenue").unwrap();

    let render = || {
        let window = resolve_time_period("last 30 days");
        synthesize(metric, &window, "country = 'US'", "date").render()
    };

    let first = render();
    for _ in 0..10 {
        assert_eq!(render(), first);
    }
}

#[test]
fn test_structured_query_survives_serialization() {
    let catalog = MetricCatalog::builtin();
    let metric = catalog.get("signups").unwrap();
    let window = resolve_time_period("last 7 days");
    let query = synthesize(metric, &window, "", "date");

    let json = serde_json::to_string(&query).unwrap();
    let back: glean::sql::SynthesizedQuery = serde_json::from_str(&json).unwrap();
    assert_eq!(back.render(), query.render());
}
