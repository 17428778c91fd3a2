//! Plain-text report assembly.
//!
//! All interpretation text lives here, composed from templates over the
//! structured results the rest of the crate produces. Nothing in this
//! module computes; it only formats.

use crate::catalog::MetricCatalog;
use crate::engine::{Answer, Comparison, Explanation};
use crate::explain::QualityReport;
use crate::history::{QueryRecord, Template};
use crate::sql::ValidationReport;

const RULE: &str = "==================================================";

/// Format a fully answered question.
pub fn format_answer(answer: &Answer) -> String {
    let metric = &answer.metric;
    let filter_line = if metric.filter.is_empty() {
        "No additional filters applied.".to_string()
    } else {
        format!("Filtered by: {}", metric.filter)
    };

    let mut report = format!(
        "Question: {question}\n\
         Time Period: {period}\n\
         \n\
         Answer: {value:.0} {unit}\n\
         \n\
         Query Used:\n{sql}\n\
         \n\
         Explanation:\n\
         This query computes {description} from the {table} table.\n\
         {filter_line}\n\
         \n\
         Data Quality:\n{quality}\n\
         \n\
         Metric Definition:\n\
         - Name: {name}\n\
         - Description: {description_raw}\n\
         - Source: {table}\n",
        question = answer.question,
        period = answer.time_period,
        value = answer.value,
        unit = metric.unit,
        sql = answer.sql,
        description = metric.description.to_lowercase(),
        table = metric.table,
        filter_line = filter_line,
        quality = format_quality_lines(&answer.quality),
        name = metric.name,
        description_raw = metric.description,
    );

    if !answer.followups.is_empty() {
        report.push_str("\nSuggested Follow-ups:\n");
        for followup in &answer.followups {
            report.push_str(&format!("- {}\n", followup));
        }
    }

    report
}

/// Guidance shown when a question resolved to no metrics.
pub fn format_unparseable(question: &str, catalog: &MetricCatalog) -> String {
    format!(
        "Unable to parse question: {question:?}\n\
         \n\
         Suggestions:\n\
         - Try mentioning specific metrics like \"active users\", \"revenue\", or \"signups\"\n\
         - Use time periods like \"last week\", \"this month\", or \"last 30 days\"\n\
         - Examples:\n\
         \x20\x20- \"How many active users last week?\"\n\
         \x20\x20- \"What was our revenue in December?\"\n\
         \x20\x20- \"Show me conversion rate for the past month\"\n\
         \n\
         Available metrics:\n{metrics}",
        question = question,
        metrics = format_metric_list(catalog),
    )
}

/// One line per catalog metric.
pub fn format_metric_list(catalog: &MetricCatalog) -> String {
    catalog
        .iter()
        .map(|m| format!("- {} - {}", m.name, m.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a generated query with its parameters.
pub fn format_generated_query(
    metric_name: &str,
    sql: &str,
    time_period: &str,
    extra_filter: &str,
    group_by: &str,
    table: &str,
    unit: &str,
) -> String {
    format!(
        "Generated Query for: {metric_name}\n{RULE}\n\
         \n\
         {sql}\n\
         \n\
         Parameters:\n\
         - Time Period: {time_period}\n\
         - Additional Filters: {filters}\n\
         - Grouping: {grouping}\n\
         \n\
         Data Source:\n\
         - Table: {table}\n\
         - Unit: {unit}\n",
        filters = if extra_filter.is_empty() {
            "None"
        } else {
            extra_filter
        },
        grouping = if group_by.is_empty() {
            "None (aggregate)"
        } else {
            group_by
        },
    )
}

/// Format a validation report with a verdict line.
pub fn format_validation(sql: &str, report: &ValidationReport) -> String {
    let mut out = format!("Query Validation Report\n{RULE}\n\nQuery:\n{sql}\n\n");

    if report.issues.is_empty() && report.warnings.is_empty() {
        out.push_str("All validation checks passed\n\n");
    }
    if !report.issues.is_empty() {
        out.push_str(&format!("Issues Found ({}):\n", report.issues.len()));
        for issue in &report.issues {
            out.push_str(&format!("  [x] {}\n", issue));
        }
        out.push('\n');
    }
    if !report.warnings.is_empty() {
        out.push_str(&format!("Warnings ({}):\n", report.warnings.len()));
        for warning in &report.warnings {
            out.push_str(&format!("  [!] {}\n", warning));
        }
        out.push('\n');
    }
    if !report.recommendations.is_empty() {
        out.push_str(&format!(
            "Recommendations ({}):\n",
            report.recommendations.len()
        ));
        for rec in &report.recommendations {
            out.push_str(&format!("  [-] {}\n", rec));
        }
        out.push('\n');
    }

    if report.passed() {
        out.push_str("Query is valid and ready to execute\n");
    } else {
        out.push_str("Fix issues before executing\n");
    }
    out
}

/// Format a result explanation.
pub fn format_explanation(explanation: &Explanation) -> String {
    let metric = &explanation.metric;
    let ctx = &explanation.context;
    format!(
        "Result Explanation: {name}\n{RULE}\n\
         \n\
         Result: {value:.0} {unit}\n\
         Time Period: {period}\n\
         \n\
         Context:\n\
         - Baseline (previous period): {baseline:.0} {unit}\n\
         - Change: {change:+.1}% ({direction})\n\
         - Statistical Significance: {significance}\n\
         \n\
         Interpretation:\n{interpretation}\n\
         \n\
         Data Quality Considerations:\n{quality}\n\
         \n\
         Recommended Actions:\n{actions}\n",
        name = metric.name,
        value = ctx.value,
        unit = metric.unit,
        period = explanation.time_period,
        baseline = ctx.baseline,
        change = ctx.change_pct,
        direction = ctx.direction,
        significance = ctx.significance,
        interpretation = explanation.interpretation,
        quality = format_quality_lines(&explanation.quality),
        actions = explanation
            .actions
            .iter()
            .map(|a| format!("- {}", a))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Format a metric comparison with a ratio insight.
pub fn format_comparison(cmp: &Comparison) -> String {
    format!(
        "Metric Comparison\n{RULE}\n\
         \n\
         Time Period: {period}\n\
         \n\
         {left} vs {right}\n\
         \n\
         Values:\n\
         \x20\x20{left}: {left_value:.0} {left_unit}\n\
         \x20\x20{right}: {right_value:.0} {right_unit}\n\
         \n\
         Definitions:\n\
         \x20\x20{left}: {left_desc}\n\
         \x20\x20{right}: {right_desc}\n\
         \n\
         Data Sources:\n\
         \x20\x20{left}: {left_table}\n\
         \x20\x20{right}: {right_table}\n\
         \n\
         Insights:\n\
         - {left} is {ratio:.2}x {right}\n\
         - Consider analyzing these together for a complete picture\n",
        period = cmp.time_period,
        left = cmp.left.name,
        right = cmp.right.name,
        left_value = cmp.left_value,
        right_value = cmp.right_value,
        left_unit = cmp.left.unit,
        right_unit = cmp.right.unit,
        left_desc = cmp.left.description,
        right_desc = cmp.right.description,
        left_table = cmp.left.table,
        right_table = cmp.right.table,
        ratio = cmp.ratio(),
    )
}

/// Format a data quality report.
pub fn format_quality(report: &QualityReport, metric_name: &str) -> String {
    format!(
        "Data Quality Report: {metric_name}\n{RULE}\n\
         \n\
         Time Period: {period}\n\
         \n\
         Freshness:\n{freshness}\n\
         \n\
         Completeness: coverage {coverage}%\n{completeness}\n\
         \n\
         Anomaly Detection:\n{anomalies}\n\
         \n\
         Overall Quality Score: {score}/100\n\
         \n\
         Recommendations:\n{recommendation}\n",
        period = report.time_period,
        freshness = report.freshness.message,
        coverage = report.coverage_pct,
        completeness = report.completeness.message,
        anomalies = report.anomalies.message,
        score = report.score(),
        recommendation = report.recommendation(),
    )
}

fn format_quality_lines(report: &QualityReport) -> String {
    format!(
        "- {}\n- {}\n- {}",
        report.freshness.message, report.completeness.message, report.anomalies.message
    )
}

/// Format the stored template list.
pub fn format_templates(templates: &[Template]) -> String {
    if templates.is_empty() {
        return "No query templates saved yet.\n\n\
                Create a template with: glean templates save <name> <sql>\n"
            .to_string();
    }

    let mut out = format!("Saved Query Templates ({})\n{RULE}\n", templates.len());
    for template in templates {
        let preview: String = template.sql.chars().take(100).collect();
        let ellipsis = if template.sql.chars().count() > 100 {
            "..."
        } else {
            ""
        };
        out.push_str(&format!(
            "\nName: {}\nDescription: {}\nCreated: {}\nTimes Run: {}\nQuery: {}{}\n",
            template.name,
            template.description,
            template.created_at.format("%Y-%m-%d %H:%M UTC"),
            template.run_count,
            preview,
            ellipsis,
        ));
    }
    out
}

/// Format recent history entries.
pub fn format_history(records: &[QueryRecord]) -> String {
    if records.is_empty() {
        return "No queries in history.\n".to_string();
    }

    let mut out = format!("Query History (last {})\n{RULE}\n", records.len());
    for (i, record) in records.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. Question: {}\n   Time Period: {}\n   Result: {}\n   Timestamp: {}\n",
            i + 1,
            record.question,
            record.time_period,
            record
                .result
                .map(|v| format!("{:.0}", v))
                .unwrap_or_else(|| "-".into()),
            record.timestamp.to_rfc3339(),
        ));
    }
    out
}

/// Format follow-up suggestions.
pub fn format_followups(question: &str, suggestions: &[String]) -> String {
    let mut out = format!(
        "Follow-up Suggestions for: {question:?}\n{RULE}\n\nDrill-Down Questions:\n"
    );
    for (i, suggestion) in suggestions.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, suggestion));
    }
    out.push_str(
        "\nRelated Analysis:\n\
         - Segment analysis: \"Break down by user segment\"\n\
         - Trend analysis: \"Show weekly trend over the past quarter\"\n\
         - Cohort analysis: \"Compare across user cohorts\"\n",
    );
    out
}
