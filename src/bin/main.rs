//! Glean CLI - ask data questions, generate and validate SQL, explain
//! results.
//!
//! Usage:
//!   glean ask "How many active users last week?"
//!   glean query revenue --period "this month" --filter "country = 'US'" --group-by date
//!   glean validate "SELECT COUNT(*) FROM t"
//!   glean explain 1500 active_users
//!   glean templates save "Weekly Report" "SELECT ..." --description "..."
//!   glean history --metric revenue --export history.json

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use glean::config::Settings;
use glean::engine::InsightEngine;
use glean::error::EngineError;
use glean::history::{ExportFormat, HistoryFilter, SqliteStore};
use glean::report;

#[derive(Parser)]
#[command(name = "glean")]
#[command(about = "Translate natural-language analytics questions into auditable SQL")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to glean.toml / GLEAN_CONFIG)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Skip the history/template store entirely
    #[arg(long, global = true)]
    no_store: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a data question in natural language
    Ask {
        /// The question, e.g. "How many active users last week?"
        question: String,

        /// Override the detected time period
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Generate a SQL query for a specific metric
    Query {
        /// Metric id, e.g. active_users
        metric: String,

        /// Time period
        #[arg(short, long, default_value = "last 7 days")]
        period: String,

        /// Additional WHERE filter, e.g. "country = 'US'"
        #[arg(short, long, default_value = "")]
        filter: String,

        /// GROUP BY expression, e.g. "date"
        #[arg(short, long, default_value = "")]
        group_by: String,
    },

    /// Validate a SQL query
    Validate {
        /// SQL text to lint
        sql: String,
    },

    /// Explain a result value with baseline context
    Explain {
        /// The numeric result, commas allowed
        value: String,

        /// Metric id the result belongs to
        metric: String,

        /// Time period of the result
        #[arg(short, long, default_value = "last 7 days")]
        period: String,
    },

    /// Compare two metrics side by side
    Compare {
        metric_a: String,
        metric_b: String,

        #[arg(short, long, default_value = "last 7 days")]
        period: String,
    },

    /// Check data quality for a metric
    Quality {
        metric: String,

        #[arg(short, long, default_value = "last 7 days")]
        period: String,
    },

    /// Suggest follow-up questions
    Followups { question: String },

    /// List available metrics
    Metrics,

    /// Manage saved query templates
    Templates {
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Show, filter, export, or clear query history
    History {
        /// Number of entries (defaults to 10 when showing, 10000 when
        /// exporting)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Search term to filter by
        #[arg(short, long)]
        search: Option<String>,

        /// Only entries recorded for this metric id
        #[arg(short, long)]
        metric: Option<String>,

        /// Only entries at or after this RFC 3339 timestamp
        #[arg(long)]
        since: Option<String>,

        /// Only entries at or before this RFC 3339 timestamp
        #[arg(long)]
        until: Option<String>,

        /// Write matching entries to this file instead of printing
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,

        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormatArg::Json)]
        format: ExportFormatArg,

        /// Delete history entries instead of showing them
        #[arg(long)]
        clear: bool,

        /// With --clear, only delete entries older than this many days
        #[arg(long)]
        older_than_days: Option<u32>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ExportFormatArg {
    Json,
    Csv,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Json => ExportFormat::Json,
            ExportFormatArg::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// List all saved templates
    List,
    /// Save a new template
    Save {
        name: String,
        sql: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Delete a template by name
    Delete { name: String },
    /// Run a template and print its simulated result
    Run { name: String },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut engine = InsightEngine::with_catalog(settings.catalog(), settings.glossary());

    if !cli.no_store {
        let store = match settings.storage.resolved_path() {
            Ok(Some(path)) => SqliteStore::open(path),
            Ok(None) => SqliteStore::open_default(),
            Err(e) => {
                eprintln!("Error resolving store path: {}", e);
                return ExitCode::FAILURE;
            }
        };
        match store {
            Ok(store) => engine = engine.with_store(Box::new(store)),
            Err(e) => {
                eprintln!("Error opening history store: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    match run(&engine, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&engine, &e);
            ExitCode::FAILURE
        }
    }
}

fn run(engine: &InsightEngine, command: Commands) -> Result<(), EngineError> {
    match command {
        Commands::Ask { question, period } => {
            match engine.ask(&question, period.as_deref()) {
                Ok(answer) => print!("{}", report::format_answer(&answer)),
                Err(EngineError::UnresolvedMetric(_)) => {
                    // Unparseable is a guidance case, not a hard failure.
                    println!("{}", report::format_unparseable(&question, engine.catalog()));
                }
                Err(e) => return Err(e),
            }
            Ok(())
        }
        Commands::Query {
            metric,
            period,
            filter,
            group_by,
        } => {
            let definition = engine
                .catalog()
                .get(&metric)
                .cloned()
                .ok_or_else(|| EngineError::UnknownMetric(metric.clone()))?;
            let query = engine.generate_query(&metric, &period, &filter, &group_by)?;
            print!(
                "{}",
                report::format_generated_query(
                    &definition.name,
                    &query.render(),
                    &period,
                    &filter,
                    &group_by,
                    &definition.table,
                    &definition.unit,
                )
            );
            Ok(())
        }
        Commands::Validate { sql } => {
            let result = engine.validate_query(&sql);
            print!("{}", report::format_validation(&sql, &result));
            Ok(())
        }
        Commands::Explain {
            value,
            metric,
            period,
        } => {
            let explanation = engine.explain_result(&value, &metric, &period)?;
            print!("{}", report::format_explanation(&explanation));
            Ok(())
        }
        Commands::Compare {
            metric_a,
            metric_b,
            period,
        } => {
            let cmp = engine.compare_metrics(&metric_a, &metric_b, &period)?;
            print!("{}", report::format_comparison(&cmp));
            Ok(())
        }
        Commands::Quality { metric, period } => {
            let quality = engine.check_data_quality(&metric, &period)?;
            let name = engine
                .catalog()
                .get(&metric)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| metric.clone());
            print!("{}", report::format_quality(&quality, &name));
            Ok(())
        }
        Commands::Followups { question } => {
            let suggestions = engine.suggest_followups(&question)?;
            print!("{}", report::format_followups(&question, &suggestions));
            Ok(())
        }
        Commands::Metrics => {
            println!("{}", report::format_metric_list(engine.catalog()));
            Ok(())
        }
        Commands::Templates { command } => run_templates(engine, command),
        Commands::History {
            limit,
            search,
            metric,
            since,
            until,
            export,
            format,
            clear,
            older_than_days,
        } => {
            if clear {
                let deleted = engine.clear_history(older_than_days)?;
                println!("Deleted {} history entries", deleted);
                return Ok(());
            }

            let filter = HistoryFilter {
                metric_id: metric,
                since: since.as_deref().map(parse_timestamp_arg).transpose()?,
                until: until.as_deref().map(parse_timestamp_arg).transpose()?,
            };

            if let Some(path) = export {
                let count = engine.export_history(
                    &path,
                    format.into(),
                    &filter,
                    limit.unwrap_or(10_000),
                )?;
                println!("Exported {} history entries to {}", count, path.display());
                return Ok(());
            }

            let limit = limit.unwrap_or(10);
            let records = match search {
                Some(term) => engine.search_history(&term, limit)?,
                None => engine.filtered_history(&filter, limit)?,
            };
            print!("{}", report::format_history(&records));
            Ok(())
        }
    }
}

fn parse_timestamp_arg(raw: &str) -> Result<chrono::DateTime<chrono::Utc>, EngineError> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|_| EngineError::InvalidTimestamp(raw.to_string()))
}

fn run_templates(engine: &InsightEngine, command: TemplateCommands) -> Result<(), EngineError> {
    match command {
        TemplateCommands::List => {
            let templates = engine.list_templates()?;
            print!("{}", report::format_templates(&templates));
        }
        TemplateCommands::Save {
            name,
            sql,
            description,
        } => {
            let template = engine.save_template(&name, &sql, &description)?;
            println!("Saved template '{}' (id: {})", template.name, template.id);
        }
        TemplateCommands::Delete { name } => {
            if engine.delete_template(&name)? {
                println!("Deleted template '{}'", name);
            } else {
                println!("No template named '{}'", name);
            }
        }
        TemplateCommands::Run { name } => {
            let (template, value) = engine.run_template(&name)?;
            println!("{}\n\nResult: {:.0}", template.sql, value);
        }
    }
    Ok(())
}

fn report_error(engine: &InsightEngine, error: &EngineError) {
    eprintln!("Error: {}", error);
    if let EngineError::UnknownMetric(id) = error {
        let similar = engine.find_similar(id);
        if !similar.is_empty() {
            eprintln!("Did you mean: {}?", similar.join(", "));
        }
        eprintln!(
            "\nAvailable metrics:\n{}",
            report::format_metric_list(engine.catalog())
        );
    }
}
