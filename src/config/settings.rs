//! TOML-based configuration for glean.
//!
//! Supports a config file (glean.toml) with environment variable expansion.
//! Metrics and glossary entries are arrays of tables so their order in the
//! file is the scan order at runtime.
//!
//! Example configuration:
//! ```toml
//! [storage]
//! path = "${HOME}/.glean/history.db"
//!
//! [[metrics]]
//! id = "active_users"
//! name = "Active Users"
//! description = "Unique users who logged in at least once in the time period"
//! expression = "COUNT(DISTINCT user_id)"
//! table = "analytics.user_events"
//! filter = "event_type = 'login'"
//! unit = "users"
//!
//! [[glossary]]
//! term = "customers"
//! canonical = "users"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{Glossary, GlossaryEntry, MetricCatalog, MetricDefinition};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Duplicate metric id in config: {0}")]
    DuplicateMetric(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// History/template store location.
    pub storage: StorageSettings,

    /// Metric definitions; empty means use the built-in catalog.
    pub metrics: Vec<MetricDefinition>,

    /// Business glossary entries; empty means use the built-in glossary.
    pub glossary: Vec<GlossaryEntry>,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Database path (supports ${ENV_VAR} expansion). None means the
    /// default location under the home directory.
    pub path: Option<String>,
}

impl StorageSettings {
    /// The database path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        match &self.path {
            Some(raw) => Ok(Some(PathBuf::from(expand_env_vars(raw)?))),
            None => Ok(None),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.check_unique_metric_ids()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `GLEAN_CONFIG`
    /// 2. `./glean.toml`
    /// 3. `~/.config/glean/config.toml`
    ///
    /// Returns defaults if no config file is found.
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("GLEAN_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("glean.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("glean").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn check_unique_metric_ids(&self) -> Result<(), SettingsError> {
        let mut seen = std::collections::HashSet::new();
        for metric in &self.metrics {
            if !seen.insert(metric.id.as_str()) {
                return Err(SettingsError::DuplicateMetric(metric.id.clone()));
            }
        }
        Ok(())
    }

    /// Build the metric catalog: configured metrics, or the built-ins when
    /// none are configured.
    pub fn catalog(&self) -> MetricCatalog {
        if self.metrics.is_empty() {
            MetricCatalog::builtin()
        } else {
            MetricCatalog::new(self.metrics.clone())
        }
    }

    /// Build the glossary: configured entries, or the built-ins when none
    /// are configured.
    pub fn glossary(&self) -> Glossary {
        if self.glossary.is_empty() {
            Glossary::builtin()
        } else {
            Glossary::new(self.glossary.clone())
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' {
            if chars.peek() == Some(&'{') {
                chars.next(); // consume '{'
                let mut var_name = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(ch);
                    chars.next();
                }
                let value = env::var(&var_name)
                    .map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
                result.push_str(&value);
            } else {
                // $VAR (ends at non-alphanumeric/underscore)
                let mut var_name = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        var_name.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if var_name.is_empty() {
                    // Just a lone $, keep it
                    result.push('$');
                } else {
                    let value = env::var(&var_name)
                        .map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
                    result.push_str(&value);
                }
            }
        } else {
            result.push(c);
        }
    }

    Ok(result)
}
