//! Run configuration
//!
//! The source location, the quarantine path, the fixed sink names and the
//! sink credentials. Credentials come from the environment and are not
//! validated here: a missing value shows up as a connection failure.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Defaults
// ============================================================================

/// Remote CSV loaded when no source URL is given
pub const DEFAULT_SOURCE_URL: &str =
    "https://s3-ap-southeast-2.amazonaws.com/jiangren-de-bucket/assignments/video_data.csv";

/// Quarantine file, relative to the working directory
pub const DEFAULT_QUARANTINE_PATH: &str = "bad_lines.csv";

/// Target database
pub const DATABASE_NAME: &str = "VIDEO_DATA";

/// Target table
pub const TABLE_NAME: &str = "video_raw";

/// Rows per insert statement
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Environment variable holding the sink host
pub const ENV_HOST: &str = "MYSQL_HOST";
/// Environment variable holding the sink user
pub const ENV_USER: &str = "MYSQL_USER";
/// Environment variable holding the sink password
pub const ENV_PASSWORD: &str = "MYSQL_PASSWORD";
/// Environment variable holding the sink port
pub const ENV_PORT: &str = "MYSQL_PORT";

// ============================================================================
// Sink engine
// ============================================================================

/// Database behind the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkEngine {
    /// MySQL / MariaDB through the DuckDB mysql extension
    #[default]
    Mysql,
    /// PostgreSQL through the DuckDB postgres extension
    Postgres,
    /// A local DuckDB file (or in-memory database)
    Duckdb,
}

impl SinkEngine {
    /// Name used in operator-facing messages
    pub fn label(self) -> &'static str {
        match self {
            SinkEngine::Mysql => "MySQL",
            SinkEngine::Postgres => "PostgreSQL",
            SinkEngine::Duckdb => "DuckDB",
        }
    }

    /// Port used when none is configured
    pub fn default_port(self) -> u16 {
        match self {
            SinkEngine::Mysql => 3306,
            SinkEngine::Postgres => 5432,
            SinkEngine::Duckdb => 0,
        }
    }
}

impl std::fmt::Display for SinkEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkEngine::Mysql => write!(f, "mysql"),
            SinkEngine::Postgres => write!(f, "postgres"),
            SinkEngine::Duckdb => write!(f, "duckdb"),
        }
    }
}

// ============================================================================
// Sink settings
// ============================================================================

/// Connection parameters for the sink
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkSettings {
    /// Database engine
    pub engine: SinkEngine,
    /// Server host
    pub host: Option<String>,
    /// User name
    pub user: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Server port, kept as text until connect time
    pub port: Option<String>,
    /// Database file for the DuckDB engine (`:memory:` when unset)
    pub database_file: Option<String>,
}

impl SinkSettings {
    /// Read the sink values from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the sink values through an arbitrary lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            engine: SinkEngine::default(),
            host: lookup(ENV_HOST),
            user: lookup(ENV_USER),
            password: lookup(ENV_PASSWORD),
            port: lookup(ENV_PORT),
            database_file: None,
        }
    }

    /// Settings for an in-process DuckDB sink
    pub fn duckdb(database_file: Option<String>) -> Self {
        Self {
            engine: SinkEngine::Duckdb,
            database_file,
            ..Self::default()
        }
    }

    /// Set the engine
    #[must_use]
    pub fn with_engine(mut self, engine: SinkEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Host, or an error naming the variable
    pub fn require_host(&self) -> Result<&str> {
        self.host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::missing_field(ENV_HOST))
    }

    /// User, or an error naming the variable
    pub fn require_user(&self) -> Result<&str> {
        self.user
            .as_deref()
            .ok_or_else(|| Error::missing_field(ENV_USER))
    }

    /// Port parsed as a number, falling back to the engine default
    pub fn port(&self) -> Result<u16> {
        match self.port.as_deref().map(str::trim) {
            None | Some("") => Ok(self.engine.default_port()),
            Some(raw) => raw.parse().map_err(|_| {
                Error::connection(
                    self.engine.label(),
                    format!("invalid port '{raw}' in {ENV_PORT}"),
                )
            }),
        }
    }
}

// ============================================================================
// Pipeline config
// ============================================================================

/// Everything one run needs
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// URL of the CSV source
    pub source_url: String,
    /// Where rejected rows are written
    pub quarantine_path: PathBuf,
    /// Target database name
    pub database: String,
    /// Target table name
    pub table: String,
    /// Rows per insert statement
    pub batch_size: usize,
    /// Sink connection parameters
    pub sink: SinkSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            quarantine_path: PathBuf::from(DEFAULT_QUARANTINE_PATH),
            database: DATABASE_NAME.to_string(),
            table: TABLE_NAME.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            sink: SinkSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Default config with the given sink settings
    pub fn new(sink: SinkSettings) -> Self {
        Self {
            sink,
            ..Self::default()
        }
    }

    /// Set the source URL
    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    /// Set the quarantine path
    #[must_use]
    pub fn with_quarantine_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.quarantine_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_sink_settings_from_lookup() {
        let settings = SinkSettings::from_lookup(lookup_from(&[
            ("MYSQL_HOST", "db.example.com"),
            ("MYSQL_USER", "loader"),
            ("MYSQL_PASSWORD", "secret"),
            ("MYSQL_PORT", "3307"),
        ]));

        assert_eq!(settings.engine, SinkEngine::Mysql);
        assert_eq!(settings.require_host().unwrap(), "db.example.com");
        assert_eq!(settings.require_user().unwrap(), "loader");
        assert_eq!(settings.password.as_deref(), Some("secret"));
        assert_eq!(settings.port().unwrap(), 3307);
    }

    #[test]
    fn test_missing_values_are_not_rejected_up_front() {
        let settings = SinkSettings::from_lookup(lookup_from(&[]));

        assert!(settings.host.is_none());
        assert!(matches!(
            settings.require_host(),
            Err(Error::MissingConfigField { ref field }) if field == "MYSQL_HOST"
        ));
        assert_eq!(settings.port().unwrap(), 3306);
    }

    #[test]
    fn test_invalid_port_is_a_connection_error() {
        let settings = SinkSettings::from_lookup(lookup_from(&[("MYSQL_PORT", "not-a-port")]));
        let err = settings.port().unwrap_err();
        assert!(err.is_sink_error());
        assert!(err.to_string().contains("not-a-port"));
    }

    #[test]
    fn test_engine_labels() {
        assert_eq!(SinkEngine::Mysql.label(), "MySQL");
        assert_eq!(SinkEngine::Postgres.default_port(), 5432);
        assert_eq!(SinkEngine::Duckdb.to_string(), "duckdb");
    }

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(config.quarantine_path, PathBuf::from("bad_lines.csv"));
        assert_eq!(config.database, "VIDEO_DATA");
        assert_eq!(config.table, "video_raw");
        assert_eq!(config.batch_size, 100);
    }
}
