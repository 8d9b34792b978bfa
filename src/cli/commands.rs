//! CLI arguments and parsing

use crate::config::{SinkEngine, DEFAULT_QUARANTINE_PATH, DEFAULT_SOURCE_URL};
use clap::Parser;
use std::path::PathBuf;

/// Load a CSV file from a URL into a database table, quarantining malformed rows
#[derive(Parser, Debug)]
#[command(name = "video-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// URL of the CSV source
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Where malformed rows are written
    #[arg(short, long, default_value = DEFAULT_QUARANTINE_PATH)]
    pub bad_lines: PathBuf,

    /// Database engine to load into
    #[arg(short, long, value_enum, default_value_t = SinkEngine::Mysql)]
    pub engine: SinkEngine,

    /// DuckDB database file (only with `--engine duckdb`, in-memory when unset)
    #[arg(long)]
    pub database_file: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one event per line)
    Json,
    /// Human-readable output
    Pretty,
}
