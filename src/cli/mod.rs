//! CLI module
//!
//! Command-line interface for a single ETL run. With no arguments it loads
//! the default source into MySQL using the `MYSQL_*` environment variables.

mod commands;
mod runner;

pub use commands::{Cli, OutputFormat};
pub use runner::Runner;
