// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Video ETL
//!
//! Fetches a CSV file over HTTP, checks every row against the header width,
//! quarantines malformed rows to a local CSV file and loads the rest into a
//! `video_raw` table, 100 rows per committed batch.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use video_etl::{run_pipeline, DatabaseEngine, PipelineConfig, SinkSettings};
//!
//! let config = PipelineConfig::new(SinkSettings::duckdb(None));
//! let body = "id,title\n1,A\n2\n";
//! let report = run_pipeline(config, body, DatabaseEngine::connect, |e| println!("{e}"))?;
//! assert_eq!(report.bad_lines, 1);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌────────────────────────┐
//! │   HTTP   │──►│  Decode  │──►│ Validate │─┬►│ Output (bad_lines.csv) │
//! └──────────┘   └──────────┘   └──────────┘ │ └────────────────────────┘
//!                                            │ ┌──────────┐   ┌──────────┐
//!                                            └►│  Schema  │──►│  Loader  │
//!                                              └──────────┘   └──────────┘
//!                                                    │              │
//!                                              ┌─────┴──────────────┴─────┐
//!                                              │ Database (DuckDB attach) │
//!                                              └──────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Run configuration and sink settings
pub mod config;

/// HTTP client for fetching the source
pub mod http;

/// Source decoders
pub mod decode;

/// Row width validation
pub mod validate;

/// Quarantine file output
pub mod output;

/// Database and table creation
pub mod schema;

/// Batched inserts
pub mod loader;

/// Sink connections via DuckDB
pub mod database;

/// Pipeline execution
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::{PipelineConfig, SinkEngine, SinkSettings};
pub use database::{DatabaseEngine, Sink};
pub use engine::{run_pipeline, Event, LoadState, Pipeline, RunReport, SinkOutcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
