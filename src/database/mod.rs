//! Sink support via DuckDB
//!
//! This module provides the `Sink` trait and its DuckDB-backed engine.
//! DuckDB reaches MySQL and PostgreSQL through its extensions, or writes a
//! local DuckDB file.

mod engine;
mod types;

pub use engine::{quote_ident, quote_literal, quote_mysql_ident, DatabaseEngine, SINK_CATALOG};
pub use types::Sink;
