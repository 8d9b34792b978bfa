//! Sink abstraction

use crate::config::SinkEngine;
use crate::error::Result;

/// A SQL-accepting destination for the loaded rows
///
/// Implementations own exactly one connection. It is released by `close`,
/// and must also be released when the value is dropped.
pub trait Sink {
    /// Engine behind this sink
    fn engine(&self) -> SinkEngine;

    /// Catalog that database-level statements are qualified with, if any
    fn catalog(&self) -> Option<&str> {
        None
    }

    /// Execute a statement that returns no rows
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Execute one parameterized insert with `values` bound in order, then commit
    fn insert_batch(&mut self, sql: &str, values: &[&str]) -> Result<usize>;

    /// Release the connection
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
