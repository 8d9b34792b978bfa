//! Batched inserts into the target table

use super::types::LoadSummary;
use crate::config::{DEFAULT_BATCH_SIZE, TABLE_NAME};
use crate::database::{quote_ident, Sink};
use crate::error::Result;
use crate::types::{Header, Row};
use std::slice::Chunks;
use tracing::debug;

/// Splits rows into fixed-size groups and inserts them one after another
///
/// Each group is one multi-row insert with bound values, committed before
/// the next group starts. A failing group stops the load; groups already
/// committed stay in the table.
#[derive(Debug, Clone)]
pub struct BatchLoader {
    table: String,
    batch_size: usize,
}

impl Default for BatchLoader {
    fn default() -> Self {
        Self::new(TABLE_NAME)
    }
}

impl BatchLoader {
    /// Loader for `table` with the default batch size
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set batch size (at least 1)
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Maximum rows per insert
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of inserts needed for `rows` rows
    pub fn batch_count(&self, rows: usize) -> usize {
        rows.div_ceil(self.batch_size)
    }

    /// Consecutive groups of at most `batch_size` rows
    pub fn batches<'a>(&self, rows: &'a [Row]) -> Chunks<'a, Row> {
        rows.chunks(self.batch_size)
    }

    /// Insert statement for `rows` rows of `header` width
    pub fn insert_sql(&self, header: &Header, rows: usize) -> String {
        let columns: Vec<String> = header.fields().iter().map(|f| quote_ident(f)).collect();
        let placeholders = vec!["?"; header.len()].join(", ");
        let values = vec![format!("({placeholders})"); rows].join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES {}",
            quote_ident(&self.table),
            columns.join(", "),
            values
        )
    }

    /// Insert every row, reporting each batch to `on_batch(index, total)` before it is sent
    ///
    /// `summary` holds the committed counts even when an error is returned.
    pub fn load<S, F>(
        &self,
        sink: &mut S,
        header: &Header,
        rows: &[Row],
        summary: &mut LoadSummary,
        mut on_batch: F,
    ) -> Result<()>
    where
        S: Sink + ?Sized,
        F: FnMut(usize, usize),
    {
        let total = self.batch_count(rows.len());

        for (index, batch) in self.batches(rows).enumerate() {
            on_batch(index + 1, total);

            let sql = self.insert_sql(header, batch.len());
            let values: Vec<&str> = batch
                .iter()
                .flat_map(|row| row.iter().map(String::as_str))
                .collect();

            sink.insert_batch(&sql, &values)?;
            summary.record_batch(batch.len());

            debug!(
                "Committed batch {}/{} ({} rows, {} total)",
                index + 1,
                total,
                batch.len(),
                summary.rows_inserted
            );
        }

        Ok(())
    }
}
