//! Row validation
//!
//! A row is valid when it has exactly as many fields as the header. Every
//! other row goes to quarantine with a `Row <n> has extra column` reason,
//! whether it is too long or too short; downstream consumers match on
//! that text.

use crate::types::{Header, QuarantineEntry, Record, Row};
use chrono::NaiveDateTime;
use thiserror::Error;

/// Row width does not match the header
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Row {row_number} has extra column")]
pub struct RowShapeError {
    /// Record number in the source (header = 1)
    pub row_number: usize,
    /// Header width
    pub expected: usize,
    /// Row width
    pub actual: usize,
}

/// Outcome of validating one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Row matches the header
    Valid(Row),
    /// Row rejected, with the reason
    Invalid(Row, RowShapeError),
}

impl Validation {
    /// Whether the row was accepted
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }
}

/// Classify one row against the header
pub fn validate_row(header: &Header, row_number: usize, row: Row) -> Validation {
    if row.len() == header.len() {
        Validation::Valid(row)
    } else {
        let error = RowShapeError {
            row_number,
            expected: header.len(),
            actual: row.len(),
        };
        Validation::Invalid(row, error)
    }
}

/// Valid rows and quarantine entries of one run, both in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitioned {
    /// Rows that match the header
    pub valid: Vec<Row>,
    /// Rejected rows
    pub quarantined: Vec<QuarantineEntry>,
}

impl Partitioned {
    /// Total number of classified records
    pub fn total(&self) -> usize {
        self.valid.len() + self.quarantined.len()
    }
}

/// Validate every record, stamping rejects with `clock()`
pub fn partition<I, F>(header: &Header, records: I, mut clock: F) -> Partitioned
where
    I: IntoIterator<Item = Record>,
    F: FnMut() -> NaiveDateTime,
{
    let mut out = Partitioned::default();

    for record in records {
        match validate_row(header, record.number, record.fields) {
            Validation::Valid(row) => out.valid.push(row),
            Validation::Invalid(row, error) => {
                tracing::debug!(
                    "Quarantining record {}: {} fields, expected {}",
                    error.row_number,
                    error.actual,
                    error.expected
                );
                out.quarantined
                    .push(QuarantineEntry::new(row, error.to_string(), clock()));
            }
        }
    }

    out
}

/// Local wall clock, used for quarantine timestamps
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}
