//! Common types used throughout video-etl
//!
//! The header, rows and quarantine entries flowing between the decoder,
//! the validator, the quarantine writer and the batch loader.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Format of quarantine timestamps and report lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Extra columns appended to the header in the quarantine file
pub const QUARANTINE_COLUMNS: [&str; 2] = ["Error", "Timestamp"];

// ============================================================================
// Rows
// ============================================================================

/// One data record as ordered text fields
pub type Row = Vec<String>;

/// Ordered column names taken from the first record
///
/// Fields are private so a header cannot change once the source is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    fields: Vec<String>,
}

impl Header {
    /// Create a header from field names
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Field names in order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Expected row width
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the header has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Header record of the quarantine file
    pub fn quarantine_header(&self) -> Vec<String> {
        self.fields
            .iter()
            .cloned()
            .chain(QUARANTINE_COLUMNS.iter().map(|c| (*c).to_string()))
            .collect()
    }
}

/// A decoded row with its position in the source
///
/// Records are numbered from 1 with the header being record 1, so the
/// first data row is record 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based record number in the source
    pub number: usize,
    /// Field values
    pub fields: Row,
}

impl Record {
    /// Create a record
    pub fn new(number: usize, fields: Row) -> Self {
        Self { number, fields }
    }
}

// ============================================================================
// Quarantine
// ============================================================================

/// A malformed row annotated with why and when it was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantineEntry {
    /// The rejected row as read
    pub row: Row,
    /// Error description
    pub error: String,
    /// Local time of classification
    pub captured_at: NaiveDateTime,
}

impl QuarantineEntry {
    /// Create a quarantine entry
    pub fn new(row: Row, error: impl Into<String>, captured_at: NaiveDateTime) -> Self {
        Self {
            row,
            error: error.into(),
            captured_at,
        }
    }

    /// Timestamp rendered as `YYYY-MM-DD HH:MM:SS`
    pub fn timestamp(&self) -> String {
        self.captured_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Record written to the quarantine file
    pub fn to_record(&self) -> Vec<String> {
        let mut record = self.row.clone();
        record.push(self.error.clone());
        record.push(self.timestamp());
        record
    }
}
