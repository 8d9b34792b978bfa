//! Decoder types and traits

use crate::error::Result;
use crate::types::{Header, Record};

/// A source body split into its header and numbered data records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSource {
    /// Column names from the first record
    pub header: Header,
    /// Data records in source order, numbered from 2
    pub records: Vec<Record>,
}

impl DecodedSource {
    /// Number of data records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the source has no data records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Trait for decoding a fetched body into header and records
pub trait SourceDecoder: Send + Sync {
    /// Decode the body
    fn decode(&self, body: &str) -> Result<DecodedSource>;
}
