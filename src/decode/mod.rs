//! Source decoder module
//!
//! Turns the fetched body into a header and numbered records.

mod decoders;
mod types;

pub use decoders::CsvDecoder;
pub use types::{DecodedSource, SourceDecoder};

#[cfg(test)]
mod tests;
