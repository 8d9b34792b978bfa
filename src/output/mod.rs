//! Output module
//!
//! Writes rejected rows to the quarantine CSV file.

mod writer;

pub use writer::{write_quarantine, QuarantineWriter};
