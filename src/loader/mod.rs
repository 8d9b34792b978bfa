//! Batch loader module
//!
//! Inserts validated rows into the target table in fixed-size batches.

mod batch;
mod types;

pub use batch::BatchLoader;
pub use types::LoadSummary;

#[cfg(test)]
mod tests;
