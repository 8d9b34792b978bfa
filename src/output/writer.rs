//! Quarantine file writer
//!
//! Writes rejected rows to a CSV file whose first record is the source
//! header plus `Error` and `Timestamp`. The file is truncated on open.

use crate::error::{Result, ResultExt};
use crate::types::{Header, QuarantineEntry};
use csv::{Writer, WriterBuilder};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Quarantine CSV writer
pub struct QuarantineWriter {
    /// CSV writer over the quarantine file
    writer: Writer<File>,
    /// Destination path
    path: PathBuf,
    /// Number of entries written
    rows_written: usize,
}

impl QuarantineWriter {
    /// Create the file (replacing any previous one) and write the header record
    pub fn create(path: impl AsRef<Path>, header: &Header) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        // rejected rows are ragged by definition
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record(header.quarantine_header())?;

        Ok(Self {
            writer,
            path,
            rows_written: 0,
        })
    }

    /// Append one entry
    pub fn write(&mut self, entry: &QuarantineEntry) -> Result<()> {
        self.writer.write_record(entry.to_record())?;
        self.rows_written += 1;
        Ok(())
    }

    /// Get the number of entries written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close the file
    pub fn close(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.rows_written)
    }
}

/// Write a complete quarantine file, returning the number of entries
pub fn write_quarantine(
    path: impl AsRef<Path>,
    header: &Header,
    entries: &[QuarantineEntry],
) -> Result<usize> {
    let mut writer = QuarantineWriter::create(path, header)?;
    for entry in entries {
        writer.write(entry)?;
    }
    let written = writer.close()?;

    tracing::debug!("Wrote {} quarantine rows", written);
    Ok(written)
}
