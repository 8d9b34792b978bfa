//! Decoder implementations

use super::types::{DecodedSource, SourceDecoder};
use crate::error::{Error, Result};
use crate::types::{Header, Record, Row};
use csv::ReaderBuilder;

/// Byte order mark some exporters put in front of the header
const UTF8_BOM: char = '\u{feff}';

// ============================================================================
// CSV Decoder
// ============================================================================

/// Comma-separated decoder
///
/// Rows of any width are accepted here; the width check belongs to the
/// validator so that short and long rows can be quarantined instead of
/// failing the decode. A blank line is a record with no fields and takes a
/// record number like any other line.
#[derive(Debug, Clone, Default)]
pub struct CsvDecoder;

impl CsvDecoder {
    /// Create a new CSV decoder
    pub fn new() -> Self {
        Self
    }

    /// Parse one logical line into its fields (none for a blank line)
    fn parse_line(line: &str) -> Result<Row> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes());

        match reader.records().next() {
            Some(record) => Ok(record?.iter().map(str::to_string).collect()),
            None => Ok(Row::new()),
        }
    }
}

impl SourceDecoder for CsvDecoder {
    fn decode(&self, body: &str) -> Result<DecodedSource> {
        let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);
        let mut lines = logical_lines(body).into_iter();

        let header = match lines.next() {
            Some(first) => Header::new(Self::parse_line(&first)?),
            None => return Err(Error::EmptySource),
        };

        let mut records = Vec::new();
        for (index, line) in lines.enumerate() {
            // header is record 1
            records.push(Record::new(index + 2, Self::parse_line(&line)?));
        }

        Ok(DecodedSource { header, records })
    }
}

/// Split a body into one string per record
///
/// Physical lines are joined while a quoted field is still open, so a
/// newline inside quotes stays part of its field.
fn logical_lines(body: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for line in body.lines() {
        let joined = match pending.take() {
            Some(mut open) => {
                open.push('\n');
                open.push_str(line);
                open
            }
            None => line.to_string(),
        };

        if ends_inside_quotes(&joined) {
            pending = Some(joined);
        } else {
            lines.push(joined);
        }
    }

    // unterminated quote at end of input
    lines.extend(pending);
    lines
}

/// Whether `text` ends inside a quoted field
///
/// A quote only opens a field at the start of that field; `""` inside a
/// quoted field is an escaped quote.
fn ends_inside_quotes(text: &str) -> bool {
    let mut in_quotes = false;
    let mut field_start = true;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }

        match c {
            '"' if field_start => in_quotes = true,
            ',' | '\n' => {
                field_start = true;
                continue;
            }
            _ => {}
        }
        field_start = false;
    }

    in_quotes
}
