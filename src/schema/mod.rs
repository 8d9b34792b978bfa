//! Schema ensurer module
//!
//! Creates the target database and table when they are missing, with one
//! `VARCHAR(255)` column per header field. Header text only ever appears as
//! a quoted identifier. On MySQL and PostgreSQL the table DDL is sent to the
//! server as-is so the column length is kept.

mod ensure;

pub use ensure::{SchemaEnsurer, COLUMN_TYPE, MAX_COLUMN_LENGTH};
