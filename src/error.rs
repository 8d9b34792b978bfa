//! Error types for video-etl
//!
//! This module defines the error hierarchy for the whole pipeline.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Only sink-side failures (connection and statement errors) are caught and
//! reported by the pipeline; everything else is fatal to the run.

use thiserror::Error;

/// The main error type for video-etl
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// A required sink setting is unset
    #[error("Missing required config field: {field}")]
    MissingConfigField {
        /// Environment variable name
        field: String,
    },

    // ============================================================================
    // Fetch Errors
    // ============================================================================
    /// Transport failure while fetching the source
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Source answered with a non-success status
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code
        status: u16,
        /// Response body, empty when unreadable
        body: String,
    },

    /// Source URL does not parse
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Decode Errors
    // ============================================================================
    /// Body has no header row
    #[error("Source contains no header row")]
    EmptySource,

    /// CSV read or write failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ============================================================================
    // Sink Errors
    // ============================================================================
    /// Sink connection could not be opened or attached
    #[error("{engine} connection failed: {message}")]
    SinkConnection {
        /// Engine label
        engine: String,
        /// Driver message
        message: String,
    },

    /// A statement against the sink failed
    #[error("Statement failed: {message}")]
    Statement {
        /// Driver message
        message: String,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    /// File system failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    /// Error wrapped with extra context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a sink connection error
    pub fn connection(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkConnection {
            engine: engine.into(),
            message: message.into(),
        }
    }

    /// Create a statement error
    pub fn statement(message: impl Into<String>) -> Self {
        Self::Statement {
            message: message.into(),
        }
    }

    /// Whether the error came from the sink and is reported instead of aborting
    pub fn is_sink_error(&self) -> bool {
        matches!(
            self,
            Error::SinkConnection { .. } | Error::Statement { .. } | Error::MissingConfigField { .. }
        )
    }

    /// Whether the error happened while fetching the source
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::HttpStatus { .. } | Error::InvalidUrl(_)
        )
    }
}

/// Result type alias for video-etl
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
