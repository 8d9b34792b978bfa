//! Engine types
//!
//! Load states, report events and run outcomes for the pipeline.

use crate::loader::LoadSummary;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Where the sink half of a run is
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing attempted yet
    NotStarted,
    /// Sink connection acquired
    Connected,
    /// Database and table exist
    SchemaEnsured,
    /// Sending batch `batch` of `of`
    Loading {
        /// 1-based batch index
        batch: usize,
        /// Total batches
        of: usize,
    },
    /// All batches committed
    Completed,
    /// A sink error stopped the run
    Failed {
        /// Error text
        reason: String,
    },
    /// Connection released
    Closed,
}

/// One progress or report line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Sink half started
    ProcessStarted {
        /// Local start time
        at: String,
    },
    /// Target database exists
    DatabaseReady {
        /// Database name
        database: String,
    },
    /// All rows committed
    RowsInserted {
        /// Rows committed
        rows: usize,
    },
    /// Sink half finished
    ProcessEnded {
        /// Local end time
        at: String,
    },
    /// Wall time of the load
    Elapsed {
        /// Seconds
        seconds: f64,
    },
    /// A connection or statement error was caught
    SinkError {
        /// Engine label
        engine: String,
        /// Error text
        message: String,
    },
    /// Connection released
    ConnectionClosed {
        /// Engine label
        engine: String,
    },
    /// Connection was never created
    ConnectionNotEstablished {
        /// Engine label
        engine: String,
    },
    /// Number of quarantined rows
    BadLines {
        /// Row count
        count: usize,
    },
    /// Quarantine file location
    QuarantineWritten {
        /// File path
        path: String,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::ProcessStarted { at } => write!(f, "Process started at: {at}"),
            Event::DatabaseReady { database } => {
                write!(f, "Database '{database}' created or already exists")
            }
            Event::RowsInserted { rows } => {
                write!(f, "{rows} records inserted successfully into the table")
            }
            Event::ProcessEnded { at } => write!(f, "Process ended at: {at}"),
            Event::Elapsed { seconds } => write!(f, "Total time taken: {seconds:.2} seconds"),
            Event::SinkError { engine, message } => {
                write!(f, "Error while connecting to {engine}: {message}")
            }
            Event::ConnectionClosed { engine } => write!(f, "{engine} connection is closed"),
            Event::ConnectionNotEstablished { engine } => {
                write!(f, "Connection to {engine} could not be established")
            }
            Event::BadLines { count } => write!(f, "Number of bad lines: {count}"),
            Event::QuarantineWritten { path } => {
                write!(f, "Bad lines have been written to '{path}'")
            }
        }
    }
}

/// How the sink half of a run ended
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SinkOutcome {
    /// Every batch committed
    Loaded {
        /// Final counters
        summary: LoadSummary,
    },
    /// Schema or insert failed after connecting; earlier batches stay committed
    Failed {
        /// Error text
        reason: String,
        /// Counters up to the failure
        summary: LoadSummary,
    },
    /// The connection could not be created
    NotEstablished {
        /// Error text
        reason: String,
    },
}

impl SinkOutcome {
    /// Whether every row reached the sink
    pub fn is_success(&self) -> bool {
        matches!(self, SinkOutcome::Loaded { .. })
    }

    /// Rows committed, whatever the outcome
    pub fn rows_inserted(&self) -> usize {
        match self {
            SinkOutcome::Loaded { summary } | SinkOutcome::Failed { summary, .. } => {
                summary.rows_inserted
            }
            SinkOutcome::NotEstablished { .. } => 0,
        }
    }
}

/// Everything a finished run reports
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Rows that passed validation
    pub valid_rows: usize,
    /// Rows sent to quarantine
    pub bad_lines: usize,
    /// Quarantine file location
    pub quarantine_path: PathBuf,
    /// Sink result
    pub outcome: SinkOutcome,
    /// Last load state
    pub final_state: LoadState,
}

impl RunReport {
    /// Whether the run loaded every valid row
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}
