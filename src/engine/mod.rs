//! Execution engine module
//!
//! The pipeline that owns the header, the valid rows, the quarantine and
//! the sink handle, and runs the stages in order:
//!
//! ```text
//! body ─► decode ─► validate ─┬─► quarantine file
//!                             └─► connect ─► ensure schema ─► batch load ─► close
//! ```
//!
//! Sink failures are caught and reported as events. Everything else
//! (decode, quarantine write) is returned as an error.

mod types;

pub use types::{Event, LoadState, RunReport, SinkOutcome};

use crate::config::{PipelineConfig, SinkSettings};
use crate::database::Sink;
use crate::decode::{CsvDecoder, SourceDecoder};
use crate::error::Result;
use crate::loader::{BatchLoader, LoadSummary};
use crate::output::write_quarantine;
use crate::schema::SchemaEnsurer;
use crate::types::{Header, QuarantineEntry, Row, TIMESTAMP_FORMAT};
use crate::validate::{local_now, partition};
use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};

/// One run over one source body
pub struct Pipeline {
    /// Run configuration
    config: PipelineConfig,
    /// Header of the source
    header: Header,
    /// Rows that passed validation, in source order
    valid: Vec<Row>,
    /// Rejected rows, in source order
    quarantined: Vec<QuarantineEntry>,
    /// Every load state entered, the current one last
    history: Vec<LoadState>,
}

impl Pipeline {
    /// Decode and validate a CSV body
    pub fn from_source<F>(config: PipelineConfig, body: &str, clock: F) -> Result<Self>
    where
        F: FnMut() -> NaiveDateTime,
    {
        Self::with_decoder(config, &CsvDecoder::new(), body, clock)
    }

    /// Decode with a custom decoder and validate
    pub fn with_decoder<D, F>(
        config: PipelineConfig,
        decoder: &D,
        body: &str,
        clock: F,
    ) -> Result<Self>
    where
        D: SourceDecoder + ?Sized,
        F: FnMut() -> NaiveDateTime,
    {
        let decoded = decoder.decode(body)?;
        let header = decoded.header;
        let split = partition(&header, decoded.records, clock);

        info!(
            "Validated {} records: {} valid, {} quarantined",
            split.total(),
            split.valid.len(),
            split.quarantined.len()
        );

        Ok(Self {
            config,
            header,
            valid: split.valid,
            quarantined: split.quarantined,
            history: vec![LoadState::NotStarted],
        })
    }

    /// Source header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Rows that passed validation
    pub fn valid_rows(&self) -> &[Row] {
        &self.valid
    }

    /// Rejected rows
    pub fn quarantined(&self) -> &[QuarantineEntry] {
        &self.quarantined
    }

    /// Run configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Current load state
    pub fn state(&self) -> &LoadState {
        self.history.last().unwrap_or(&LoadState::NotStarted)
    }

    /// Every load state entered so far
    pub fn history(&self) -> &[LoadState] {
        &self.history
    }

    /// Write the quarantine file (header-only when nothing was rejected)
    pub fn write_quarantine(&self) -> Result<usize> {
        write_quarantine(&self.config.quarantine_path, &self.header, &self.quarantined)
    }

    fn transition(&mut self, next: LoadState) {
        debug!("Load state: {:?} -> {:?}", self.state(), next);
        self.history.push(next);
    }

    /// Connect, ensure the schema, load every valid row and release the connection
    ///
    /// Connection and statement errors end up in the returned outcome and
    /// as `SinkError` events; they are never returned as `Err`.
    pub fn load_into<S, C, E>(&mut self, connect: C, emit: &mut E) -> SinkOutcome
    where
        S: Sink,
        C: FnOnce(&SinkSettings) -> Result<S>,
        E: FnMut(&Event),
    {
        let engine = self.config.sink.engine.label().to_string();
        let mut summary = LoadSummary::start();
        emit(&Event::ProcessStarted {
            at: summary.started_at.format(TIMESTAMP_FORMAT).to_string(),
        });

        let mut sink = match connect(&self.config.sink) {
            Ok(sink) => sink,
            Err(e) => {
                error!("Could not connect to {}: {}", engine, e);
                let reason = e.to_string();
                self.transition(LoadState::Failed {
                    reason: reason.clone(),
                });
                emit(&Event::SinkError {
                    engine: engine.clone(),
                    message: reason.clone(),
                });
                emit(&Event::ConnectionNotEstablished { engine });
                return SinkOutcome::NotEstablished { reason };
            }
        };
        self.transition(LoadState::Connected);

        let outcome = match self.ensure_and_load(&mut sink, &mut summary, emit) {
            Ok(()) => {
                self.transition(LoadState::Completed);
                SinkOutcome::Loaded { summary }
            }
            Err(e) => {
                error!(
                    "Load failed after {} committed rows: {}",
                    summary.rows_inserted, e
                );
                let reason = e.to_string();
                self.transition(LoadState::Failed {
                    reason: reason.clone(),
                });
                emit(&Event::SinkError {
                    engine: engine.clone(),
                    message: reason.clone(),
                });
                SinkOutcome::Failed { reason, summary }
            }
        };

        // the connection is released whether or not close reports an error
        match sink.close() {
            Ok(()) => emit(&Event::ConnectionClosed { engine }),
            Err(e) => {
                warn!("Failed to close {} connection: {}", engine, e);
                emit(&Event::SinkError {
                    engine,
                    message: e.to_string(),
                });
            }
        }
        self.transition(LoadState::Closed);

        outcome
    }

    fn ensure_and_load<S, E>(
        &mut self,
        sink: &mut S,
        summary: &mut LoadSummary,
        emit: &mut E,
    ) -> Result<()>
    where
        S: Sink,
        E: FnMut(&Event),
    {
        let Self {
            config,
            header,
            valid,
            history,
            ..
        } = self;

        SchemaEnsurer::new(&config.database, &config.table).ensure(sink, header)?;
        emit(&Event::DatabaseReady {
            database: config.database.clone(),
        });
        history.push(LoadState::SchemaEnsured);

        BatchLoader::new(&config.table)
            .with_batch_size(config.batch_size)
            .load(sink, header, valid, summary, |batch, of| {
                history.push(LoadState::Loading { batch, of });
            })?;

        let finished = summary.finish();
        info!(
            "Inserted {} rows in {} batches",
            summary.rows_inserted, summary.batches
        );
        emit(&Event::RowsInserted {
            rows: summary.rows_inserted,
        });
        emit(&Event::ProcessEnded {
            at: finished.format(TIMESTAMP_FORMAT).to_string(),
        });
        emit(&Event::Elapsed {
            seconds: summary.elapsed_secs(),
        });

        Ok(())
    }

    /// Build the final report for a sink outcome
    pub fn report(&self, outcome: SinkOutcome) -> RunReport {
        RunReport {
            valid_rows: self.valid.len(),
            bad_lines: self.quarantined.len(),
            quarantine_path: self.config.quarantine_path.clone(),
            outcome,
            final_state: self.state().clone(),
        }
    }
}

/// Run every stage over a fetched body
///
/// The quarantine file is written before the sink is touched, so it exists
/// whatever happens to the load. Errors other than sink errors are returned.
pub fn run_pipeline<S, C, E>(
    config: PipelineConfig,
    body: &str,
    connect: C,
    mut emit: E,
) -> Result<RunReport>
where
    S: Sink,
    C: FnOnce(&SinkSettings) -> Result<S>,
    E: FnMut(&Event),
{
    let mut pipeline = Pipeline::from_source(config, body, local_now)?;
    pipeline.write_quarantine()?;

    let outcome = pipeline.load_into(connect, &mut emit);

    emit(&Event::BadLines {
        count: pipeline.quarantined().len(),
    });
    emit(&Event::QuarantineWritten {
        path: pipeline.config().quarantine_path.display().to_string(),
    });

    Ok(pipeline.report(outcome))
}
