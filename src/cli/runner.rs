//! CLI runner - fetches the source and drives the pipeline

use crate::cli::commands::{Cli, OutputFormat};
use crate::config::{PipelineConfig, SinkEngine, SinkSettings};
use crate::database::DatabaseEngine;
use crate::engine::{run_pipeline, Event, RunReport};
use crate::error::Result;
use crate::http::HttpClient;
use tracing::{error, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Pipeline configuration derived from the arguments and environment
    pub fn pipeline_config(&self) -> PipelineConfig {
        let sink = match self.cli.engine {
            SinkEngine::Duckdb => SinkSettings::duckdb(self.cli.database_file.clone()),
            engine => SinkSettings::from_env().with_engine(engine),
        };

        PipelineConfig::new(sink)
            .with_source_url(&self.cli.source_url)
            .with_quarantine_path(&self.cli.bad_lines)
    }

    /// Fetch the source and run every stage
    pub async fn run(&self) -> Result<RunReport> {
        let config = self.pipeline_config();

        info!("Fetching {}", config.source_url);
        let client = HttpClient::new()?;
        let body = client.fetch_text(&config.source_url).await?;
        info!("Fetched {} bytes", body.len());

        let report = run_pipeline(config, &body, DatabaseEngine::connect, |event| {
            self.output_event(event);
        })?;

        info!(
            "Run finished: {} valid, {} quarantined, {} inserted",
            report.valid_rows,
            report.bad_lines,
            report.outcome.rows_inserted()
        );

        Ok(report)
    }

    /// Print one event in the selected format
    fn output_event(&self, event: &Event) {
        match self.cli.format {
            OutputFormat::Pretty => println!("{event}"),
            OutputFormat::Json => match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => error!("Failed to serialize event {:?}: {}", event, e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_duckdb_config_ignores_environment() {
        let cli = Cli::parse_from([
            "video-etl",
            "--engine",
            "duckdb",
            "--database-file",
            "videos.duckdb",
            "--bad-lines",
            "rejects.csv",
        ]);
        let config = Runner::new(cli).pipeline_config();

        assert_eq!(config.sink.engine, SinkEngine::Duckdb);
        assert_eq!(config.sink.database_file.as_deref(), Some("videos.duckdb"));
        assert!(config.sink.host.is_none());
        assert_eq!(config.quarantine_path, std::path::PathBuf::from("rejects.csv"));
        assert_eq!(config.database, "VIDEO_DATA");
        assert_eq!(config.table, "video_raw");
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn test_source_url_override() {
        let cli = Cli::parse_from(["video-etl", "--source-url", "http://localhost:9000/v.csv"]);
        let config = Runner::new(cli).pipeline_config();

        assert_eq!(config.source_url, "http://localhost:9000/v.csv");
        assert_eq!(config.sink.engine, SinkEngine::Mysql);
    }

    #[test]
    fn test_every_event_serializes_for_json_output() {
        let events = [
            Event::ProcessStarted { at: "2024-01-01 00:00:00".to_string() },
            Event::DatabaseReady { database: "VIDEO_DATA".to_string() },
            Event::RowsInserted { rows: 3 },
            Event::ProcessEnded { at: "2024-01-01 00:00:01".to_string() },
            Event::Elapsed { seconds: 1.25 },
            Event::SinkError { engine: "MySQL".to_string(), message: "refused".to_string() },
            Event::ConnectionClosed { engine: "MySQL".to_string() },
            Event::ConnectionNotEstablished { engine: "MySQL".to_string() },
            Event::BadLines { count: 2 },
            Event::QuarantineWritten { path: "bad_lines.csv".to_string() },
        ];
        let runner = Runner::new(Cli::parse_from(["video-etl", "--format", "json"]));

        for event in &events {
            let line = serde_json::to_string(event).unwrap();
            assert!(line.starts_with("{\"event\":"), "{line}");
            runner.output_event(event);
        }
    }
}
