// Allow common clippy pedantic lints
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unused_async)]

//! Video ETL CLI
//!
//! Loads the video CSV into the configured database

use clap::Parser;
use video_etl::cli::{Cli, Runner};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let runner = Runner::new(cli);

    match runner.run().await {
        Ok(report) if report.is_success() => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
