//! Tests for batch loader module

use super::*;
use crate::config::{SinkEngine, SinkSettings};
use crate::database::{DatabaseEngine, Sink};
use crate::error::{Error, Result};
use crate::schema::SchemaEnsurer;
use crate::types::{Header, Row};
use pretty_assertions::assert_eq;

/// Sink that keeps every insert it receives
#[derive(Default)]
struct RecordingSink {
    inserts: Vec<(String, Vec<String>)>,
    fail_on_insert: Option<usize>,
}

impl Sink for RecordingSink {
    fn engine(&self) -> SinkEngine {
        SinkEngine::Mysql
    }

    fn execute(&mut self, _sql: &str) -> Result<()> {
        Ok(())
    }

    fn insert_batch(&mut self, sql: &str, values: &[&str]) -> Result<usize> {
        if self.fail_on_insert == Some(self.inserts.len()) {
            return Err(Error::statement("Data too long for column 'title'"));
        }
        self.inserts
            .push((sql.to_string(), values.iter().map(|v| (*v).to_string()).collect()));
        Ok(values.len())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

fn header() -> Header {
    Header::new(["id", "title", "views"])
}

fn rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| vec![i.to_string(), format!("title {i}"), (i * 10).to_string()])
        .collect()
}

#[test]
fn test_batch_count() {
    let loader = BatchLoader::default();
    assert_eq!(loader.batch_size(), 100);
    assert_eq!(loader.batch_count(0), 0);
    assert_eq!(loader.batch_count(1), 1);
    assert_eq!(loader.batch_count(100), 1);
    assert_eq!(loader.batch_count(101), 2);
    assert_eq!(loader.batch_count(250), 3);
}

#[test]
fn test_zero_batch_size_is_clamped() {
    let loader = BatchLoader::default().with_batch_size(0);
    assert_eq!(loader.batch_size(), 1);
}

#[test]
fn test_insert_sql() {
    let loader = BatchLoader::new("video_raw");
    assert_eq!(
        loader.insert_sql(&header(), 2),
        "INSERT INTO \"video_raw\" (\"id\", \"title\", \"views\") VALUES (?, ?, ?), (?, ?, ?)"
    );
}

#[test]
fn test_insert_sql_never_contains_values() {
    let loader = BatchLoader::default();
    let mut sink = RecordingSink::default();
    let hostile = vec![vec![
        "1".to_string(),
        "'); DROP TABLE video_raw; --".to_string(),
        "0".to_string(),
    ]];
    let mut summary = LoadSummary::start();

    loader
        .load(&mut sink, &header(), &hostile, &mut summary, |_, _| {})
        .unwrap();

    let (sql, values) = &sink.inserts[0];
    assert!(!sql.contains("DROP"));
    assert_eq!(values[1], "'); DROP TABLE video_raw; --");
}

#[test]
fn test_250_rows_make_three_ordered_batches() {
    let loader = BatchLoader::default();
    let mut sink = RecordingSink::default();
    let input = rows(250);
    let mut summary = LoadSummary::start();
    let mut progress = Vec::new();

    loader
        .load(&mut sink, &header(), &input, &mut summary, |i, n| {
            progress.push((i, n));
        })
        .unwrap();

    let sizes: Vec<usize> = sink.inserts.iter().map(|(_, v)| v.len() / 3).collect();
    assert_eq!(sizes, vec![100, 100, 50]);
    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(summary.rows_inserted, 250);
    assert_eq!(summary.batches, 3);

    // order is preserved within and across batches
    let flattened: Vec<String> = sink
        .inserts
        .iter()
        .flat_map(|(_, v)| v.iter().cloned())
        .collect();
    let expected: Vec<String> = input.into_iter().flatten().collect();
    assert_eq!(flattened, expected);
}

#[test]
fn test_batches_never_exceed_size() {
    for (n, size) in [(0, 7), (1, 7), (7, 7), (8, 7), (99, 10), (1000, 33)] {
        let loader = BatchLoader::default().with_batch_size(size);
        let input = rows(n);
        let batches: Vec<&[Row]> = loader.batches(&input).collect();

        assert_eq!(batches.len(), loader.batch_count(n));
        assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= size));
        assert_eq!(batches.iter().map(|b| b.len()).sum::<usize>(), n);
    }
}

#[test]
fn test_no_rows_no_inserts() {
    let loader = BatchLoader::default();
    let mut sink = RecordingSink::default();
    let mut summary = LoadSummary::start();

    loader
        .load(&mut sink, &header(), &[], &mut summary, |_, _| {
            panic!("no batch expected")
        })
        .unwrap();

    assert!(sink.inserts.is_empty());
    assert_eq!(summary.rows_inserted, 0);
}

#[test]
fn test_failed_batch_stops_load_and_keeps_committed_count() {
    let loader = BatchLoader::default();
    let mut sink = RecordingSink {
        fail_on_insert: Some(1),
        ..RecordingSink::default()
    };
    let mut summary = LoadSummary::start();

    let err = loader
        .load(&mut sink, &header(), &rows(250), &mut summary, |_, _| {})
        .unwrap_err();

    assert!(err.is_sink_error());
    assert_eq!(sink.inserts.len(), 1);
    assert_eq!(summary.rows_inserted, 100);
    assert_eq!(summary.batches, 1);
}

#[test]
fn test_summary_elapsed() {
    let mut summary = LoadSummary::start();
    assert!(summary.finished_at.is_none());
    let finished = summary.finish();
    assert_eq!(summary.finished_at, Some(finished));
    assert!(summary.elapsed_secs() >= 0.0);
}

#[test]
fn test_load_into_duckdb() {
    let mut engine = DatabaseEngine::connect(&SinkSettings::duckdb(None)).unwrap();
    let header = header();
    SchemaEnsurer::default().ensure(&mut engine, &header).unwrap();

    let input = rows(250);
    let mut summary = LoadSummary::start();
    BatchLoader::default()
        .load(&mut engine, &header, &input, &mut summary, |_, _| {})
        .unwrap();

    assert_eq!(summary.rows_inserted, 250);
    assert_eq!(engine.row_count("VIDEO_DATA", "video_raw").unwrap(), 250);
    assert_eq!(engine.select_rows("VIDEO_DATA", "video_raw", 3).unwrap(), input);

    engine.close().unwrap();
}

#[test]
fn test_mid_run_failure_keeps_earlier_batches_in_duckdb() {
    let mut engine = DatabaseEngine::connect(&SinkSettings::duckdb(None)).unwrap();
    let header = header();
    SchemaEnsurer::default().ensure(&mut engine, &header).unwrap();

    // the third row of the second batch is one field short
    let mut input = rows(15);
    input[12].pop();

    let mut summary = LoadSummary::start();
    let result = BatchLoader::default().with_batch_size(10).load(
        &mut engine,
        &header,
        &input,
        &mut summary,
        |_, _| {},
    );

    assert!(result.is_err());
    assert_eq!(summary.rows_inserted, 10);
    assert_eq!(engine.row_count("VIDEO_DATA", "video_raw").unwrap(), 10);
}
