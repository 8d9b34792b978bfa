//! Tests for decoder module

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;

fn fields(record: &crate::types::Record) -> Vec<&str> {
    record.fields.iter().map(String::as_str).collect()
}

#[test]
fn test_csv_decoder_header_and_records() {
    let body = "id,title,views\n1,A,10\n2,B,20\n";
    let decoded = CsvDecoder::new().decode(body).unwrap();

    assert_eq!(decoded.header.fields(), &["id", "title", "views"]);
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded.records[0].number, 2);
    assert_eq!(fields(&decoded.records[0]), vec!["1", "A", "10"]);
    assert_eq!(decoded.records[1].number, 3);
}

#[test]
fn test_csv_decoder_keeps_ragged_rows() {
    let body = "id,title,views\n1,A,10\n2,B\n3,C,30,extra\n";
    let decoded = CsvDecoder::new().decode(body).unwrap();

    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded.records[1].fields.len(), 2);
    assert_eq!(decoded.records[2].fields.len(), 4);
    assert_eq!(decoded.records[2].number, 4);
}

#[test]
fn test_csv_decoder_quoted_fields() {
    let body = "id,title\n1,\"Hello, world\"\n2,\"She said \"\"hi\"\"\"\n";
    let decoded = CsvDecoder::new().decode(body).unwrap();

    assert_eq!(fields(&decoded.records[0]), vec!["1", "Hello, world"]);
    assert_eq!(fields(&decoded.records[1]), vec!["2", "She said \"hi\""]);
}

#[test]
fn test_csv_decoder_crlf_and_missing_trailing_newline() {
    let body = "id,title\r\n1,A\r\n2,B";
    let decoded = CsvDecoder::new().decode(body).unwrap();

    assert_eq!(decoded.header.fields(), &["id", "title"]);
    assert_eq!(fields(&decoded.records[1]), vec!["2", "B"]);
}

#[test]
fn test_csv_decoder_strips_bom() {
    let body = "\u{feff}id,title\n1,A\n";
    let decoded = CsvDecoder::new().decode(body).unwrap();
    assert_eq!(decoded.header.fields()[0], "id");
}

#[test]
fn test_csv_decoder_header_only() {
    let decoded = CsvDecoder::new().decode("id,title\n").unwrap();
    assert_eq!(decoded.header.len(), 2);
    assert!(decoded.is_empty());
}

#[test]
fn test_csv_decoder_empty_body() {
    let err = CsvDecoder::new().decode("").unwrap_err();
    assert!(matches!(err, Error::EmptySource));
}

#[test]
fn test_csv_decoder_blank_lines_are_empty_records() {
    let body = "id,title\n1,A\n\n2\n";
    let decoded = CsvDecoder::new().decode(body).unwrap();

    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded.records[1].number, 3);
    assert!(decoded.records[1].fields.is_empty());
    assert_eq!(decoded.records[2].number, 4);
    assert_eq!(fields(&decoded.records[2]), vec!["2"]);
}

#[test]
fn test_csv_decoder_trailing_blank_line_is_a_record() {
    let decoded = CsvDecoder::new().decode("id,title\n1,A\n\n").unwrap();

    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded.records[1].number, 3);
    assert!(decoded.records[1].fields.is_empty());
}

#[test]
fn test_csv_decoder_blank_crlf_line() {
    let decoded = CsvDecoder::new().decode("id\r\n\r\n7\r\n").unwrap();

    assert!(decoded.records[0].fields.is_empty());
    assert_eq!(fields(&decoded.records[1]), vec!["7"]);
    assert_eq!(decoded.records[1].number, 3);
}

#[test]
fn test_csv_decoder_newline_inside_quotes_is_one_record() {
    let body = "id,title\n1,\"two\nlines\"\n\"2\",\"say \"\"hi\"\"\"\n3,C\n";
    let decoded = CsvDecoder::new().decode(body).unwrap();

    assert_eq!(decoded.len(), 3);
    assert_eq!(fields(&decoded.records[0]), vec!["1", "two\nlines"]);
    assert_eq!(fields(&decoded.records[1]), vec!["2", "say \"hi\""]);
    assert_eq!(decoded.records[2].number, 4);
}

#[test]
fn test_csv_decoder_quote_inside_unquoted_field_is_literal() {
    let body = "id,title\n1,5\" screen\n2,B\n";
    let decoded = CsvDecoder::new().decode(body).unwrap();

    assert_eq!(decoded.len(), 2);
    assert_eq!(fields(&decoded.records[1]), vec!["2", "B"]);
}
