//! CSV loading.

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use crate::error::{ExplorerError, ExplorerResult};
use crate::types::DataSet;

use super::infer::load_rows;
use super::options::CsvDialect;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Load a CSV file into an in-memory [`DataSet`], inferring column types.
pub fn load_csv_from_path(path: impl AsRef<Path>, dialect: &CsvDialect) -> ExplorerResult<DataSet> {
    let bytes = std::fs::read(path)?;
    load_csv_from_bytes(&bytes, dialect)
}

/// Load CSV data from any reader (e.g. an upload stream).
pub fn load_csv_from_reader<R: Read>(mut reader: R, dialect: &CsvDialect) -> ExplorerResult<DataSet> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    load_csv_from_bytes(&bytes, dialect)
}

/// Load CSV data from raw bytes.
///
/// Rules:
///
/// - The first record is the header row and must contain at least one column.
/// - Every record must have as many fields as the header.
/// - A leading UTF-8 byte-order mark is ignored. Bytes that are not valid UTF-8 are decoded as
///   ISO-8859-1.
pub fn load_csv_from_bytes(bytes: &[u8], dialect: &CsvDialect) -> ExplorerResult<DataSet> {
    let text = decode_text(bytes);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        // Ragged rows are reported below with our own error kind.
        .flexible(true)
        .delimiter(dialect.delimiter)
        .trim(if dialect.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        })
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(ExplorerError::malformed("input is empty (no header row)"));
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.len() != headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(ExplorerError::malformed(format!(
                "line {line} has {} fields, expected {}",
                record.len(),
                headers.len()
            )));
        }
        rows.push(record.iter().map(str::to_owned).collect());
    }

    load_rows(headers, rows, dialect)
}

fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        // ISO-8859-1 maps every byte to the code point of the same value.
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}
