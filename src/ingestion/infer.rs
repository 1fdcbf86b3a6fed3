//! Column-kind inference and typed row construction from raw string rows.

use crate::error::{ExplorerError, ExplorerResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::options::CsvDialect;

/// Load already-split raw rows into a [`DataSet`], inferring the column schema.
///
/// Rules:
///
/// - `headers` must contain at least one column; names must be unique. Blank names become
///   `Unnamed: <index>`.
/// - Every row must have exactly as many fields as `headers`.
/// - Cells that are blank or match one of `dialect.null_tokens` become [`Value::Null`].
/// - Each column gets the narrowest type that every non-missing cell parses as, trying
///   `Bool`, `Int64`, `Float64`, `DateTime` in that order and falling back to `Utf8`.
pub fn load_rows(
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    dialect: &CsvDialect,
) -> ExplorerResult<DataSet> {
    let names = normalize_headers(headers)?;

    for (row_idx0, row) in rows.iter().enumerate() {
        if row.len() != names.len() {
            return Err(ExplorerError::malformed(format!(
                "row {} has {} fields, expected {} (header={:?})",
                // 1-based, header is row 1
                row_idx0 + 2,
                row.len(),
                names.len(),
                names
            )));
        }
    }

    let types: Vec<DataType> = (0..names.len())
        .map(|col| infer_data_type(rows.iter().map(|r| r[col].as_str()), dialect))
        .collect();

    let typed_rows = rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(types.iter())
                .map(|(raw, data_type)| typed_value(raw, *data_type, dialect))
                .collect()
        })
        .collect();

    let fields = names
        .into_iter()
        .zip(types)
        .map(|(name, data_type)| Field::new(name, data_type))
        .collect();

    Ok(DataSet::new(Schema::new(fields), typed_rows))
}

fn normalize_headers(headers: Vec<String>) -> ExplorerResult<Vec<String>> {
    if headers.is_empty() {
        return Err(ExplorerError::malformed("input has no columns"));
    }

    let mut names: Vec<String> = Vec::with_capacity(headers.len());
    for (idx, raw) in headers.into_iter().enumerate() {
        let trimmed = raw.trim();
        let name = if trimmed.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            trimmed.to_owned()
        };
        if names.contains(&name) {
            return Err(ExplorerError::malformed(format!(
                "duplicate column name '{name}'"
            )));
        }
        names.push(name);
    }
    Ok(names)
}

/// Returns the trimmed token, or `None` if the cell counts as missing.
fn token<'a>(raw: &'a str, dialect: &CsvDialect) -> Option<&'a str> {
    let t = if dialect.trim { raw.trim() } else { raw };
    if t.trim().is_empty() || dialect.null_tokens.iter().any(|n| n == t) {
        None
    } else {
        Some(t)
    }
}

/// Infer the narrowest [`DataType`] every non-missing value of a column parses as.
///
/// A column with no non-missing values is `Utf8`.
pub fn infer_data_type<'a>(
    values: impl IntoIterator<Item = &'a str>,
    dialect: &CsvDialect,
) -> DataType {
    let mut seen = false;
    let mut can_bool = true;
    let mut can_int = true;
    let mut can_float = true;
    let mut can_datetime = true;

    for raw in values {
        let Some(t) = token(raw, dialect) else {
            continue;
        };
        seen = true;
        can_bool = can_bool && DataType::Bool.parse_literal(t).is_some();
        can_int = can_int && DataType::Int64.parse_literal(t).is_some();
        can_float = can_float && DataType::Float64.parse_literal(t).is_some();
        can_datetime = can_datetime && DataType::DateTime.parse_literal(t).is_some();
        if !(can_bool || can_int || can_float || can_datetime) {
            return DataType::Utf8;
        }
    }

    match (seen, can_bool, can_int, can_float, can_datetime) {
        (false, ..) => DataType::Utf8,
        (_, true, ..) => DataType::Bool,
        (_, _, true, ..) => DataType::Int64,
        (_, _, _, true, _) => DataType::Float64,
        (_, _, _, _, true) => DataType::DateTime,
        _ => DataType::Utf8,
    }
}

fn typed_value(raw: &str, data_type: DataType, dialect: &CsvDialect) -> Value {
    match token(raw, dialect) {
        None => Value::Null,
        Some(t) => data_type
            .parse_literal(t)
            .unwrap_or_else(|| Value::Utf8(t.to_owned())),
    }
}
