//! Hand results back out: a view as CSV (the "download filtered data" path), or any result
//! structure as JSON for a presentation layer.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::ExplorerResult;
use crate::processing::ViewResult;
use crate::types::Value;

/// Options for [`write_csv`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvExportOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Prefix the output with a UTF-8 byte-order mark (helps spreadsheet apps detect UTF-8).
    pub include_bom: bool,
}

impl Default for CsvExportOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            include_bom: true,
        }
    }
}

/// Cell text for CSV output. Whole floats keep a `.0` so the column reloads as `float64`.
fn csv_field(value: &Value) -> String {
    match value {
        Value::Float64(v) if v.fract() == 0.0 => format!("{v:.1}"),
        other => other.to_string(),
    }
}

/// Write the header and every row of `view` as CSV. Missing values become empty fields.
pub fn write_csv<W: Write>(
    view: &ViewResult,
    mut writer: W,
    options: &CsvExportOptions,
) -> ExplorerResult<()> {
    if options.include_bom {
        writer.write_all(b"\xEF\xBB\xBF")?;
    }
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(writer);

    wtr.write_record(view.schema().field_names())?;
    for row in view.rows() {
        wtr.write_record(row.iter().map(csv_field))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render `view` as CSV bytes.
pub fn to_csv_bytes(view: &ViewResult, options: &CsvExportOptions) -> ExplorerResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(view, &mut buf, options)?;
    Ok(buf)
}

/// Serialize any result structure (view, summary, series, profile) as pretty JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> ExplorerResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
