//! Describe-style summary statistics over a [`ViewResult`].

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{ExplorerError, ExplorerResult};
use crate::types::{DataType, Value};

use super::aggregate::{mean, percentile, sample_std};
use super::group::Groups;
use super::view::ViewResult;

/// Statistics of a numeric column. Missing values are excluded from every field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation; `None` for fewer than two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Statistics of a text or boolean column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub distinct: usize,
    /// Most frequent value; ties go to the value seen first.
    pub top: Option<Value>,
    pub top_count: usize,
}

/// Statistics of a datetime column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalSummary {
    pub count: usize,
    pub distinct: usize,
    pub min: Option<NaiveDateTime>,
    pub max: Option<NaiveDateTime>,
}

/// Per-column summary, shaped by the column kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
    Temporal(TemporalSummary),
}

/// A computed column summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub summary: ColumnSummary,
}

/// A requested column that could not be summarized, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedColumn {
    pub column: String,
    pub reason: String,
}

/// Result of [`summarize`]: computed columns in request order, plus skipped columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub columns: Vec<ColumnStats>,
    pub skipped: Vec<SkippedColumn>,
}

impl SummaryStats {
    /// Summary for `column`, if it was computed.
    pub fn get(&self, column: &str) -> Option<&ColumnSummary> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| &c.summary)
    }
}

/// Summarize the requested columns of `view`.
///
/// Columns that cannot be summarized (unknown, or holding values that contradict the column
/// type) are listed in [`SummaryStats::skipped`]; the rest are still computed.
pub fn summarize<S: AsRef<str>>(view: &ViewResult, columns: &[S]) -> SummaryStats {
    let mut out = SummaryStats::default();
    for column in columns {
        let column = column.as_ref();
        match summarize_column(view, column) {
            Ok(summary) => out.columns.push(ColumnStats {
                column: column.to_owned(),
                summary,
            }),
            Err(e) => {
                log::debug!("summary skipped column '{column}': {e}");
                out.skipped.push(SkippedColumn {
                    column: column.to_owned(),
                    reason: e.to_string(),
                });
            }
        }
    }
    out
}

/// Summarize every column of `view`, in schema order.
pub fn summarize_all(view: &ViewResult) -> SummaryStats {
    let names: Vec<&str> = view.schema().field_names().collect();
    summarize(view, names.as_slice())
}

/// Summarize a single column.
///
/// Fails with [`ExplorerError::UnsupportedColumn`] if the column is unknown or holds a value
/// that does not fit its declared type.
pub fn summarize_column(view: &ViewResult, column: &str) -> ExplorerResult<ColumnSummary> {
    let (idx, field) = view
        .schema()
        .field(column)
        .ok_or_else(|| ExplorerError::unsupported(column, "unknown column"))?;
    let dt = field.data_type;
    let values = view.dataset().column_values(idx);

    match dt {
        DataType::Int64 | DataType::Float64 => {
            numeric_values(column, values).map(|v| ColumnSummary::Numeric(numeric_summary(v)))
        }
        DataType::Utf8 | DataType::Bool => {
            categorical_summary(column, dt, values).map(ColumnSummary::Categorical)
        }
        DataType::DateTime => temporal_summary(column, values).map(ColumnSummary::Temporal),
    }
}

/// Collect non-missing numeric values of a column, rejecting any non-numeric value.
pub(crate) fn numeric_values<'a>(
    column: &str,
    values: impl Iterator<Item = &'a Value>,
) -> ExplorerResult<Vec<f64>> {
    let mut out = Vec::new();
    for v in values {
        if v.is_null() {
            continue;
        }
        match v.as_f64() {
            Some(x) => out.push(x),
            None => return Err(mixed(column, v)),
        }
    }
    Ok(out)
}

fn mixed(column: &str, v: &Value) -> ExplorerError {
    ExplorerError::unsupported(
        column,
        format!(
            "column holds mixed types (found {} value `{v}`)",
            v.data_type().map(DataType::name).unwrap_or("null")
        ),
    )
}

fn numeric_summary(values: Vec<f64>) -> NumericSummary {
    let mut sorted = values;
    sorted.sort_by(f64::total_cmp);
    NumericSummary {
        count: sorted.len(),
        mean: mean(&sorted),
        std: sample_std(&sorted),
        min: sorted.first().copied(),
        q25: percentile(&sorted, 25.0),
        median: percentile(&sorted, 50.0),
        q75: percentile(&sorted, 75.0),
        max: sorted.last().copied(),
    }
}

fn categorical_summary<'a>(
    column: &str,
    dt: DataType,
    values: impl Iterator<Item = &'a Value>,
) -> ExplorerResult<CategoricalSummary> {
    let mut groups: Groups<usize> = Groups::new();
    let mut count = 0;
    for v in values {
        if !v.fits(dt) {
            return Err(mixed(column, v));
        }
        if v.is_null() {
            continue;
        }
        count += 1;
        *groups.entry(v) += 1;
    }

    let mut top: Option<(&Value, usize)> = None;
    for (v, n) in groups.iter() {
        if top.is_none_or(|(_, best)| *n > best) {
            top = Some((v, *n));
        }
    }

    Ok(CategoricalSummary {
        count,
        distinct: groups.len(),
        top: top.map(|(v, _)| v.clone()),
        top_count: top.map(|(_, n)| n).unwrap_or(0),
    })
}

fn temporal_summary<'a>(
    column: &str,
    values: impl Iterator<Item = &'a Value>,
) -> ExplorerResult<TemporalSummary> {
    let mut groups: Groups<()> = Groups::new();
    let mut min: Option<NaiveDateTime> = None;
    let mut max: Option<NaiveDateTime> = None;
    let mut count = 0;
    for v in values {
        if !v.fits(DataType::DateTime) {
            return Err(mixed(column, v));
        }
        if let Value::DateTime(dt) = v {
            count += 1;
            groups.entry(v);
            min = Some(min.map_or(*dt, |m| m.min(*dt)));
            max = Some(max.map_or(*dt, |m| m.max(*dt)));
        }
    }
    Ok(TemporalSummary {
        count,
        distinct: groups.len(),
        min,
        max,
    })
}
