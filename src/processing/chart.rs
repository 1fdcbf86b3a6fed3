//! Chart-ready series derived from a [`ViewResult`].
//!
//! These are plain data; rendering belongs to the presentation layer.

use serde::Serialize;

use crate::error::{ExplorerError, ExplorerResult};
use crate::types::{DataType, Value};

use super::aggregate::Aggregation;
use super::group::Groups;
use super::summary::numeric_values;
use super::view::ViewResult;

/// Default bin count for [`histogram`].
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Upper bound on the bin count [`histogram`] will allocate.
pub const MAX_HISTOGRAM_BINS: usize = 1_000;

/// One aggregated point of a [`ChartSeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: Value,
    pub y: f64,
}

/// Grouped and aggregated `(x, y)` pairs, ordered by first appearance of each x value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub x_column: String,
    /// `None` for a plain row count per group (see [`count_by`]).
    pub y_column: Option<String>,
    pub aggregation: Aggregation,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// The points as `(x, y)` tuples.
    pub fn pairs(&self) -> Vec<(Value, f64)> {
        self.points.iter().map(|p| (p.x.clone(), p.y)).collect()
    }
}

fn column_index(view: &ViewResult, column: &str) -> ExplorerResult<(usize, DataType)> {
    view.schema()
        .field(column)
        .map(|(idx, f)| (idx, f.data_type))
        .ok_or_else(|| ExplorerError::unsupported(column, "unknown column"))
}

fn require_numeric(column: &str, dt: DataType, what: &str) -> ExplorerResult<()> {
    if dt.is_numeric() {
        Ok(())
    } else {
        Err(ExplorerError::unsupported(
            column,
            format!("{what} requires a numeric column, column is {dt}"),
        ))
    }
}

/// Group the view's rows by `x_column` and aggregate `y_column` within each group.
///
/// Missing x values form their own group. Missing y values are ignored by every aggregation.
/// Fails with [`ExplorerError::UnsupportedColumn`] if a column is unknown, or if `y_column` is
/// not numeric and the aggregation needs numbers.
pub fn project(
    view: &ViewResult,
    x_column: &str,
    y_column: &str,
    aggregation: Aggregation,
) -> ExplorerResult<ChartSeries> {
    let (x_idx, _) = column_index(view, x_column)?;
    let (y_idx, y_type) = column_index(view, y_column)?;
    if aggregation.requires_numeric() {
        require_numeric(y_column, y_type, &aggregation.to_string())?;
    }

    let mut groups: Groups<Vec<&Value>> = Groups::new();
    for row in view.rows() {
        let x = row.get(x_idx).unwrap_or(&Value::Null);
        let y = row.get(y_idx).unwrap_or(&Value::Null);
        let bucket = groups.entry(x);
        if !y.is_null() {
            bucket.push(y);
        }
    }

    let mut points = Vec::with_capacity(groups.len());
    for (x, ys) in groups.into_entries() {
        let y = if aggregation.requires_numeric() {
            let values = numeric_values(y_column, ys.into_iter())?;
            aggregation.apply(&values)
        } else {
            ys.len() as f64
        };
        points.push(ChartPoint { x, y });
    }

    log::debug!(
        "projected {aggregation} of '{y_column}' by '{x_column}': {} group(s)",
        points.len()
    );
    Ok(ChartSeries {
        x_column: x_column.to_owned(),
        y_column: Some(y_column.to_owned()),
        aggregation,
        points,
    })
}

/// Number of rows per `x_column` value, ordered by first appearance.
pub fn count_by(view: &ViewResult, x_column: &str) -> ExplorerResult<ChartSeries> {
    let (x_idx, _) = column_index(view, x_column)?;
    let mut groups: Groups<usize> = Groups::new();
    for row in view.rows() {
        *groups.entry(row.get(x_idx).unwrap_or(&Value::Null)) += 1;
    }
    Ok(ChartSeries {
        x_column: x_column.to_owned(),
        y_column: None,
        aggregation: Aggregation::Count,
        points: groups
            .into_entries()
            .into_iter()
            .map(|(x, n)| ChartPoint { x, y: n as f64 })
            .collect(),
    })
}

/// Raw numeric `(x, y)` pairs for a scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub x_column: String,
    pub y_column: String,
    pub points: Vec<(f64, f64)>,
}

/// Pair up two numeric columns, keeping rows where both values are present.
pub fn scatter(view: &ViewResult, x_column: &str, y_column: &str) -> ExplorerResult<ScatterSeries> {
    let (x_idx, x_type) = column_index(view, x_column)?;
    let (y_idx, y_type) = column_index(view, y_column)?;
    require_numeric(x_column, x_type, "scatter")?;
    require_numeric(y_column, y_type, "scatter")?;

    let points = view
        .rows()
        .iter()
        .filter_map(|row| Some((row.get(x_idx)?.as_f64()?, row.get(y_idx)?.as_f64()?)))
        .collect();

    Ok(ScatterSeries {
        x_column: x_column.to_owned(),
        y_column: y_column.to_owned(),
        points,
    })
}

/// A half-open histogram bin `[lower, upper)`; the last bin also includes `upper`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<HistogramBin>,
}

/// Bin the non-missing values of a numeric column into `bins` equal-width bins.
///
/// `bins` is clamped to `1..=MAX_HISTOGRAM_BINS`. A column with no values yields no bins. A constant column is binned over
/// `[value - 0.5, value + 0.5]`.
pub fn histogram(view: &ViewResult, column: &str, bins: usize) -> ExplorerResult<Histogram> {
    let (idx, dt) = column_index(view, column)?;
    require_numeric(column, dt, "histogram")?;
    let values = numeric_values(column, view.dataset().column_values(idx))?;

    let bins = bins.clamp(1, MAX_HISTOGRAM_BINS);
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Ok(Histogram {
            column: column.to_owned(),
            bins: Vec::new(),
        });
    };
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &values {
        let slot = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[slot] += 1;
    }

    Ok(Histogram {
        column: column.to_owned(),
        bins: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: lo + width * i as f64,
                upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
                count,
            })
            .collect(),
    })
}
