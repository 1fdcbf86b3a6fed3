//! Aggregations applied to the y values of each chart group.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Built-in aggregation over a group of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Sum of non-missing values; `0` for an empty group.
    Sum,
    /// Arithmetic mean of non-missing values; NaN for an empty group.
    Mean,
    /// Median of non-missing values; NaN for an empty group.
    Median,
    /// Number of non-missing values. Works on any column kind.
    Count,
}

impl Aggregation {
    /// Whether the aggregated column must be numeric.
    pub fn requires_numeric(self) -> bool {
        !matches!(self, Self::Count)
    }

    /// Aggregate numeric values.
    pub fn apply(self, values: &[f64]) -> f64 {
        match self {
            Self::Sum => values.iter().sum(),
            Self::Mean => mean(values).unwrap_or(f64::NAN),
            Self::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                percentile(&sorted, 50.0).unwrap_or(f64::NAN)
            }
            Self::Count => values.len() as f64,
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Count => "count",
        })
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator). `None` for fewer than two values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(var.sqrt())
}

/// Percentile with linear interpolation between closest ranks. `sorted` must be ascending.
pub(crate) fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        1 => Some(sorted[0]),
        _ => {
            let rank = (p / 100.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = (rank.ceil() as usize).min(n - 1);
            let frac = rank - lower as f64;
            Some(sorted[lower] * (1.0 - frac) + sorted[upper] * frac)
        }
    }
}
