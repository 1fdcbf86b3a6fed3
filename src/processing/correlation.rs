//! Pairwise Pearson correlation between numeric columns.

use serde::Serialize;

use super::view::ViewResult;

/// Square correlation matrix; `values[i][j]` correlates `columns[i]` with `columns[j]`.
///
/// Undefined cells (fewer than two complete pairs, or a constant column) are NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlation between two named columns, if both are in the matrix.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

/// Correlate every pair of numeric columns in `view`, using rows where both values are
/// present.
///
/// Returns `None` when the view has fewer than two numeric columns.
pub fn correlation(view: &ViewResult) -> Option<CorrelationMatrix> {
    let numeric: Vec<(usize, &str)> = view
        .schema()
        .fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.data_type.is_numeric())
        .map(|(i, f)| (i, f.name.as_str()))
        .collect();
    if numeric.len() < 2 {
        return None;
    }

    let n = numeric.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for a in 0..n {
        for b in a..n {
            let r = pearson(view, numeric[a].0, numeric[b].0);
            let r = if a == b && !r.is_nan() { 1.0 } else { r };
            values[a][b] = r;
            values[b][a] = r;
        }
    }

    Some(CorrelationMatrix {
        columns: numeric.iter().map(|(_, name)| name.to_string()).collect(),
        values,
    })
}

fn pearson(view: &ViewResult, a: usize, b: usize) -> f64 {
    let pairs: Vec<(f64, f64)> = view
        .rows()
        .iter()
        .filter_map(|row| Some((row.get(a)?.as_f64()?, row.get(b)?.as_f64()?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}
