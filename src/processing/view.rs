//! Filtered views over a [`DataSet`].

use serde::Serialize;

use crate::types::{DataSet, Schema, Value};

/// The ordered subsequence of a dataset's rows that satisfied a predicate set.
///
/// A view owns a copy of the kept rows (in the source's order) plus the index each row had in
/// the source dataset. It is recomputed on every filter change and never written back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewResult {
    dataset: DataSet,
    source_rows: Vec<usize>,
}

impl ViewResult {
    pub(crate) fn new(dataset: DataSet, source_rows: Vec<usize>) -> Self {
        debug_assert_eq!(dataset.row_count(), source_rows.len());
        Self {
            dataset,
            source_rows,
        }
    }

    /// A view containing every row of `dataset`.
    pub fn all(dataset: &DataSet) -> Self {
        Self::new(dataset.clone(), (0..dataset.row_count()).collect())
    }

    /// The kept rows as a dataset with the source schema.
    pub fn dataset(&self) -> &DataSet {
        &self.dataset
    }

    /// Consume the view, returning its rows as a dataset.
    pub fn into_dataset(self) -> DataSet {
        self.dataset
    }

    /// Schema (column order and kinds) of the view.
    pub fn schema(&self) -> &Schema {
        &self.dataset.schema
    }

    /// Kept rows, in source order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.dataset.rows
    }

    /// Index of each kept row in the source dataset.
    pub fn source_rows(&self) -> &[usize] {
        &self.source_rows
    }

    /// Number of kept rows.
    pub fn row_count(&self) -> usize {
        self.dataset.row_count()
    }

    /// At most the first `n` rows, for previews.
    pub fn head(&self, n: usize) -> &[Vec<Value>] {
        &self.dataset.rows[..n.min(self.dataset.rows.len())]
    }
}
