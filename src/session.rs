//! Per-upload session state: the loaded dataset, the active filters and the current view.
//!
//! Presentation code owns one [`Session`] per user, calls a method per interaction, and renders
//! whatever it returns. Nothing here is shared between sessions.

use std::sync::Arc;

use crate::error::{ExplorerError, ExplorerResult};
use crate::execution::ExecutionEngine;
use crate::processing::{
    apply_filters, correlation, count_by, histogram, profile, project, scatter, summarize,
    Aggregation, ChartSeries, CorrelationMatrix, DatasetProfile, Histogram, Predicate,
    ScatterSeries, SummaryStats, ViewResult,
};
use crate::types::DataSet;

/// One user's exploration state over one loaded dataset.
pub struct Session {
    dataset: DataSet,
    filters: Vec<Predicate>,
    view: ViewResult,
    engine: Option<Arc<ExecutionEngine>>,
}

impl Session {
    /// Start a session over a freshly loaded dataset, with no filters.
    pub fn new(dataset: DataSet) -> Self {
        let view = ViewResult::all(&dataset);
        Self {
            dataset,
            filters: Vec::new(),
            view,
            engine: None,
        }
    }

    /// Evaluate filters with `engine` instead of sequentially.
    pub fn with_engine(mut self, engine: Arc<ExecutionEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// The loaded dataset, unchanged by filtering.
    pub fn dataset(&self) -> &DataSet {
        &self.dataset
    }

    /// Active filters, in the order they were added.
    pub fn filters(&self) -> &[Predicate] {
        &self.filters
    }

    /// The current filtered view.
    pub fn view(&self) -> &ViewResult {
        &self.view
    }

    /// Discard the current dataset and filters and start over with `dataset`.
    pub fn replace_dataset(&mut self, dataset: DataSet) {
        log::debug!(
            "session dataset replaced: {} rows, {} columns",
            dataset.row_count(),
            dataset.column_count()
        );
        *self = Self {
            view: ViewResult::all(&dataset),
            dataset,
            filters: Vec::new(),
            engine: self.engine.take(),
        };
    }

    /// Add a filter and recompute the view.
    ///
    /// If the predicate is incompatible with the dataset, the error is returned and both the
    /// filter list and the current view stay as they were.
    pub fn add_filter(&mut self, predicate: Predicate) -> ExplorerResult<&ViewResult> {
        predicate.validate(&self.dataset.schema)?;
        let mut filters = self.filters.clone();
        filters.push(predicate);
        self.commit(filters)
    }

    /// Replace every filter at once; all-or-nothing.
    pub fn set_filters(&mut self, filters: Vec<Predicate>) -> ExplorerResult<&ViewResult> {
        self.commit(filters)
    }

    /// Remove the filter at `index` and recompute the view.
    ///
    /// Returns `Ok(None)` (and changes nothing) if `index` is out of range.
    pub fn remove_filter(&mut self, index: usize) -> ExplorerResult<Option<Predicate>> {
        if index >= self.filters.len() {
            return Ok(None);
        }
        let mut filters = self.filters.clone();
        let removed = filters.remove(index);
        self.commit(filters)?;
        Ok(Some(removed))
    }

    /// Drop every filter; the view goes back to the full dataset.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.view = ViewResult::all(&self.dataset);
    }

    fn commit(&mut self, filters: Vec<Predicate>) -> ExplorerResult<&ViewResult> {
        let view = match &self.engine {
            Some(engine) => engine.apply_filters(&self.dataset, &filters)?,
            None => apply_filters(&self.dataset, &filters)?,
        };
        self.filters = filters;
        self.view = view;
        Ok(&self.view)
    }

    /// Overview of the loaded dataset (not the filtered view).
    pub fn profile(&self) -> DatasetProfile {
        profile(&self.dataset)
    }

    /// Summary statistics over the current view.
    pub fn summarize<S: AsRef<str>>(&self, columns: &[S]) -> SummaryStats {
        match &self.engine {
            Some(engine) => engine.summarize(&self.view, columns),
            None => summarize(&self.view, columns),
        }
    }

    /// Chart series over the current view.
    ///
    /// With `y_column == None` the series counts rows per x value. Otherwise `aggregation` is
    /// applied to y. A non-numeric y with sum/mean/median falls back to counting rows per x;
    /// an unknown y column is still an error.
    pub fn chart(
        &self,
        x_column: &str,
        y_column: Option<&str>,
        aggregation: Aggregation,
    ) -> ExplorerResult<ChartSeries> {
        let Some(y) = y_column else {
            return count_by(&self.view, x_column);
        };
        let (_, field) = self
            .view
            .schema()
            .field(y)
            .ok_or_else(|| ExplorerError::unsupported(y, "unknown column"))?;
        if aggregation.requires_numeric() && !field.data_type.is_numeric() {
            log::debug!("chart y '{y}' is {}, counting rows per '{x_column}'", field.data_type);
            return count_by(&self.view, x_column);
        }
        project(&self.view, x_column, y, aggregation)
    }

    /// Strict projection over the current view; see [`crate::processing::project`].
    pub fn project(
        &self,
        x_column: &str,
        y_column: &str,
        aggregation: Aggregation,
    ) -> ExplorerResult<ChartSeries> {
        project(&self.view, x_column, y_column, aggregation)
    }

    /// Scatter pairs over the current view.
    pub fn scatter(&self, x_column: &str, y_column: &str) -> ExplorerResult<ScatterSeries> {
        scatter(&self.view, x_column, y_column)
    }

    /// Histogram over the current view.
    pub fn histogram(&self, column: &str, bins: usize) -> ExplorerResult<Histogram> {
        histogram(&self.view, column, bins)
    }

    /// Correlation matrix over the current view's numeric columns.
    pub fn correlation(&self) -> Option<CorrelationMatrix> {
        correlation(&self.view)
    }
}
