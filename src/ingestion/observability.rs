use std::fmt;
use std::sync::Arc;

use crate::error::ExplorerError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    /// The load failed because of the input (malformed CSV, bad headers).
    Error,
    /// Critical error (I/O or other infrastructure failures).
    Critical,
}

impl LoadSeverity {
    /// Classify a load error.
    pub fn for_error(e: &ExplorerError) -> Self {
        match e {
            ExplorerError::Io(_) => Self::Critical,
            ExplorerError::Csv(err) => match err.kind() {
                csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            _ => Self::Error,
        }
    }
}

/// Context about a load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadContext {
    /// Human-readable source label (a path, or the name of an uploaded file).
    pub source: String,
}

/// Minimal stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of loaded rows.
    pub rows: usize,
    /// Number of columns.
    pub columns: usize,
}

/// Observer interface for load outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait LoadObserver: Send + Sync {
    /// Called when a load succeeds.
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    /// Called when a load fails.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &ExplorerError) {}

    /// Called when a load failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &ExplorerError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &ExplorerError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &ExplorerError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Forwards load events to the [`log`] facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl LoadObserver for LogObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        log::info!(
            "loaded source={} rows={} columns={}",
            ctx.source,
            stats.rows,
            stats.columns
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &ExplorerError) {
        log::warn!("load failed severity={severity:?} source={} err={error}", ctx.source);
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &ExplorerError) {
        log::error!("[ALERT] load failed severity={severity:?} source={} err={error}", ctx.source);
    }
}
