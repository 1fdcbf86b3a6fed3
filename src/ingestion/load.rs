//! Observed load entrypoints.
//!
//! [`load_from_path`] and [`load_from_bytes`] wrap the CSV loaders and, if an
//! [`LoadObserver`](super::LoadObserver) is configured, report success/failure/alerts to it.

use std::path::Path;

use crate::error::ExplorerResult;
use crate::types::DataSet;

use super::csv::{load_csv_from_bytes, load_csv_from_path};
use super::observability::{LoadContext, LoadSeverity, LoadStats};
use super::options::LoadOptions;

/// Load a CSV file from disk.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/column stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// ```no_run
/// use std::sync::Arc;
///
/// use csv_explorer::ingestion::{load_from_path, LoadOptions, LogObserver};
///
/// # fn main() -> Result<(), csv_explorer::ExplorerError> {
/// let opts = LoadOptions {
///     observer: Some(Arc::new(LogObserver)),
///     ..Default::default()
/// };
/// let ds = load_from_path("sales.csv", &opts)?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
pub fn load_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> ExplorerResult<DataSet> {
    let path = path.as_ref();
    let ctx = LoadContext {
        source: path.display().to_string(),
    };
    let result = load_csv_from_path(path, &options.dialect);
    report(&ctx, options, &result);
    result
}

/// Load CSV bytes handed over by an upload handler.
///
/// `source` is only used to label observer events.
pub fn load_from_bytes(
    bytes: &[u8],
    source: &str,
    options: &LoadOptions,
) -> ExplorerResult<DataSet> {
    let ctx = LoadContext {
        source: source.to_owned(),
    };
    let result = load_csv_from_bytes(bytes, &options.dialect);
    report(&ctx, options, &result);
    result
}

fn report(ctx: &LoadContext, options: &LoadOptions, result: &ExplorerResult<DataSet>) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(ds) => obs.on_success(
            ctx,
            LoadStats {
                rows: ds.row_count(),
                columns: ds.column_count(),
            },
        ),
        Err(e) => {
            let sev = LoadSeverity::for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}
