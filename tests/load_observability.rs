use std::sync::{Arc, Mutex};

use csv_explorer::ingestion::{
    load_from_bytes, load_from_path, CompositeObserver, LoadContext, LoadObserver, LoadOptions,
    LoadSeverity, LoadStats,
};
use csv_explorer::ExplorerError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(String, LoadStats)>>,
    failures: Mutex<Vec<LoadSeverity>>,
    alerts: Mutex<Vec<LoadSeverity>>,
}

impl LoadObserver for RecordingObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.successes.lock().unwrap().push((ctx.source.clone(), stats));
    }

    fn on_failure(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &ExplorerError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &ExplorerError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn options(obs: Arc<RecordingObserver>, alert_at_or_above: LoadSeverity) -> LoadOptions {
    LoadOptions {
        observer: Some(obs),
        alert_at_or_above,
        ..Default::default()
    }
}

#[test]
fn observer_receives_success_stats() {
    let obs = Arc::new(RecordingObserver::default());
    let ds = load_from_path("tests/fixtures/sales.csv", &options(obs.clone(), LoadSeverity::Critical))
        .unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![(
            "tests/fixtures/sales.csv".to_string(),
            LoadStats {
                rows: ds.row_count(),
                columns: 6
            }
        )]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options(obs.clone(), LoadSeverity::Critical);

    // Missing file -> Io error -> Critical
    let _ = load_from_path("tests/fixtures/does_not_exist.csv", &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![LoadSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![LoadSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_malformed_input() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options(obs.clone(), LoadSeverity::Critical);

    let _ = load_from_path("tests/fixtures/ragged.csv", &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![LoadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lower_alert_threshold_alerts_on_malformed_upload() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options(obs.clone(), LoadSeverity::Error);

    let _ = load_from_bytes(b"", "upload.csv", &opts).unwrap_err();

    assert_eq!(*obs.alerts.lock().unwrap(), vec![LoadSeverity::Error]);
}

#[test]
fn composite_observer_fans_out() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new(vec![a.clone() as Arc<dyn LoadObserver>, b.clone()]);
    let opts = LoadOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    load_from_bytes(b"x\n1\n", "upload.csv", &opts).unwrap();

    assert_eq!(a.successes.lock().unwrap().len(), 1);
    assert_eq!(b.successes.lock().unwrap().len(), 1);
}
