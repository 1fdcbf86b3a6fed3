use std::sync::{Arc, Mutex};

use csv_explorer::execution::{
    ExecutionEngine, ExecutionEvent, ExecutionObserver, ExecutionOptions,
};
use csv_explorer::ingestion::{load_from_path, LoadOptions};
use csv_explorer::processing::{Aggregation, ColumnSummary, Predicate};
use csv_explorer::types::Value;
use csv_explorer::{ExplorerError, Session};

fn people() -> Session {
    Session::new(load_from_path("tests/fixtures/people.csv", &LoadOptions::default()).unwrap())
}

#[test]
fn session_filters_then_summarizes_the_view() {
    let mut s = people();
    s.add_filter(Predicate::contains("city", "london")).unwrap();

    let stats = s.summarize(&["age", "score"]);
    let Some(ColumnSummary::Numeric(age)) = stats.get("age") else {
        panic!("expected numeric summary");
    };
    assert_eq!(age.count, 2);
    assert_eq!(age.mean, Some(38.5));

    let Some(ColumnSummary::Numeric(score)) = stats.get("score") else {
        panic!("expected numeric summary");
    };
    assert_eq!(score.count, 1);
    assert_eq!(score.std, None);
}

#[test]
fn session_keeps_view_after_rejected_filter() {
    let mut s = people();
    s.add_filter(Predicate::greater_than("age", Value::Int64(30)))
        .unwrap();
    let rows_before = s.view().source_rows().to_vec();

    let err = s
        .add_filter(Predicate::greater_than("city", Value::Int64(1)))
        .unwrap_err();
    assert!(matches!(err, ExplorerError::IncompatiblePredicate { .. }));
    assert_eq!(s.filters().len(), 1);
    assert_eq!(s.view().source_rows(), rows_before.as_slice());
}

#[test]
fn session_profile_ignores_filters() {
    let mut s = people();
    s.add_filter(Predicate::contains("city", "paris")).unwrap();
    assert_eq!(s.view().row_count(), 1);

    let p = s.profile();
    assert_eq!(p.rows, 5);
    assert_eq!(p.fields[2].missing, 1);
}

#[test]
fn session_charts_and_histogram() {
    let s = people();

    let series = s.chart("city", Some("age"), Aggregation::Median).unwrap();
    assert_eq!(series.points[0].x, Value::Utf8("London".to_string()));
    assert_eq!(series.points[0].y, 38.5);

    let counts = s.chart("city", None, Aggregation::Sum).unwrap();
    assert_eq!(counts.aggregation, Aggregation::Count);
    assert_eq!(counts.points.len(), 4);

    let hist = s.histogram("score", 4).unwrap();
    assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 4);

    let m = s.correlation().unwrap();
    assert_eq!(m.columns.len(), 3);
}

#[derive(Default)]
struct CountingObserver {
    chunks: Mutex<usize>,
}

impl ExecutionObserver for CountingObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        if matches!(event, ExecutionEvent::ChunkFinished { .. }) {
            *self.chunks.lock().unwrap() += 1;
        }
    }
}

#[test]
fn engine_backed_session_reports_chunks() {
    let obs = Arc::new(CountingObserver::default());
    let engine = ExecutionEngine::new(ExecutionOptions {
        num_threads: Some(2),
        chunk_size: 2,
        max_in_flight_chunks: 1,
    })
    .with_observer(obs.clone());
    let engine = Arc::new(engine);

    let mut s = people().with_engine(Arc::clone(&engine));
    s.add_filter(Predicate::greater_than("age", Value::Int64(35)))
        .unwrap();

    assert_eq!(s.view().source_rows(), &[0, 1, 2]);
    // 5 rows in chunks of 2.
    assert_eq!(*obs.chunks.lock().unwrap(), 3);

    let snap = engine.metrics().snapshot();
    assert_eq!(snap.rows_scanned, 5);
    assert_eq!(snap.rows_kept, 3);
    assert_eq!(snap.peak_active_chunks, 1);
}
