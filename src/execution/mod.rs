//! Chunked, parallel evaluation of filter predicates with metrics and observer hooks.
//!
//! This module sits "above" [`crate::processing`]. [`ExecutionEngine::apply_filters`] returns
//! exactly what [`crate::processing::apply_filters`] returns (same rows, same order); it only
//! spreads predicate evaluation over a private thread pool, which pays off on large uploads.
//!
//! - Resource limits / throttling (in-flight chunks)
//! - Real-time metrics + observer hooks for monitoring

mod observer;
mod semaphore;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::error::ExplorerResult;
use crate::processing::filter::{compile_all, CompiledPredicate};
use crate::processing::{summarize, Predicate, SummaryStats, ViewResult};
use crate::types::{DataSet, Value};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver,
    LogExecutionObserver, RunKind,
};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of rows per chunk.
    pub chunk_size: usize,
    /// Upper bound on concurrently evaluated chunks, on top of `num_threads`.
    pub max_in_flight_chunks: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self {
            num_threads: Some(n),
            chunk_size: 4_096,
            max_in_flight_chunks: n.max(1),
        }
    }
}

/// A configurable execution engine for filtering and summarizing in-memory datasets.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size == 0`, `max_in_flight_chunks == 0`, or `num_threads == Some(0)`.
    pub fn new(opts: ExecutionOptions) -> Self {
        assert!(opts.chunk_size > 0, "chunk_size must be > 0");
        assert!(
            opts.max_in_flight_chunks > 0,
            "max_in_flight_chunks must be > 0"
        );
        if let Some(n) = opts.num_threads {
            assert!(n > 0, "num_threads must be > 0 when set");
        }

        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("csv-explorer-{i}"))
            .build()
            .expect("failed to build rayon thread pool");

        Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        }
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Options the engine was built with.
    pub fn options(&self) -> &ExecutionOptions {
        &self.opts
    }

    /// Filter `dataset` by `predicates`, evaluating row chunks in parallel.
    ///
    /// Validation happens up front, exactly as in [`crate::processing::apply_filters`]; an
    /// incompatible predicate fails before any chunk is scheduled.
    pub fn apply_filters(
        &self,
        dataset: &DataSet,
        predicates: &[Predicate],
    ) -> ExplorerResult<ViewResult> {
        let compiled = compile_all(&dataset.schema, predicates)?;
        Ok(self.pool.install(|| self.filter_impl(dataset, &compiled)))
    }

    fn filter_impl(&self, dataset: &DataSet, compiled: &[CompiledPredicate]) -> ViewResult {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            kind: RunKind::Filter,
        });

        let sem = Semaphore::new(self.opts.max_in_flight_chunks);
        let chunk_ranges = chunk_ranges(dataset.row_count(), self.opts.chunk_size);

        // Indexed parallel iterator: `collect` keeps chunk order, so row order is preserved.
        let per_chunk: Vec<Vec<(usize, Vec<Value>)>> = chunk_ranges
            .into_par_iter()
            .map(|range| {
                let (permit, waited) = sem.acquire();
                if waited > Duration::ZERO {
                    self.metrics.record_throttle_wait(waited);
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }

                let chunk = self.metrics.chunk_started();
                self.emit(ExecutionEvent::ChunkStarted {
                    start_row: range.start,
                    row_count: range.len(),
                });

                let scanned = range.len();
                let kept: Vec<(usize, Vec<Value>)> = range
                    .filter_map(|idx| {
                        let row = &dataset.rows[idx];
                        compiled
                            .iter()
                            .all(|p| p.matches(row))
                            .then(|| (idx, row.clone()))
                    })
                    .collect();

                chunk.finish(scanned, kept.len());
                self.emit(ExecutionEvent::ChunkFinished {
                    kept_rows: kept.len(),
                });
                drop(permit);
                kept
            })
            .collect();

        let (source_rows, rows): (Vec<usize>, Vec<Vec<Value>>) =
            per_chunk.into_iter().flatten().unzip();
        let out = ViewResult::new(DataSet::new(dataset.schema.clone(), rows), source_rows);

        self.finish_run(RunKind::Filter, start);
        out
    }

    /// Summarize columns of a view, tracked via the observer/metrics hooks.
    ///
    /// This is currently sequential.
    pub fn summarize<S: AsRef<str>>(&self, view: &ViewResult, columns: &[S]) -> SummaryStats {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            kind: RunKind::Summary,
        });
        self.emit(ExecutionEvent::SummaryStarted {
            columns: columns.iter().map(|c| c.as_ref().to_owned()).collect(),
        });

        let out = summarize(view, columns);
        self.metrics.record_rows(view.row_count(), view.row_count());

        self.emit(ExecutionEvent::SummaryFinished {
            computed: out.columns.len(),
            skipped: out.skipped.len(),
        });
        self.finish_run(RunKind::Summary, start);
        out
    }

    fn finish_run(&self, kind: RunKind, start: Instant) {
        let elapsed = start.elapsed();
        self.metrics.end_run(elapsed);
        let metrics = self.metrics.snapshot();
        log::debug!("{kind:?} run finished: {metrics}");
        self.emit(ExecutionEvent::RunFinished {
            kind,
            elapsed,
            metrics,
        });
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn chunk_ranges(row_count: usize, chunk_size: usize) -> Vec<std::ops::Range<usize>> {
    (0..row_count)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(row_count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{chunk_ranges, ExecutionEngine, ExecutionOptions};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::execution::{ExecutionEvent, ExecutionObserver};
    use crate::processing::{apply_filters, Predicate};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn dataset_of_n(n: usize) -> DataSet {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("tag", DataType::Utf8),
        ]);
        let rows = (0..n as i64)
            .map(|i| {
                let tag = if i % 7 == 0 { Value::Null } else { Value::Utf8(format!("t{}", i % 3)) };
                vec![Value::Int64(i), tag]
            })
            .collect();
        DataSet::new(schema, rows)
    }

    fn engine(chunk_size: usize, max_in_flight_chunks: usize) -> ExecutionEngine {
        ExecutionEngine::new(ExecutionOptions {
            num_threads: Some(4),
            chunk_size,
            max_in_flight_chunks,
        })
    }

    #[test]
    fn chunk_ranges_cover_rows() {
        assert_eq!(chunk_ranges(0, 4), vec![]);
        assert_eq!(chunk_ranges(5, 2), vec![0..2, 2..4, 4..5]);
    }

    #[test]
    fn parallel_filter_matches_sequential() {
        let ds = dataset_of_n(1_000);
        let predicates = vec![
            Predicate::greater_than("id", Value::Int64(100)),
            Predicate::contains("tag", "T1"),
        ];

        let expected = apply_filters(&ds, &predicates).unwrap();
        let got = engine(17, 4).apply_filters(&ds, &predicates).unwrap();
        assert_eq!(got, expected);
        assert!(got.row_count() > 0);
    }

    #[test]
    fn parallel_filter_rejects_incompatible_predicates() {
        let ds = dataset_of_n(10);
        let err = engine(2, 2)
            .apply_filters(&ds, &[Predicate::contains("id", "1")])
            .unwrap_err();
        assert!(err.to_string().contains("incompatible predicate"));
    }

    struct ConcurrencyObserver {
        active_chunks: AtomicUsize,
        max_active_chunks: AtomicUsize,
    }

    impl ConcurrencyObserver {
        fn new() -> Self {
            Self {
                active_chunks: AtomicUsize::new(0),
                max_active_chunks: AtomicUsize::new(0),
            }
        }
        fn max(&self) -> usize {
            self.max_active_chunks.load(Ordering::SeqCst)
        }
    }

    impl ExecutionObserver for ConcurrencyObserver {
        fn on_event(&self, event: &ExecutionEvent) {
            match event {
                ExecutionEvent::ChunkStarted { .. } => {
                    let now = self.active_chunks.fetch_add(1, Ordering::SeqCst) + 1;
                    self.max_active_chunks.fetch_max(now, Ordering::SeqCst);
                }
                ExecutionEvent::ChunkFinished { .. } => {
                    let _ = self.active_chunks.fetch_sub(1, Ordering::SeqCst);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn max_in_flight_chunks_throttles_chunk_concurrency() {
        let ds = dataset_of_n(200);
        let observer = Arc::new(ConcurrencyObserver::new());
        let obs_trait: Arc<dyn ExecutionObserver> = observer.clone();
        let engine = engine(1, 1).with_observer(obs_trait);

        let out = engine.apply_filters(&ds, &[]).unwrap();

        assert_eq!(out.row_count(), ds.row_count());
        assert_eq!(observer.max(), 1);
    }

    #[test]
    fn metrics_are_available_after_run() {
        let ds = dataset_of_n(60);
        let engine = engine(10, 2);
        let metrics = engine.metrics();

        let out = engine
            .apply_filters(&ds, &[Predicate::less_than("id", Value::Int64(15))])
            .unwrap();
        assert_eq!(out.row_count(), 15);

        let snap = metrics.snapshot();
        assert_eq!(snap.run_id, 1);
        assert_eq!(snap.rows_scanned, 60);
        assert_eq!(snap.rows_kept, 15);
        assert_eq!(snap.chunks_started, 6);
        assert_eq!(snap.chunks_finished, 6);
        assert!(snap.peak_active_chunks <= 2);
        assert!(snap.elapsed.is_some());
    }

    #[test]
    fn summarize_reports_through_observer() {
        #[derive(Default)]
        struct Recorder(std::sync::Mutex<Vec<(usize, usize)>>);
        impl ExecutionObserver for Recorder {
            fn on_event(&self, event: &ExecutionEvent) {
                if let ExecutionEvent::SummaryFinished { computed, skipped } = event {
                    self.0.lock().unwrap().push((*computed, *skipped));
                }
            }
        }

        let rec = Arc::new(Recorder::default());
        let engine = engine(8, 1).with_observer(rec.clone());
        let view = engine.apply_filters(&dataset_of_n(20), &[]).unwrap();
        let stats = engine.summarize(&view, &["id", "tag", "nope"]);

        assert_eq!(stats.columns.len(), 2);
        assert_eq!(*rec.0.lock().unwrap(), vec![(2, 1)]);
    }
}
