use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use serde::Serialize;

/// What an engine run is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Filter,
    Summary,
}

/// Events emitted by [`super::ExecutionEngine`] while it works.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { kind: RunKind },
    /// A chunk waited for an in-flight slot.
    ThrottleWaited { duration: Duration },
    ChunkStarted { start_row: usize, row_count: usize },
    ChunkFinished { kept_rows: usize },
    SummaryStarted { columns: Vec<String> },
    SummaryFinished { computed: usize, skipped: usize },
    RunFinished {
        kind: RunKind,
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events. Called from worker threads.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Forwards every execution event to the [`log`] facade at trace level.
///
/// The engine already logs one debug line per finished run; this adds the per-chunk detail.
#[derive(Debug, Default)]
pub struct LogExecutionObserver;

impl ExecutionObserver for LogExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        log::trace!("{event:?}");
    }
}

/// Live counters for the most recent engine run.
///
/// Counters reset at the start of every run; `run_id` keeps counting up. Read them at any time
/// through [`ExecutionMetrics::snapshot`].
#[derive(Debug, Default)]
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,
    rows_scanned: AtomicU64,
    rows_kept: AtomicU64,
    chunks_started: AtomicU64,
    chunks_finished: AtomicU64,
    throttle_wait_ns: AtomicU64,
    active_chunks: AtomicUsize,
    peak_active_chunks: AtomicUsize,
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin_run(&self) {
        self.run_id.fetch_add(1, Ordering::SeqCst);
        for counter in [
            &self.elapsed_ns,
            &self.rows_scanned,
            &self.rows_kept,
            &self.chunks_started,
            &self.chunks_finished,
            &self.throttle_wait_ns,
        ] {
            counter.store(0, Ordering::SeqCst);
        }
        self.active_chunks.store(0, Ordering::SeqCst);
        self.peak_active_chunks.store(0, Ordering::SeqCst);
    }

    pub(crate) fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns.store(nanos(elapsed), Ordering::SeqCst);
    }

    pub(crate) fn record_rows(&self, scanned: usize, kept: usize) {
        self.rows_scanned.fetch_add(scanned as u64, Ordering::SeqCst);
        self.rows_kept.fetch_add(kept as u64, Ordering::SeqCst);
    }

    pub(crate) fn record_throttle_wait(&self, waited: Duration) {
        self.throttle_wait_ns.fetch_add(nanos(waited), Ordering::SeqCst);
    }

    /// Mark a chunk as in flight until the returned guard is dropped.
    pub(crate) fn chunk_started(&self) -> ChunkGuard<'_> {
        self.chunks_started.fetch_add(1, Ordering::SeqCst);
        let now = self.active_chunks.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active_chunks.fetch_max(now, Ordering::SeqCst);
        ChunkGuard { metrics: self }
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            rows_scanned: self.rows_scanned.load(Ordering::SeqCst),
            rows_kept: self.rows_kept.load(Ordering::SeqCst),
            chunks_started: self.chunks_started.load(Ordering::SeqCst),
            chunks_finished: self.chunks_finished.load(Ordering::SeqCst),
            peak_active_chunks: self.peak_active_chunks.load(Ordering::SeqCst),
            throttle_wait: Duration::from_nanos(self.throttle_wait_ns.load(Ordering::SeqCst)),
        }
    }
}

/// An in-flight chunk; counted as finished when dropped.
pub(crate) struct ChunkGuard<'a> {
    metrics: &'a ExecutionMetrics,
}

impl ChunkGuard<'_> {
    /// Record the rows this chunk scanned and kept, then finish it.
    pub(crate) fn finish(self, scanned: usize, kept: usize) {
        self.metrics.record_rows(scanned, kept);
    }
}

impl Drop for ChunkGuard<'_> {
    fn drop(&mut self) {
        self.metrics.chunks_finished.fetch_add(1, Ordering::SeqCst);
        self.metrics.active_chunks.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Point-in-time copy of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    /// `None` while the run is still going.
    pub elapsed: Option<Duration>,
    pub rows_scanned: u64,
    pub rows_kept: u64,
    pub chunks_started: u64,
    pub chunks_finished: u64,
    pub peak_active_chunks: usize,
    pub throttle_wait: Duration,
}

impl ExecutionMetricsSnapshot {
    /// Fraction of scanned rows that were kept, or `None` if nothing was scanned.
    pub fn selectivity(&self) -> Option<f64> {
        (self.rows_scanned > 0).then(|| self.rows_kept as f64 / self.rows_scanned as f64)
    }
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run #{}: kept {} of {} rows in {}/{} chunks (peak {} in flight, throttled {:?})",
            self.run_id,
            self.rows_kept,
            self.rows_scanned,
            self.chunks_finished,
            self.chunks_started,
            self.peak_active_chunks,
            self.throttle_wait,
        )?;
        if let Some(elapsed) = self.elapsed {
            write!(f, " in {elapsed:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ExecutionMetrics;

    #[test]
    fn chunk_guard_tracks_in_flight_chunks() {
        let m = ExecutionMetrics::new();
        m.begin_run();
        let a = m.chunk_started();
        let b = m.chunk_started();
        a.finish(10, 4);
        drop(b);

        let snap = m.snapshot();
        assert_eq!((snap.chunks_started, snap.chunks_finished), (2, 2));
        assert_eq!(snap.peak_active_chunks, 2);
        assert_eq!(snap.selectivity(), Some(0.4));
        assert_eq!(snap.elapsed, None);

        m.begin_run();
        assert_eq!(m.snapshot().run_id, 2);
        assert_eq!(m.snapshot().rows_scanned, 0);
    }
}
