//! Snapshot store: owns the published snapshot and the load lifecycle.
//!
//! Lifecycle: `Uninitialized -> Loading -> Ready | Failed`. A run fetches
//! text, parses, aggregates, and builds scales as one unit; only a complete
//! snapshot is ever published. A new run may start from `Failed` (retry) or
//! `Ready` (refresh, the previous snapshot stays readable until replaced),
//! but never while another run is `Loading`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::PipelineConfig;
use crate::data::{DateKey, Maxima, Measurement, RegionMetric, ScaleKind};
use crate::errors::PipelineError;
use crate::scale::BinningFunction;
use crate::snapshot::Snapshot;
use crate::source::TextSource;
use crate::types::SourceId;

/// Externally visible lifecycle state of a `SnapshotStore`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// No run has started yet.
    Uninitialized,
    /// A run is in progress.
    ///
    /// During a refresh `SnapshotStore::snapshot` keeps returning the
    /// previous snapshot, so `snapshot().is_some()` does not imply `Ready`.
    Loading,
    /// The latest run published a snapshot.
    Ready,
    /// The latest run failed; see `SnapshotStore::error`.
    Failed,
}

/// Cooperative cancellation flag shared between a caller and a run.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the run stops at its next stage boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), PipelineError> {
        if self.is_cancelled() {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Internal state behind the store lock.
#[derive(Clone, Debug)]
enum LoadState {
    Uninitialized,
    /// `prior` is restored if the run is cancelled.
    Loading { run: u64, prior: Box<LoadState> },
    Ready(Arc<Snapshot>),
    Failed(PipelineError),
}

impl LoadState {
    fn status(&self) -> LoadStatus {
        match self {
            LoadState::Uninitialized => LoadStatus::Uninitialized,
            LoadState::Loading { .. } => LoadStatus::Loading,
            LoadState::Ready(_) => LoadStatus::Ready,
            LoadState::Failed(_) => LoadStatus::Failed,
        }
    }

    fn readable(&self) -> Option<&Arc<Snapshot>> {
        match self {
            LoadState::Ready(snapshot) => Some(snapshot),
            LoadState::Loading { prior, .. } => prior.readable(),
            _ => None,
        }
    }
}

struct StoreInner {
    state: LoadState,
    next_run: u64,
}

/// Shared, cloneable handle to the published snapshot and its lifecycle.
///
/// Clones share state. Readers get `Arc<Snapshot>` values that never change
/// after publication.
#[derive(Clone)]
pub struct SnapshotStore {
    inner: Arc<RwLock<StoreInner>>,
    notifier: Arc<(Mutex<u64>, Condvar)>,
    config: Arc<PipelineConfig>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl SnapshotStore {
    /// Create an uninitialized store that builds snapshots with `config`.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                state: LoadState::Uninitialized,
                next_run: 0,
            })),
            notifier: Arc::new((Mutex::new(0), Condvar::new())),
            config: Arc::new(config),
        }
    }

    /// Pipeline configuration used by every run.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole pipeline against `source` on the calling thread.
    pub fn load(&self, source: &dyn TextSource) -> Result<Arc<Snapshot>, PipelineError> {
        self.load_with_cancel(source, &CancellationToken::new())
    }

    /// Like `load`, stopping at the next stage boundary once `token` is cancelled.
    ///
    /// A cancelled run publishes nothing and the store returns to the state it
    /// had before the run started.
    pub fn load_with_cancel(
        &self,
        source: &dyn TextSource,
        token: &CancellationToken,
    ) -> Result<Arc<Snapshot>, PipelineError> {
        let run = self.begin(source.id())?;
        let result = run_pipeline(source, &self.config, token);
        self.settle(run, source.id(), token, result)
    }

    /// Start the pipeline on a background thread.
    ///
    /// The store is `Loading` when this returns. Dropping the returned handle
    /// cancels the run; call `LoadHandle::detach` to let it finish unattended.
    pub fn spawn_load(&self, source: Arc<dyn TextSource>) -> Result<LoadHandle, PipelineError> {
        let source_id: SourceId = source.id().to_string();
        let run = self.begin(&source_id)?;
        let token = CancellationToken::new();
        let store = self.clone();
        let worker_token = token.clone();
        let worker_source_id = source_id.clone();
        let handle = thread::spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                run_pipeline(source.as_ref(), &store.config, &worker_token)
            }))
            .unwrap_or_else(|_| Err(worker_panicked(&worker_source_id)));
            store.settle(run, &worker_source_id, &worker_token, result)
        });
        Ok(LoadHandle {
            source_id,
            token,
            handle: Some(handle),
        })
    }

    /// Current lifecycle state.
    pub fn status(&self) -> LoadStatus {
        self.read_state(LoadState::status)
    }

    /// Published snapshot, if any.
    ///
    /// `None` until the first successful run. While a refresh is `Loading`
    /// the previous snapshot is still returned; check `status` to tell the two
    /// apart.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.read_state(|state| state.readable().cloned())
    }

    /// Error carried by the `Failed` state.
    pub fn error(&self) -> Option<PipelineError> {
        self.read_state(|state| match state {
            LoadState::Failed(err) => Some(err.clone()),
            _ => None,
        })
    }

    /// Dates of the published snapshot in first-seen order; empty when none.
    pub fn list_dates(&self) -> Vec<DateKey> {
        self.snapshot()
            .map(|snapshot| snapshot.list_dates().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Metric for one region on one date from the published snapshot.
    pub fn region_metric(&self, date: &str, region_id: &str) -> Option<RegionMetric> {
        self.snapshot()?.region_metric(date, region_id).cloned()
    }

    /// Maxima of the published snapshot.
    pub fn maxima(&self) -> Option<Maxima> {
        self.snapshot().map(|snapshot| snapshot.maxima())
    }

    /// Binning function of the published snapshot.
    pub fn scale(
        &self,
        kind: ScaleKind,
        measurement: Measurement,
    ) -> Option<Arc<dyn BinningFunction>> {
        self.snapshot()
            .map(|snapshot| snapshot.scale_arc(kind, measurement))
    }

    /// Block until no run is in progress or `timeout` elapses; returns the status.
    pub fn wait_for_settled(&self, timeout: Duration) -> LoadStatus {
        let deadline = Instant::now() + timeout;
        let (lock, cvar) = &*self.notifier;
        let mut generation = lock.lock().expect("snapshot store notifier poisoned");
        loop {
            let status = self.status();
            if status != LoadStatus::Loading {
                return status;
            }
            let now = Instant::now();
            if now >= deadline {
                return status;
            }
            let (guard, _) = cvar
                .wait_timeout(generation, deadline - now)
                .expect("snapshot store notifier poisoned");
            generation = guard;
        }
    }

    fn read_state<T>(&self, f: impl FnOnce(&LoadState) -> T) -> T {
        let inner = self.inner.read().expect("snapshot store poisoned");
        f(&inner.state)
    }

    fn begin(&self, source_id: &str) -> Result<u64, PipelineError> {
        let mut inner = self.inner.write().expect("snapshot store poisoned");
        if matches!(inner.state, LoadState::Loading { .. }) {
            warn!(source_id, "ingestion run rejected: another run is in progress");
            return Err(PipelineError::LoadInProgress);
        }
        inner.next_run = inner.next_run.saturating_add(1);
        let run = inner.next_run;
        let prior = std::mem::replace(&mut inner.state, LoadState::Uninitialized);
        inner.state = LoadState::Loading {
            run,
            prior: Box::new(prior),
        };
        drop(inner);
        info!(source_id, run, "ingestion run started");
        self.notify();
        Ok(run)
    }

    /// Publish or discard the outcome of run `run`.
    fn settle(
        &self,
        run: u64,
        source_id: &str,
        token: &CancellationToken,
        result: Result<Snapshot, PipelineError>,
    ) -> Result<Arc<Snapshot>, PipelineError> {
        let mut inner = self.inner.write().expect("snapshot store poisoned");
        let prior = match &mut inner.state {
            LoadState::Loading { run: current, prior } if *current == run => {
                std::mem::replace(prior.as_mut(), LoadState::Uninitialized)
            }
            _ => {
                // Another path already settled this run.
                return result.map(Arc::new);
            }
        };
        let outcome = if token.is_cancelled() {
            Err(PipelineError::Cancelled)
        } else {
            result.map(Arc::new)
        };
        match &outcome {
            Ok(snapshot) => {
                inner.state = LoadState::Ready(Arc::clone(snapshot));
                info!(
                    source_id,
                    run,
                    date_count = snapshot.date_count(),
                    "snapshot published"
                );
            }
            Err(PipelineError::Cancelled) => {
                inner.state = prior;
                warn!(source_id, run, "ingestion run cancelled; result discarded");
            }
            Err(err) => {
                inner.state = LoadState::Failed(err.clone());
                error!(source_id, run, error = %err, "ingestion run failed");
            }
        }
        drop(inner);
        self.notify();
        outcome
    }

    fn notify(&self) {
        let (lock, cvar) = &*self.notifier;
        let mut generation = lock.lock().expect("snapshot store notifier poisoned");
        *generation = generation.wrapping_add(1);
        cvar.notify_all();
    }
}

/// Fetch, parse, aggregate, and build scales, checking `token` between stages.
fn run_pipeline(
    source: &dyn TextSource,
    config: &PipelineConfig,
    token: &CancellationToken,
) -> Result<Snapshot, PipelineError> {
    let start = Instant::now();
    token.check()?;
    let text = source.fetch()?;
    debug!(
        source_id = %source.id(),
        bytes = text.len(),
        fetch_ms = start.elapsed().as_millis(),
        "text source fetched"
    );
    token.check()?;
    let snapshot = Snapshot::from_text(&text, config)?;
    debug!(
        source_id = %source.id(),
        date_count = snapshot.date_count(),
        elapsed_ms = start.elapsed().as_millis(),
        "snapshot built"
    );
    token.check()?;
    Ok(snapshot)
}

fn worker_panicked(source_id: &str) -> PipelineError {
    PipelineError::Transport {
        source_id: source_id.to_string(),
        reason: "ingestion thread panicked".into(),
    }
}

/// Handle to a background ingestion run started by `SnapshotStore::spawn_load`.
pub struct LoadHandle {
    source_id: SourceId,
    token: CancellationToken,
    handle: Option<thread::JoinHandle<Result<Arc<Snapshot>, PipelineError>>>,
}

impl LoadHandle {
    /// Request cancellation; an unpublished result will be discarded.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token shared with the background run.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns `true` once the background thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(true)
    }

    /// Wait for the run and return its outcome.
    pub fn join(mut self) -> Result<Arc<Snapshot>, PipelineError> {
        let handle = self.handle.take().ok_or(PipelineError::Cancelled)?;
        // The worker settles its own panics; a join error means settle itself panicked.
        handle
            .join()
            .unwrap_or_else(|_| Err(worker_panicked(&self.source_id)))
    }

    /// Let the run finish without holding the handle.
    pub fn detach(mut self) {
        self.handle.take();
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.token.cancel();
        }
    }
}
