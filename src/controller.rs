//! Scan controller: per-scan configuration, preconditions, scheduling
//!
//! A [`ScanController`] owns one single-slot worker thread. `start_scan`
//! validates preconditions synchronously, clears the target store, and
//! enqueues the pass; scans issued against the same controller serialize
//! behind each other. Per-row observer callbacks run on the worker thread;
//! the single `on_complete` is posted to a [`CompletionQueue`] the caller
//! drains on its own thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::error::ScanError;
use crate::models::MediaKind;
use crate::progress::ScanObserver;
use crate::scanner;
use crate::source::MediaIndex;
use crate::store::{CollectionStore, MediaLibrary};

/// Observable controller state
///
/// `Idle → Validating → Scanning → Completing → Idle`. A `start_scan`
/// issued while not `Idle` queues behind the in-flight pass instead of
/// being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No pass in flight
    Idle,
    /// Precondition checks running on the caller's thread
    Validating,
    /// The worker is iterating source rows
    Scanning,
    /// The pass ended, completion is being delivered
    Completing,
}

type Task = Box<dyn FnOnce() + Send>;

/// Sending half of the completion handback channel
///
/// The controller posts the `on_complete` closure here; the caller drains
/// the matching [`CompletionReceiver`] on the thread that should run it.
#[derive(Clone)]
pub struct CompletionQueue {
    tx: Sender<Task>,
}

impl CompletionQueue {
    /// Create a connected queue/receiver pair
    pub fn channel() -> (CompletionQueue, CompletionReceiver) {
        let (tx, rx) = mpsc::channel();
        (CompletionQueue { tx }, CompletionReceiver { rx })
    }

    fn post(&self, task: Task) {
        // A dropped receiver means the caller stopped listening; the
        // completion is advisory so this is not an error.
        if self.tx.send(task).is_err() {
            log::debug!("completion receiver dropped, notification discarded");
        }
    }
}

/// Receiving half of the completion handback channel
pub struct CompletionReceiver {
    rx: Receiver<Task>,
}

impl CompletionReceiver {
    /// Run every task currently queued, without blocking
    ///
    /// Returns the number of tasks executed.
    pub fn run_pending(&self) -> usize {
        let mut executed = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            executed += 1;
        }
        executed
    }

    /// Block up to `timeout` for one task and run it
    ///
    /// Returns `true` if a task was executed.
    pub fn run_one(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(task) => {
                task();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

struct ScanJob {
    index: Arc<dyn MediaIndex>,
    kind: MediaKind,
    with_album_art: bool,
    store: Arc<Mutex<CollectionStore>>,
    observer: Option<Arc<dyn ScanObserver>>,
    queue: Option<CompletionQueue>,
}

struct Shared {
    cancel: AtomicBool,
    state: Mutex<ScanState>,
}

impl Shared {
    fn new() -> Self {
        Self {
            cancel: AtomicBool::new(false),
            state: Mutex::new(ScanState::Idle),
        }
    }

    fn state(&self) -> ScanState {
        *self.lock_state()
    }

    fn set_state(&self, state: ScanState) {
        *self.lock_state() = state;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ScanState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_validating(&self) {
        let mut state = self.lock_state();
        if *state == ScanState::Idle {
            *state = ScanState::Validating;
        }
    }

    fn end_validating(&self) {
        let mut state = self.lock_state();
        if *state == ScanState::Validating {
            *state = ScanState::Idle;
        }
    }
}

/// Drives inventory passes for one media kind
///
/// Configuration is fluent and order-independent; the media index and the
/// kind are required, the album-art flag and the delivery queue optional
/// (the queue becomes required once an observer is attached).
///
/// ```no_run
/// use std::sync::Arc;
/// use media_inventory::{
///     CompletionQueue, FsMediaIndex, IndexConfig, MediaKind, MediaLibrary, ScanController,
/// };
///
/// let library = MediaLibrary::new();
/// let (queue, receiver) = CompletionQueue::channel();
/// let index = FsMediaIndex::new(IndexConfig::new(vec!["/media".into()]));
///
/// let controller = ScanController::new(library.clone())
///     .with_index(Arc::new(index))
///     .kind(MediaKind::Audio)
///     .with_album_art(true)
///     .deliver_on(queue);
/// controller.start_scan(None).unwrap();
/// ```
pub struct ScanController {
    library: MediaLibrary,
    index: Option<Arc<dyn MediaIndex>>,
    kind: Option<MediaKind>,
    with_album_art: bool,
    queue: Option<CompletionQueue>,
    shared: Arc<Shared>,
    jobs: Option<Sender<ScanJob>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ScanController {
    /// Create a controller over a library, spawning its worker thread
    pub fn new(library: MediaLibrary) -> Self {
        let shared = Arc::new(Shared::new());
        let (tx, rx) = mpsc::channel::<ScanJob>();
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("media-scan".to_string())
            .spawn(move || worker_loop(rx, worker_shared))
            .ok();
        if worker.is_none() {
            log::error!("failed to spawn scan worker thread");
        }

        Self {
            library,
            index: None,
            kind: None,
            with_album_art: false,
            queue: None,
            shared,
            jobs: Some(tx),
            worker,
        }
    }

    /// Set the capability handle over the media index
    pub fn with_index(mut self, index: Arc<dyn MediaIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the media kind this controller scans
    pub fn kind(mut self, kind: MediaKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Enable album-art resolution (audio passes only)
    pub fn with_album_art(mut self, enabled: bool) -> Self {
        self.with_album_art = enabled;
        self
    }

    /// Set the queue completion notifications are posted to
    pub fn deliver_on(mut self, queue: CompletionQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Current observable state
    pub fn state(&self) -> ScanState {
        self.shared.state()
    }

    /// The library this controller writes into
    pub fn library(&self) -> &MediaLibrary {
        &self.library
    }

    /// Validate preconditions, clear the target store, and enqueue a pass
    ///
    /// Returns immediately; the pass runs on the controller's worker
    /// thread. Fails synchronously when the index or kind is missing, when
    /// read access is not granted, or when an observer is attached without
    /// a delivery queue. A failed call changes nothing: no store clear, no
    /// callbacks.
    pub fn start_scan(&self, observer: Option<Arc<dyn ScanObserver>>) -> Result<(), ScanError> {
        self.shared.begin_validating();
        match self.validate_and_enqueue(observer) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.shared.end_validating();
                Err(e)
            }
        }
    }

    fn validate_and_enqueue(&self, observer: Option<Arc<dyn ScanObserver>>) -> Result<(), ScanError> {
        let index = self.index.clone().ok_or_else(|| {
            ScanError::configuration("media index not set; call with_index() before start_scan()")
        })?;
        let kind = self.kind.ok_or_else(|| {
            ScanError::configuration("media kind not set; call kind() before start_scan()")
        })?;
        if !index.is_read_permitted() {
            return Err(ScanError::authorization(
                "read access to the media index is not granted",
            ));
        }
        if observer.is_some() && self.queue.is_none() {
            return Err(ScanError::configuration(
                "observer attached without a delivery queue; call deliver_on()",
            ));
        }
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| ScanError::source("scan worker unavailable"))?;

        let store = self.library.store(kind);
        store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();

        let job = ScanJob {
            index,
            kind,
            with_album_art: self.with_album_art,
            store,
            observer,
            queue: self.queue.clone(),
        };
        jobs.send(job)
            .map_err(|_| ScanError::source("scan worker unavailable"))?;
        log::info!("{kind} scan queued");
        Ok(())
    }

    /// Request cancellation of the in-flight pass
    ///
    /// Idempotent; a no-op unless a pass is currently scanning. The flag
    /// is observed between rows, so the pass stops promptly but at no
    /// particular row. `on_complete` still fires exactly once.
    pub fn cancel(&self) {
        let state = self.shared.lock_state();
        if *state == ScanState::Scanning {
            self.shared.cancel.store(true, Ordering::SeqCst);
        }
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        // Closing the job channel lets the worker drain queued passes and
        // exit.
        drop(self.jobs.take());
        if let Some(worker) = self.worker.take() {
            worker.join().ok();
        }
    }
}

fn worker_loop(rx: Receiver<ScanJob>, shared: Arc<Shared>) {
    while let Ok(job) = rx.recv() {
        {
            let mut state = shared.lock_state();
            // A cancel raised against an earlier pass must not leak into
            // this one.
            shared.cancel.store(false, Ordering::SeqCst);
            *state = ScanState::Scanning;
        }

        let rows = match job.index.query(job.kind) {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("{} query failed, treating as empty source: {e}", job.kind);
                Vec::new()
            }
        };

        scanner::run_pass(
            &rows,
            job.kind,
            job.with_album_art,
            job.index.as_ref(),
            &job.store,
            &shared.cancel,
            job.observer.as_ref(),
        );

        shared.set_state(ScanState::Completing);
        if let (Some(observer), Some(queue)) = (job.observer, job.queue) {
            queue.post(Box::new(move || observer.on_complete()));
        }
        shared.set_state(ScanState::Idle);
    }
}
