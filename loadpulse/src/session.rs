//! Run lifecycle: the result stream, the completion tracker, and the
//! supervisor that closes the stream once every worker is done.
use crate::{executor, scheduler};
use loadpulse_core::{ConfigError, Outcome, RunConfig};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use thiserror::Error;
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, warn};

/// One event on the caller-facing stream: an outcome from some worker,
/// or the single terminal close signal.
#[derive(Debug)]
pub enum RunEvent {
    Outcome(Outcome),
    Closed(Result<(), RunError>),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("run interrupted before all workers finished")]
    Interrupted,
}

/// Publication was rejected because the stream left the `Open` state or
/// the caller dropped the receiving half.
#[derive(Debug, Error)]
#[error("result stream is no longer accepting outcomes")]
pub struct StreamClosed;

/// The shared sink all workers publish onto. Each publish is one atomic
/// channel send; outcomes are never split or interleaved.
///
/// Publish and close are serialized through the same lock so the
/// terminal event always wins the channel race: `Open` is the sender
/// being present, `Closing` is the close call holding the lock, and
/// `Closed` is the sender taken out. Nothing can enqueue an outcome
/// after the terminal event, on any path.
pub(crate) struct ResultStream {
    tx: Mutex<Option<mpsc::UnboundedSender<RunEvent>>>,
}

impl ResultStream {
    fn new(tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<RunEvent>>> {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn publish(&self, outcome: Outcome) -> Result<(), StreamClosed> {
        match &*self.lock() {
            Some(tx) => tx
                .send(RunEvent::Outcome(outcome))
                .map_err(|_| StreamClosed),
            None => Err(StreamClosed),
        }
    }

    /// Emit the terminal event exactly once; a second close is a no-op.
    /// Taking the sender out closes the channel once workers drop their
    /// stream references, and makes every later publish fail.
    fn close(&self, result: Result<(), RunError>) {
        if let Some(tx) = self.lock().take() {
            let _ = tx.send(RunEvent::Closed(result));
        }
    }
}

/// Counts down as workers finish. The supervisor blocks on [`wait`]
/// until the count reaches zero.
///
/// [`wait`]: CompletionTracker::wait
pub(crate) struct CompletionTracker {
    pending: AtomicUsize,
    notify: Notify,
}

impl CompletionTracker {
    pub(crate) fn new(workers: usize) -> Self {
        Self {
            pending: AtomicUsize::new(workers),
            notify: Notify::new(),
        }
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    fn worker_done(&self) {
        let prev = self.pending.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "completion tracker underflow");
        if prev == 1 {
            self.notify.notify_waiters();
        }
    }

    async fn wait(&self) {
        loop {
            // Register interest before the check so a decrement between
            // the load and the await cannot be missed.
            let notified = self.notify.notified();
            if self.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// RAII handle notifying the tracker exactly once per worker, on every
/// exit path.
pub(crate) struct CompletionGuard(Arc<CompletionTracker>);

impl CompletionGuard {
    pub(crate) fn new(tracker: Arc<CompletionTracker>) -> Self {
        Self(tracker)
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.0.worker_done();
    }
}

/// A configured, validated load test. Call [`stream`](Self::stream) to
/// launch it.
pub struct LoadTest {
    config: RunConfig,
}

impl LoadTest {
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Launch the run: spawns the ramp-up scheduler and the supervisor,
    /// and returns a handle to the live result stream.
    #[instrument(name = "run", skip_all, fields(virtual_users = self.config.virtual_users))]
    pub fn stream(self) -> RunHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let stream = Arc::new(ResultStream::new(tx));
        let tracker = Arc::new(CompletionTracker::new(self.config.virtual_users as usize));
        let cancel = CancellationToken::new();
        let executor = executor::executor_for(&self.config.target);

        info!("launching {} virtual users", self.config.virtual_users);

        tokio::spawn(scheduler::run_scheduler(
            self.config,
            executor,
            Arc::clone(&stream),
            Arc::clone(&tracker),
            cancel.clone(),
        ));
        tokio::spawn(supervise(
            tracker,
            stream,
            cancel.clone(),
            tokio::time::Instant::now(),
        ));

        RunHandle { events: rx, cancel }
    }
}

/// Blocks until every worker has notified the tracker, then closes the
/// stream. This wait is the only place cancellation is observed; an
/// interrupted supervisor closes the stream with an error instead of
/// hanging.
async fn supervise(
    tracker: Arc<CompletionTracker>,
    stream: Arc<ResultStream>,
    cancel: CancellationToken,
    started_at: tokio::time::Instant,
) {
    tokio::select! {
        _ = tracker.wait() => {
            info!(elapsed = ?started_at.elapsed(), "all workers finished; closing stream");
            stream.close(Ok(()));
        }
        _ = cancel.cancelled() => {
            warn!(pending = tracker.pending(), "run cancelled; closing stream with error");
            stream.close(Err(RunError::Interrupted));
        }
    }
}

/// Caller-facing handle for one run: the event receiver plus the token
/// that interrupts the supervisor.
pub struct RunHandle {
    events: mpsc::UnboundedReceiver<RunEvent>,
    cancel: CancellationToken,
}

impl RunHandle {
    /// Next event, `None` once the terminal event has been consumed and
    /// the channel drained.
    pub async fn recv(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn split(self) -> (mpsc::UnboundedReceiver<RunEvent>, CancellationToken) {
        (self.events, self.cancel)
    }
}
