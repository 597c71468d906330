//! Ramp-up scheduling: decides when each virtual user is launched.
use crate::executor::RequestExecutor;
use crate::session::{CompletionGuard, CompletionTracker, ResultStream};
use crate::worker::{self, WorkerContext};
use loadpulse_core::RunConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
#[allow(unused_imports)]
use tracing::{debug, instrument, trace};

/// Spacing between successive worker launches: `floor(ramp_up_ms / U)`.
/// Callers must reject `virtual_users == 0` before getting here.
pub(crate) fn launch_interval(virtual_users: u32, ramp_up: Duration) -> Duration {
    debug_assert!(virtual_users > 0);
    Duration::from_millis(ramp_up.as_millis() as u64 / u64::from(virtual_users))
}

/// Launches workers `1..=U`, sleeping between launches. The first
/// worker starts immediately; each launched worker runs concurrently
/// with all previously launched ones. This task is not a virtual user
/// and is not counted by the tracker.
///
/// On cancellation the remaining workers are spawned without delay;
/// their first publish fails against the closed stream and their
/// completion guards still fire, so no completion is ever lost.
#[instrument(name = "scheduler", skip_all, fields(virtual_users = config.virtual_users))]
pub(crate) async fn run_scheduler(
    config: RunConfig,
    executor: Arc<dyn RequestExecutor>,
    stream: Arc<ResultStream>,
    tracker: Arc<CompletionTracker>,
    cancel: CancellationToken,
) {
    let interval = launch_interval(config.virtual_users, config.ramp_up);
    debug!(?interval, "ramp-up launch interval");

    for id in 1..=config.virtual_users {
        if id != 1 && !interval.is_zero() && !cancel.is_cancelled() {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = cancel.cancelled() => {}
            }
        }

        trace!(worker = id, "launching virtual user");
        let ctx = WorkerContext {
            id,
            name: format!("vu-{id}"),
            policy: config.termination,
            executor: Arc::clone(&executor),
            stream: Arc::clone(&stream),
        };
        let guard = CompletionGuard::new(Arc::clone(&tracker));
        tokio::spawn(worker::run_worker(ctx, guard));
    }
}
