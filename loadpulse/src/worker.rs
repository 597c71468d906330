//! The virtual-user worker: one independent request loop per user.
use crate::builder;
use crate::executor::{IterationContext, RequestExecutor};
use crate::session::{CompletionGuard, ResultStream, StreamClosed};
use loadpulse_core::TerminationPolicy;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::time::Instant;
#[allow(unused_imports)]
use tracing::{debug, trace, warn};

pub(crate) struct WorkerContext {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) policy: TerminationPolicy,
    pub(crate) executor: Arc<dyn RequestExecutor>,
    pub(crate) stream: Arc<ResultStream>,
}

/// Runs the worker's loop to completion under its termination policy.
///
/// An executor failure is data (error fields on the outcome) and never
/// stops the loop; a rejected publish means the sink itself is gone and
/// does. The guard is held for the whole body so the tracker is
/// notified exactly once on every exit path.
pub(crate) async fn run_worker(ctx: WorkerContext, guard: CompletionGuard) {
    let _guard = guard;

    match ctx.policy {
        TerminationPolicy::Iterations(count) => {
            for iteration in 1..=count {
                if run_iteration(&ctx, Some(iteration)).await.is_err() {
                    warn!(worker = ctx.id, iteration, "stream rejected publish; worker exiting early");
                    return;
                }
            }
        }
        TerminationPolicy::Duration(limit) => {
            // Non-preemptive: elapsed time is checked only after an
            // iteration completes, so the run may overshoot the limit
            // by up to one iteration.
            let started = Instant::now();
            loop {
                if run_iteration(&ctx, None).await.is_err() {
                    warn!(worker = ctx.id, "stream rejected publish; worker exiting early");
                    return;
                }
                if started.elapsed() >= limit {
                    break;
                }
            }
        }
    }

    trace!(worker = ctx.id, "worker loop complete");
}

/// One full request/response cycle: execute, build the outcome, publish.
/// Success and failure both yield exactly one outcome.
async fn run_iteration(ctx: &WorkerContext, iteration: Option<u32>) -> Result<(), StreamClosed> {
    let start_at = OffsetDateTime::now_utc();
    let iteration_ctx = IterationContext {
        worker_id: ctx.id,
        iteration,
    };

    let outcome = match ctx.executor.execute(&iteration_ctx).await {
        Ok(measure) => builder::success(ctx.id, &ctx.name, iteration, start_at, measure),
        Err(failure) => {
            debug!(worker = ctx.id, code = %failure.code, "iteration failed: {}", failure.message);
            builder::failure(ctx.id, &ctx.name, iteration, start_at, failure)
        }
    };

    ctx.stream.publish(outcome)
}
