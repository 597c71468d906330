//! The pluggable request executor: one unit of timed work per call.
//!
//! New protocols are added by implementing [`RequestExecutor`], not by
//! extending the engine.
use async_trait::async_trait;
use loadpulse_core::{Failure, RawMeasure, TargetParams};
use std::sync::Arc;

mod http;
mod sql;

pub use http::HttpExecutor;
pub use sql::SqlExecutor;

/// Identity of the iteration being executed, for executors that want to
/// vary or label their work.
#[derive(Debug, Clone, Copy)]
pub struct IterationContext {
    pub worker_id: u32,
    /// 1-based under an iteration policy, `None` under a duration policy.
    pub iteration: Option<u32>,
}

/// Performs one request/response cycle and reports either raw timing
/// data or a typed failure. Failures are data, never panics or errors
/// unwound into the worker loop.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, ctx: &IterationContext) -> Result<RawMeasure, Failure>;
}

pub(crate) fn executor_for(target: &TargetParams) -> Arc<dyn RequestExecutor> {
    match target {
        TargetParams::Sql(sql) => Arc::new(SqlExecutor::new(sql.clone())),
        TargetParams::Http(http) => Arc::new(HttpExecutor::new(http.clone())),
    }
}
