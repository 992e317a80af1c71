//! # Logging subscriber backed by `tracing`.
//!
//! [`LogWriter`] turns pool events into `tracing` records with structured fields.
//! Install any `tracing` subscriber (e.g. `tracing-subscriber::fmt`) to see them.
//!
//! ## Levels
//! ```text
//! debug  TaskSubmitted, TaskStarting, TaskSucceeded, TaskRequeued
//! info   PoolDrained, ShutdownRequested, ShutdownComplete
//! warn   TaskFailed, TimeoutHit, TaskExhausted, TaskDiscarded, SubscriberOverflow
//! error  CallbackPanicked, SubscriberPanicked
//! ```
//!
//! ## Example
//! ```no_run
//! # use std::sync::Arc;
//! # use taskpool::{LogWriter, Pool, PoolConfig, Subscribe};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), taskpool::PoolError> {
//! let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//! let pool = Pool::<()>::builder(PoolConfig::default())
//!     .with_subscribers(subs)
//!     .build()?;
//! # pool.shutdown().await;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber that forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::TaskSubmitted => {
                debug!(seq = e.seq, id = ?e.task_id, task, priority = ?e.priority, retries_left = ?e.retries_left, "submitted");
            }
            EventKind::TaskStarting => {
                debug!(seq = e.seq, id = ?e.task_id, task, priority = ?e.priority, attempt = ?e.attempt, "starting");
            }
            EventKind::TaskSucceeded => {
                debug!(seq = e.seq, id = ?e.task_id, task, attempt = ?e.attempt, "succeeded");
            }
            EventKind::TaskRequeued => {
                debug!(seq = e.seq, id = ?e.task_id, task, attempt = ?e.attempt, retries_left = ?e.retries_left, "requeued");
            }
            EventKind::TaskFailed => {
                warn!(seq = e.seq, id = ?e.task_id, task, attempt = ?e.attempt, retries_left = ?e.retries_left, err = reason, "failed");
            }
            EventKind::TimeoutHit => {
                warn!(seq = e.seq, id = ?e.task_id, task, attempt = ?e.attempt, timeout_ms = ?e.timeout_ms, "timeout");
            }
            EventKind::TaskExhausted => {
                warn!(seq = e.seq, id = ?e.task_id, task, attempt = ?e.attempt, reason, "exhausted");
            }
            EventKind::TaskDiscarded => {
                warn!(seq = e.seq, id = ?e.task_id, task, priority = ?e.priority, "discarded by shutdown");
            }
            EventKind::CallbackPanicked => {
                error!(seq = e.seq, id = ?e.task_id, task, reason, "callback panicked");
            }
            EventKind::PoolDrained => {
                info!(seq = e.seq, reason, "drained");
            }
            EventKind::ShutdownRequested => {
                info!(seq = e.seq, reason, "shutdown requested");
            }
            EventKind::ShutdownComplete => {
                info!(seq = e.seq, "shutdown complete");
            }
            EventKind::SubscriberOverflow => {
                warn!(seq = e.seq, subscriber = task, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                error!(seq = e.seq, subscriber = task, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
