//! # Task abstraction.
//!
//! This module defines the [`Task`] trait (async, cancelable, value-producing).
//! The common handle type is [`TaskRef`], an `Arc<dyn Task<T>>` suitable for sharing
//! between the queue and every retry of the same submission.
//!
//! A task receives a [`CancellationToken`] and should check it to stop cooperatively
//! when its attempt times out or the pool shuts down. The token is advisory: a task
//! that ignores it keeps running after the pool has already reported the timeout.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Boxed future produced by a single attempt.
pub type BoxTaskFuture<T> = Pin<Box<dyn Future<Output = Result<T, TaskError>> + Send + 'static>>;

/// Shared handle to a task.
pub type TaskRef<T> = Arc<dyn Task<T>>;

/// # Asynchronous, cancelable unit of work.
///
/// A `Task` has a human-readable [`name`](Task::name) and creates a fresh future per
/// attempt via [`spawn`](Task::spawn). Retries call `spawn` again, so a task must be
/// re-runnable.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use taskpool::{BoxTaskFuture, Task, TaskError};
///
/// struct Answer;
///
/// impl Task<u32> for Answer {
///     fn name(&self) -> &str { "answer" }
///
///     fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture<u32> {
///         Box::pin(async move {
///             if ctx.is_cancelled() {
///                 return Err(TaskError::Canceled);
///             }
///             Ok(42)
///         })
///     }
/// }
/// ```
pub trait Task<T>: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Creates the future for one attempt.
    ///
    /// Implementations should watch `ctx` and return early once it is cancelled.
    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture<T>;
}
