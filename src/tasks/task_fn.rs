//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a fresh
//! future per attempt. This avoids shared mutable state between retries.
//!
//! ## Concurrency semantics
//! - Each call to [`Task::spawn`] creates a **new** future that owns its state.
//! - No hidden mutation between attempts; if shared state is needed, use `Arc<...>`
//!   explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use taskpool::{Task, TaskFn, TaskRef, TaskError};
//!
//! let t: TaskRef<String> = TaskFn::arc("greet", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(TaskError::Canceled);
//!     }
//!     Ok::<_, TaskError>("hello".to_string())
//! });
//!
//! assert_eq!(t.name(), "greet");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::{BoxTaskFuture, Task};

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per attempt.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<T, F, Fut> Task<T> for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture<T> {
        let fut = (self.f)(ctx);
        Box::pin(fut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskRef;

    #[tokio::test]
    async fn each_spawn_builds_a_fresh_future() {
        let calls = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let c = calls.clone();
        let t: TaskRef<u32> = TaskFn::arc("count", move |_ctx: CancellationToken| {
            let n = c.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
            async move { Ok::<_, TaskError>(n) }
        });

        assert_eq!(t.spawn(CancellationToken::new()).await, Ok(1));
        assert_eq!(t.spawn(CancellationToken::new()).await, Ok(2));
    }

    #[tokio::test]
    async fn closure_sees_cancelled_token() {
        let t: TaskRef<()> = TaskFn::arc("cancel-aware", |ctx: CancellationToken| async move {
            if ctx.is_cancelled() {
                Err(TaskError::Canceled)
            } else {
                Ok(())
            }
        });
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(t.spawn(token).await, Err(TaskError::Canceled));
    }
}
