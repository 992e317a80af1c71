//! # Run a single attempt of a work item.
//!
//! Executes one attempt of a [`Task`] with an optional timeout.
//!
//! - **Spawn the closure** as its own tokio task, handing it the attempt token
//! - **Race** it against the timeout
//! - **Publish** `TimeoutHit` when the timer wins
//!
//! ## Flow
//!
//! ```text
//! Closure panics before returning a future:
//!   Task::spawn panics → Err(Fail)             → Outcome { result, lingering: None }
//!
//! Closure first:
//!   spawn(task) → Ok(v) / Err(e)           → Outcome { result, lingering: None }
//!
//! Timer first:
//!   timeout elapsed → token.cancel()       → publish TimeoutHit
//!                                          → Outcome { Err(Timeout), lingering: Some(join) }
//! ```
//!
//! ## Rules
//! - Cancellation is **cooperative**: on timeout the closure is signalled, never aborted.
//! - The caller owns `lingering` and must unregister the attempt's handle once it settles.
//! - A panicking closure is reported as [`TaskError::Fail`], whether it panics while
//!   building its future or while that future runs.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{TaskError, panic_message},
    events::{Bus, Event, EventKind},
    tasks::Task,
};

/// Result of one attempt.
pub(crate) struct Outcome<T> {
    pub result: Result<T, TaskError>,
    /// Closure still running after a timeout.
    pub lingering: Option<JoinHandle<Result<T, TaskError>>>,
}

/// Identity of the attempt, used for events.
pub(crate) struct AttemptInfo<'a> {
    pub id: u64,
    pub name: &'a str,
    pub attempt: u32,
}

/// Executes a single attempt of `task`.
///
/// ### Timeout behavior
/// If `timeout` is `Some(dur)` and `dur > 0`:
/// - the spawned closure is raced against `dur`
/// - on timeout: cancels `token`, publishes `TimeoutHit`, returns `Timeout` and the
///   still-running join handle
pub(crate) async fn run_once<T, K>(
    task: &K,
    token: CancellationToken,
    timeout: Option<Duration>,
    info: AttemptInfo<'_>,
    bus: &Bus,
) -> Outcome<T>
where
    T: Send + 'static,
    K: Task<T> + ?Sized,
{
    let fut = match catch_unwind(AssertUnwindSafe(|| task.spawn(token.clone()))) {
        Ok(fut) => fut,
        Err(payload) => {
            return Outcome {
                result: Err(panicked(payload)),
                lingering: None,
            };
        }
    };
    let mut join = tokio::spawn(fut);

    let Some(dur) = timeout.filter(|d| *d > Duration::ZERO) else {
        return Outcome {
            result: flatten(join.await),
            lingering: None,
        };
    };

    match time::timeout(dur, &mut join).await {
        Ok(res) => Outcome {
            result: flatten(res),
            lingering: None,
        },
        Err(_elapsed) => {
            token.cancel();
            publish_timeout(bus, &info, dur);
            Outcome {
                result: Err(TaskError::Timeout { timeout: dur }),
                lingering: Some(join),
            }
        }
    }
}

/// Maps a join result onto the attempt result.
pub(crate) fn flatten<T>(res: Result<Result<T, TaskError>, JoinError>) -> Result<T, TaskError> {
    match res {
        Ok(r) => r,
        Err(e) if e.is_panic() => Err(panicked(e.into_panic())),
        Err(_) => Err(TaskError::Canceled),
    }
}

fn panicked(payload: Box<dyn std::any::Any + Send>) -> TaskError {
    TaskError::fail(format!("task panicked: {}", panic_message(payload)))
}

/// Publishes `TimeoutHit` event (always followed by `TaskFailed`).
fn publish_timeout(bus: &Bus, info: &AttemptInfo<'_>, dur: Duration) {
    bus.publish(
        Event::new(EventKind::TimeoutHit)
            .with_task(info.id, info.name)
            .with_attempt(info.attempt)
            .with_timeout(dur),
    );
}
