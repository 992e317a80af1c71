//! # taskpool
//!
//! **Taskpool** is a bounded-concurrency scheduler for async work on Tokio.
//!
//! It accepts units of work, runs at most `size` of them at once in priority order,
//! gives every attempt a time budget with cooperative cancellation, retries failures
//! up to a total attempt budget and tells observers when the pool goes idle.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskSpec   │   │   TaskSpec   │   │   TaskSpec   │
//!     │ (priority 0) │   │ (priority 3) │   │ (priority 5) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Pool / Dispatcher                                                │
//! │  - PriorityQueue (priority, then submission order)                │
//! │  - running count (never above `size`)                             │
//! │  - CancelRegistry (one token per executing closure)               │
//! │  - DrainNotifier (once per idle period)                           │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │  run_once    │   │  run_once    │   │  run_once    │   │
//!     │ (timeout +   │   │ (timeout +   │   │ (timeout +   │   │
//!     │  token)      │   │  token)      │   │  token)      │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ TaskStarting     │ TaskSucceeded    │ TimeoutHit      │ PoolDrained
//!      │ TaskFailed       │                  │ TaskRequeued    │ Shutdown*
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                  (capacity: PoolConfig::bus_capacity)             │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                            (per-sub queues)
//!                          ┌────────┼────────┐
//!                          ▼        ▼        ▼
//!                       worker1  worker2  workerN
//! ```
//!
//! ### Lifecycle of a submission
//! ```text
//! submit(spec) ──► validate priority/attempts ──► queue ──► dispatch pass
//!
//! attempt:
//!   ├─► running += 1, register token, publish TaskStarting
//!   ├─► run_once(task, token, timeout)
//!   │       ├─ Ok(v)  ──► on_success(v)
//!   │       └─ Err(e) ──► on_failure(e, retries_left)
//!   │                    ├─ budget left and pool open ─► requeue (back of its band)
//!   │                    └─ otherwise                  ─► TaskExhausted
//!   └─► running -= 1, dispatch pass
//!
//! queue empty and running == 0 ──► drain fires (once per idle period)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                      |
//! |-------------------|---------------------------------------------------------------|-----------------------------------------|
//! | **Pool**          | Submit work, wait for drain, shut down.                       | [`Pool`], [`PoolBuilder`], [`DrainListener`] |
//! | **Tasks**         | Define work as closures receiving a cancellation token.       | [`TaskRef`], [`TaskFn`], [`TaskSpec`]   |
//! | **Retries**       | Total-attempt budget per submission.                          | [`RetryPolicy`]                         |
//! | **Subscriber API**| Observe lifecycle events (logging, metrics, custom).          | [`Subscribe`], [`Event`]                |
//! | **Errors**        | Typed errors for the API and for task execution.              | [`PoolError`], [`TaskError`]            |
//! | **Configuration** | Size, timeout, attempts, bus capacity.                        | [`PoolConfig`]                          |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber that forwards events to `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use taskpool::{Pool, PoolConfig, TaskError, TaskFn, TaskRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let total = Arc::new(AtomicU32::new(0));
//!     let sink = total.clone();
//!
//!     let pool = Pool::<u32>::builder(PoolConfig::new(2, Duration::from_secs(1), 3))
//!         .on_success(move |v| {
//!             sink.fetch_add(v, Ordering::Relaxed);
//!         })
//!         .on_failure(|err, retries_left| eprintln!("failed: {err} ({retries_left} left)"))
//!         .build()?;
//!
//!     let mut drained = pool.drained();
//!     for n in 1..=4u32 {
//!         let task: TaskRef<u32> = TaskFn::arc(format!("job-{n}"), move |_ctx: CancellationToken| async move {
//!             Ok::<u32, TaskError>(n)
//!         });
//!         pool.submit(task)?;
//!     }
//!     drained.wait().await;
//!
//!     assert_eq!(total.load(Ordering::Relaxed), 10);
//!     pool.shutdown().await;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::PoolConfig;
pub use crate::core::{DrainListener, FailureFn, Pool, PoolBuilder, SuccessFn, TaskId};
pub use error::{PoolError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use policies::{ExhaustReason, RetryDecision, RetryPolicy};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{BoxTaskFuture, Priority, Task, TaskFn, TaskRef, TaskSpec};

// Optional: a built-in subscriber that forwards events to `tracing`.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
