//! # Pool: public handle to the dispatcher.
//!
//! [`Pool`] is a cheap, cloneable handle. Every clone talks to the same queue,
//! running count and callbacks.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use taskpool::{Pool, PoolConfig, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), taskpool::PoolError> {
//!     let seen = Arc::new(Mutex::new(Vec::new()));
//!     let sink = seen.clone();
//!
//!     let pool = Pool::<String>::builder(PoolConfig::new(2, Duration::from_millis(100), 2))
//!         .on_success(move |v| sink.lock().unwrap().push(v))
//!         .build()?;
//!
//!     let mut drained = pool.drained();
//!     pool.submit(TaskFn::arc("hello", |_ctx: CancellationToken| async {
//!         Ok::<_, TaskError>("hello".to_string())
//!     }))?;
//!     drained.wait().await;
//!
//!     assert_eq!(*seen.lock().unwrap(), vec!["hello".to_string()]);
//!     pool.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::{
    config::PoolConfig,
    core::{builder::PoolBuilder, dispatcher::Dispatcher, drain::DrainListener, queue::TaskId},
    error::PoolError,
    events::Event,
    tasks::{TaskRef, TaskSpec},
};

/// Bounded-concurrency task pool.
pub struct Pool<T> {
    inner: Arc<Dispatcher<T>>,
}

impl<T> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> Pool<T> {
    /// Starts building a pool from `cfg`.
    pub fn builder(cfg: PoolConfig) -> PoolBuilder<T> {
        PoolBuilder::new(cfg)
    }

    pub(crate) fn from_dispatcher(inner: Arc<Dispatcher<T>>) -> Self {
        Self { inner }
    }

    /// Queues `task` with default priority (3) and the pool's attempt budget.
    pub fn submit(&self, task: TaskRef<T>) -> Result<TaskId, PoolError> {
        self.submit_spec(TaskSpec::new(task))
    }

    /// Queues `task` with an explicit priority (0 = highest, 5 = lowest).
    ///
    /// Fails with [`PoolError::InvalidPriority`] outside `0..=5`.
    pub fn submit_with(&self, task: TaskRef<T>, priority: u8) -> Result<TaskId, PoolError> {
        self.submit_spec(TaskSpec::new(task).with_priority(priority))
    }

    /// Queues a fully specified submission.
    ///
    /// ### Errors
    /// - [`PoolError::InvalidPriority`] priority outside `0..=5`
    /// - [`PoolError::InvalidAttempts`] attempt override of 0
    /// - [`PoolError::Closed`] after [`shutdown`](Self::shutdown)
    pub fn submit_spec(&self, spec: TaskSpec<T>) -> Result<TaskId, PoolError> {
        self.inner.submit(spec)
    }

    /// Closes the pool and waits until no attempt holds a slot.
    ///
    /// ### Semantics
    /// - later `submit` calls fail with [`PoolError::Closed`]
    /// - queued items that never started are discarded
    /// - every live cancellation token is triggered
    /// - failures observed from now on are reported but not requeued
    ///
    /// A closure that ignores its token and never settles keeps this waiting forever;
    /// use [`shutdown_within`](Self::shutdown_within) for a bound.
    pub async fn shutdown(&self) {
        let mut running = self.inner.begin_shutdown();
        let _ = running.wait_for(|n| *n == 0).await;
        self.inner.publish_shutdown_complete();
    }

    /// Like [`shutdown`](Self::shutdown) but gives up after `grace`.
    pub async fn shutdown_within(&self, grace: Duration) -> Result<(), PoolError> {
        let mut running = self.inner.begin_shutdown();
        let done = time::timeout(grace, running.wait_for(|n| *n == 0))
            .await
            .is_ok();
        if done {
            self.inner.publish_shutdown_complete();
            Ok(())
        } else {
            Err(PoolError::GraceExceeded {
                grace,
                stuck: self.inner.running(),
            })
        }
    }

    /// Subscribes to the drain signal.
    pub fn drained(&self) -> DrainListener {
        self.inner.drained()
    }

    /// Subscribes to the raw event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus().subscribe()
    }

    /// Number of attempts currently holding a slot.
    pub fn running(&self) -> usize {
        self.inner.running()
    }

    /// Number of items waiting for a slot.
    pub fn queued(&self) -> usize {
        self.inner.queued()
    }

    /// Number of registered cancellation handles, timed-out closures that are
    /// still unwinding included.
    pub fn active_handles(&self) -> usize {
        self.inner.active_handles()
    }

    /// How many times the pool has drained.
    pub fn drain_count(&self) -> u64 {
        self.inner.drain_count()
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// The configuration the pool was built with.
    pub fn config(&self) -> &PoolConfig {
        self.inner.config()
    }
}
