//! # Dispatcher: the pool's control loop.
//!
//! Owns the queue, the running count and the cancellation registry. Every mutation
//! of that state happens inside one short critical section that never awaits and
//! never calls user code, so the bookkeeping behaves as if it ran on a single
//! control thread even though attempts execute in parallel.
//!
//! ## Dispatch pass
//! Run on every submission, every settlement and every requeue:
//! ```text
//! loop {
//!   ├─ running >= size          → stop
//!   ├─ closed                   → stop (drain if running == 0)
//!   ├─ queue empty              → stop (drain if running == 0)
//!   └─ pop highest item
//!        ├─ running += 1
//!        ├─ register cancellation handle
//!        └─ launch execute(item) as its own tokio task (not awaited)
//! }
//! ```
//!
//! ## Attempt lifecycle
//! ```text
//! execute(item)
//!   ├─► run_once(task, token, timeout)
//!   ├─► unregister handle (now, or by a reaper once a timed-out closure settles)
//!   ├─ Ok(v)  ──► publish TaskSucceeded ─► on_success(v)
//!   └─ Err(e) ──► publish TaskFailed    ─► on_failure(e, retries_left)
//!   └─► running -= 1, RetryPolicy::decide, dispatch pass (one critical section)
//!                       ├─ Requeue   ─► push (back of band), publish TaskRequeued
//!                       └─ Exhausted ─► publish TaskExhausted
//! ```
//!
//! ## Rules
//! - The decrement, the retry decision, the following pass and the drain firing share
//!   one critical section, so exactly one settlement observes the transition to idle
//!   and drain fires once per idle period, before anything else can start.
//! - Callbacks run outside the lock and may re-enter `submit`.
//! - A panicking callback is caught and reported as `CallbackPanicked`.
//! - Once closed, nothing new starts and failures are never requeued.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    config::PoolConfig,
    core::{
        drain::{DrainListener, DrainNotifier},
        queue::{PriorityQueue, TaskId, WorkItem},
        registry::{CancelRegistry, HandleId},
        runner::{self, AttemptInfo},
    },
    error::{PoolError, TaskError, panic_message},
    events::{Bus, Event, EventKind},
    policies::{RetryDecision, RetryPolicy},
    tasks::{Priority, TaskSpec},
};

/// Success callback.
pub type SuccessFn<T> = Arc<dyn Fn(T) + Send + Sync>;
/// Failure callback: the error and the attempts left after this failure.
pub type FailureFn = Arc<dyn Fn(&TaskError, u32) + Send + Sync>;

/// Optional user callbacks.
pub(crate) struct Callbacks<T> {
    pub on_success: Option<SuccessFn<T>>,
    pub on_failure: Option<FailureFn>,
}

/// Mutable pool state, guarded by the dispatcher lock.
struct State<T> {
    queue: PriorityQueue<T>,
    running: usize,
    registry: CancelRegistry,
    closed: bool,
}

/// Item that won a slot during a pass.
struct Launch<T> {
    item: WorkItem<T>,
    handle: HandleId,
    token: CancellationToken,
}

/// Result of one dispatch pass, applied after the lock is released.
struct Pass<T> {
    launches: Vec<Launch<T>>,
    /// Drain generation fired by this pass.
    drained: Option<u64>,
}

/// Shared core behind every [`Pool`](crate::Pool) handle.
pub(crate) struct Dispatcher<T> {
    cfg: PoolConfig,
    retry: RetryPolicy,
    state: Mutex<State<T>>,
    running_tx: watch::Sender<usize>,
    next_id: AtomicU64,
    drain: DrainNotifier,
    bus: Bus,
    callbacks: Callbacks<T>,
    rt: Handle,
    /// Cancelled when the dispatcher is dropped; stops the subscriber listener.
    listener_token: CancellationToken,
}

impl<T> Drop for Dispatcher<T> {
    fn drop(&mut self) {
        self.listener_token.cancel();
    }
}

impl<T: Send + 'static> Dispatcher<T> {
    pub fn new(
        cfg: PoolConfig,
        retry: RetryPolicy,
        bus: Bus,
        callbacks: Callbacks<T>,
        rt: Handle,
        listener_token: CancellationToken,
    ) -> Self {
        let (running_tx, _rx) = watch::channel(0usize);
        Self {
            cfg,
            retry,
            state: Mutex::new(State {
                queue: PriorityQueue::new(),
                running: 0,
                registry: CancelRegistry::new(),
                closed: false,
            }),
            running_tx,
            next_id: AtomicU64::new(1),
            drain: DrainNotifier::new(),
            bus,
            callbacks,
            rt,
            listener_token,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.cfg
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn drained(&self) -> DrainListener {
        self.drain.listen()
    }

    pub fn drain_count(&self) -> u64 {
        self.drain.generation()
    }

    pub fn running(&self) -> usize {
        self.lock().running
    }

    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn active_handles(&self) -> usize {
        self.lock().registry.len()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Validates and queues a submission, then runs a dispatch pass.
    pub fn submit(self: &Arc<Self>, spec: TaskSpec<T>) -> Result<TaskId, PoolError> {
        let (task, priority, attempts) = spec.into_parts();
        let priority = Priority::new(priority)?;
        let attempts = self.retry.budget_for(attempts)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = task.name().to_string();
        let item = WorkItem::new(id, task, priority, attempts);

        let pass = {
            let mut st = self.lock();
            if st.closed {
                return Err(PoolError::Closed);
            }
            st.queue.push(item);
            self.pass(&mut st)
        };

        self.bus.publish(
            Event::new(EventKind::TaskSubmitted)
                .with_task(id, name)
                .with_priority(priority.get())
                .with_retries_left(RetryPolicy::retries_left(attempts)),
        );
        self.apply(pass);
        Ok(id)
    }

    /// Closes the pool, drops the backlog and signals every live handle.
    ///
    /// Returns a receiver over the running count to wait on.
    pub fn begin_shutdown(&self) -> watch::Receiver<usize> {
        let (first, discarded, cancelled) = {
            let mut st = self.lock();
            let first = !st.closed;
            st.closed = true;
            let discarded = st.queue.drain();
            let cancelled = st.registry.cancel_all();
            (first, discarded, cancelled)
        };

        if first {
            self.bus.publish(
                Event::new(EventKind::ShutdownRequested).with_reason(format!(
                    "cancelled={cancelled} discarded={}",
                    discarded.len()
                )),
            );
        }
        for item in discarded {
            self.bus.publish(
                Event::new(EventKind::TaskDiscarded)
                    .with_task(item.id, item.name())
                    .with_priority(item.priority.get()),
            );
        }
        self.running_tx.subscribe()
    }

    pub fn publish_shutdown_complete(&self) {
        self.bus.publish(Event::new(EventKind::ShutdownComplete));
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fills free slots from the queue and fires drain when idle.
    /// Must be called with the lock held.
    fn pass(&self, st: &mut State<T>) -> Pass<T> {
        let mut launches = Vec::new();
        let drained = loop {
            if st.running >= self.cfg.size {
                break false;
            }
            if st.closed {
                break st.running == 0;
            }
            let Some(item) = st.queue.pop() else {
                break st.running == 0;
            };
            st.running += 1;
            let (handle, token) = st.registry.register();
            launches.push(Launch {
                item,
                handle,
                token,
            });
        };
        self.running_tx.send_replace(st.running);
        let drained = drained.then(|| self.drain.fire());
        Pass { launches, drained }
    }

    /// Starts launched attempts and publishes the drain event, outside the lock.
    fn apply(self: &Arc<Self>, pass: Pass<T>) {
        for launch in pass.launches {
            let item = &launch.item;
            self.bus.publish(
                Event::new(EventKind::TaskStarting)
                    .with_task(item.id, item.name())
                    .with_priority(item.priority.get())
                    .with_attempt(item.attempt),
            );
            let me = Arc::clone(self);
            self.rt.spawn(me.execute(launch));
        }

        if let Some(generation) = pass.drained {
            self.bus.publish(
                Event::new(EventKind::PoolDrained).with_reason(format!("generation={generation}")),
            );
        }
    }

    /// Runs one attempt and settles it.
    async fn execute(self: Arc<Self>, launch: Launch<T>) {
        let Launch {
            item,
            handle,
            token,
        } = launch;

        let outcome = runner::run_once(
            item.task.as_ref(),
            token,
            self.cfg.default_timeout(),
            AttemptInfo {
                id: item.id,
                name: item.name(),
                attempt: item.attempt,
            },
            &self.bus,
        )
        .await;

        match outcome.lingering {
            None => self.unregister(handle),
            Some(join) => {
                let me = Arc::clone(&self);
                self.rt.spawn(async move {
                    let _ = join.await;
                    me.unregister(handle);
                });
            }
        }

        match outcome.result {
            Ok(value) => self.succeed(item, value),
            Err(err) => self.fail(item, err),
        }
    }

    fn unregister(&self, handle: HandleId) {
        self.lock().registry.unregister(handle);
    }

    fn succeed(self: &Arc<Self>, item: WorkItem<T>, value: T) {
        self.bus.publish(
            Event::new(EventKind::TaskSucceeded)
                .with_task(item.id, item.name())
                .with_attempt(item.attempt),
        );
        if let Some(cb) = &self.callbacks.on_success {
            let res = catch_unwind(AssertUnwindSafe(|| cb(value)));
            self.report_callback_panic(&item, res);
        }
        self.settle(None);
    }

    fn fail(self: &Arc<Self>, item: WorkItem<T>, err: TaskError) {
        let retries_left = RetryPolicy::retries_left(item.attempts_remaining);
        self.bus.publish(
            Event::new(EventKind::TaskFailed)
                .with_task(item.id, item.name())
                .with_attempt(item.attempt)
                .with_retries_left(retries_left)
                .with_reason(err.to_string()),
        );
        if let Some(cb) = &self.callbacks.on_failure {
            let res = catch_unwind(AssertUnwindSafe(|| cb(&err, retries_left)));
            self.report_callback_panic(&item, res);
        }
        self.settle(Some(item));
    }

    /// Releases the slot, requeues if decided, and runs a pass; one critical section.
    fn settle(self: &Arc<Self>, failed: Option<WorkItem<T>>) {
        let mut report = None;
        let pass = {
            let mut st = self.lock();
            st.running = st.running.saturating_sub(1);
            if let Some(item) = failed {
                let id = item.id;
                let name = item.name().to_string();
                let attempt = item.attempt;
                let ev = match self.retry.decide(item.attempts_remaining, st.closed) {
                    RetryDecision::Requeue { attempts_remaining } => {
                        let priority = item.priority.get();
                        st.queue.push(item.retry(attempts_remaining));
                        Event::new(EventKind::TaskRequeued)
                            .with_task(id, name)
                            .with_priority(priority)
                            .with_attempt(attempt + 1)
                            .with_retries_left(RetryPolicy::retries_left(attempts_remaining))
                    }
                    RetryDecision::Exhausted(reason) => Event::new(EventKind::TaskExhausted)
                        .with_task(id, name)
                        .with_attempt(attempt)
                        .with_reason(reason.as_label()),
                };
                report = Some(ev);
            }
            self.pass(&mut st)
        };

        if let Some(ev) = report {
            self.bus.publish(ev);
        }
        self.apply(pass);
    }

    fn report_callback_panic(&self, item: &WorkItem<T>, res: std::thread::Result<()>) {
        if let Err(payload) = res {
            self.bus.publish(
                Event::new(EventKind::CallbackPanicked)
                    .with_task(item.id, item.name())
                    .with_reason(panic_message(payload)),
            );
        }
    }
}
