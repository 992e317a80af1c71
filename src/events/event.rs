//! # Runtime events emitted by the pool.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Submission events**: work entering or leaving the queue
//! - **Attempt events**: execution flow (starting, succeeded, failed, timeout)
//! - **Pool events**: drain and shutdown
//! - **Subscriber events**: problems inside observers themselves
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task id,
//! priority, attempt counters and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskpool::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task(7, "fetch")
//!     .with_reason("boom")
//!     .with_attempt(2)
//!     .with_timeout(Duration::from_millis(100));
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task_id, Some(7));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `reason` (panic message).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `reason` ("full" or "closed").
    SubscriberOverflow,

    // === Submission events ===
    /// A task was accepted and queued.
    ///
    /// Sets: `task_id`, `task`, `priority`, `retries_left` (attempt budget minus one).
    TaskSubmitted,

    /// A failed task went back to the queue for another attempt.
    ///
    /// Sets: `task_id`, `task`, `priority`, `attempt`, `retries_left`.
    TaskRequeued,

    /// A failed task was dropped: budget exhausted or pool closed.
    ///
    /// Sets: `task_id`, `task`, `attempt`, `reason`.
    TaskExhausted,

    /// A queued task was thrown away by shutdown before it ever started.
    ///
    /// Sets: `task_id`, `task`, `priority`.
    TaskDiscarded,

    // === Attempt events ===
    /// An attempt took a slot and is starting.
    ///
    /// Sets: `task_id`, `task`, `priority`, `attempt` (1-based).
    TaskStarting,

    /// An attempt returned a value.
    ///
    /// Sets: `task_id`, `task`, `attempt`.
    TaskSucceeded,

    /// An attempt failed (including timeouts).
    ///
    /// Sets: `task_id`, `task`, `attempt`, `retries_left`, `reason`.
    TaskFailed,

    /// An attempt exceeded its time budget. Always followed by `TaskFailed`.
    ///
    /// Sets: `task_id`, `task`, `attempt`, `timeout_ms`.
    TimeoutHit,

    /// A success or failure callback panicked; the pool kept going.
    ///
    /// Sets: `task_id`, `task`, `reason`.
    CallbackPanicked,

    // === Pool events ===
    /// Nothing is queued and nothing is running.
    PoolDrained,

    /// `shutdown` was called.
    ShutdownRequested,

    /// Every running attempt released its slot after `shutdown`.
    ShutdownComplete,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Pool-assigned id of the submission (stable across retries).
    pub task_id: Option<u64>,
    /// Name of the task (or of the subscriber, for subscriber events).
    pub task: Option<Arc<str>>,
    /// Priority of the task (0 highest).
    pub priority: Option<u8>,
    /// Attempt number (starting from 1).
    pub attempt: Option<u32>,
    /// Attempts left after this one.
    pub retries_left: Option<u32>,
    /// Attempt timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task_id: None,
            task: None,
            priority: None,
            attempt: None,
            retries_left: None,
            timeout_ms: None,
            reason: None,
        }
    }

    /// Attaches the submission id and task name.
    #[inline]
    pub fn with_task(mut self, id: u64, name: impl Into<Arc<str>>) -> Self {
        self.task_id = Some(id);
        self.task = Some(name.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a priority.
    #[inline]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches the number of attempts still available.
    #[inline]
    pub fn with_retries_left(mut self, n: u32) -> Self {
        self.retries_left = Some(n);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.task = Some(subscriber.into());
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.task = Some(subscriber.into());
        ev
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
