//! # Submission specification.
//!
//! Defines [`TaskSpec`], a bundle that describes how one submission should be
//! scheduled: which task, at what priority, with how many attempts.
//!
//! A spec can be created:
//! - **With defaults** via [`TaskSpec::new`] (priority 3, pool attempt budget)
//! - **Explicitly** by chaining [`TaskSpec::with_priority`] / [`TaskSpec::with_attempts`]
//!
//! ## Rules
//! - Values are validated by [`Pool::submit_spec`](crate::Pool::submit_spec), not here,
//!   so invalid input surfaces as a [`PoolError`](crate::PoolError) at the submit call site.
//! - `attempts` counts the first run: `with_attempts(1)` means "never retry".

use crate::tasks::{priority::Priority, task::TaskRef};

/// Specification for one submission.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use taskpool::{TaskError, TaskFn, TaskRef, TaskSpec};
///
/// let job: TaskRef<u32> = TaskFn::arc("job", |_ctx: CancellationToken| async move {
///     Ok::<u32, TaskError>(1)
/// });
///
/// let spec = TaskSpec::new(job).with_priority(0).with_attempts(5);
/// assert_eq!(spec.priority(), 0);
/// assert_eq!(spec.attempts(), Some(5));
/// ```
pub struct TaskSpec<T> {
    task: TaskRef<T>,
    priority: u8,
    attempts: Option<u32>,
}

impl<T: 'static> Clone for TaskSpec<T> {
    fn clone(&self) -> Self {
        Self {
            task: self.task.clone(),
            priority: self.priority,
            attempts: self.attempts,
        }
    }
}

impl<T: 'static> TaskSpec<T> {
    /// Creates a spec with default priority and the pool's attempt budget.
    pub fn new(task: TaskRef<T>) -> Self {
        Self {
            task,
            priority: Priority::DEFAULT.get(),
            attempts: None,
        }
    }

    /// Returns reference to the task.
    pub fn task(&self) -> &TaskRef<T> {
        &self.task
    }

    /// Convenience: returns the task name.
    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// Returns the requested raw priority.
    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Returns the attempt override, if any.
    pub fn attempts(&self) -> Option<u32> {
        self.attempts
    }

    /// Returns a new spec with updated priority (0 = highest, 5 = lowest).
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Returns a new spec with an explicit total-attempts budget.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub(crate) fn into_parts(self) -> (TaskRef<T>, u8, Option<u32>) {
        (self.task, self.priority, self.attempts)
    }
}

impl<T: 'static> From<TaskRef<T>> for TaskSpec<T> {
    fn from(task: TaskRef<T>) -> Self {
        Self::new(task)
    }
}
