//! # Task abstractions and specifications.
//!
//! This module provides the task-related types:
//! - [`Task`] - trait for implementing async cancelable tasks
//! - [`TaskFn`] - function-based task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task<T>>`)
//! - [`TaskSpec`] - submission bundling a task with priority and attempt budget
//! - [`Priority`] - validated priority in `0..=5`

mod priority;
mod spec;
mod task;
mod task_fn;

pub use priority::Priority;
pub use spec::TaskSpec;
pub use task::{BoxTaskFuture, Task, TaskRef};
pub use task_fn::TaskFn;
