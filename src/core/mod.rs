//! Pool core: queueing, dispatch and attempt execution.
//!
//! The public API from this module is [`Pool`] (with its [`PoolBuilder`]) and
//! the [`DrainListener`] returned by [`Pool::drained`].
//!
//! Internal modules:
//! - [`queue`]: priority queue of waiting work items;
//! - [`registry`]: cancellation handles of executing closures;
//! - [`runner`]: executes one attempt with timeout/cancellation;
//! - [`dispatcher`]: the control loop owning all pool state;
//! - [`drain`]: the idle-period notifier;
//! - [`builder`], [`pool`]: construction and the public handle.

mod builder;
mod dispatcher;
mod drain;
mod pool;
mod queue;
mod registry;
mod runner;

pub use builder::PoolBuilder;
pub use dispatcher::{FailureFn, SuccessFn};
pub use drain::DrainListener;
pub use pool::Pool;
pub use queue::TaskId;
