use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use super::{
    dispatcher::{Callbacks, Dispatcher},
    pool::Pool,
};
use crate::{
    config::PoolConfig,
    error::{PoolError, TaskError},
    events::Bus,
    policies::RetryPolicy,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Pool`] with optional callbacks and subscribers.
pub struct PoolBuilder<T> {
    cfg: PoolConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    callbacks: Callbacks<T>,
}

impl<T: Send + 'static> PoolBuilder<T> {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: PoolConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            callbacks: Callbacks {
                on_success: None,
                on_failure: None,
            },
        }
    }

    /// Called with the value of every successful attempt.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.callbacks.on_success = Some(Arc::new(f));
        self
    }

    /// Called on every failed attempt (timeouts included) with the error and the
    /// number of attempts left after this one.
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(&TaskError, u32) + Send + Sync + 'static,
    {
        self.callbacks.on_failure = Some(Arc::new(f));
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive pool events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and starts the pool.
    ///
    /// Must be called from within a Tokio runtime; the pool spawns its attempts there.
    ///
    /// ### Errors
    /// - [`PoolError::InvalidSize`] when `size == 0`
    /// - [`PoolError::InvalidAttempts`] when `attempts == 0`
    /// - [`PoolError::NoRuntime`] outside a runtime
    pub fn build(self) -> Result<Pool<T>, PoolError> {
        self.cfg.validate()?;
        let retry = RetryPolicy::new(self.cfg.attempts)?;
        let rt = Handle::try_current().map_err(|_| PoolError::NoRuntime)?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener_token = CancellationToken::new();
        if !self.subscribers.is_empty() {
            let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
            subscriber_listener(&rt, &bus, subs, listener_token.clone());
        }

        let dispatcher = Dispatcher::new(
            self.cfg,
            retry,
            bus,
            self.callbacks,
            rt,
            listener_token,
        );
        Ok(Pool::from_dispatcher(Arc::new(dispatcher)))
    }
}

/// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
fn subscriber_listener(
    rt: &Handle,
    bus: &Bus,
    set: Arc<SubscriberSet>,
    token: CancellationToken,
) {
    let mut rx = bus.subscribe();
    rt.spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        }
    });
}
