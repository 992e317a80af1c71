//! # Completion notifier.
//!
//! Signals the *drain* condition: nothing queued and nothing running.
//!
//! ## Rules
//! - Fires once per idle period; fires again after the pool gets busy and drains again.
//! - No buffering for late listeners: a [`DrainListener`] only observes firings that
//!   happen after it was created.
//! - Every firing carries a generation number (1, 2, …) so listeners can tell
//!   consecutive idle periods apart.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Sender side, owned by the dispatcher.
pub(crate) struct DrainNotifier {
    tx: broadcast::Sender<u64>,
    generation: AtomicU64,
}

impl DrainNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(16);
        Self {
            tx,
            generation: AtomicU64::new(0),
        }
    }

    /// Fires the signal and returns the new generation.
    pub fn fire(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let _ = self.tx.send(generation);
        generation
    }

    /// How many times the pool has drained so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn listen(&self) -> DrainListener {
        DrainListener {
            rx: self.tx.subscribe(),
        }
    }
}

/// Subscription to the drain signal.
///
/// Create it **before** submitting the work you want to wait for; firings that
/// happened earlier are not replayed.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use taskpool::{Pool, PoolConfig, TaskError, TaskFn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), taskpool::PoolError> {
/// let pool = Pool::<u32>::builder(PoolConfig::new(2, Duration::from_secs(1), 1)).build()?;
/// let mut drained = pool.drained();
///
/// pool.submit(TaskFn::arc("one", |_ctx: CancellationToken| async {
///     Ok::<u32, TaskError>(1)
/// }))?;
///
/// assert_eq!(drained.wait().await, Some(1));
/// # Ok(())
/// # }
/// ```
pub struct DrainListener {
    rx: broadcast::Receiver<u64>,
}

impl DrainListener {
    /// Waits for the next drain and returns its generation.
    ///
    /// Returns `None` once the pool is gone and can never drain again.
    pub async fn wait(&mut self) -> Option<u64> {
        loop {
            match self.rx.recv().await {
                Ok(generation) => return Some(generation),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
