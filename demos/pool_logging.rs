//! # Example: pool_logging
//!
//! Wires the built-in [`LogWriter`] subscriber to `tracing-subscriber`.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example pool_logging --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskpool::{LogWriter, Pool, PoolConfig, Subscribe, TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let pool = Pool::<u32>::builder(PoolConfig::new(1, Duration::from_millis(100), 2))
        .with_subscribers(subs)
        .build()?;

    let fine: TaskRef<u32> = TaskFn::arc("fine", |_ctx: CancellationToken| async {
        Ok::<u32, TaskError>(1)
    });
    let late: TaskRef<u32> = TaskFn::arc("late", |_ctx: CancellationToken| async {
        tokio::time::sleep(Duration::from_millis(250)).await;
        Ok::<u32, TaskError>(2)
    });

    let mut drained = pool.drained();
    pool.submit_with(fine, 0)?;
    pool.submit(late)?;
    drained.wait().await;

    pool.shutdown().await;
    // Give the subscriber worker a moment to flush.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
