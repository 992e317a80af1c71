//! # Example: pool_shutdown
//!
//! Shutting a busy pool down.
//!
//! Demonstrates how to:
//! - Let tasks react to their [`CancellationToken`].
//! - Close the pool with [`Pool::shutdown_within`] and inspect the outcome.
//! - See that queued work is discarded and new submissions are rejected.
//!
//! ## Flow
//! ```text
//! submit worker-1..4 (size 2) ─► worker-1, worker-2 running; worker-3, worker-4 queued
//! shutdown_within(1s)
//!     ├─► queue discarded (TaskDiscarded ×2)
//!     ├─► tokens cancelled ─► workers return Canceled
//!     └─► running == 0 ─► Ok(())
//! submit(...) ─► Err(Closed)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example pool_shutdown
//! ```

use std::time::Duration;

use taskpool::{EventKind, Pool, PoolConfig, PoolError, TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;

fn worker(n: u32) -> TaskRef<u32> {
    TaskFn::arc(format!("worker-{n}"), move |ctx: CancellationToken| async move {
        let mut ticks = 0;
        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    println!("[worker-{n}] cancelled after {ticks} ticks");
                    return Err(TaskError::Canceled);
                }
                _ = tokio::time::sleep(Duration::from_millis(100)) => ticks += 1,
            }
        }
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let pool = Pool::<u32>::builder(PoolConfig::new(2, Duration::ZERO, 1)).build()?;
    let mut events = pool.subscribe();

    for n in 1..=4 {
        pool.submit(worker(n))?;
    }
    tokio::time::sleep(Duration::from_millis(350)).await;

    pool.shutdown_within(Duration::from_secs(1)).await?;

    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::TaskDiscarded {
            println!("[discarded] {}", ev.task.as_deref().unwrap_or("?"));
        }
    }

    match pool.submit(worker(5)) {
        Err(PoolError::Closed) => println!("[closed] late submission rejected"),
        other => anyhow::bail!("unexpected submit result: {other:?}"),
    }
    Ok(())
}
