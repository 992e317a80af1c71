//! # Example: basic_pool
//!
//! A pool of two slots working through a mixed batch: quick successes, a flaky job
//! that fails twice before succeeding, and a job that always overruns its time budget.
//!
//! Demonstrates how to:
//! - Configure size, timeout and attempts with [`PoolConfig`].
//! - Observe results through `on_success` / `on_failure`.
//! - Wait for the pool to go idle with [`Pool::drained`].
//!
//! ## Flow
//! ```text
//! submit ×4 ──► queue ──► dispatch (2 slots)
//!     ├─► quick-1, quick-2          ─► on_success
//!     ├─► flaky  Err, Err, Ok       ─► on_failure(2), on_failure(1), on_success
//!     └─► slow   Timeout ×3         ─► on_failure(2), (1), (0)
//! drained.wait() ─► shutdown()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_pool
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use taskpool::{Pool, PoolConfig, TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Two slots, 200ms per attempt, three attempts in total
    let cfg = PoolConfig::new(2, Duration::from_millis(200), 3);

    // 2. Build the pool with callbacks
    let pool = Pool::<String>::builder(cfg)
        .on_success(|v| println!("[ok] {v}"))
        .on_failure(|err, left| println!("[failed] {err} (attempts left: {left})"))
        .build()?;

    // 3. Define tasks
    let quick = |n: u32| -> TaskRef<String> {
        TaskFn::arc(format!("quick-{n}"), move |_ctx: CancellationToken| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, TaskError>(format!("quick-{n} done"))
        })
    };

    let tries = Arc::new(AtomicU32::new(0));
    let flaky: TaskRef<String> = TaskFn::arc("flaky", move |_ctx: CancellationToken| {
        let tries = tries.clone();
        async move {
            let n = tries.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                return Err(TaskError::fail(format!("flaky attempt {n}")));
            }
            Ok(format!("flaky done after {n} attempts"))
        }
    });

    let slow: TaskRef<String> = TaskFn::arc("slow", |ctx: CancellationToken| async move {
        tokio::select! {
            _ = ctx.cancelled() => Err(TaskError::Canceled),
            _ = tokio::time::sleep(Duration::from_secs(1)) => Ok("slow done".to_string()),
        }
    });

    // 4. Submit and wait for the pool to go idle
    let mut drained = pool.drained();
    pool.submit(quick(1))?;
    pool.submit(quick(2))?;
    pool.submit(flaky)?;
    pool.submit_with(slow, 5)?;
    drained.wait().await;

    // 5. Close the pool
    pool.shutdown().await;
    Ok(())
}
