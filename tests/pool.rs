//! Scheduling behavior of the pool: capacity, priority, timeouts, retries and drain.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::time;
use tokio_util::sync::CancellationToken;

use taskpool::{
    Event, EventKind, Pool, PoolConfig, PoolError, Subscribe, TaskError, TaskFn, TaskRef, TaskSpec,
};

/// Values and failures observed through the pool callbacks.
#[derive(Clone, Default)]
struct Outcomes {
    ok: Arc<Mutex<Vec<u32>>>,
    failed: Arc<Mutex<Vec<(String, u32)>>>,
}

impl Outcomes {
    fn pool(&self, cfg: PoolConfig) -> Pool<u32> {
        let ok = self.ok.clone();
        let failed = self.failed.clone();
        Pool::builder(cfg)
            .on_success(move |v| ok.lock().unwrap().push(v))
            .on_failure(move |err, left| failed.lock().unwrap().push((err.to_string(), left)))
            .build()
            .expect("valid config")
    }

    fn ok(&self) -> Vec<u32> {
        self.ok.lock().unwrap().clone()
    }

    fn failed(&self) -> Vec<(String, u32)> {
        self.failed.lock().unwrap().clone()
    }
}

fn ok_after(name: &'static str, ms: u64, value: u32) -> TaskRef<u32> {
    TaskFn::arc(name, move |_ctx: CancellationToken| async move {
        time::sleep(Duration::from_millis(ms)).await;
        Ok::<u32, TaskError>(value)
    })
}

fn fail_now(name: &'static str) -> TaskRef<u32> {
    TaskFn::arc(name, move |_ctx: CancellationToken| async move {
        Err::<u32, _>(TaskError::fail(name))
    })
}

#[tokio::test(start_paused = true)]
async fn slow_task_times_out_once_without_retry() {
    let out = Outcomes::default();
    let pool = out.pool(PoolConfig::new(1, Duration::from_millis(100), 1));
    let mut drained = pool.drained();

    pool.submit(ok_after("sleeper", 300, 1)).unwrap();
    assert_eq!(drained.wait().await, Some(1));

    assert_eq!(out.failed(), vec![("Timeout".to_string(), 0)]);
    assert!(out.ok().is_empty());
    assert_eq!(pool.running(), 0);

    // The abandoned closure finishes later; its value goes nowhere.
    time::sleep(Duration::from_millis(300)).await;
    assert!(out.ok().is_empty());
    assert_eq!(pool.active_handles(), 0);
    assert_eq!(pool.drain_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn mixed_batch_reports_every_attempt() {
    let out = Outcomes::default();
    let pool = out.pool(PoolConfig::new(2, Duration::from_millis(100), 2));
    let mut drained = pool.drained();

    pool.submit(ok_after("ok1", 10, 1)).unwrap();
    pool.submit(ok_after("ok2", 0, 2)).unwrap();
    pool.submit(fail_now("fail1")).unwrap();
    pool.submit(ok_after("too-slow", 150, 4)).unwrap();
    drained.wait().await;

    let mut ok = out.ok();
    ok.sort_unstable();
    assert_eq!(ok, vec![1, 2]);

    let mut failed = out.failed();
    failed.sort();
    assert_eq!(
        failed,
        vec![
            ("Timeout".to_string(), 0),
            ("Timeout".to_string(), 1),
            ("fail1".to_string(), 0),
            ("fail1".to_string(), 1),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn always_failing_task_runs_exactly_budget_times() {
    let out = Outcomes::default();
    let pool = out.pool(PoolConfig::new(2, Duration::ZERO, 4));
    let runs = Arc::new(AtomicU32::new(0));
    let counter = runs.clone();

    let mut drained = pool.drained();
    pool.submit(TaskFn::arc("flaky", move |_ctx: CancellationToken| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<u32, _>(TaskError::fail("nope"))
        }
    }))
    .unwrap();
    drained.wait().await;

    assert_eq!(runs.load(Ordering::SeqCst), 4);
    let left: Vec<u32> = out.failed().into_iter().map(|(_, n)| n).collect();
    assert_eq!(left, vec![3, 2, 1, 0]);
}

#[tokio::test(start_paused = true)]
async fn per_submission_attempts_override_pool_default() {
    let out = Outcomes::default();
    let pool = out.pool(PoolConfig::new(1, Duration::ZERO, 5));
    let mut drained = pool.drained();

    pool.submit_spec(TaskSpec::new(fail_now("once")).with_attempts(1))
        .unwrap();
    drained.wait().await;

    assert_eq!(out.failed(), vec![("once".to_string(), 0)]);
}

/// Task that counts its runs and always fails with `err`.
fn failing_with(name: &'static str, err: TaskError, runs: Arc<AtomicU32>) -> TaskRef<u32> {
    TaskFn::arc(name, move |_ctx: CancellationToken| {
        let runs = runs.clone();
        let err = err.clone();
        async move {
            runs.fetch_add(1, Ordering::SeqCst);
            Err::<u32, _>(err)
        }
    })
}

#[tokio::test(start_paused = true)]
async fn fatal_and_canceled_spend_the_full_budget() {
    let out = Outcomes::default();
    let pool = out.pool(PoolConfig::new(1, Duration::from_millis(100), 3));
    let mut events = pool.subscribe();
    let fatal_runs = Arc::new(AtomicU32::new(0));
    let canceled_runs = Arc::new(AtomicU32::new(0));

    let mut drained = pool.drained();
    pool.submit(failing_with("fatal", TaskError::fatal("bad input"), fatal_runs.clone()))
        .unwrap();
    pool.submit(failing_with("canceled", TaskError::Canceled, canceled_runs.clone()))
        .unwrap();
    drained.wait().await;

    assert_eq!(fatal_runs.load(Ordering::SeqCst), 3);
    assert_eq!(canceled_runs.load(Ordering::SeqCst), 3);

    let canceled: Vec<u32> = out
        .failed()
        .into_iter()
        .filter(|(msg, _)| msg == "context cancelled")
        .map(|(_, left)| left)
        .collect();
    assert_eq!(canceled, vec![2, 1, 0]);

    let reasons: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|ev| ev.kind == EventKind::TaskExhausted)
        .filter_map(|ev| ev.reason.clone())
        .collect();
    assert_eq!(reasons.len(), 2);
    assert!(reasons.iter().all(|r| &**r == "budget_spent"));
}

#[tokio::test(start_paused = true)]
async fn closure_panicking_before_its_future_releases_the_slot() {
    let out = Outcomes::default();
    let pool = out.pool(PoolConfig::new(1, Duration::from_millis(100), 2));
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    let mut drained = pool.drained();
    pool.submit(TaskFn::arc("eager", move |_ctx: CancellationToken| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        let first = if n == 1 { Vec::<u32>::new()[0] } else { n };
        async move { Ok::<u32, TaskError>(first) }
    }))
    .unwrap();
    assert_eq!(drained.wait().await, Some(1));

    let failed = out.failed();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].0.starts_with("task panicked: index out of bounds"));
    assert_eq!(failed[0].1, 1);
    assert_eq!(out.ok(), vec![2]);
    assert_eq!(pool.running(), 0);
    assert_eq!(pool.active_handles(), 0);
    assert_eq!(pool.shutdown_within(Duration::from_secs(1)).await, Ok(()));
}

#[tokio::test(start_paused = true)]
async fn higher_priority_runs_first_and_ties_keep_submission_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let sink = order.clone();
    let pool = Pool::<&'static str>::builder(PoolConfig::new(1, Duration::ZERO, 1))
        .on_success(move |name| sink.lock().unwrap().push(name))
        .build()
        .unwrap();

    let named = |name: &'static str| -> TaskRef<&'static str> {
        TaskFn::arc(name, move |_ctx: CancellationToken| async move {
            time::sleep(Duration::from_millis(5)).await;
            Ok::<_, TaskError>(name)
        })
    };

    let mut drained = pool.drained();
    // Occupies the only slot while the rest queue up.
    pool.submit_with(named("blocker"), 5).unwrap();
    pool.submit_with(named("low"), 5).unwrap();
    pool.submit_with(named("high-a"), 0).unwrap();
    pool.submit(named("mid")).unwrap();
    pool.submit_with(named("high-b"), 0).unwrap();
    assert_eq!(pool.queued(), 4);
    drained.wait().await;

    assert_eq!(
        *order.lock().unwrap(),
        vec!["blocker", "high-a", "high-b", "mid", "low"]
    );
}

#[tokio::test(start_paused = true)]
async fn running_count_never_exceeds_size() {
    const SIZE: usize = 3;
    let out = Outcomes::default();
    let pool = out.pool(PoolConfig::new(SIZE, Duration::ZERO, 1));
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut rng = rand::rng();
    let mut drained = pool.drained();
    for i in 0..30u32 {
        let ms = rng.random_range(1..20u64);
        let priority = rng.random_range(0..=5u8);
        let active = active.clone();
        let peak = peak.clone();
        let task: TaskRef<u32> = TaskFn::arc(format!("job-{i}"), move |_ctx: CancellationToken| {
            let active = active.clone();
            let peak = peak.clone();
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                time::sleep(Duration::from_millis(ms)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                Ok::<u32, TaskError>(i)
            }
        });
        pool.submit_with(task, priority).unwrap();
        assert!(pool.running() <= SIZE);
    }
    drained.wait().await;

    assert_eq!(peak.load(Ordering::SeqCst), SIZE);
    assert_eq!(out.ok().len(), 30);
    assert!(out.failed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn timed_out_slot_is_reused_while_closure_lingers() {
    let out = Outcomes::default();
    let pool = out.pool(PoolConfig::new(1, Duration::from_millis(50), 1));
    let mut drained = pool.drained();

    pool.submit(TaskFn::arc("stuck", |_ctx: CancellationToken| async {
        std::future::pending::<Result<u32, TaskError>>().await
    }))
    .unwrap();
    pool.submit(ok_after("next", 0, 7)).unwrap();
    drained.wait().await;

    assert_eq!(out.ok(), vec![7]);
    assert_eq!(pool.running(), 0);
    // The ignored token keeps the stuck closure registered.
    assert_eq!(pool.active_handles(), 1);
}

#[tokio::test(start_paused = true)]
async fn timeout_signals_the_attempt_token() {
    let out = Outcomes::default();
    let pool = out.pool(PoolConfig::new(1, Duration::from_millis(20), 1));
    let observed = Arc::new(AtomicU32::new(0));
    let flag = observed.clone();

    let mut drained = pool.drained();
    pool.submit(TaskFn::arc("polite", move |ctx: CancellationToken| {
        let flag = flag.clone();
        async move {
            ctx.cancelled().await;
            flag.store(1, Ordering::SeqCst);
            Err::<u32, _>(TaskError::Canceled)
        }
    }))
    .unwrap();
    drained.wait().await;
    time::sleep(Duration::from_millis(1)).await;

    assert_eq!(observed.load(Ordering::SeqCst), 1);
    assert_eq!(pool.active_handles(), 0);
    assert_eq!(out.failed(), vec![("Timeout".to_string(), 0)]);
}

#[tokio::test(start_paused = true)]
async fn success_callback_can_submit_more_work() {
    let cell: Arc<OnceLock<Pool<u32>>> = Arc::new(OnceLock::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let handle = cell.clone();
    let sink = seen.clone();
    let pool = Pool::<u32>::builder(PoolConfig::new(1, Duration::ZERO, 1))
        .on_success(move |v| {
            sink.lock().unwrap().push(v);
            if v < 3 {
                if let Some(pool) = handle.get() {
                    pool.submit(ok_after("chained", 1, v + 1)).unwrap();
                }
            }
        })
        .build()
        .unwrap();
    let _ = cell.set(pool.clone());

    let mut drained = pool.drained();
    pool.submit(ok_after("first", 1, 1)).unwrap();
    assert_eq!(drained.wait().await, Some(1));

    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(pool.drain_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn drain_fires_once_per_idle_period() {
    let out = Outcomes::default();
    let pool = out.pool(PoolConfig::new(2, Duration::ZERO, 1));
    let mut drained = pool.drained();

    for n in 0..3 {
        pool.submit(ok_after("batch-1", 5, n)).unwrap();
    }
    assert_eq!(drained.wait().await, Some(1));
    time::sleep(Duration::from_millis(50)).await;
    assert_eq!(pool.drain_count(), 1);

    pool.submit(ok_after("batch-2", 5, 9)).unwrap();
    assert_eq!(drained.wait().await, Some(2));
    assert_eq!(out.ok().len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn drain_is_counted_before_new_work_can_start() {
    let pool = Pool::<u32>::builder(PoolConfig::new(2, Duration::ZERO, 1))
        .build()
        .unwrap();
    let mut events = pool.subscribe();
    let mut drained = pool.drained();

    for round in 1..=50u64 {
        pool.submit(ok_after("tick", 0, 1)).unwrap();
        assert_eq!(drained.wait().await, Some(round));
        assert_eq!(pool.drain_count(), round);
        assert_eq!(pool.running(), 0);
    }

    let mut generations: Vec<u64> = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|ev| ev.kind == EventKind::PoolDrained)
        .filter_map(|ev| ev.reason.as_deref()?.strip_prefix("generation=")?.parse().ok())
        .collect();
    generations.sort_unstable();
    assert_eq!(generations, (1..=50).collect::<Vec<u64>>());
}

#[tokio::test(start_paused = true)]
async fn panicking_callback_does_not_stop_the_pool() {
    let pool = Pool::<u32>::builder(PoolConfig::new(1, Duration::ZERO, 1))
        .on_success(|v| {
            if v == 1 {
                panic!("callback exploded");
            }
        })
        .build()
        .unwrap();
    let mut events = pool.subscribe();
    let mut drained = pool.drained();

    pool.submit(ok_after("a", 1, 1)).unwrap();
    pool.submit(ok_after("b", 1, 2)).unwrap();
    drained.wait().await;

    let kinds: Vec<EventKind> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|ev| ev.kind)
        .collect();
    assert_eq!(
        kinds.iter().filter(|k| **k == EventKind::CallbackPanicked).count(),
        1
    );
    assert_eq!(
        kinds.iter().filter(|k| **k == EventKind::TaskSucceeded).count(),
        2
    );
}

#[tokio::test]
async fn invalid_submissions_are_rejected() {
    let pool = Outcomes::default().pool(PoolConfig::new(1, Duration::ZERO, 1));

    assert_eq!(
        pool.submit_with(ok_after("p", 0, 0), 6).err(),
        Some(PoolError::InvalidPriority { priority: 6 })
    );
    assert_eq!(
        pool.submit_spec(TaskSpec::new(ok_after("a", 0, 0)).with_attempts(0))
            .err(),
        Some(PoolError::InvalidAttempts { attempts: 0 })
    );
    assert_eq!(pool.queued(), 0);
    assert_eq!(pool.running(), 0);
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let size = Pool::<u32>::builder(PoolConfig::new(0, Duration::ZERO, 1)).build();
    assert_eq!(size.err(), Some(PoolError::InvalidSize));

    let attempts = Pool::<u32>::builder(PoolConfig::new(1, Duration::ZERO, 0)).build();
    assert_eq!(attempts.err(), Some(PoolError::InvalidAttempts { attempts: 0 }));
}

#[test]
fn building_outside_runtime_fails() {
    let res = Pool::<u32>::builder(PoolConfig::default()).build();
    assert_eq!(res.err(), Some(PoolError::NoRuntime));
}

#[derive(Default)]
struct KindRecorder(tokio::sync::Mutex<Vec<EventKind>>);

#[async_trait]
impl Subscribe for KindRecorder {
    async fn on_event(&self, ev: &Event) {
        self.0.lock().await.push(ev.kind);
    }

    fn name(&self) -> &'static str {
        "kind-recorder"
    }
}

#[tokio::test]
async fn subscribers_see_the_lifecycle() {
    let rec = Arc::new(KindRecorder::default());
    let pool = Pool::<u32>::builder(PoolConfig::new(1, Duration::ZERO, 1))
        .with_subscribers(vec![rec.clone() as Arc<dyn Subscribe>])
        .build()
        .unwrap();

    let mut drained = pool.drained();
    pool.submit(ok_after("watched", 0, 1)).unwrap();
    drained.wait().await;
    time::sleep(Duration::from_millis(50)).await;

    let kinds = rec.0.lock().await.clone();
    assert_eq!(
        kinds,
        vec![
            EventKind::TaskSubmitted,
            EventKind::TaskStarting,
            EventKind::TaskSucceeded,
            EventKind::PoolDrained,
        ]
    );
}
