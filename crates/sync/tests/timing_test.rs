//! End-to-end timing tests against the real monotonic clock.
//!
//! Delays are scaled down from seconds to tens of milliseconds; the "too
//! late" bound is loose so a busy machine does not cause spurious failures.

use std::collections::BTreeMap;
use std::thread;
use std::time::{Duration, Instant};

use atsched_sync::{ScheduledTask, SyncScheduler, TaskError, TaskScheduler};

const DELAY: Duration = Duration::from_millis(150);
const STEP: Duration = Duration::from_millis(10);
const SETTLE: Duration = Duration::from_millis(100);
const LATE_TOLERANCE: Duration = Duration::from_millis(250);

type Args = (Vec<i64>, BTreeMap<String, String>);

#[derive(Debug, Clone, PartialEq)]
struct FailedTaskError {
    msg: String,
    run_at: Instant,
    args: Vec<i64>,
    kwargs: BTreeMap<String, String>,
}

fn sample_args() -> Args {
    let kwargs = [("x".to_string(), "3".to_string()), ("flag".to_string(), "true".to_string())]
        .into_iter()
        .collect();
    (vec![1, 2, -7], kwargs)
}

/// Poll on a fixed cadence until `until` has passed.
fn poll_until(scheduler: &SyncScheduler, until: Instant) {
    while Instant::now() < until {
        thread::sleep(STEP);
        scheduler.poll();
    }
}

#[test]
fn future_task_runs_close_to_due_time() {
    let scheduler = SyncScheduler::new();
    let (args, kwargs) = sample_args();
    let at = Instant::now() + DELAY;

    let (a, k) = (args.clone(), kwargs.clone());
    let task = scheduler.schedule(at, move || Ok::<_, ()>((Instant::now(), a, k)));

    poll_until(&scheduler, at + SETTLE);

    let (run_at, run_args, run_kwargs) = task.result().expect("task did not get executed");
    assert_eq!(run_args, args, "args do not match");
    assert_eq!(run_kwargs, kwargs, "kwargs do not match");
    assert!(run_at >= at, "ran too early");
    assert!(run_at < at + LATE_TOLERANCE, "ran too late");
}

#[test]
fn future_task_failure_is_reproduced() {
    let scheduler = SyncScheduler::new();
    let (args, kwargs) = sample_args();
    let at = Instant::now() + DELAY;

    let (a, k) = (args.clone(), kwargs.clone());
    let task = scheduler.schedule(at, move || -> Result<(), FailedTaskError> {
        Err(FailedTaskError {
            msg: "I failed".to_string(),
            run_at: Instant::now(),
            args: a,
            kwargs: k,
        })
    });

    poll_until(&scheduler, at + SETTLE);

    match task.result() {
        Err(TaskError::Failed(e)) => {
            assert_eq!(e.msg, "I failed");
            assert_eq!(e.args, args, "args do not match");
            assert_eq!(e.kwargs, kwargs, "kwargs do not match");
            assert!(e.run_at >= at, "ran too early");
            assert!(e.run_at < at + LATE_TOLERANCE, "ran too late");
        }
        Ok(()) => panic!("task did not fail"),
        Err(other) => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn cancelled_future_task_does_not_run() {
    let scheduler = SyncScheduler::new();
    let at = Instant::now() + DELAY;
    let task = scheduler.schedule(at, || Ok::<_, ()>(Instant::now()));

    scheduler.poll();
    task.cancel();
    assert!(task.cancelled(), "not cancelled");

    poll_until(&scheduler, at + SETTLE);

    assert_eq!(task.result(), Err(TaskError::NotExecutedYet));
}

#[test]
fn cancel_all_stops_every_task() {
    let scheduler = SyncScheduler::new();
    let at = Instant::now() + DELAY;

    let tasks: Vec<_> = (0..3u32)
        .map(|i| {
            let due = at + STEP * (10 * i);
            scheduler.schedule(due, move || Ok::<_, ()>(i))
        })
        .collect();

    scheduler.poll();
    scheduler.cancel_all();

    poll_until(&scheduler, at + STEP * 20 + SETTLE);

    for task in &tasks {
        assert_eq!(task.result(), Err(TaskError::NotExecutedYet), "task executed");
    }
}

#[test]
fn result_before_due_is_not_executed() {
    let scheduler = SyncScheduler::new();
    let task = scheduler.schedule(Instant::now() + DELAY, || Ok::<_, ()>(1));
    scheduler.poll();
    assert_eq!(task.result(), Err(TaskError::NotExecutedYet));
}

#[test]
fn host_can_sleep_until_next_due() {
    let scheduler = SyncScheduler::new();
    let task = scheduler.schedule_after(Duration::from_millis(30), || Ok::<_, ()>("woke"));

    while let Some(next) = scheduler.next_due() {
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        }
        scheduler.poll();
    }
    assert_eq!(task.result(), Ok("woke"));
}
