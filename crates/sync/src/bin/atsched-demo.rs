//! atsched-demo — a minimal host loop around [`SyncScheduler`].
//!
//! Schedules a batch of tasks spread over a time window, cancels and fails
//! some of them on purpose, then polls on a fixed cadence until the queue is
//! empty and prints every task's result plus the scheduler metrics.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use atsched_sync::{
    MonotonicClock, ScheduledTask, SchedulerConfig, SyncScheduler, TaskError, TaskHandle,
    TaskScheduler,
};

// ── CLI ─────────────────────────────────────────────────────────────

/// Run a batch of deferred tasks through a poll-driven scheduler.
#[derive(Parser, Debug)]
#[command(name = "atsched-demo", version, about)]
struct Cli {
    /// Number of tasks to schedule.
    #[arg(long, default_value_t = 10)]
    tasks: u32,

    /// Window (ms) over which due times are spread.
    #[arg(long, default_value_t = 2000)]
    spread_ms: u64,

    /// Make every Kth task fail (0 = never).
    #[arg(long, default_value_t = 4)]
    fail_every: u32,

    /// Cancel every Kth task before it runs (0 = never).
    #[arg(long, default_value_t = 5)]
    cancel_every: u32,

    /// Polling cadence in ms. Overrides the configured value.
    #[arg(long, env = "ATSCHED_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
struct Report {
    index: u32,
    label: String,
    status: &'static str,
    detail: String,
}

type DemoTask = TaskHandle<String, String, Instant>;

fn describe(index: u32, task: &DemoTask) -> Report {
    let (status, detail) = match task.result() {
        Ok(value) => ("completed", value),
        Err(TaskError::Failed(e)) => ("failed", e),
        Err(TaskError::Panicked(msg)) => ("panicked", msg),
        Err(TaskError::NotExecutedYet) if task.cancelled() => ("cancelled", String::new()),
        Err(TaskError::NotExecutedYet) => ("pending", String::new()),
    };
    Report {
        index,
        label: task.label().unwrap_or_default().to_string(),
        status,
        detail,
    }
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = SchedulerConfig::from_env();
    if let Some(ms) = cli.poll_interval_ms {
        config.poll_interval_ms = ms;
    }
    config.log_summary();

    let poll_interval = config.poll_interval();
    let scheduler = SyncScheduler::with_config(config, MonotonicClock);
    let start = Instant::now();
    let step = cli.spread_ms / u64::from(cli.tasks.max(1));

    let tasks: Vec<DemoTask> = (0..cli.tasks)
        .map(|i| {
            let at = start + Duration::from_millis(step * u64::from(i));
            let fails = cli.fail_every > 0 && (i + 1) % cli.fail_every == 0;
            scheduler.schedule_named(at, format!("task-{}", i), move || {
                let elapsed = start.elapsed();
                if fails {
                    Err(format!("task {} failed on purpose after {:?}", i, elapsed))
                } else {
                    Ok(format!("task {} ran after {:?}", i, elapsed))
                }
            })
        })
        .collect();

    if cli.cancel_every > 0 {
        for (i, task) in tasks.iter().enumerate() {
            if (i as u32 + 1) % cli.cancel_every == 0 {
                task.cancel();
            }
        }
    }

    info!(tasks = tasks.len(), ?poll_interval, "polling until queue drains");
    while !scheduler.is_empty() {
        thread::sleep(poll_interval);
        scheduler.poll();
    }

    let reports: Vec<Report> = tasks
        .iter()
        .zip(0u32..)
        .map(|(task, i)| describe(i, task))
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&reports).context("serializing task reports")?
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&scheduler.metrics()).context("serializing metrics")?
    );

    info!(elapsed = ?start.elapsed(), "done");
    Ok(())
}
