//! Synchronous, poll-driven task scheduler.
//!
//! [`SyncScheduler`] keeps tasks in a min-heap keyed on due time. Nothing
//! runs until the host calls `poll()` (or [`SyncScheduler::run_due`]), which
//! executes every due task on the calling thread and returns.
//!
//! ```no_run
//! use std::time::Duration;
//! use atsched_sync::{ScheduledTask, SyncScheduler, TaskScheduler};
//!
//! let scheduler = SyncScheduler::new();
//! let task = scheduler.schedule_after(Duration::from_millis(50), || Ok::<_, String>(2 + 2));
//!
//! while !task.is_done() {
//!     std::thread::sleep(scheduler.config().poll_interval());
//!     scheduler.poll();
//! }
//! assert_eq!(task.result(), Ok(4));
//! ```

pub mod metrics;
mod queue;
pub mod runner;
pub mod task;
pub mod types;

pub use atsched_core::{
    Clock, ManualClock, MonotonicClock, SchedulerConfig, ScheduledTask, TaskError, TaskScheduler,
    TaskState, WallClock,
};
pub use metrics::SchedulerMetrics;
pub use runner::SyncScheduler;
pub use task::{Call, TaskHandle};
pub use types::{PollReport, RunStatus};
