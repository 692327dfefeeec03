//! Contracts for deferred, poll-driven task execution.
//!
//! A [`TaskScheduler`] accepts work to run at or after an instant and hands
//! back a [`ScheduledTask`] handle. Nothing here spawns threads or sleeps:
//! the host decides when to call `poll()`.

pub mod clock;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod task;

pub use clock::{Clock, ManualClock, MonotonicClock, WallClock};
pub use config::{load_dotenv, SchedulerConfig};
pub use error::TaskError;
pub use scheduler::TaskScheduler;
pub use task::{ScheduledTask, TaskState};
