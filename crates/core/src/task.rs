use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Lifecycle state of a scheduled task.
///
/// Transitions are one-way: `Pending -> Cancelled` or `Pending -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Neither executed nor cancelled. Still holds its call.
    Pending,
    /// Cancelled before execution. The call was dropped unrun.
    Cancelled,
    /// Executed, successfully or not. The outcome is stored.
    Completed,
}

/// Handle to a unit of work registered with a [`TaskScheduler`].
///
/// [`TaskScheduler`]: crate::TaskScheduler
pub trait ScheduledTask {
    /// Value returned by a successful call.
    type Output;
    /// Error returned by a failed call.
    type Error;

    /// Cancel the task if it is still pending, dropping its call and
    /// everything the call captured. No-op once cancelled or completed.
    fn cancel(&self);

    /// True once `cancel()` took effect. False for pending or completed tasks.
    fn cancelled(&self) -> bool;

    /// The stored outcome.
    ///
    /// Returns [`TaskError::NotExecutedYet`] while the task is pending
    /// (even if already past due) and after it was cancelled.
    fn result(&self) -> Result<Self::Output, TaskError<Self::Error>>;

    /// Current lifecycle state.
    fn state(&self) -> TaskState;

    /// Whether the task ran to an outcome.
    fn is_done(&self) -> bool {
        self.state() == TaskState::Completed
    }
}
