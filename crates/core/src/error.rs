use thiserror::Error;

/// Error returned when reading a task's result.
///
/// `NotExecutedYet` is the scheduler's own condition; the other two variants
/// carry a failure captured from the task's call and are reproduced on every
/// read. A cancelled task also reports `NotExecutedYet`, so callers that need
/// to tell the two apart should check `cancelled()` first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError<E> {
    #[error("task has not been executed yet")]
    NotExecutedYet,

    #[error("task failed: {0}")]
    Failed(E),

    #[error("task panicked: {0}")]
    Panicked(String),
}

impl<E> TaskError<E> {
    pub fn is_not_executed(&self) -> bool {
        matches!(self, TaskError::NotExecutedYet)
    }

    /// The error returned by the call, if the task failed that way.
    pub fn failure(&self) -> Option<&E> {
        match self {
            TaskError::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Map the captured call error, keeping the other variants as they are.
    pub fn map_failure<F, U>(self, f: F) -> TaskError<U>
    where
        F: FnOnce(E) -> U,
    {
        match self {
            TaskError::NotExecutedYet => TaskError::NotExecutedYet,
            TaskError::Failed(e) => TaskError::Failed(f(e)),
            TaskError::Panicked(msg) => TaskError::Panicked(msg),
        }
    }
}
