use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use atsched_core::{ScheduledTask, TaskError, TaskState};
use uuid::Uuid;

use crate::types::RunStatus;

/// The deferred call. Arguments are whatever the closure captured.
pub type Call<T, E> = Box<dyn FnOnce() -> Result<T, E> + Send>;

/// Outcome of an executed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome<T, E> {
    Completed(T),
    Failed(E),
    Panicked(String),
}

impl<T, E> Outcome<T, E> {
    fn status(&self) -> RunStatus {
        match self {
            Outcome::Completed(_) => RunStatus::Completed,
            Outcome::Failed(_) => RunStatus::Failed,
            Outcome::Panicked(_) => RunStatus::Panicked,
        }
    }
}

/// Holds the call while pending, nothing once cancelled, the outcome once
/// executed. `Running` marks a call that was taken out for execution.
enum Slot<T, E> {
    Pending(Call<T, E>),
    Running,
    Cancelled,
    Done(Outcome<T, E>),
}

/// Lock a mutex, recovering the guard if a previous holder panicked.
///
/// No user code ever runs while one of our locks is held, so the data behind
/// a poisoned lock is still consistent.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A task executed synchronously by [`SyncScheduler`](crate::SyncScheduler).
pub(crate) struct SyncTask<T, E, I> {
    id: Uuid,
    label: Option<String>,
    due: I,
    slot: Mutex<Slot<T, E>>,
}

impl<T, E, I> SyncTask<T, E, I> {
    pub(crate) fn new(due: I, label: Option<String>, call: Call<T, E>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label,
            due,
            slot: Mutex::new(Slot::Pending(call)),
        }
    }

    fn state(&self) -> TaskState {
        match &*lock(&self.slot) {
            Slot::Pending(_) | Slot::Running => TaskState::Pending,
            Slot::Cancelled => TaskState::Cancelled,
            Slot::Done(_) => TaskState::Completed,
        }
    }

    /// Returns true if this call moved the task from pending to cancelled.
    fn cancel(&self) -> bool {
        let released = {
            let mut slot = lock(&self.slot);
            if !matches!(&*slot, Slot::Pending(_)) {
                return false;
            }
            std::mem::replace(&mut *slot, Slot::Cancelled)
        };
        // Captured values may run arbitrary Drop code; keep it outside the lock.
        drop(released);
        true
    }

    /// Run the call and store its outcome.
    ///
    /// The call is taken out of the slot before it runs, so the lock is not
    /// held during execution and a second `run` finds nothing to do.
    fn run(&self) -> RunStatus {
        let call = {
            let mut slot = lock(&self.slot);
            match std::mem::replace(&mut *slot, Slot::Running) {
                Slot::Pending(call) => call,
                other => {
                    *slot = other;
                    return RunStatus::Skipped;
                }
            }
        };

        let outcome = match catch_unwind(AssertUnwindSafe(call)) {
            Ok(Ok(value)) => Outcome::Completed(value),
            Ok(Err(err)) => Outcome::Failed(err),
            Err(payload) => Outcome::Panicked(panic_message(&*payload)),
        };
        let status = outcome.status();
        *lock(&self.slot) = Slot::Done(outcome);
        status
    }
}

/// Type-erased view of a queued task, so one heap can hold tasks of any
/// output and error type.
pub(crate) trait Runnable: Send + Sync {
    fn id(&self) -> Uuid;
    fn label(&self) -> Option<&str>;
    fn is_cancelled(&self) -> bool;
    fn cancel(&self) -> bool;
    fn run(&self) -> RunStatus;
}

impl<T, E, I> Runnable for SyncTask<T, E, I>
where
    T: Send + 'static,
    E: Send + 'static,
    I: Send + Sync + 'static,
{
    fn id(&self) -> Uuid {
        self.id
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn is_cancelled(&self) -> bool {
        self.state() == TaskState::Cancelled
    }

    fn cancel(&self) -> bool {
        SyncTask::cancel(self)
    }

    fn run(&self) -> RunStatus {
        SyncTask::run(self)
    }
}

/// Caller's handle to a scheduled task. Cloning is cheap and every clone
/// refers to the same task.
pub struct TaskHandle<T, E, I> {
    inner: Arc<SyncTask<T, E, I>>,
}

impl<T, E, I> TaskHandle<T, E, I> {
    pub(crate) fn new(inner: Arc<SyncTask<T, E, I>>) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn label(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }
}

impl<T, E, I: Copy> TaskHandle<T, E, I> {
    /// Earliest instant at which the task may run.
    pub fn due_time(&self) -> I {
        self.inner.due
    }
}

impl<T, E, I> Clone for TaskHandle<T, E, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E, I: fmt::Debug> fmt::Debug for TaskHandle<T, E, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("due", &self.inner.due)
            .field("state", &self.inner.state())
            .finish()
    }
}

impl<T, E, I> ScheduledTask for TaskHandle<T, E, I>
where
    T: Clone,
    E: Clone,
{
    type Output = T;
    type Error = E;

    fn cancel(&self) {
        self.inner.cancel();
    }

    fn cancelled(&self) -> bool {
        self.inner.state() == TaskState::Cancelled
    }

    fn result(&self) -> Result<T, TaskError<E>> {
        match &*lock(&self.inner.slot) {
            Slot::Done(Outcome::Completed(value)) => Ok(value.clone()),
            Slot::Done(Outcome::Failed(err)) => Err(TaskError::Failed(err.clone())),
            Slot::Done(Outcome::Panicked(msg)) => Err(TaskError::Panicked(msg.clone())),
            Slot::Pending(_) | Slot::Running | Slot::Cancelled => Err(TaskError::NotExecutedYet),
        }
    }

    fn state(&self) -> TaskState {
        self.inner.state()
    }
}
