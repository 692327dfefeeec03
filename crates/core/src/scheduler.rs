use crate::task::ScheduledTask;

/// Contract for running work at or after a given instant.
///
/// Implementations never run work from inside [`schedule`]; execution only
/// happens during [`poll`] (or, for implementations that drive themselves,
/// through whatever mechanism they use instead).
///
/// [`schedule`]: TaskScheduler::schedule
/// [`poll`]: TaskScheduler::poll
pub trait TaskScheduler {
    /// Due-time type, usually the instant of the scheduler's clock.
    type Instant;

    /// Handle returned for a task producing `Result<T, E>`.
    type Task<T, E>: ScheduledTask<Output = T, Error = E>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + 'static;

    /// Execute every task that is currently due, then return.
    ///
    /// Never waits for future tasks. Implementations that guarantee
    /// execution by other means may make this a no-op.
    fn poll(&self);

    /// Register `call` to run no earlier than `at`.
    fn schedule<F, T, E>(&self, at: Self::Instant, call: F) -> Self::Task<T, E>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Clone + Send + 'static,
        E: Clone + Send + 'static;

    /// Cancel every task not yet executed, including ones already past due.
    fn cancel_all(&self);
}
