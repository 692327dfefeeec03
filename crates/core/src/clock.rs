//! Time sources for due-time comparison.
//!
//! A scheduler samples its clock on every peek of the queue, so `now()`
//! should be cheap. Instants only need to be totally ordered; schedulers
//! never do arithmetic on them except through [`Clock::after`].

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// A source of "now" for deciding which tasks are due.
pub trait Clock: Send + Sync {
    type Instant: Ord + Copy + Debug + Send + Sync + 'static;

    /// Current instant. Sampled fresh on every call.
    fn now(&self) -> Self::Instant;

    /// The instant `delay` from now.
    fn after(&self, delay: Duration) -> Self::Instant;
}

/// Monotonic process clock backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    /// Delays past what `Instant` can represent are clamped to a far-future
    /// instant: the delay is halved until it fits.
    fn after(&self, delay: Duration) -> Instant {
        let now = Instant::now();
        let mut delay = delay;
        loop {
            if let Some(at) = now.checked_add(delay) {
                return at;
            }
            delay /= 2;
        }
    }
}

/// Wall clock in UTC. Use this when due times come from calendar timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    type Instant = DateTime<Utc>;

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn after(&self, delay: Duration) -> DateTime<Utc> {
        // Out-of-range delays saturate instead of wrapping.
        match chrono::Duration::from_std(delay) {
            Ok(d) => Utc::now()
                .checked_add_signed(d)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            Err(_) => DateTime::<Utc>::MAX_UTC,
        }
    }
}

/// Manually advanced clock.
///
/// Instants are offsets from the clock's creation. Clones share the same
/// underlying time, so a host (or test) can hold one clone and advance it
/// while the scheduler reads another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| {
                Some(cur.saturating_add(by))
            });
    }

    /// Jump to an absolute offset. Moving backwards is ignored.
    pub fn set(&self, to: Duration) {
        let to = u64::try_from(to.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_max(to, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    type Instant = Duration;

    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    fn after(&self, delay: Duration) -> Duration {
        self.now().saturating_add(delay)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    type Instant = C::Instant;

    fn now(&self) -> C::Instant {
        (**self).now()
    }

    fn after(&self, delay: Duration) -> C::Instant {
        (**self).after(delay)
    }
}
