//! Injected clock.
//!
//! Nothing in the pipeline reads wall-clock time directly. The audit filter,
//! the entry logger and the uptime endpoint all take an `Arc<dyn Clock>`, so
//! tests can pin time with [`FixedClock`] or advance it deterministically
//! with [`SteppingClock`].

use std::sync::atomic::{AtomicI32, Ordering};

use chrono::{DateTime, Duration, Utc};

/// Source of the current time. Must be safe to call from many requests at once.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Returns `start`, then `start + step`, then `start + 2 * step`, …
///
/// Each call advances the clock exactly once, which lets a test count how
/// often time was read as well as check the values.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    step: Duration,
    ticks: AtomicI32,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self { start, step, ticks: AtomicI32::new(0) }
    }

    /// How many times [`Clock::now`] has been called.
    pub fn reads(&self) -> i32 {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let n = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + self.step * n
    }
}
