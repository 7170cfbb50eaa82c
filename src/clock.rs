//! Injected time sources
//!
//! All scheduling logic takes "now" as an argument or reads it from a [`Clock`],
//! and every backoff sleeps through a [`Delay`], so that tests can run the
//! reconciliation sequences against fake timers.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};

/// A source of the current local time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The real wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// An async sleep primitive
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

impl<C: Clock> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

#[async_trait]
impl<D: Delay> Delay for std::sync::Arc<D> {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}

/// A clock pinned to a fixed instant, for tests
#[cfg(any(test, feature = "mock_host"))]
pub struct FixedClock(pub std::sync::Mutex<DateTime<Local>>);

#[cfg(any(test, feature = "mock_host"))]
impl FixedClock {
    pub fn at(instant: DateTime<Local>) -> Self {
        Self(std::sync::Mutex::new(instant))
    }

    pub fn advance_to(&self, instant: DateTime<Local>) {
        *self.0.lock().unwrap() = instant;
    }
}

#[cfg(any(test, feature = "mock_host"))]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.0.lock().unwrap()
    }
}

/// Records requested sleeps and returns immediately, for tests
#[cfg(any(test, feature = "mock_host"))]
#[derive(Default)]
pub struct RecordingDelay {
    slept: std::sync::Mutex<Vec<Duration>>,
}

#[cfg(any(test, feature = "mock_host"))]
#[async_trait]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

#[cfg(any(test, feature = "mock_host"))]
impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sleeps requested so far, in order
    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}
