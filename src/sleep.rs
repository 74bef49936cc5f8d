//! Pause primitives used between retry attempts.
//!
//! The blocking wrapper parks the calling thread through [`Sleep`]; the async
//! wrapper awaits an [`AsyncSleep`] so only the calling task is suspended.
//! Both are traits so tests can observe delays without waiting for them.

use async_trait::async_trait;
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
pub trait Sleep: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread with [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AsyncSleep: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Suspends the current task with [`tokio::time::sleep`].
///
/// Dropping the future mid-sleep drops the timer with it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleep;

#[async_trait]
impl AsyncSleep for TokioSleep {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
