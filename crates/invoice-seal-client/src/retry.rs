//! Exponential backoff for idempotent authority calls.
//!
//! A call is repeated only while it fails with a retryable [`ClientError`];
//! rejections and unreadable replies return at once.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{ClientError, Result};

/// First delay; each further attempt doubles it.
const BASE_DELAY: Duration = Duration::from_millis(200);

/// Doubling stops here (200ms << 6 = 12.8s).
const MAX_SHIFT: u32 = 6;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Backoff {
    retries: u32,
    base: Duration,
}

impl Backoff {
    /// Allow `retries` repeats after the first attempt.
    pub(crate) fn new(retries: u32) -> Self {
        Self {
            retries,
            base: BASE_DELAY,
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(1 << attempt.min(MAX_SHIFT))
    }

    /// Run `call` until it succeeds, fails for good, or retries run out.
    pub(crate) async fn run<T, F, Fut>(&self, endpoint: &str, call: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    let delay = self.delay(attempt);
                    attempt += 1;
                    warn!(
                        endpoint,
                        attempt,
                        retries = self.retries,
                        ?delay,
                        error = %e,
                        "authority call failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                outcome => return outcome,
            }
        }
    }
}
