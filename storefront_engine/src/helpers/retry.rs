use std::{future::Future, time::Duration};

use log::*;
use tokio::time::sleep;

use crate::traits::StoreError;

/// Exponential backoff settings for storage operations that fail with a transient error.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound on the delay between retries
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A configuration that tries exactly once.
    pub fn no_retries() -> Self {
        Self { max_attempts: 1, ..Default::default() }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        delay.mul_f64(self.multiplier).min(self.max_delay)
    }
}

/// Runs `operation`, retrying with exponential backoff for as long as it fails with a transient
/// [`StoreError::DatabaseError`]. Any other error is returned immediately, as is the last error once the attempts
/// run out.
pub async fn retry_storage<F, Fut, T>(config: &RetryConfig, name: &str, mut operation: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;
    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    info!("🔁️ {name} succeeded after {attempt} attempts");
                }
                return Ok(result);
            },
            Err(e) if e.is_transient() && attempt < config.max_attempts => {
                warn!("🔁️ {name} failed on attempt {attempt}/{}: {e}. Retrying in {delay:?}", config.max_attempts);
                sleep(delay).await;
                delay = config.next_delay(delay);
            },
            Err(e) => {
                if e.is_transient() {
                    error!("🔁️ {name} failed after {attempt} attempts: {e}");
                }
                return Err(e);
            },
        }
    }
}
