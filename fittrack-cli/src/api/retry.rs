use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;

use super::error::find_api_error;
use crate::config::RetrySettings;

/// Retry configuration with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 5000,
            backoff_factor: 2.0,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries.max(1),
            initial_delay_ms: settings.delay_ms,
            max_delay_ms: settings.max_delay_ms,
            backoff_factor: settings.backoff_factor,
        }
    }
}

impl RetryConfig {
    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_retries: 1,
            ..Self::default()
        }
    }

    /// Execute a function with retries and exponential backoff.
    ///
    /// Errors carrying a non-transient `ApiError` (4xx other than 429)
    /// are returned immediately. Errors without an `ApiError` are retried.
    pub async fn execute<F, Fut, T>(&self, mut func: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        let mut delay_ms = self.initial_delay_ms;

        loop {
            match func().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;

                    let retryable = find_api_error(&e).map_or(true, |api| api.is_retryable());
                    if !retryable {
                        return Err(e);
                    }

                    if attempt >= self.max_retries {
                        tracing::info!("Max retries ({}) exceeded", self.max_retries);
                        return Err(e);
                    }

                    tracing::debug!(
                        "Attempt {} failed, retrying in {}ms: {}",
                        attempt,
                        delay_ms,
                        e
                    );

                    sleep(Duration::from_millis(delay_ms)).await;

                    // Exponential backoff with cap
                    delay_ms = ((delay_ms as f64 * self.backoff_factor) as u64).min(self.max_delay_ms);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_factor: 2.0,
        }
    }

    /// Run `outcome(attempt)` under `config`; returns the result and the
    /// number of attempts made
    async fn run<F>(config: RetryConfig, outcome: F) -> (Result<u32>, u32)
    where
        F: Fn(u32) -> Result<u32>,
    {
        let attempts = AtomicU32::new(0);
        let result = config
            .execute(|| {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                let out = outcome(attempt);
                async move { out }
            })
            .await;
        (result, attempts.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let (result, attempts) = run(fast(3), |_| Ok(7)).await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_network_failures_are_retried() {
        let (result, attempts) = run(fast(3), |n| {
            if n < 3 {
                Err(ApiError::Network("connection reset".into()).into())
            } else {
                Ok(n)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let (result, attempts) = run(fast(2), |_| {
            Err(ApiError::Server {
                status: 502,
                message: "bad gateway".into(),
            }
            .into())
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts, 2);
    }

    #[tokio::test]
    async fn test_client_errors_fail_fast() {
        let (result, attempts) =
            run(fast(3), |_| Err(ApiError::NotFound("goal".into()).into())).await;
        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_none_makes_a_single_attempt() {
        let (_, attempts) = run(RetryConfig::none(), |_| Err(anyhow::anyhow!("offline"))).await;
        assert_eq!(attempts, 1);
    }

    #[test]
    fn test_settings_never_disable_the_first_attempt() {
        let settings = RetrySettings {
            max_retries: 0,
            ..Default::default()
        };
        assert_eq!(RetryConfig::from(&settings).max_retries, 1);
    }
}
