// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Exponential backoff for requests against the docs repository.
///
/// Only [`Error::Remote`] failures are retried. Anything else, such as a
/// playbook that does not parse, is returned on the first attempt.
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::Error;

/// Backoff schedule for remote requests.
#[derive(Debug, Clone, PartialEq,)]
pub struct RetryConfig
{
    /// Total attempts including the first one (default: 3).
    pub max_attempts:   u32,
    /// Pause before the second attempt (default: 1s).
    pub initial_delay:  Duration,
    /// Growth of the pause between consecutive attempts (default: 2.0).
    pub backoff_factor: f64,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            max_attempts:   3,
            initial_delay:  Duration::from_millis(1000,),
            backoff_factor: 2.0,
        }
    }
}

impl RetryConfig
{
    /// A schedule that performs exactly one attempt.
    pub fn no_retry() -> Self
    {
        Self {
            max_attempts:   1,
            initial_delay:  Duration::ZERO,
            backoff_factor: 1.0,
        }
    }

    /// Pause taken after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32,) -> Duration
    {
        let exponent = i32::try_from(attempt.saturating_sub(1,),).unwrap_or(i32::MAX,);
        self.initial_delay.mul_f64(self.backoff_factor.max(1.0,).powi(exponent,),)
    }
}

/// Runs `request` until it succeeds, fails with a non-retryable error, or
/// the attempts in `config` are exhausted.
///
/// # Errors
///
/// Returns the first non-retryable error, or the last remote error once every
/// attempt has failed.
///
/// # Example
///
/// ```no_run
/// use playbook_loader::{Error, RetryConfig, retry_with_backoff};
///
/// # async fn example() -> Result<(), Error> {
/// let contents = retry_with_backoff(&RetryConfig::default(), "fetch antora-playbook.yml", || async {
///     Ok::<_, Error,>("site: {}".to_owned(),)
/// },)
/// .await?;
/// assert_eq!(contents, "site: {}");
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<F, Fut, T,>(
    config: &RetryConfig,
    operation: &str,
    mut request: F,
) -> Result<T, Error,>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, Error,>,>,
{
    let max_attempts = config.max_attempts.max(1,);
    let mut attempt = 1;

    loop {
        let error = match request().await {
            Ok(value,) => {
                if attempt > 1 {
                    debug!("{operation} succeeded on attempt {attempt}");
                }
                return Ok(value,);
            }
            Err(error,) => error,
        };

        if !error.is_retryable() {
            return Err(error,);
        }
        if attempt >= max_attempts {
            warn!("{operation} failed after {max_attempts} attempt(s): {error}");
            return Err(error,);
        }

        let delay = config.delay_after(attempt,);
        warn!("{operation} failed on attempt {attempt}/{max_attempts}: {error}. Retrying in {}ms...", delay.as_millis());
        sleep(delay,).await;
        attempt += 1;
    }
}
