//! Polling with exponential backoff.
//!
//! Some host capabilities answer "granted" before the data they granted is
//! readable (the contact request is the main one). [`poll_until`] re-reads
//! such data a bounded number of times with a growing pause in between and
//! resolves to a single `Option`.

use std::future::Future;
use std::time::Duration;

/// Backoff configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Number of attempts after the first one
    pub max_retries: u32,
    /// Delay before the first attempt
    pub initial_delay: Duration,
    /// Maximum delay between attempts
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Creates a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of attempts after the first one.
    #[must_use]
    pub fn max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Sets the initial delay.
    #[must_use]
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    #[must_use]
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    #[must_use]
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculates delay for a given attempt number (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_secs_f64(base_delay.min(self.max_delay.as_secs_f64()))
    }

    /// Config used after the host reports a granted contact:
    /// two re-reads, 500 ms then 1000 ms.
    pub fn contact_poll() -> Self {
        use crate::core::config::contact;

        Self::new()
            .max_retries(contact::POLL_ATTEMPTS.saturating_sub(1))
            .initial_delay(contact::poll_initial_delay())
    }
}

/// Outcome of [`poll_until`].
#[derive(Debug)]
pub struct PollResult<T> {
    /// The first value an attempt produced, if any
    pub value: Option<T>,
    /// Number of attempts made
    pub attempts: u32,
}

/// Sleeps, tries, and repeats until an attempt yields `Some` or the
/// configured number of attempts is used up.
///
/// Every attempt, including the first, is preceded by its backoff delay.
pub async fn poll_until<F, Fut, T>(config: &RetryConfig, mut try_once: F) -> PollResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let total = config.max_retries + 1;

    for attempt in 0..total {
        tokio::time::sleep(config.delay_for_attempt(attempt)).await;

        if let Some(value) = try_once().await {
            return PollResult {
                value: Some(value),
                attempts: attempt + 1,
            };
        }

        log::debug!("Probe {}/{} returned nothing", attempt + 1, total);
    }

    PollResult {
        value: None,
        attempts: total,
    }
}
