//! Timing knobs for the stores, loaded from environment variables.

use std::time::Duration;

use vidgen_client::config::{parse_or, ConfigError};

use crate::poller::PollConfig;
use crate::retry::RetryPolicy;

/// Default settle delay between a task concluding and the history refresh.
pub const DEFAULT_REFRESH_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub retry: RetryPolicy,
    pub poll: PollConfig,
    /// Wait after a task concludes before re-fetching history, giving the
    /// backend time to persist the record.
    pub refresh_delay: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            poll: PollConfig::default(),
            refresh_delay: Duration::from_millis(DEFAULT_REFRESH_DELAY_MS),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default |
    /// |----------------------------|---------|
    /// | `SUBMIT_MAX_ATTEMPTS`      | `3`     |
    /// | `SUBMIT_RETRY_BASE_MS`     | `2000`  |
    /// | `POLL_MAX_ATTEMPTS`        | `60`    |
    /// | `POLL_INTERVAL_MS`         | `5000`  |
    /// | `HISTORY_REFRESH_DELAY_MS` | `1000`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let retry = RetryPolicy {
            max_attempts: parse_or(&lookup, "SUBMIT_MAX_ATTEMPTS", defaults.retry.max_attempts)?,
            base_delay: millis(
                &lookup,
                "SUBMIT_RETRY_BASE_MS",
                defaults.retry.base_delay,
            )?,
        };

        let poll = PollConfig {
            max_attempts: parse_or(&lookup, "POLL_MAX_ATTEMPTS", defaults.poll.max_attempts)?,
            interval: millis(&lookup, "POLL_INTERVAL_MS", defaults.poll.interval)?,
        };

        let refresh_delay = millis(&lookup, "HISTORY_REFRESH_DELAY_MS", defaults.refresh_delay)?;

        Ok(Self {
            retry,
            poll,
            refresh_delay,
        })
    }
}

fn millis<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let ms: u64 = parse_or(lookup, key, default.as_millis() as u64)?;
    Ok(Duration::from_millis(ms))
}
