//! Backend connection settings loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

/// Default backend base URL for local development.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Default per-request timeout for generation submissions.
pub const DEFAULT_SUBMIT_TIMEOUT_MS: u64 = 60_000;

/// Errors raised while reading configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable was set but could not be parsed.
    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection configuration for [`VideoApi`](crate::api::VideoApi).
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:8000`.
    pub backend_url: String,
    /// Sent as `X-API-Key` when set; the backend falls back to its default
    /// user otherwise.
    pub api_key: Option<String>,
    /// Timeout applied to `POST /generate` only.
    pub submit_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            api_key: None,
            submit_timeout: Duration::from_millis(DEFAULT_SUBMIT_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var             | Default                 |
    /// |---------------------|-------------------------|
    /// | `BACKEND_URL`       | `http://localhost:8000` |
    /// | `VIDGEN_API_KEY`    | unset                   |
    /// | `SUBMIT_TIMEOUT_MS` | `60000`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through
    /// `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = lookup("BACKEND_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let api_key = lookup("VIDGEN_API_KEY").filter(|key| !key.trim().is_empty());

        let submit_timeout_ms: u64 =
            parse_or(&lookup, "SUBMIT_TIMEOUT_MS", DEFAULT_SUBMIT_TIMEOUT_MS)?;

        Ok(Self {
            backend_url,
            api_key,
            submit_timeout: Duration::from_millis(submit_timeout_ms),
        })
    }
}

/// Parse `key` through `lookup`, falling back to `default` when unset.
pub fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config =
            ClientConfig::from_lookup(lookup(&[("BACKEND_URL", "https://api.example.com/")]))
                .unwrap();
        assert_eq!(config.backend_url, "https://api.example.com");
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[("VIDGEN_API_KEY", "  ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn invalid_timeout_is_reported() {
        let err = ClientConfig::from_lookup(lookup(&[("SUBMIT_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("SUBMIT_TIMEOUT_MS"));
    }
}
