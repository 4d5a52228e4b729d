//! Runtime configuration.
//!
//! Every field has a default, so `Config::default()` talks to the public NASA
//! endpoint with sensible limits. [`Config::from_env`] overrides fields from
//! `NASA_MEDIA_*` environment variables (a `.env` file is read first if present).
//!
//! | Variable                       | Field               | Default                              |
//! |--------------------------------|---------------------|--------------------------------------|
//! | `NASA_MEDIA_BASE_URL`          | `base_url`          | `https://images-api.nasa.gov/search` |
//! | `NASA_MEDIA_TIMEOUT_SECS`      | `timeout_secs`      | `30`                                 |
//! | `NASA_MEDIA_MAX_RETRIES`       | `max_retries`       | `3`                                  |
//! | `NASA_MEDIA_RETRY_DELAY_MS`    | `retry_delay_ms`    | `500`                                |
//! | `NASA_MEDIA_RATE_LIMIT_MS`     | `rate_limit_ms`     | `200`                                |
//! | `NASA_MEDIA_USER_AGENT`        | `user_agent`        | `nasa-media/<version>`               |
//! | `NASA_MEDIA_DESCRIPTION_LIMIT` | `description_limit` | `470`                                |
//! | `NASA_MEDIA_FALLBACK_PREVIEW`  | `fallback_preview`  | `img/placeholder.png`                |
//! | `NASA_MEDIA_VALIDATION`        | `validation`        | `any-field`                          |

use serde::Deserialize;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::net::RetryPolicy;
use crate::query::ValidationPolicy;

pub const DEFAULT_BASE_URL: &str = "https://images-api.nasa.gov/search";

/// Characters of a description shown before it is cut off.
pub const DEFAULT_DESCRIPTION_LIMIT: usize = 470;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub rate_limit_ms: u64,
    pub user_agent: String,
    pub description_limit: usize,
    /// Image shown for items that have no preview link.
    pub fallback_preview: String,
    pub validation: ValidationPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 500,
            rate_limit_ms: 200,
            user_agent: concat!("nasa-media/", env!("CARGO_PKG_VERSION")).to_string(),
            description_limit: DEFAULT_DESCRIPTION_LIMIT,
            fallback_preview: "img/placeholder.png".to_string(),
            validation: ValidationPolicy::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `NASA_MEDIA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config: Config = envy::prefixed("NASA_MEDIA_")
            .from_env()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would make the client unusable.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid base_url {}: {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base_url must be http(s), got {}",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.description_limit, 470);
        assert_eq!(config.validation, ValidationPolicy::AnyField);
    }

    #[test]
    fn rejects_non_http_base() {
        let config = Config {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn deserializes_partial() {
        let config: Config =
            serde_json::from_str(r#"{"max_retries": 0, "validation": "require-text"}"#).unwrap();
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.validation, ValidationPolicy::RequireText);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
