//! Network utilities for HTTP requests, rate limiting, retries, and JSON helpers.
//!
//! This module provides the networking infrastructure underneath the API client:
//!
//! - **Transport**: the [`Transport`] seam every request goes through, so the
//!   pipeline can run against reqwest or an in-memory fake
//! - **HTTP Client**: [`HttpClient`], the reqwest-backed transport with a
//!   per-request timeout and connection pooling
//! - **Rate Limiting**: per-host minimum delay between requests
//! - **Retry Logic**: [`RetryPolicy`], bounded retries with exponential backoff
//! - **JSON helpers**: path extraction in [`json`]
//!
//! # Examples
//!
//! ```rust
//! use nasa_media::net::{HttpClient, Transport};
//!
//! # async fn example() -> nasa_media::Result<()> {
//! let client = HttpClient::new().with_rate_limit(500);
//! let response = client.get("https://images-api.nasa.gov/search?q=mars").await?;
//! println!("HTTP {}", response.status);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use reqwest::Client;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};

pub mod json;

const USER_AGENT: &str = concat!("nasa-media/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client used when no custom timeout or user agent is configured.
///
/// This client is configured with:
/// - 30-second timeout
/// - Connection pooling (10 idle connections per host)
/// - Compression support (gzip, brotli)
static CLIENT: Lazy<Client> = Lazy::new(|| build_client(Duration::from_secs(30), USER_AGENT));

fn build_client(timeout: Duration, user_agent: &str) -> Client {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .pool_max_idle_per_host(10)
        .gzip(true)
        .brotli(true)
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {}", e);
            Client::new()
        })
}

/// A raw HTTP response: status, body and the `Retry-After` header if any.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Bytes,
    pub retry_after: Option<u64>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
            retry_after: None,
        }
    }
}

/// A single-attempt GET transport.
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status, and `Err` only when no response arrived at all. Status
/// classification and retries happen above this trait, in
/// [`MediaApi`](crate::client::MediaApi).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &str) -> Result<Response> {
        (**self).get(url).await
    }
}

/// Per-host rate limiter.
///
/// Tracks the next free request slot for each host. Every caller reserves
/// its own slot under the lock, so concurrent requests to one host are
/// spaced out instead of firing together.
#[derive(Debug)]
pub struct RateLimiter {
    next_slot: Mutex<HashMap<String, Instant>>,
    default_delay: Duration,
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            next_slot: Mutex::new(HashMap::new()),
            default_delay: self.default_delay,
        }
    }
}

impl RateLimiter {
    /// Creates a new rate limiter with the specified delay in milliseconds.
    ///
    /// ```rust
    /// use nasa_media::net::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(500);
    /// ```
    pub fn new(delay_ms: u64) -> Self {
        Self {
            next_slot: Mutex::new(HashMap::new()),
            default_delay: Duration::from_millis(delay_ms),
        }
    }

    /// Waits until a request to `key` is allowed.
    pub async fn wait(&self, key: &str) {
        let slot = {
            let mut slots = self.next_slot.lock();
            let now = Instant::now();
            let slot = slots.get(key).map_or(now, |&next| next.max(now));
            slots.insert(key.to_string(), slot + self.default_delay);
            slot
        };

        if slot > Instant::now() {
            tokio::time::sleep_until(slot).await;
        }
    }
}

/// Bounded retry with exponential backoff.
///
/// The first retry waits `base_delay`, each following one twice as long. A
/// `Retry-After` value from a rate-limited response overrides the computed
/// delay. Only [transient](Error::is_transient) failures are retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    fn delay_for(&self, attempt: u32, error: &Error) -> Duration {
        if let Error::RateLimit {
            retry_after: Some(secs),
        } = error
        {
            return Duration::from_secs(*secs);
        }
        self.base_delay * 2_u32.saturating_pow(attempt.saturating_sub(1))
    }

    /// Runs `op` until it succeeds, fails permanently, or retries run out.
    ///
    /// ```rust
    /// use nasa_media::net::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// # async fn example() -> nasa_media::Result<()> {
    /// let policy = RetryPolicy::new(2, Duration::from_millis(10));
    /// let value = policy.run("example", || async { Ok::<_, nasa_media::Error>(42) }).await?;
    /// assert_eq!(value, 42);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempts = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempts < self.max_retries => {
                    attempts += 1;
                    let delay = self.delay_for(attempts, &e);
                    warn!(
                        "{} failed ({}), retry {}/{} in {:?}",
                        label, e, attempts, self.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// reqwest-backed [`Transport`] with per-host rate limiting.
///
/// ```rust
/// use nasa_media::net::HttpClient;
///
/// let client = HttpClient::new().with_rate_limit(1000);
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter,
}

impl HttpClient {
    /// Creates a client on the shared connection pool with a 200ms rate limit.
    pub fn new() -> Self {
        Self {
            client: CLIENT.clone(),
            rate_limiter: RateLimiter::new(200),
        }
    }

    /// Creates a client with the timeout, user agent and rate limit from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: build_client(
                Duration::from_secs(config.timeout_secs),
                &config.user_agent,
            ),
            rate_limiter: RateLimiter::new(config.rate_limit_ms),
        }
    }

    /// Sets the minimum delay between requests to the same host.
    pub fn with_rate_limit(mut self, delay_ms: u64) -> Self {
        self.rate_limiter = RateLimiter::new(delay_ms);
        self
    }

}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &str) -> Result<Response> {
        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        self.rate_limiter.wait(&host).await;

        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.bytes().await?;

        Ok(Response {
            status,
            body,
            retry_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_stop_after_max() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(2, Duration::from_millis(1));

        let result: Result<()> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::ServerError { status: 500 }) }
            })
            .await;

        assert!(matches!(result, Err(Error::ServerError { status: 500 })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::from_millis(1));

        let result: Result<()> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::not_found("x")) }
            })
            .await;

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let result = policy
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(Error::from_status(502, "x"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 1);
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let err = Error::ServerError { status: 500 };
        assert_eq!(policy.delay_for(1, &err), Duration::from_millis(100));
        assert_eq!(policy.delay_for(3, &err), Duration::from_millis(400));
        assert_eq!(
            policy.delay_for(1, &Error::rate_limit(Some(2))),
            Duration::from_secs(2)
        );
    }

    #[tokio::test]
    async fn concurrent_waits_are_spaced() {
        let limiter = RateLimiter::new(50);
        let start = Instant::now();

        futures::future::join_all((0..4).map(|_| limiter.wait("images-assets.nasa.gov"))).await;

        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn hosts_are_limited_independently() {
        let limiter = RateLimiter::new(500);
        let start = Instant::now();

        limiter.wait("images-api.nasa.gov").await;
        limiter.wait("images-assets.nasa.gov").await;

        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
