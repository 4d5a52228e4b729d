//! API client for the NASA Image and Video Library.
//!
//! [`MediaApi`] is the only place that sees HTTP status codes. Everything it
//! returns is either parsed data or a typed [`Error`], so the layers above it
//! (renderer, resolver, pagination, app state) never handle transport failures
//! directly.
//!
//! # Status classification
//!
//! | Status | Outcome                                             |
//! |--------|-----------------------------------------------------|
//! | 200    | body parsed as JSON                                 |
//! | 404    | [`Error::NotFound`]                                 |
//! | 403    | [`Error::Forbidden`] (ignorable, see [`Error::is_ignorable`]) |
//! | 500    | retried, then [`Error::ServerError`]                |
//! | 502-504 | retried, then [`Error::Unexpected`]                |
//! | 429    | retried, then [`Error::RateLimit`]                  |
//! | other  | [`Error::Unexpected`]                               |
//!
//! # Examples
//!
//! ```rust,no_run
//! use nasa_media::client::MediaApi;
//! use nasa_media::types::SearchQuery;
//!
//! # async fn example() -> nasa_media::Result<()> {
//! let api = MediaApi::new();
//! let page = api.search(&SearchQuery::from("mars")).await?;
//! println!("{} items, next page: {:?}", page.items.len(), page.next);
//! # Ok(())
//! # }
//! ```

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::net::{HttpClient, RetryPolicy, Transport, json};
use crate::search::SearchBuilder;
use crate::types::{ResultPage, SearchQuery};

/// Client for the search endpoint and per-item asset manifests.
#[derive(Clone)]
pub struct MediaApi {
    transport: Arc<dyn Transport>,
    base_url: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for MediaApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaApi")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl MediaApi {
    /// Creates a client for the public endpoint with default settings.
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Creates a reqwest-backed client from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::with_transport(HttpClient::from_config(config), config)
    }

    /// Creates a client over a custom [`Transport`].
    pub fn with_transport(transport: impl Transport + 'static, config: &Config) -> Self {
        Self {
            transport: Arc::new(transport),
            base_url: config.base_url.clone(),
            retry: config.retry_policy(),
        }
    }

    /// Replaces the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Starts a fluent search. See [`SearchBuilder`].
    pub fn query(&self, text: impl Into<String>) -> SearchBuilder<'_> {
        SearchBuilder::new(self, text)
    }

    /// GETs `url` with `params` appended and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// See the status table in the [module docs](self). Transport failures
    /// surface as [`Error::Network`] once retries are exhausted, and an
    /// undecodable 200 body as [`Error::Json`].
    pub async fn fetch_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        let request_url = if params.is_empty() {
            url.to_string()
        } else {
            url::Url::parse_with_params(url, params)
                .map_err(|e| Error::parse(format!("Invalid URL {}: {}", url, e)))?
                .to_string()
        };

        let url = request_url.as_str();
        let transport = &self.transport;

        self.retry
            .run(url, || async move {
                let response = transport.get(url).await?;
                match response.status {
                    200 => Ok(serde_json::from_slice(&response.body)?),
                    429 => Err(Error::rate_limit(response.retry_after)),
                    status => Err(Error::from_status(status, url)),
                }
            })
            .await
    }

    /// Runs a search and parses the result envelope.
    ///
    /// The query is sent as-is; validation belongs to
    /// [`build_query`](crate::query::build_query).
    pub async fn search(&self, query: &SearchQuery) -> Result<ResultPage> {
        let params = query.to_params();
        debug!("Searching {} with {:?}", self.base_url, params);
        let value = self.fetch_json(&self.base_url, &params).await?;
        parse_page(value)
    }

    /// Fetches a page by its full URL, as supplied in a next-page link.
    pub async fn fetch_page(&self, url: &str) -> Result<ResultPage> {
        let value = self.fetch_json(url, &[]).await?;
        parse_page(value)
    }

    /// Fetches an asset manifest: the list of direct asset URLs of one item.
    ///
    /// # Errors
    ///
    /// Everything [`fetch_json`](Self::fetch_json) returns, plus
    /// [`Error::Parse`] when the body is not a JSON array.
    pub async fn fetch_manifest(&self, href: &str) -> Result<Vec<String>> {
        let value = self.fetch_json(href, &[]).await?;
        if !value.is_array() {
            return Err(Error::parse(format!("Manifest is not an array: {}", href)));
        }
        Ok(json::string_entries(&value))
    }
}

impl Default for MediaApi {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_page(value: Value) -> Result<ResultPage> {
    let total_hits = json::extract_as::<u64>(&value, "collection.metadata.total_hits").ok();
    let mut page = ResultPage::from_json(value)?;
    page.total_hits = total_hits;
    debug!(
        "Parsed page with {} items (total hits {:?})",
        page.items.len(),
        page.total_hits
    );
    Ok(page)
}
