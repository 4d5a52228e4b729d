//! Fluent search builder and result helpers.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nasa_media::prelude::*;
//! # use nasa_media::Result;
//!
//! # async fn example() -> Result<()> {
//! let api = MediaApi::new();
//!
//! let page = api
//!     .query("apollo 11")
//!     .media_type(MediaFilter::Video)
//!     .year_start("1969")
//!     .keywords(vec!["moon".to_string()])
//!     .send()
//!     .await?;
//!
//! let videos = page.items.filter_media(MediaType::Video).dedupe_by_id();
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;

use crate::{
    client::MediaApi,
    error::{Error, Result},
    query::ValidationPolicy,
    types::{MediaFilter, MediaType, ResultItem, ResultPage, SearchQuery},
};

/// A fluent search builder over a [`MediaApi`].
///
/// Builds a [`SearchQuery`] as methods are chained and executes it with
/// [`send()`](SearchBuilder::send), or hands the query back with
/// [`build()`](SearchBuilder::build).
pub struct SearchBuilder<'a> {
    api: &'a MediaApi,
    query: SearchQuery,
    policy: ValidationPolicy,
}

impl<'a> SearchBuilder<'a> {
    /// Called by [`MediaApi::query()`](crate::client::MediaApi::query).
    pub(crate) fn new(api: &'a MediaApi, text: impl Into<String>) -> Self {
        Self {
            api,
            query: SearchQuery::from(text.into()),
            policy: ValidationPolicy::default(),
        }
    }

    /// Restricts results to one media type. `MediaFilter::All` removes the
    /// restriction.
    pub fn media_type(mut self, media_type: MediaFilter) -> Self {
        self.query.media_type = media_type;
        self
    }

    /// Only items created in or after `year`.
    pub fn year_start(mut self, year: impl Into<String>) -> Self {
        self.query.year_start = Some(year.into());
        self
    }

    /// Only items tagged with all of `keywords`.
    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.query.tags = keywords;
        self
    }

    /// Adds a single keyword.
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.query.tags.push(keyword.into());
        self
    }

    /// Sets when the query counts as empty. Defaults to
    /// [`ValidationPolicy::AnyField`].
    pub fn policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Executes the search and returns the first page.
    ///
    /// # Errors
    ///
    /// * [`Error::Validation`] if the query is empty under the policy; no
    ///   request is issued
    /// * Everything [`MediaApi::search`] returns
    pub async fn send(self) -> Result<ResultPage> {
        let rejected = match self.policy {
            ValidationPolicy::AnyField => self.query.is_empty(),
            ValidationPolicy::RequireText => self.query.text.trim().is_empty(),
        };
        if rejected {
            return Err(Error::validation("Please enter a search query."));
        }
        self.api.search(&self.query).await
    }

    /// Returns the query without executing it.
    pub fn build(self) -> SearchQuery {
        self.query
    }
}

/// Post-processing helpers for result items.
pub trait SearchResultExt {
    /// Keeps only items of `media_type`.
    fn filter_media(self, media_type: MediaType) -> Self;

    /// Removes repeated items, keyed by NASA id (falling back to the manifest
    /// href). The first occurrence is kept.
    fn dedupe_by_id(self) -> Self;

    /// Keeps items carrying `keyword`, compared case-insensitively.
    fn with_keyword(self, keyword: &str) -> Self;
}

impl SearchResultExt for Vec<ResultItem> {
    fn filter_media(mut self, media_type: MediaType) -> Self {
        self.retain(|item| item.media_type == media_type);
        self
    }

    fn dedupe_by_id(mut self) -> Self {
        let mut seen = HashSet::new();
        self.retain(|item| {
            let key = item
                .nasa_id
                .clone()
                .unwrap_or_else(|| item.manifest_href.clone());
            seen.insert(key)
        });
        self
    }

    fn with_keyword(mut self, keyword: &str) -> Self {
        let keyword = keyword.to_lowercase();
        self.retain(|item| item.keywords.iter().any(|k| k.to_lowercase() == keyword));
        self
    }
}
