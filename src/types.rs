//! Core data types for search queries, result pages and result items.
//!
//! This module defines the data model shared by every stage of the pipeline:
//!
//! - [`SearchQuery`] - A validated, canonical search submission
//! - [`MediaFilter`] - The media-type filter of a search form
//! - [`ResultPage`] - One page of results plus its next-page link
//! - [`ResultItem`] - A single search hit, derived once from the raw API record
//! - [`AssetLink`] - A link attached to a result item (preview, asset variant)
//!
//! Raw envelope structures mirror the JSON returned by the search endpoint and
//! never leave this module; callers only see the derived types.
//!
//! # Examples
//!
//! ```rust
//! use nasa_media::types::{MediaFilter, SearchQueryBuilder};
//!
//! let query = SearchQueryBuilder::default()
//!     .text("apollo 11")
//!     .media_type(MediaFilter::Video)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     query.to_params(),
//!     vec![("q", "apollo 11".to_string()), ("media_type", "video".to_string())]
//! );
//! ```

use derive_builder::Builder;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Media type of a single result item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Audio,
    Video,
    #[default]
    #[serde(other)]
    Unknown,
}

impl MediaType {
    /// Returns `true` for media that needs a manifest fetch before it can play.
    pub fn needs_manifest(self) -> bool {
        matches!(self, MediaType::Audio | MediaType::Video)
    }
}

/// The media-type filter selected in a search form.
///
/// `All` is never sent to the API; the parameter is omitted instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFilter {
    #[default]
    All,
    Image,
    Audio,
    Video,
}

impl MediaFilter {
    /// The value sent as `media_type`, or `None` when the filter is `All`.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            MediaFilter::All => None,
            MediaFilter::Image => Some("image"),
            MediaFilter::Audio => Some("audio"),
            MediaFilter::Video => Some("video"),
        }
    }
}

impl FromStr for MediaFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(MediaFilter::All),
            "image" => Ok(MediaFilter::Image),
            "audio" => Ok(MediaFilter::Audio),
            "video" => Ok(MediaFilter::Video),
            other => Err(Error::validation(format!("Unknown media type: {}", other))),
        }
    }
}

impl fmt::Display for MediaFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param().unwrap_or("all"))
    }
}

/// A canonical search submission.
///
/// Built fresh for every submission by the query builder (see
/// [`build_query`](crate::query::build_query)) or directly through the generated
/// `SearchQueryBuilder`, and never mutated after it has been sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct SearchQuery {
    #[builder(default)]
    pub text: String,
    #[builder(default)]
    pub media_type: MediaFilter,
    #[builder(default)]
    pub year_start: Option<String>,
    #[builder(default)]
    pub tags: Vec<String>,
}

impl SearchQuery {
    /// Returns `true` when no field would produce a query parameter.
    pub fn is_empty(&self) -> bool {
        self.to_params().is_empty()
    }

    /// The outgoing parameter set.
    ///
    /// Blank fields and the `All` media filter are omitted entirely instead of
    /// being sent as empty values; the API treats absence and emptiness
    /// differently for some filters. Tags are sent as one comma-separated
    /// `keywords` parameter.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        let text = self.text.trim();
        if !text.is_empty() {
            params.push(("q", text.to_string()));
        }

        if let Some(media_type) = self.media_type.as_param() {
            params.push(("media_type", media_type.to_string()));
        }

        if let Some(year) = self
            .year_start
            .as_deref()
            .map(str::trim)
            .filter(|y| !y.is_empty())
        {
            params.push(("year_start", year.to_string()));
        }

        let tags: Vec<&str> = self
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            params.push(("keywords", tags.join(",")));
        }

        params
    }
}

impl From<&str> for SearchQuery {
    fn from(text: &str) -> Self {
        SearchQuery {
            text: text.to_string(),
            ..Default::default()
        }
    }
}

impl From<String> for SearchQuery {
    fn from(text: String) -> Self {
        SearchQuery {
            text,
            ..Default::default()
        }
    }
}

/// A link attached to a result item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLink {
    pub href: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub rel: Option<String>,
}

/// A single search hit.
///
/// Derived once from a raw API record and read-only thereafter. The metadata
/// fields come from the first entry of the record's `data` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub title: String,
    pub description: String,
    pub media_type: MediaType,
    /// Href of the link whose `rel` is `"preview"`.
    pub preview_url: Option<String>,
    pub asset_links: Vec<AssetLink>,
    /// Href of the asset manifest (the record's own `href`).
    pub manifest_href: String,
    pub keywords: BTreeSet<String>,
    pub nasa_id: Option<String>,
    pub date_created: Option<String>,
}

impl ResultItem {
    /// Href of the largest asset link by `size`.
    ///
    /// Links without a size never win, and neither do zero-sized ones. Ties
    /// keep the earlier link.
    ///
    /// ```rust
    /// # use nasa_media::types::{AssetLink, ResultItem, MediaType};
    /// # let link = |href: &str, size| AssetLink { href: href.into(), size, rel: None };
    /// let item = ResultItem {
    ///     asset_links: vec![
    ///         link("small.jpg", Some(100)),
    ///         link("orig.jpg", Some(9000)),
    ///         link("thumb.jpg", None),
    ///     ],
    /// #   title: String::new(), description: String::new(), media_type: MediaType::Image,
    /// #   preview_url: None, manifest_href: String::new(), keywords: Default::default(),
    /// #   nasa_id: None, date_created: None,
    /// };
    /// assert_eq!(item.largest_asset(), Some("orig.jpg"));
    /// ```
    pub fn largest_asset(&self) -> Option<&str> {
        let mut best: Option<(&str, u64)> = None;
        for link in &self.asset_links {
            let size = link.size.unwrap_or(0);
            if size > best.map_or(0, |(_, s)| s) {
                best = Some((&link.href, size));
            }
        }
        best.map(|(href, _)| href)
    }
}

/// The next-page link supplied by the search envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextLink {
    pub href: String,
    pub prompt: String,
}

/// One page of search results.
///
/// Immutable once received and replaced wholesale by the next page fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPage {
    pub items: Vec<ResultItem>,
    pub next: Option<NextLink>,
    pub total_hits: Option<u64>,
}

impl ResultPage {
    /// Parses a search envelope.
    ///
    /// Missing optional fields (item links, keywords, page links) are
    /// tolerated. A body without a `collection` object is a parse error.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let envelope: Envelope = serde_json::from_value(value)?;
        let collection = envelope.collection;

        let next = select_next_link(&collection.links).map(|link| NextLink {
            href: link.href.clone(),
            prompt: link
                .prompt
                .clone()
                .unwrap_or_else(|| "Next".to_string()),
        });

        Ok(ResultPage {
            items: collection.items.into_iter().map(ResultItem::from).collect(),
            next,
            total_hits: None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// Later pages carry both a "prev" and a "next" link; an entry explicitly
// tagged "next" wins, otherwise the first untagged entry is taken.
fn select_next_link(links: &[RawPageLink]) -> Option<&RawPageLink> {
    links
        .iter()
        .find(|l| l.rel.as_deref() == Some("next"))
        .or_else(|| links.iter().find(|l| l.rel.is_none()))
        .filter(|l| !l.href.trim().is_empty())
}

/// Search endpoint envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    collection: RawCollection,
}

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(default)]
    items: Vec<RawItem>,
    #[serde(default)]
    links: Vec<RawPageLink>,
}

#[derive(Debug, Deserialize)]
struct RawPageLink {
    href: String,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    href: String,
    #[serde(default)]
    data: Vec<RawData>,
    #[serde(default)]
    links: Vec<AssetLink>,
}

#[derive(Debug, Default, Deserialize)]
struct RawData {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    media_type: MediaType,
    #[serde(default, deserialize_with = "string_or_seq")]
    keywords: Vec<String>,
    #[serde(default)]
    nasa_id: Option<String>,
    #[serde(default)]
    date_created: Option<String>,
}

impl From<RawItem> for ResultItem {
    fn from(raw: RawItem) -> Self {
        let data = raw.data.into_iter().next().unwrap_or_default();

        let preview_url = raw
            .links
            .iter()
            .find(|l| l.rel.as_deref() == Some("preview"))
            .map(|l| l.href.clone());

        let keywords = data
            .keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        ResultItem {
            title: data.title.unwrap_or_default(),
            description: data.description.unwrap_or_default(),
            media_type: data.media_type,
            preview_url,
            asset_links: raw.links,
            manifest_href: raw.href,
            keywords,
            nasa_id: data.nasa_id,
            date_created: data.date_created,
        }
    }
}

// Some records carry keywords as one comma-separated string instead of a list.
fn string_or_seq<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => s.split(',').map(str::to_string).collect(),
        OneOrMany::Many(v) => v,
        OneOrMany::Null(()) => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn next_link_prefers_rel_next() {
        let page = ResultPage::from_json(json!({
            "collection": {
                "items": [],
                "links": [
                    {"href": "https://x/prev", "prompt": "Previous", "rel": "prev"},
                    {"href": "https://x/next", "prompt": "Next", "rel": "next"}
                ]
            }
        }))
        .unwrap();

        assert_eq!(page.next.unwrap().href, "https://x/next");
    }

    #[test]
    fn prev_only_has_no_next() {
        let page = ResultPage::from_json(json!({
            "collection": {
                "items": [],
                "links": [{"href": "https://x/prev", "prompt": "Previous", "rel": "prev"}]
            }
        }))
        .unwrap();

        assert!(page.next.is_none());
    }

    #[test]
    fn keywords_as_single_string() {
        let page = ResultPage::from_json(json!({
            "collection": {
                "items": [{
                    "href": "https://x/collection.json",
                    "data": [{"title": "T", "media_type": "image", "keywords": "Mars, Rover"}]
                }]
            }
        }))
        .unwrap();

        let keywords: Vec<_> = page.items[0].keywords.iter().cloned().collect();
        assert_eq!(keywords, vec!["Mars".to_string(), "Rover".to_string()]);
    }

    #[test]
    fn unknown_media_type() {
        let page = ResultPage::from_json(json!({
            "collection": {"items": [{"href": "h", "data": [{"title": "T", "media_type": "model"}]}]}
        }))
        .unwrap();

        assert_eq!(page.items[0].media_type, MediaType::Unknown);
    }

    #[test]
    fn missing_collection_is_error() {
        assert!(ResultPage::from_json(json!({"reason": "nope"})).is_err());
    }
}
