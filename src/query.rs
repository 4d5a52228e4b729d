//! Query builder: turns raw search-form input into a [`SearchQuery`].
//!
//! The form is whatever the front-end collected: free text, a media-type
//! selection, a start year and a comma-separated tag list. [`build_query`]
//! normalises it and applies a [`ValidationPolicy`] before anything touches
//! the network.
//!
//! # Examples
//!
//! ```rust
//! use nasa_media::query::{build_query, FormState, ValidationPolicy};
//!
//! let form = FormState::new("mars").media_type("all");
//! let query = build_query(&form, ValidationPolicy::AnyField).unwrap();
//! assert_eq!(query.to_params(), vec![("q", "mars".to_string())]);
//!
//! let empty = FormState::default();
//! assert!(build_query(&empty, ValidationPolicy::AnyField).is_err());
//! ```

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{Error, Result};
use crate::types::{MediaFilter, SearchQuery};

/// When a search submission is rejected as empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationPolicy {
    /// Reject only when text, media type, year and tags are all empty.
    #[default]
    AnyField,
    /// Reject whenever the search text is empty, whatever the filters say.
    RequireText,
}

/// Raw search-form input, exactly as typed or selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub text: String,
    /// `""`, `"all"`, `"image"`, `"audio"` or `"video"`.
    pub media_type: String,
    pub year_start: String,
    /// Comma-separated.
    pub tags: String,
}

impl FormState {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    pub fn year_start(mut self, year: impl Into<String>) -> Self {
        self.year_start = year.into();
        self
    }

    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    /// Restores a form from a page URL query such as `q=mars&media_type=audio`.
    ///
    /// A leading `?` is ignored, as is anything up to it when a whole URL is
    /// passed. Unknown keys are dropped.
    ///
    /// ```rust
    /// use nasa_media::query::FormState;
    ///
    /// let form = FormState::from_query_string("/?q=apollo%2011&media_type=video");
    /// assert_eq!(form.text, "apollo 11");
    /// assert_eq!(form.media_type, "video");
    /// ```
    pub fn from_query_string(input: &str) -> Self {
        let query = input.split_once('?').map_or(input, |(_, q)| q);
        let mut form = FormState::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "q" => form.text = value.into_owned(),
                "media_type" => form.media_type = value.into_owned(),
                "year_start" => form.year_start = value.into_owned(),
                "keywords" => form.tags = value.into_owned(),
                _ => {}
            }
        }

        form
    }
}

impl From<&SearchQuery> for FormState {
    fn from(query: &SearchQuery) -> Self {
        FormState {
            text: query.text.clone(),
            media_type: query.media_type.to_string(),
            year_start: query.year_start.clone().unwrap_or_default(),
            tags: query.tags.join(","),
        }
    }
}

/// Builds a canonical [`SearchQuery`] from form input.
///
/// # Errors
///
/// [`Error::Validation`] when the form is empty under `policy`, the media
/// type is unknown, or the start year is not four digits. No request is ever
/// issued for a rejected form.
pub fn build_query(form: &FormState, policy: ValidationPolicy) -> Result<SearchQuery> {
    let media_type: MediaFilter = form.media_type.parse()?;

    let year = form.year_start.trim();
    if !year.is_empty() && !(year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit())) {
        return Err(Error::validation(format!("Invalid start year: {}", year)));
    }

    let query = SearchQuery {
        text: form.text.trim().to_string(),
        media_type,
        year_start: (!year.is_empty()).then(|| year.to_string()),
        tags: split_tags(&form.tags),
    };

    let rejected = match policy {
        ValidationPolicy::AnyField => query.is_empty(),
        ValidationPolicy::RequireText => query.text.is_empty(),
    };
    if rejected {
        return Err(Error::validation("Please enter a search query."));
    }

    Ok(query)
}

/// Encodes a query's parameters as a URL query string (without `?`).
///
/// ```rust
/// use nasa_media::query::to_query_string;
/// use nasa_media::types::SearchQuery;
///
/// assert_eq!(to_query_string(&SearchQuery::from("mars rover")), "q=mars+rover");
/// ```
pub fn to_query_string(query: &SearchQuery) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.to_params())
        .finish()
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims_tags() {
        assert_eq!(split_tags(" mars, ,rover ,"), vec!["mars", "rover"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn rejects_bad_year() {
        let form = FormState::new("mars").year_start("69");
        assert!(matches!(
            build_query(&form, ValidationPolicy::AnyField),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn rejects_unknown_media_type() {
        let form = FormState::new("mars").media_type("hologram");
        assert!(build_query(&form, ValidationPolicy::AnyField).is_err());
    }
}
