//! Result renderer: turns a [`ResultPage`] into display cards.
//!
//! Rendering is synchronous. Every item gets a [`RenderedCard`] whose
//! [`Placeholder`] (title, display description, preview, keyword links) is
//! complete the moment [`render_page`] returns. The card's media slot is
//! filled immediately for images and unknown media types, and later, exactly
//! once, by the [`MediaResolver`](crate::resolver::MediaResolver) for audio
//! and video.
//!
//! Text from the API is untrusted and is only ever carried as data here. The
//! "more results" affordance and user messages are structured
//! [`ViewUpdate`]s, never markup.
//!
//! # Examples
//!
//! ```rust
//! use nasa_media::render::{render_page, RenderOptions, RenderOutcome};
//! use nasa_media::types::ResultPage;
//!
//! let outcome = render_page(&ResultPage::default(), &RenderOptions::default());
//! assert!(matches!(outcome, RenderOutcome::NoResults));
//! ```

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

use crate::config::{Config, DEFAULT_DESCRIPTION_LIMIT};
use crate::error::Error;
use crate::types::{MediaType, NextLink, ResultItem, ResultPage};

/// Appended to descriptions cut at the display limit.
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Characters of description shown before truncation.
    pub description_limit: usize,
    /// Preview image for items without a `preview` link.
    pub fallback_preview: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            description_limit: DEFAULT_DESCRIPTION_LIMIT,
            fallback_preview: Config::default().fallback_preview,
        }
    }
}

impl From<&Config> for RenderOptions {
    fn from(config: &Config) -> Self {
        Self {
            description_limit: config.description_limit,
            fallback_preview: config.fallback_preview.clone(),
        }
    }
}

/// A link that searches for one keyword.
///
/// `href` is a query string (`?keywords=...`) that
/// [`FormState::from_query_string`](crate::query::FormState::from_query_string)
/// turns back into a search form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordLink {
    pub keyword: String,
    pub href: String,
}

/// The part of a card available right after rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub title: String,
    /// Description as displayed, possibly truncated.
    pub description: String,
    pub preview_url: String,
    pub media_type: MediaType,
    pub keyword_links: Vec<KeywordLink>,
}

/// The content of a card's media slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaSlot {
    /// A thumbnail linking to the largest available rendition.
    Image {
        href: Option<String>,
        thumbnail: String,
        alt: String,
    },
    Audio {
        src: String,
    },
    Video {
        src: String,
        poster: String,
        subtitles: Option<String>,
    },
    /// The asset could not be resolved; shown as sentinel artwork.
    Unavailable,
}

impl MediaSlot {
    /// The playable (or linked) URL, if any.
    pub fn src(&self) -> Option<&str> {
        match self {
            MediaSlot::Image { href, .. } => href.as_deref(),
            MediaSlot::Audio { src } | MediaSlot::Video { src, .. } => Some(src),
            MediaSlot::Unavailable => None,
        }
    }

    pub fn subtitles(&self) -> Option<&str> {
        match self {
            MediaSlot::Video { subtitles, .. } => subtitles.as_deref(),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, MediaSlot::Unavailable)
    }
}

/// One rendered result: the item, its placeholder, and a write-once media slot.
#[derive(Debug)]
pub struct RenderedCard {
    item: ResultItem,
    placeholder: Placeholder,
    slot: OnceCell<MediaSlot>,
}

impl RenderedCard {
    fn new(item: ResultItem, options: &RenderOptions) -> Self {
        let placeholder = Placeholder {
            title: item.title.clone(),
            description: truncate_description(&item.description, options.description_limit)
                .into_owned(),
            preview_url: item
                .preview_url
                .clone()
                .unwrap_or_else(|| options.fallback_preview.clone()),
            media_type: item.media_type,
            keyword_links: item.keywords.iter().map(|k| keyword_link(k)).collect(),
        };

        let slot = OnceCell::new();
        match item.media_type {
            MediaType::Image => {
                let _ = slot.set(image_slot(&item, &placeholder.preview_url));
            }
            MediaType::Unknown => {
                let _ = slot.set(MediaSlot::Unavailable);
            }
            MediaType::Audio | MediaType::Video => {}
        }

        Self {
            item,
            placeholder,
            slot,
        }
    }

    pub fn item(&self) -> &ResultItem {
        &self.item
    }

    pub fn placeholder(&self) -> &Placeholder {
        &self.placeholder
    }

    /// The media slot, or `None` while resolution is pending.
    pub fn slot(&self) -> Option<&MediaSlot> {
        self.slot.get()
    }

    pub fn resolved_media_url(&self) -> Option<&str> {
        self.slot.get().and_then(MediaSlot::src)
    }

    pub fn subtitle_url(&self) -> Option<&str> {
        self.slot.get().and_then(MediaSlot::subtitles)
    }

    /// `true` while the slot is empty and the item has a manifest to resolve.
    pub fn needs_resolution(&self) -> bool {
        self.slot.get().is_none() && self.item.media_type.needs_manifest()
    }

    /// Fills the slot. Returns `false`, leaving the slot untouched, if it was
    /// already filled.
    pub fn fill(&self, slot: MediaSlot) -> bool {
        self.slot.set(slot).is_ok()
    }
}

/// Result of rendering one page.
#[derive(Debug)]
pub enum RenderOutcome {
    /// The page had no items. Distinct from any transport failure.
    NoResults,
    Cards(Vec<RenderedCard>),
}

impl RenderOutcome {
    /// The rendered cards; empty for [`RenderOutcome::NoResults`].
    pub fn into_cards(self) -> Vec<RenderedCard> {
        match self {
            RenderOutcome::NoResults => Vec::new(),
            RenderOutcome::Cards(cards) => cards,
        }
    }
}

/// Renders every item of `page` into a card, in order.
pub fn render_page(page: &ResultPage, options: &RenderOptions) -> RenderOutcome {
    if page.items.is_empty() {
        debug!("Rendering empty page");
        return RenderOutcome::NoResults;
    }

    let cards: Vec<RenderedCard> = page
        .items
        .iter()
        .cloned()
        .map(|item| RenderedCard::new(item, options))
        .collect();

    debug!(
        "Rendered {} cards, {} pending resolution",
        cards.len(),
        cards.iter().filter(|c| c.needs_resolution()).count()
    );
    RenderOutcome::Cards(cards)
}

/// Cuts `text` to `limit` characters plus [`ELLIPSIS`] when it is longer.
///
/// ```rust
/// use nasa_media::render::truncate_description;
///
/// assert_eq!(truncate_description("short", 470), "short");
/// assert_eq!(truncate_description("abcdef", 3), "abc...");
/// ```
pub fn truncate_description(text: &str, limit: usize) -> Cow<'_, str> {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], ELLIPSIS)),
        None => Cow::Borrowed(text),
    }
}

fn keyword_link(keyword: &str) -> KeywordLink {
    KeywordLink {
        keyword: keyword.to_string(),
        href: format!("?keywords={}", urlencoding::encode(keyword)),
    }
}

pub(crate) fn image_slot(item: &ResultItem, preview: &str) -> MediaSlot {
    MediaSlot::Image {
        href: item
            .largest_asset()
            .map(str::to_string)
            .or_else(|| item.preview_url.clone()),
        thumbnail: preview.to_string(),
        alt: item.title.clone(),
    }
}

/// Severity of a [`UserMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    pub kind: MessageKind,
    pub text: String,
}

/// A structured change to the results view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewUpdate {
    /// Restore the initial, empty-search view.
    ShowBase,
    /// Discard the current results.
    ClearResults,
    /// Show the cards of a freshly rendered page.
    ShowCards { count: usize },
    Message(UserMessage),
    /// Append a "more results" heading and one link that loads `href`.
    NextPage { heading: String, prompt: String, href: String },
}

impl ViewUpdate {
    pub fn error(error: &Error) -> Self {
        ViewUpdate::Message(UserMessage {
            kind: MessageKind::Error,
            text: error.user_message().to_string(),
        })
    }

    pub fn no_results() -> Self {
        ViewUpdate::Message(UserMessage {
            kind: MessageKind::Info,
            text: "No results found. Please try again.".to_string(),
        })
    }

    pub fn no_more_results() -> Self {
        ViewUpdate::Message(UserMessage {
            kind: MessageKind::Info,
            text: "No more results.".to_string(),
        })
    }

    /// The "more results" affordance for `link`.
    pub fn next_page(link: &NextLink) -> Self {
        ViewUpdate::NextPage {
            heading: "More Results:".to_string(),
            prompt: link.prompt.clone(),
            href: link.href.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(truncate_description(&text, 4), format!("{}...", "é".repeat(4)));
    }

    #[test]
    fn limit_length_is_unchanged() {
        let text = "a".repeat(470);
        assert_eq!(truncate_description(&text, 470), text);
    }

    #[test]
    fn keyword_links_are_encoded() {
        let link = keyword_link("Apollo 11");
        assert_eq!(link.href, "?keywords=Apollo%2011");
    }
}
