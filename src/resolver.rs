//! Media resolver: fills audio and video cards with playable URLs.
//!
//! Audio and video results only carry the href of an asset manifest, a JSON
//! array of direct asset URLs. Resolving an item fetches that manifest and
//! picks the playable URL (plus a caption track for video). Failures never
//! leave this module: a missing or empty manifest turns into
//! [`MediaSlot::Unavailable`] for that one card while the rest of the page
//! carries on.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nasa_media::prelude::*;
//! use nasa_media::generation::GenerationCounter;
//!
//! # async fn example() -> nasa_media::Result<()> {
//! let api = MediaApi::new();
//! let page = api.query("apollo").media_type(MediaFilter::Audio).send().await?;
//!
//! let cards = render_page(&page, &RenderOptions::default()).into_cards();
//! let resolver = MediaResolver::new(api);
//! let generations = GenerationCounter::new();
//!
//! let summary = resolver.resolve_page(&cards, &generations.advance()).await;
//! println!("{} resolved, {} unavailable", summary.resolved, summary.unavailable);
//! # Ok(())
//! # }
//! ```

use futures::future;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::MediaApi;
use crate::error::{Error, Result};
use crate::generation::{GenerationToken, Scoped};
use crate::render::{MediaSlot, RenderOptions, RenderedCard, image_slot};
use crate::types::{MediaType, ResultItem};

/// Counts from one [`MediaResolver::resolve_page`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    /// Cards that received a playable URL.
    pub resolved: usize,
    /// Cards that received the unavailable sentinel.
    pub unavailable: usize,
    /// Resolutions dropped because their page was superseded.
    pub stale: usize,
}

/// Resolves asset manifests, caching successful resolutions by manifest href.
#[derive(Debug)]
pub struct MediaResolver {
    api: MediaApi,
    cache: Mutex<HashMap<String, MediaSlot>>,
    fallback_preview: String,
}

impl MediaResolver {
    pub fn new(api: MediaApi) -> Self {
        Self {
            api,
            cache: Mutex::new(HashMap::new()),
            fallback_preview: RenderOptions::default().fallback_preview,
        }
    }

    /// Uses `preview` as thumbnail and poster for items without a preview
    /// link. Should match the [`RenderOptions`] the cards were rendered with.
    pub fn with_fallback_preview(mut self, preview: impl Into<String>) -> Self {
        self.fallback_preview = preview.into();
        self
    }

    fn preview_of<'a>(&'a self, item: &'a ResultItem) -> &'a str {
        item.preview_url.as_deref().unwrap_or(&self.fallback_preview)
    }

    /// Resolves the media slot for one item.
    ///
    /// - Images resolve locally to their largest rendition.
    /// - Audio and video fetch the manifest; its first entry is the playable
    ///   URL, upgraded from `http://` to `https://`. This assumes the API lists
    ///   the preferred rendition first, which it does not document.
    /// - Video additionally takes the first `.vtt` entry as its caption track.
    /// - Anything else, a failed fetch, or an empty manifest yields
    ///   [`MediaSlot::Unavailable`].
    ///
    /// Resolving the same item twice is safe and, once the first call has
    /// succeeded, served from the cache.
    pub async fn resolve(&self, item: &ResultItem) -> MediaSlot {
        match item.media_type {
            MediaType::Image => image_slot(item, self.preview_of(item)),
            MediaType::Unknown => MediaSlot::Unavailable,
            MediaType::Audio | MediaType::Video => self.resolve_manifest(item).await,
        }
    }

    async fn resolve_manifest(&self, item: &ResultItem) -> MediaSlot {
        let href = &item.manifest_href;
        if let Some(slot) = self.cached(href) {
            debug!("Manifest cache hit for {}", href);
            return slot;
        }

        match self.fetch_slot(item).await {
            Ok(slot) => {
                self.cache.lock().insert(href.clone(), slot.clone());
                slot
            }
            Err(e) => {
                warn!("Asset unavailable for {:?}: {}", item.title, e);
                MediaSlot::Unavailable
            }
        }
    }

    async fn fetch_slot(&self, item: &ResultItem) -> Result<MediaSlot> {
        let entries = self.api.fetch_manifest(&item.manifest_href).await?;
        let first = entries.first().ok_or_else(|| {
            Error::asset_unavailable(format!("empty manifest {}", item.manifest_href))
        })?;

        let src = upgrade_scheme(first);
        if item.media_type != MediaType::Video {
            return Ok(MediaSlot::Audio { src });
        }

        Ok(MediaSlot::Video {
            src,
            poster: self.preview_of(item).to_string(),
            subtitles: entries
                .iter()
                .find(|entry| is_caption(entry))
                .map(|entry| upgrade_scheme(entry)),
        })
    }

    fn cached(&self, href: &str) -> Option<MediaSlot> {
        self.cache.lock().get(href).cloned()
    }

    /// Number of cached resolutions.
    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Resolves every pending card of a rendered page concurrently.
    ///
    /// Cards must already exist, so rendering always precedes resolution.
    /// Resolutions complete in any order and each writes only to its own
    /// card, and only while `token` is current.
    pub async fn resolve_page(
        &self,
        cards: &[RenderedCard],
        token: &GenerationToken,
    ) -> ResolveSummary {
        let pending = cards.iter().filter(|card| card.needs_resolution()).map(|card| async move {
            match token.scope(self.resolve(card.item())).await {
                Scoped::Current(slot) => {
                    let unavailable = slot.is_unavailable();
                    card.fill(slot);
                    Some(unavailable)
                }
                Scoped::Stale => None,
            }
        });

        let mut summary = ResolveSummary::default();
        for outcome in future::join_all(pending).await {
            match outcome {
                Some(false) => summary.resolved += 1,
                Some(true) => summary.unavailable += 1,
                None => summary.stale += 1,
            }
        }

        debug!(
            "Generation {}: {} resolved, {} unavailable, {} stale",
            token.id(),
            summary.resolved,
            summary.unavailable,
            summary.stale
        );
        summary
    }

    /// Runs [`resolve_page`](Self::resolve_page) on a background task, so
    /// the caller can paint the placeholders without waiting.
    pub fn spawn_page(
        self: &Arc<Self>,
        cards: Arc<Vec<RenderedCard>>,
        token: GenerationToken,
    ) -> JoinHandle<ResolveSummary> {
        let resolver = Arc::clone(self);
        tokio::spawn(async move { resolver.resolve_page(&cards, &token).await })
    }
}

/// Rewrites a leading `http://` to `https://`. Other URLs pass through.
///
/// ```rust
/// use nasa_media::resolver::upgrade_scheme;
///
/// assert_eq!(upgrade_scheme("http://example.com/a.mp4"), "https://example.com/a.mp4");
/// assert_eq!(upgrade_scheme("https://example.com/a.mp4"), "https://example.com/a.mp4");
/// ```
pub fn upgrade_scheme(url: &str) -> String {
    match url.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("http://") => {
            format!("https://{}", &url[7..])
        }
        _ => url.to_string(),
    }
}

// Caption tracks are WebVTT files; the query string and fragment are ignored.
fn is_caption(entry: &str) -> bool {
    let path = entry.split(['?', '#']).next().unwrap_or(entry);
    path.to_ascii_lowercase().ends_with(".vtt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_detection() {
        assert!(is_caption("http://a/b/captions.vtt"));
        assert!(is_caption("http://a/b/CAPTIONS.VTT?x=1"));
        assert!(!is_caption("http://a/b/orig.mp4"));
        assert!(!is_caption("http://a/vtt/orig.srt"));
    }

    #[test]
    fn upgrade_is_case_insensitive() {
        assert_eq!(upgrade_scheme("HTTP://a/b"), "https://a/b");
        assert_eq!(upgrade_scheme("ftp://a/b"), "ftp://a/b");
        assert_eq!(upgrade_scheme("http:"), "http:");
    }
}
