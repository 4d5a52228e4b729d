//! Pagination controller.
//!
//! The search envelope carries at most one usable next-page link. Following
//! it yields a whole new page that replaces the current one; pages are never
//! merged.

use tracing::debug;

use crate::client::MediaApi;
use crate::error::Result;
use crate::render::ViewUpdate;
use crate::types::{NextLink, ResultPage};

/// Result of asking for the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// A non-empty page that replaces the current one.
    Page(ResultPage),
    /// There is no next link, or following it produced zero items.
    NoMoreResults,
}

/// The next-page link of `page`, if the envelope supplied one.
pub fn next_link(page: &ResultPage) -> Option<&NextLink> {
    page.next.as_ref()
}

/// The "more results" affordance for `page`, or `None` when there is no
/// next page to offer.
pub fn next_page_action(page: &ResultPage) -> Option<ViewUpdate> {
    next_link(page).map(ViewUpdate::next_page)
}

/// Fetches the page after `page`.
///
/// # Errors
///
/// Whatever [`MediaApi::fetch_page`] returns for the next-page request.
pub async fn load_next(api: &MediaApi, page: &ResultPage) -> Result<PageOutcome> {
    let Some(link) = next_link(page) else {
        debug!("No next link on current page");
        return Ok(PageOutcome::NoMoreResults);
    };

    let next = api.fetch_page(&link.href).await?;
    if next.is_empty() {
        debug!("Next page {} is empty", link.href);
        return Ok(PageOutcome::NoMoreResults);
    }

    Ok(PageOutcome::Page(next))
}
