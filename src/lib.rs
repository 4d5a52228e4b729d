//! # nasa-media - Async client for the NASA Image and Video Library
//!
//! nasa-media searches the public NASA Image and Video Library, renders result
//! pages into structured display cards, and lazily resolves the playable URLs of
//! audio and video results. It is the engine behind a search front-end: the
//! library produces data and view updates; painting them is up to the caller
//! (the bundled `nasa-media` binary prints them to a terminal).
//!
//! ## Features
//!
//! - **Query Builder**: turn raw form input into a canonical query, omitting blank filters
//! - **Typed API Client**: every HTTP outcome mapped to data or a typed [`Error`]
//! - **Render-then-resolve**: placeholders exist before any asset manifest is fetched
//! - **Concurrent Media Resolution**: per-item manifest fetches, cached, never fatal to a page
//! - **Generation Scoping**: results from superseded pages are dropped, not written
//! - **Pagination and History**: next-page loading and back/forward without re-fetching
//! - **Retries and Rate Limiting**: bounded backoff for transient failures, per-host delays
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nasa_media::prelude::*;
//! use nasa_media::generation::GenerationCounter;
//!
//! #[tokio::main]
//! async fn main() -> nasa_media::Result<()> {
//!     let api = MediaApi::new();
//!
//!     let page = api.query("mars").send().await?;
//!     let cards = render_page(&page, &RenderOptions::default()).into_cards();
//!
//!     for card in &cards {
//!         println!("{}", card.placeholder().title);
//!     }
//!
//!     let resolver = MediaResolver::new(api.clone());
//!     let token = GenerationCounter::new().advance();
//!     resolver.resolve_page(&cards, &token).await;
//!
//!     for card in &cards {
//!         println!("{} -> {:?}", card.placeholder().title, card.resolved_media_url());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`query`]: form input to [`SearchQuery`]
//! - [`client`]: the API client and status classification
//! - [`search`]: fluent search builder and result helpers
//! - [`render`]: result cards, truncation, view updates
//! - [`resolver`]: manifest resolution into media slots
//! - [`pagination`]: next-page loading
//! - [`generation`]: generation tokens for stale-write protection
//! - [`state`]: immutable app state, history, and the [`App`] controller
//! - [`net`]: transport, retries, rate limiting, JSON helpers
//! - [`config`]: runtime configuration
//! - [`error`]: error taxonomy

pub mod client;
pub mod config;
pub mod error;
pub mod generation;
pub mod net;
pub mod pagination;
pub mod query;
pub mod render;
pub mod resolver;
pub mod search;
pub mod state;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```rust
/// use nasa_media::prelude::*;
///
/// let form = FormState::new("apollo");
/// let query = build_query(&form, ValidationPolicy::AnyField).unwrap();
/// assert_eq!(query.media_type, MediaFilter::All);
/// ```
pub mod prelude {
    pub use crate::{
        client::MediaApi,
        config::Config,
        query::{FormState, ValidationPolicy, build_query},
        render::{MediaSlot, RenderOptions, RenderOutcome, RenderedCard, ViewUpdate, render_page},
        resolver::MediaResolver,
        search::{SearchBuilder, SearchResultExt},
        state::{App, AppState, Transition},
        types::{MediaFilter, MediaType, ResultItem, ResultPage, SearchQuery},
    };
}

// Re-export main types at crate root for direct access
pub use client::MediaApi;
pub use config::Config;
pub use error::{Error, Result};
pub use resolver::MediaResolver;
pub use search::{SearchBuilder, SearchResultExt};
pub use state::{App, AppState};
pub use types::{MediaFilter, MediaType, ResultItem, ResultPage, SearchQuery};
