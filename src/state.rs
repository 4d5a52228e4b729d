//! Application state, navigation history, and the controller that ties the
//! pipeline together.
//!
//! [`AppState`] is an immutable value: every handler on [`App`] takes the
//! current state and returns a [`Transition`] holding the next one, the view
//! updates to apply, and the freshly rendered cards. Nothing about the page on
//! screen lives in ambient mutable state.
//!
//! [`History`] stores serialized snapshots of the states produced by searches
//! and page loads, so going back or forward redisplays an earlier page
//! without fetching it again.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nasa_media::prelude::*;
//!
//! # async fn example() {
//! let mut app = App::new(Config::default());
//! let transition = app.submit(&AppState::default(), &FormState::new("mars")).await;
//!
//! // Paint transition.updates and the placeholders, then resolve media.
//! let summary = app.resolve(&transition).await;
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::MediaApi;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::generation::{GenerationCounter, GenerationToken};
use crate::pagination::{self, PageOutcome};
use crate::query::{self, FormState, ValidationPolicy};
use crate::render::{RenderOptions, RenderOutcome, RenderedCard, ViewUpdate, render_page};
use crate::resolver::{MediaResolver, ResolveSummary};
use crate::types::{ResultPage, SearchQuery};

/// What the results view is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub query: Option<SearchQuery>,
    pub page: Option<ResultPage>,
    /// Generation of the results view this state was rendered into.
    pub generation: u64,
}

impl AppState {
    /// The page URL for this state, e.g. `/?q=mars&media_type=audio`.
    pub fn url(&self) -> String {
        match &self.query {
            Some(query) => format!("/?{}", query::to_query_string(query)),
            None => "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryEntry {
    url: String,
    snapshot: String,
}

/// Back/forward stack of serialized [`AppState`] snapshots.
///
/// Before the first entry sits the base view; stepping back past the first
/// entry lands there.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `state` as the newest entry, discarding any forward entries.
    pub fn push(&mut self, state: &AppState) -> Result<()> {
        let entry = HistoryEntry {
            url: state.url(),
            snapshot: serde_json::to_string(state)?,
        };
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(entry);
        self.cursor = Some(self.entries.len() - 1);
        Ok(())
    }

    /// Steps back. `Ok(None)` means the base view.
    pub fn back(&mut self) -> Result<Option<AppState>> {
        match self.cursor {
            Some(0) | None => {
                self.cursor = None;
                Ok(None)
            }
            Some(c) => {
                self.cursor = Some(c - 1);
                self.current().map(Some)
            }
        }
    }

    /// Steps forward. `Ok(None)` when already at the newest entry.
    pub fn forward(&mut self) -> Result<Option<AppState>> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.entries.len() {
            return Ok(None);
        }
        self.cursor = Some(next);
        self.current().map(Some)
    }

    fn current(&self) -> Result<AppState> {
        let entry = self
            .cursor
            .and_then(|c| self.entries.get(c))
            .ok_or_else(|| Error::Other("History cursor out of range".to_string()))?;
        Ok(serde_json::from_str(&entry.snapshot)?)
    }

    /// URL of the entry on screen, `None` on the base view.
    pub fn current_url(&self) -> Option<&str> {
        self.cursor
            .and_then(|c| self.entries.get(c))
            .map(|e| e.url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The outcome of one handler: next state, view updates, and rendered cards.
#[derive(Debug)]
pub struct Transition {
    pub state: AppState,
    pub updates: Vec<ViewUpdate>,
    pub cards: Vec<RenderedCard>,
    /// Generation the cards belong to; `None` when no cards were rendered.
    pub token: Option<GenerationToken>,
}

impl Transition {
    fn unchanged(state: &AppState, updates: Vec<ViewUpdate>) -> Self {
        Self {
            state: state.clone(),
            updates,
            cards: Vec::new(),
            token: None,
        }
    }
}

/// Search, paginate and navigate history against one API.
pub struct App {
    api: MediaApi,
    resolver: Arc<MediaResolver>,
    options: RenderOptions,
    policy: ValidationPolicy,
    generations: GenerationCounter,
    history: History,
}

impl App {
    /// Creates an app talking to the API described by `config`.
    pub fn new(config: Config) -> Self {
        Self::with_api(MediaApi::from_config(&config), &config)
    }

    /// Creates an app over an existing client.
    pub fn with_api(api: MediaApi, config: &Config) -> Self {
        Self {
            resolver: Arc::new(
                MediaResolver::new(api.clone()).with_fallback_preview(&config.fallback_preview),
            ),
            api,
            options: RenderOptions::from(config),
            policy: config.validation,
            generations: GenerationCounter::new(),
            history: History::new(),
        }
    }

    pub fn api(&self) -> &MediaApi {
        &self.api
    }

    pub fn resolver(&self) -> &Arc<MediaResolver> {
        &self.resolver
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Generation of the results view currently on screen.
    pub fn generation(&self) -> u64 {
        self.generations.current()
    }

    /// Handles a search form submission.
    ///
    /// An invalid form produces a message and no request. A successful search
    /// is pushed onto the history and rendered.
    pub async fn submit(&mut self, state: &AppState, form: &FormState) -> Transition {
        let query = match query::build_query(form, self.policy) {
            Ok(query) => query,
            Err(e) => {
                debug!("Rejected search form: {}", e);
                return Transition::unchanged(state, vec![ViewUpdate::error(&e)]);
            }
        };

        match self.api.search(&query).await {
            Ok(page) => self.show(Some(query), page, true),
            Err(e) => self.failed(state, e),
        }
    }

    /// Restores and runs the search encoded in a page URL query, as on first
    /// load of a bookmarked results page. An empty query shows the base view.
    pub async fn open_url(&mut self, state: &AppState, url_query: &str) -> Transition {
        let form = FormState::from_query_string(url_query);
        if form == FormState::default() {
            return self.base_view();
        }
        self.submit(state, &form).await
    }

    /// Follows the next-page link of the page on screen.
    pub async fn next_page(&mut self, state: &AppState) -> Transition {
        let Some(page) = &state.page else {
            return Transition::unchanged(state, vec![ViewUpdate::no_more_results()]);
        };

        match pagination::load_next(&self.api, page).await {
            Ok(PageOutcome::Page(next)) => self.show(state.query.clone(), next, true),
            Ok(PageOutcome::NoMoreResults) => {
                Transition::unchanged(state, vec![ViewUpdate::no_more_results()])
            }
            Err(e) => self.failed(state, e),
        }
    }

    /// Steps back through history.
    pub async fn back(&mut self, state: &AppState) -> Transition {
        let restored = self.history.back();
        self.restore(state, restored).await
    }

    /// Steps forward through history.
    pub async fn forward(&mut self, state: &AppState) -> Transition {
        match self.history.forward() {
            Ok(None) => Transition::unchanged(state, Vec::new()),
            restored => self.restore(state, restored).await,
        }
    }

    /// Resolves the media of a transition's cards, dropping results if a newer
    /// transition has replaced them in the meantime.
    pub async fn resolve(&self, transition: &Transition) -> ResolveSummary {
        match &transition.token {
            Some(token) => self.resolver.resolve_page(&transition.cards, token).await,
            None => ResolveSummary::default(),
        }
    }

    async fn restore(&mut self, state: &AppState, restored: Result<Option<AppState>>) -> Transition {
        match restored {
            Ok(Some(AppState {
                query,
                page: Some(page),
                ..
            })) => self.show(query, page, false),
            // A snapshot without a page is searched again.
            Ok(Some(AppState {
                query: Some(query),
                page: None,
                ..
            })) => match self.api.search(&query).await {
                Ok(page) => self.show(Some(query), page, false),
                Err(e) => self.failed(state, e),
            },
            Ok(_) => self.base_view(),
            Err(e) => {
                warn!("Unreadable history entry: {}", e);
                self.base_view()
            }
        }
    }

    fn base_view(&mut self) -> Transition {
        let token = self.generations.advance();
        Transition {
            state: AppState {
                generation: token.id(),
                ..Default::default()
            },
            updates: vec![ViewUpdate::ShowBase],
            cards: Vec::new(),
            token: None,
        }
    }

    fn failed(&mut self, state: &AppState, error: Error) -> Transition {
        if error.is_ignorable() {
            debug!("Ignoring {}", error);
            return Transition::unchanged(state, Vec::new());
        }

        warn!("Request failed: {}", error);
        let token = self.generations.advance();
        Transition {
            state: AppState {
                generation: token.id(),
                ..state.clone()
            },
            updates: vec![ViewUpdate::ClearResults, ViewUpdate::error(&error)],
            cards: Vec::new(),
            token: None,
        }
    }

    fn show(&mut self, query: Option<SearchQuery>, page: ResultPage, record: bool) -> Transition {
        let token = self.generations.advance();

        let mut updates = vec![ViewUpdate::ClearResults];
        let cards = match render_page(&page, &self.options) {
            RenderOutcome::NoResults => {
                updates.push(ViewUpdate::no_results());
                Vec::new()
            }
            RenderOutcome::Cards(cards) => {
                updates.push(ViewUpdate::ShowCards { count: cards.len() });
                updates.extend(pagination::next_page_action(&page));
                cards
            }
        };

        let state = AppState {
            query,
            page: Some(page),
            generation: token.id(),
        };

        if record {
            if let Err(e) = self.history.push(&state) {
                warn!("Could not record history entry: {}", e);
            }
        }

        Transition {
            state,
            updates,
            cards,
            token: Some(token),
        }
    }
}
