//! Generation tokens for the results view.
//!
//! Each time the results view is replaced (new search, next page, history
//! navigation) the app advances a [`GenerationCounter`]. Work started for a
//! page carries the [`GenerationToken`] of that page and checks it before
//! writing anything back, so a resolution that lands after its page was
//! replaced is dropped instead of written into a view nobody shows.
//!
//! ```rust
//! use nasa_media::generation::{GenerationCounter, Scoped};
//!
//! # async fn example() {
//! let counter = GenerationCounter::new();
//! let first = counter.advance();
//! let second = counter.advance();
//!
//! assert!(matches!(first.scope(async { 1 }).await, Scoped::Stale));
//! assert!(matches!(second.scope(async { 2 }).await, Scoped::Current(2)));
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of generation ids. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    current: Arc<AtomicU64>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation and returns its token. Every earlier token
    /// becomes stale.
    pub fn advance(&self) -> GenerationToken {
        let id = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        GenerationToken {
            id,
            current: Arc::clone(&self.current),
        }
    }

    /// A token for the generation currently on screen.
    pub fn token(&self) -> GenerationToken {
        GenerationToken {
            id: self.current(),
            current: Arc::clone(&self.current),
        }
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

/// Identifies one generation of the results view.
#[derive(Debug, Clone)]
pub struct GenerationToken {
    id: u64,
    current: Arc<AtomicU64>,
}

impl GenerationToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// `true` while no newer generation has started.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.id
    }

    /// Awaits `fut` and tags its output with whether this generation was
    /// still current when it finished.
    pub async fn scope<F: Future>(&self, fut: F) -> Scoped<F::Output> {
        let output = fut.await;
        if self.is_current() {
            Scoped::Current(output)
        } else {
            Scoped::Stale
        }
    }
}

/// Output of a generation-scoped future.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scoped<T> {
    Current(T),
    /// The generation was superseded; the output was discarded.
    Stale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_invalidates_older_tokens() {
        let counter = GenerationCounter::new();
        let a = counter.advance();
        assert!(a.is_current());

        let b = counter.advance();
        assert!(!a.is_current());
        assert!(b.is_current());
        assert_eq!(b.id(), 2);
        assert_eq!(counter.token().id(), 2);
    }

    #[test]
    fn clones_share_state() {
        let counter = GenerationCounter::new();
        let token = counter.advance();
        counter.clone().advance();
        assert!(!token.is_current());
    }
}
