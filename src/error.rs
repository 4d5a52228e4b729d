//! Error types and result handling for media search operations.
//!
//! Every network-originating failure is converted into an [`enum@Error`] at the
//! API client boundary, so nothing above it ever deals with raw transport
//! errors. All public APIs return [`Result<T>`].
//!
//! # Error Categories
//!
//! - **Validation**: the search form was empty or malformed; no request was made
//! - **Not Found**: the search endpoint answered 404
//! - **Server / Unexpected**: 500, or any other status the client does not classify
//! - **Forbidden**: 403, treated by callers as an empty, ignorable outcome
//! - **Asset Unavailable**: a manifest could not be fetched or was empty
//! - **Network / JSON / Parse**: transport and decoding failures
//!
//! # Examples
//!
//! ```rust
//! use nasa_media::Error;
//!
//! let error = Error::not_found("search results");
//! assert_eq!(error.user_message(), "No results found. Please try again.");
//! ```

use thiserror::Error;

/// Type alias for Results with media search errors.
///
/// ```rust
/// use nasa_media::{Result, Error};
///
/// fn example_with_error() -> Result<()> {
///     Err(Error::validation("Please enter a search query."))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all media search operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The search form did not pass validation. No request was issued.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The endpoint answered 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The endpoint answered 500 on every attempt.
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// The endpoint answered 403.
    ///
    /// The search page never showed anything for this status, so callers are
    /// expected to treat it as an empty result. See [`Error::is_ignorable`].
    #[error("Forbidden")]
    Forbidden,

    /// Any status code the client does not classify, including 5xx other
    /// than 500.
    #[error("Unexpected HTTP status {0}")]
    Unexpected(u16),

    /// A media manifest could not be fetched, parsed, or was empty.
    ///
    /// The resolver recovers from this locally; it never aborts a page.
    #[error("Asset unavailable: {0}")]
    AssetUnavailable(String),

    /// Rate limiting responses, with the `Retry-After` value when present.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimit { retry_after: Option<u64> },

    /// Network-related errors from HTTP operations.
    ///
    /// Wraps connection failures, DNS errors and request timeouts from the
    /// underlying HTTP client (reqwest).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization and deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data that decoded as JSON but has the wrong shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid configuration values.
    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Creates a not found error with the given message.
    ///
    /// ```rust
    /// use nasa_media::Error;
    ///
    /// let error = Error::not_found("https://images-api.nasa.gov/search?q=zzz");
    /// assert!(matches!(error, Error::NotFound(_)));
    /// ```
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Creates a parse error with the given message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Creates an asset-unavailable error for the given manifest href.
    pub fn asset_unavailable(msg: impl Into<String>) -> Self {
        Error::AssetUnavailable(msg.into())
    }

    /// Creates a rate limit error with optional retry-after time.
    pub fn rate_limit(retry_after: Option<u64>) -> Self {
        Error::RateLimit { retry_after }
    }

    /// Classifies a non-success HTTP status.
    ///
    /// `context` names what was requested and ends up in the
    /// [`NotFound`](Error::NotFound) message.
    ///
    /// ```rust
    /// use nasa_media::Error;
    ///
    /// assert!(matches!(Error::from_status(404, "x"), Error::NotFound(_)));
    /// assert!(matches!(Error::from_status(500, "x"), Error::ServerError { status: 500 }));
    /// assert!(matches!(Error::from_status(403, "x"), Error::Forbidden));
    /// assert!(matches!(Error::from_status(503, "x"), Error::Unexpected(503)));
    /// assert!(matches!(Error::from_status(418, "x"), Error::Unexpected(418)));
    /// ```
    pub fn from_status(status: u16, context: &str) -> Self {
        match status {
            404 => Error::not_found(context),
            403 => Error::Forbidden,
            429 => Error::rate_limit(None),
            500 => Error::ServerError { status },
            other => Error::Unexpected(other),
        }
    }

    /// Returns `true` for outcomes callers should treat as an empty result
    /// rather than report.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Error::Forbidden)
    }

    /// Returns `true` for failures worth retrying: transport errors, 500,
    /// gateway statuses (502-504) and rate limiting.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::ServerError { .. } | Error::RateLimit { .. } => true,
            Error::Unexpected(status) => matches!(status, 502..=504),
            Error::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// The message a front-end shows for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Validation(_) => "Please enter a search query.",
            Error::NotFound(_) => "No results found. Please try again.",
            Error::ServerError { .. } => "Internal server error. Please try again.",
            Error::AssetUnavailable(_) => "Media unavailable.",
            _ => "An error occurred. Please try again.",
        }
    }
}
