//! Typed errors for the enrichment library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). None of these ever
//! escape the enrichment orchestrator: fetch failures are folded into empty
//! text and the batch always completes.

use thiserror::Error;

/// Errors raised by a [`Session`](crate::session::Session) transport.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The request did not complete within its timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// DNS, connect, TLS or body read failure
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A configured header name or value is not valid HTTP
    #[error("invalid header {name}")]
    InvalidHeader { name: String },
}

/// Errors that can occur while fetching a detail page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The transport failed before a response arrived
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The server answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The record has no detail URL to fetch
    #[error("record has no detail URL")]
    MissingUrl,
}

impl FetchError {
    /// True when the upstream answered but refused or failed the request.
    pub fn is_http_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds a value that does not parse
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Errors from the listings page parser.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The base URL used to resolve relative links does not parse
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for session operations.
pub type SessionResult<T> = std::result::Result<T, SessionError>;
