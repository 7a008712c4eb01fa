//! Error types for fetchsave
//!
//! The `Display` output of [`FetchError`] is the exact message surfaced to
//! callers in an error-shaped [`FetchResult`](crate::FetchResult).

use thiserror::Error;

/// Errors that can occur during a fetch-and-persist operation
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is not an absolute http(s) URL
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    /// Download directory could not be created
    #[error("Failed to create download directory: {0}")]
    CreateDirectory(#[source] std::io::Error),

    /// A pipeline stage failed after the directory was ready
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: StageError,
    },

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client: {0}")]
    ClientBuildError(#[source] reqwest::Error),
}

impl FetchError {
    pub(crate) fn stage(url: &str, source: impl Into<StageError>) -> Self {
        FetchError::Fetch {
            url: url.to_string(),
            source: source.into(),
        }
    }
}

/// Failure of a single stage between directory setup and persistence
#[derive(Debug, Error)]
pub enum StageError {
    /// Target resolved to a private or internal address
    #[error("Fetcher blocked an attempt to fetch a private IP {0}. This is to prevent a security vulnerability where a local agent could fetch privileged local IPs and exfiltrate data.")]
    PrivateIp(String),

    /// Server answered with a non-success status
    #[error("HTTP error: {0}")]
    HttpStatus(u16),

    /// Redirect chain exceeded the hop limit
    #[error("Too many redirects (limit: {0})")]
    TooManyRedirects(usize),

    /// Caller supplied a header that is not valid HTTP
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Persisting the transformed content failed
    #[error("{0}")]
    Write(#[source] std::io::Error),
}

/// Errors raised by the HTTP transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("Failed to connect to server: {0}")]
    Connect(String),

    /// Reading the response body failed
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// Other request error
    #[error("Request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Errors raised while converting a response body
#[derive(Debug, Error)]
pub enum TransformError {
    /// Body is not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// HTML could not be converted
    #[error("Failed to convert HTML: {0}")]
    Html(String),
}
