//! Error types for the r53 workspace
//!
//! Every fallible operation in the library crates returns [`Result`].
//! Nothing is swallowed: transport and provider failures surface here
//! and the binary decides how to report them.

use thiserror::Error;

/// Result type alias for r53 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the r53 workspace
#[derive(Error, Debug)]
pub enum Error {
    /// The request never produced a usable response (connect failure,
    /// timeout, non-2xx from the time endpoint)
    #[error("Network error: {0}")]
    Network(String),

    /// The time endpoint answered without a `Date` header
    #[error("Signing date unavailable: {url} returned no Date header")]
    MissingDateHeader {
        /// Time endpoint that was queried
        url: String,
    },

    /// Route 53 rejected the request
    #[error("Route 53 API error ({status}) {code}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider error code (e.g. "InvalidChangeBatch")
        code: String,
        /// Provider error message
        message: String,
    },

    /// Authentication errors (bad signature, unknown key, clock skew)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Zone or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// XML rendering or parsing errors
    #[error("XML error: {0}")]
    Xml(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Instance metadata lookups
    #[error("Instance metadata error: {0}")]
    Metadata(String),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a missing date header error
    pub fn missing_date_header(url: impl Into<String>) -> Self {
        Self::MissingDateHeader { url: url.into() }
    }

    /// Create a provider API error
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an XML error
    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an instance metadata error
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    /// Whether the provider never saw or never accepted the request
    /// because of the transport (as opposed to a rejection of its content)
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::MissingDateHeader { .. })
    }
}
