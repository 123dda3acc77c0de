//! Configuration types for the r53 workspace
//!
//! Configuration is always passed explicitly at construction time. The
//! library crates never read environment variables or other ambient
//! state; the `r53` binary is the only place that does.

use serde::{Deserialize, Serialize};

/// Route 53 client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route53Config {
    /// Access key pair used for request signing
    pub credentials: Credentials,

    /// Route 53 service endpoint (scheme + host, no trailing path)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API version path segment
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// HTTP timeout for every request (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Base URL of the instance metadata service
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,
}

impl Route53Config {
    /// Create a new configuration with default endpoints
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            metadata_url: default_metadata_url(),
        }
    }

    /// Override the service endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the API version
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Override the HTTP timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Override the instance metadata base URL
    pub fn with_metadata_url(mut self, metadata_url: impl Into<String>) -> Self {
        self.metadata_url = metadata_url.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.credentials.validate()?;

        if !self.endpoint.starts_with("https://") && !self.endpoint.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "Endpoint must use HTTP or HTTPS scheme. Got: {}",
                self.endpoint
            )));
        }

        if self.api_version.is_empty() {
            return Err(crate::Error::config("API version cannot be empty"));
        }

        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Timeout must be > 0"));
        }

        if self.metadata_url.is_empty() {
            return Err(crate::Error::config("Metadata URL cannot be empty"));
        }

        Ok(())
    }

    /// URL of the provider time endpoint used for signing dates
    pub fn date_url(&self) -> String {
        format!("{}/date", self.endpoint.trim_end_matches('/'))
    }

    /// Versioned API base, e.g. `https://route53.amazonaws.com/2013-04-01`
    pub fn api_base(&self) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.api_version.trim_matches('/')
        )
    }

    /// XML namespace for request documents of the configured API version
    pub fn xml_namespace(&self) -> String {
        format!(
            "https://route53.amazonaws.com/doc/{}/",
            self.api_version.trim_matches('/')
        )
    }
}

/// Access key pair
///
/// The Debug implementation does NOT expose the secret key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Access key id (sent in clear, percent-escaped, in the auth header)
    pub access_key_id: String,

    /// Secret access key
    /// ⚠️ NEVER log this value
    pub secret_access_key: String,
}

impl Credentials {
    /// Create a new credential pair
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Validate that both halves are present
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.access_key_id.is_empty() {
            return Err(crate::Error::config("Access key id cannot be empty"));
        }
        if self.secret_access_key.is_empty() {
            return Err(crate::Error::config("Secret access key cannot be empty"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<REDACTED>")
            .finish()
    }
}

fn default_endpoint() -> String {
    "https://route53.amazonaws.com".to_string()
}

fn default_api_version() -> String {
    "2013-04-01".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_metadata_url() -> String {
    "http://169.254.169.254/latest/meta-data/".to_string()
}
