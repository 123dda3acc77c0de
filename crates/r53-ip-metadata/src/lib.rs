// # Instance Metadata Source
//
// Reads values from the EC2 instance metadata service
// (`http://169.254.169.254/latest/meta-data/` by default).
//
// ## Purpose
//
// Lets the CLI point a record at the machine it runs on: the public or
// private IPv4 address comes from `public-ipv4` / `local-ipv4`.
//
// ## Notes
//
// - The service is only reachable from inside an instance; elsewhere
//   every lookup fails with `Error::Metadata` once the timeout expires
// - Requests are not signed

use async_trait::async_trait;
use r53_core::traits::MetadataSource;
use r53_core::{Error, Result};
use std::time::Duration;

/// Default HTTP timeout for metadata lookups
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Instance metadata service client
#[derive(Debug, Clone)]
pub struct InstanceMetadata {
    /// Base URL, always ending in `/`
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl InstanceMetadata {
    /// Create a metadata source for `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create with a custom request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::config(format!(
                "Metadata URL must use HTTP or HTTPS scheme. Got: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: normalize_base(&base_url),
            client,
        })
    }

    /// URL of one metadata key
    pub fn url_for(&self, key: &str) -> String {
        format!("{}{}", self.base_url, key.trim_start_matches('/'))
    }
}

fn normalize_base(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

#[async_trait]
impl MetadataSource for InstanceMetadata {
    async fn get_metadata(&self, key: &str) -> Result<String> {
        let url = self.url_for(key);
        tracing::debug!("Reading instance metadata {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::metadata(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::metadata(format!(
                "GET {} returned status {}",
                url,
                response.status()
            )));
        }

        let value = response
            .text()
            .await
            .map_err(|e| Error::metadata(format!("Failed to read {}: {}", url, e)))?;

        Ok(value.trim().to_string())
    }
}
