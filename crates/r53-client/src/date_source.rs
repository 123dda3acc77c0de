// # Route 53 Time Endpoint
//
// Route 53 answers any request to `<endpoint>/date` with its own clock in
// the standard `Date` response header. That header value is the signing
// date; the body is ignored.

use async_trait::async_trait;
use r53_core::traits::DateSource;
use r53_core::{Error, Result};
use reqwest::StatusCode;
use reqwest::header::{DATE, HeaderMap};

/// `DateSource` that reads the `Date` header of the Route 53 time endpoint
#[derive(Debug, Clone)]
pub struct HttpDateSource {
    client: reqwest::Client,
    url: String,
}

impl HttpDateSource {
    /// Create a date source for `url` (usually `Route53Config::date_url()`)
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl DateSource for HttpDateSource {
    async fn fetch_date(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("GET {} failed: {}", self.url, e)))?;

        date_from_response(response.status(), response.headers(), &self.url)
    }

    fn describe(&self) -> &str {
        &self.url
    }
}

/// Signing date from a time endpoint answer
///
/// A non-2xx status is a network failure whatever the headers say.
pub fn date_from_response(status: StatusCode, headers: &HeaderMap, url: &str) -> Result<String> {
    if !status.is_success() {
        return Err(Error::network(format!(
            "GET {} returned status {}",
            url, status
        )));
    }

    date_from_headers(headers, url)
}

/// Extract the `Date` header value exactly as sent
pub fn date_from_headers(headers: &HeaderMap, url: &str) -> Result<String> {
    let value = headers
        .get(DATE)
        .ok_or_else(|| Error::missing_date_header(url))?;

    let date = value
        .to_str()
        .map_err(|e| Error::network(format!("{} sent an unreadable Date header: {}", url, e)))?
        .trim();

    if date.is_empty() {
        return Err(Error::missing_date_header(url));
    }

    Ok(date.to_string())
}
