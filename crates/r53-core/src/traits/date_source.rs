// # Date Source Trait
//
// The legacy signing scheme signs the provider's own notion of "now",
// not the local clock. A date source fetches that value.
//
// ## Implementations
//
// - `GET <endpoint>/date`: `r53_client::HttpDateSource`

use async_trait::async_trait;

/// Source of provider-issued date strings
///
/// Implementations make one request per call and never cache; caching is
/// owned by [`SigningDateCache`](crate::signer::SigningDateCache).
#[async_trait]
pub trait DateSource: Send + Sync {
    /// Fetch the current provider date (RFC 1123, e.g.
    /// `Mon, 26 Mar 2012 19:37:58 GMT`)
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The `Date` header value
    /// - `Err(Error::Network)`: Endpoint unreachable or non-2xx
    /// - `Err(Error::MissingDateHeader)`: Response carried no `Date` header
    async fn fetch_date(&self) -> Result<String, crate::Error>;

    /// Where the date comes from (for logging)
    fn describe(&self) -> &str;
}
