//! Legacy `AWS3-HTTPS` request signing
//!
//! Every request to Route 53 carries two headers:
//!
//! - `x-amz-date`: a date string issued by Route 53 itself
//! - `X-Amzn-Authorization`: an HMAC-SHA1 over that exact date string,
//!   keyed with the secret access key
//!
//! The date comes from [`SigningDateCache`] so it is fetched once and
//! reused. The local clock is never used.

mod date_cache;

pub use date_cache::SigningDateCache;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::sync::Arc;

use crate::config::Credentials;
use crate::Result;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the provider-issued date
pub const DATE_HEADER: &str = "x-amz-date";

/// Header carrying the signature
pub const AUTHORIZATION_HEADER: &str = "X-Amzn-Authorization";

/// Compute the `X-Amzn-Authorization` header value
///
/// `AWS3-HTTPS AWSAccessKeyId=<escaped id>,Algorithm=HmacSHA1,Signature=<base64>`
///
/// The access key id is percent-encoded (everything outside
/// `A-Z a-z 0-9 - _ . ~` is escaped).
pub fn compute_authorization_header(secret_key: &[u8], date: &str, access_key_id: &str) -> String {
    let mut mac = HmacSha1::new_from_slice(secret_key).expect("HMAC can take key of any size");
    mac.update(date.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    format!(
        "AWS3-HTTPS AWSAccessKeyId={},Algorithm=HmacSHA1,Signature={}",
        urlencoding::encode(access_key_id),
        signature
    )
}

/// Header pair for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// Value of `x-amz-date`
    pub date: String,
    /// Value of `X-Amzn-Authorization`
    pub authorization: String,
}

impl SignedHeaders {
    /// Header name/value pairs, ready to attach to a request
    pub fn pairs(&self) -> [(&'static str, &str); 2] {
        [
            (DATE_HEADER, self.date.as_str()),
            (AUTHORIZATION_HEADER, self.authorization.as_str()),
        ]
    }
}

/// Signs requests with one credential pair
///
/// Cloning a signer shares its date cache.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
    dates: Arc<SigningDateCache>,
}

impl Signer {
    /// Create a signer over `dates`
    pub fn new(credentials: Credentials, dates: Arc<SigningDateCache>) -> Self {
        Self { credentials, dates }
    }

    /// The provider date used for signing (fetched on first use)
    pub async fn signing_date(&self) -> Result<String> {
        self.dates.get_or_fetch().await
    }

    /// Authorization header value for `date`
    pub fn authorization_for(&self, date: &str) -> String {
        compute_authorization_header(
            self.credentials.secret_access_key.as_bytes(),
            date,
            &self.credentials.access_key_id,
        )
    }

    /// Both headers for the next request
    pub async fn sign(&self) -> Result<SignedHeaders> {
        let date = self.signing_date().await?;
        let authorization = self.authorization_for(&date);
        Ok(SignedHeaders {
            date,
            authorization,
        })
    }
}
