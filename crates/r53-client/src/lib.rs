// # Route 53 Client
//
// HTTPS transport for the Route 53 REST API, signed with the legacy
// `AWS3-HTTPS` scheme.
//
// ## Behavior
//
// - Every request carries `x-amz-date` and `X-Amzn-Authorization` from the
//   shared `Signer`; the signing date is fetched from `<endpoint>/date`
//   once and reused
// - Listings follow pagination until the last page
// - Change batches are posted as XML exactly in builder order
// - Non-2xx answers are parsed and returned as typed errors
// - No retries and no background tasks
//
// ## Security
//
// - The secret key never appears in logs or Debug output
//
// ## API Reference
//
// - List zones: GET `/<version>/hostedzone`
// - List record sets: GET `/<version>/hostedzone/<id>/rrset`
// - Change record sets: POST `/<version>/hostedzone/<id>/rrset`

pub mod date_source;
pub mod xml;

pub use date_source::HttpDateSource;

use async_trait::async_trait;
use r53_core::change_batch::ChangeBatch;
use r53_core::config::Route53Config;
use r53_core::record::{ChangeInfo, HostedZone, ResourceRecord};
use r53_core::signer::{Signer, SigningDateCache};
use r53_core::traits::Route53Api;
use r53_core::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Route 53 client
///
/// Cloning is cheap; clones share the HTTP connection pool and the
/// signing date.
#[derive(Debug, Clone)]
pub struct Route53Client {
    api_base: String,
    namespace: String,
    signer: Signer,
    client: reqwest::Client,
}

impl Route53Client {
    /// Create a client from validated configuration
    ///
    /// The signing date is fetched lazily, on the first request.
    pub fn new(config: &Route53Config) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let dates = Arc::new(SigningDateCache::new(Arc::new(HttpDateSource::new(
            client.clone(),
            config.date_url(),
        ))));
        let signer = Signer::new(config.credentials.clone(), dates);

        Ok(Self::with_signer(config, client, signer))
    }

    /// Create a client around an existing signer and HTTP client
    pub fn with_signer(config: &Route53Config, client: reqwest::Client, signer: Signer) -> Self {
        Self {
            api_base: config.api_base(),
            namespace: config.xml_namespace(),
            signer,
            client,
        }
    }

    fn hosted_zones_url(&self, marker: Option<&str>) -> String {
        let mut url = format!("{}/hostedzone", self.api_base);
        if let Some(marker) = marker {
            url.push_str("?marker=");
            url.push_str(&urlencoding::encode(marker));
        }
        url
    }

    fn rrset_url(&self, hosted_zone_id: &str) -> String {
        format!(
            "{}/hostedzone/{}/rrset",
            self.api_base,
            xml::bare_zone_id(hosted_zone_id)
        )
    }

    fn rrset_page_url(&self, hosted_zone_id: &str, cursor: Option<&xml::RecordSetCursor>) -> String {
        let mut url = self.rrset_url(hosted_zone_id);
        if let Some(cursor) = cursor {
            url.push_str("?name=");
            url.push_str(&urlencoding::encode(&cursor.name));
            if !cursor.record_type.is_empty() {
                url.push_str("&type=");
                url.push_str(&urlencoding::encode(&cursor.record_type));
            }
            if let Some(ref identifier) = cursor.identifier {
                url.push_str("&identifier=");
                url.push_str(&urlencoding::encode(identifier));
            }
        }
        url
    }

    /// Sign and send one request, returning the body of a 2xx answer
    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<String> {
        let headers = self.signer.sign().await?;

        let mut request = request;
        for (name, value) in headers.pairs() {
            request = request.header(name, value);
        }

        tracing::debug!("Route 53 request: {}", what);

        let response = request
            .send()
            .await
            .map_err(|e| Error::network(format!("{} failed: {}", what, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("{}: failed to read response: {}", what, e)))?;

        if !status.is_success() {
            tracing::debug!("Route 53 answered {} for {}", status, what);
            return Err(error_for_status(status.as_u16(), &body));
        }

        Ok(body)
    }
}

/// Fetch pages until the listing ends
///
/// `fetch_page` gets the cursor of the page to fetch (`None` for the
/// first) and returns its items and the cursor of the next page. A cursor
/// equal to the one just used ends the listing.
async fn collect_pages<C, T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>>
where
    C: Clone + PartialEq,
    F: FnMut(Option<C>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<C>)>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<C> = None;

    loop {
        let (page, next) = fetch_page(cursor.clone()).await?;
        items.extend(page);

        match next {
            Some(next) if cursor.as_ref() != Some(&next) => cursor = Some(next),
            Some(_) => {
                tracing::warn!("Listing cursor did not advance, stopping");
                break;
            }
            None => break,
        }
    }

    Ok(items)
}

/// Map a non-2xx Route 53 answer to a typed error
pub fn error_for_status(status: u16, body: &str) -> Error {
    let (code, message) = xml::parse_error(body);
    let detail = if code.is_empty() {
        message.clone()
    } else {
        format!("{}: {}", code, message)
    };

    match status {
        401 | 403 => Error::auth(detail),
        404 => Error::not_found(detail),
        429 => Error::rate_limited(detail),
        _ if code == "NoSuchHostedZone" || code == "NoSuchChange" => Error::not_found(detail),
        _ if code == "Throttling" || code == "PriorRequestNotComplete" => {
            Error::rate_limited(detail)
        }
        _ => Error::api(status, code, message),
    }
}

#[async_trait]
impl Route53Api for Route53Client {
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>> {
        let zones = collect_pages(|marker: Option<String>| async move {
            let url = self.hosted_zones_url(marker.as_deref());
            let body = self
                .send(self.client.get(&url), &format!("GET {}", url))
                .await?;
            let page = xml::parse_hosted_zones(&body)?;
            Ok((page.zones, page.next_marker))
        })
        .await?;

        tracing::debug!("Listed {} hosted zones", zones.len());
        Ok(zones)
    }

    async fn list_resource_record_sets(&self, hosted_zone_id: &str) -> Result<Vec<ResourceRecord>> {
        let records = collect_pages(|cursor: Option<xml::RecordSetCursor>| async move {
            let url = self.rrset_page_url(hosted_zone_id, cursor.as_ref());
            let body = self
                .send(self.client.get(&url), &format!("GET {}", url))
                .await?;
            let page = xml::parse_record_sets(&body)?;
            Ok((page.records, page.next))
        })
        .await?;

        tracing::debug!(
            "Listed {} record sets in zone {}",
            records.len(),
            xml::bare_zone_id(hosted_zone_id)
        );
        Ok(records)
    }

    async fn submit_changes(&self, hosted_zone_id: &str, batch: &ChangeBatch) -> Result<ChangeInfo> {
        batch.validate()?;

        let body = xml::render_change_batch(&self.namespace, batch)?;
        let url = self.rrset_url(hosted_zone_id);

        tracing::info!(
            "Submitting {} change(s) to zone {}",
            batch.len(),
            xml::bare_zone_id(hosted_zone_id)
        );

        let request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/xml")
            .body(body);
        let response = self.send(request, &format!("POST {}", url)).await?;

        let change = xml::parse_change_info(&response)?;
        tracing::info!("Change {} accepted ({})", change.id, change.status);
        Ok(change)
    }
}
