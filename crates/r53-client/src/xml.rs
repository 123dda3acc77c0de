//! Route 53 XML documents
//!
//! Requests are written event by event so element order is exactly the
//! order of the change batch. Responses are read with serde; elements the
//! CLI does not use are ignored.

use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use r53_core::change_batch::ChangeBatch;
use r53_core::record::{ChangeInfo, HostedZone, RecordType, ResourceRecord};
use r53_core::{Error, Result};
use serde::Deserialize;

const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";
const CHANGE_PREFIX: &str = "/change/";

/// Strip the `/hostedzone/` prefix Route 53 puts on zone ids
pub fn bare_zone_id(id: &str) -> &str {
    id.trim().trim_start_matches(HOSTED_ZONE_PREFIX)
}

// ---------------------------------------------------------------------------
// Request rendering

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::xml(format!("Failed to write request: {}", e)))
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.event(Event::Start(BytesStart::new(name)))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| Error::xml(format!("Request is not UTF-8: {}", e)))
    }
}

/// Render a `ChangeResourceRecordSetsRequest` document
///
/// Changes are written in batch order; record values in record order.
pub fn render_change_batch(namespace: &str, batch: &ChangeBatch) -> Result<String> {
    let mut out = XmlOut::new();

    out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("ChangeResourceRecordSetsRequest");
    root.push_attribute(("xmlns", namespace));
    out.event(Event::Start(root))?;

    out.start("ChangeBatch")?;
    if let Some(comment) = batch.comment() {
        out.text_element("Comment", comment)?;
    }

    out.start("Changes")?;
    for op in batch.changes() {
        out.start("Change")?;
        out.text_element("Action", op.action.as_str())?;
        write_record_set(&mut out, &op.record)?;
        out.end("Change")?;
    }
    out.end("Changes")?;

    out.end("ChangeBatch")?;
    out.end("ChangeResourceRecordSetsRequest")?;

    out.finish()
}

fn write_record_set(out: &mut XmlOut, record: &ResourceRecord) -> Result<()> {
    out.start("ResourceRecordSet")?;
    out.text_element("Name", &record.name)?;
    out.text_element("Type", record.record_type.as_str())?;
    out.text_element("TTL", &record.ttl.to_string())?;
    out.start("ResourceRecords")?;
    for value in &record.values {
        out.start("ResourceRecord")?;
        out.text_element("Value", value)?;
        out.end("ResourceRecord")?;
    }
    out.end("ResourceRecords")?;
    out.end("ResourceRecordSet")
}

// ---------------------------------------------------------------------------
// Response parsing

#[derive(Debug, Deserialize)]
struct ListHostedZonesXml {
    #[serde(rename = "HostedZones", default)]
    hosted_zones: HostedZonesXml,
    #[serde(rename = "IsTruncated", default)]
    is_truncated: bool,
    #[serde(rename = "NextMarker")]
    next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct HostedZonesXml {
    #[serde(rename = "HostedZone", default)]
    hosted_zone: Vec<HostedZoneXml>,
}

#[derive(Debug, Deserialize)]
struct HostedZoneXml {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "CallerReference")]
    caller_reference: Option<String>,
    #[serde(rename = "Config")]
    config: Option<HostedZoneConfigXml>,
    #[serde(rename = "ResourceRecordSetCount")]
    resource_record_set_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct HostedZoneConfigXml {
    #[serde(rename = "Comment")]
    comment: Option<String>,
    #[serde(rename = "PrivateZone")]
    private_zone: Option<bool>,
}

/// One page of hosted zones
#[derive(Debug)]
pub struct HostedZonePage {
    pub zones: Vec<HostedZone>,
    /// Marker for the next page, when the listing is truncated
    pub next_marker: Option<String>,
}

/// Parse a `ListHostedZonesResponse` document
pub fn parse_hosted_zones(body: &str) -> Result<HostedZonePage> {
    let parsed: ListHostedZonesXml = quick_xml::de::from_str(body)
        .map_err(|e| Error::xml(format!("Failed to parse hosted zones: {}", e)))?;

    let zones = parsed
        .hosted_zones
        .hosted_zone
        .into_iter()
        .map(|zone| {
            let (comment, private_zone) = match zone.config {
                Some(config) => (config.comment, config.private_zone.unwrap_or(false)),
                None => (None, false),
            };
            HostedZone {
                id: bare_zone_id(&zone.id).to_string(),
                name: zone.name,
                caller_reference: zone.caller_reference,
                comment,
                private_zone,
                record_set_count: zone.resource_record_set_count,
            }
        })
        .collect();

    let next_marker = if parsed.is_truncated {
        parsed.next_marker.filter(|m| !m.is_empty())
    } else {
        None
    };

    Ok(HostedZonePage { zones, next_marker })
}

#[derive(Debug, Deserialize)]
struct ListResourceRecordSetsXml {
    #[serde(rename = "ResourceRecordSets", default)]
    resource_record_sets: ResourceRecordSetsXml,
    #[serde(rename = "IsTruncated", default)]
    is_truncated: bool,
    #[serde(rename = "NextRecordName")]
    next_record_name: Option<String>,
    #[serde(rename = "NextRecordType")]
    next_record_type: Option<String>,
    #[serde(rename = "NextRecordIdentifier")]
    next_record_identifier: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResourceRecordSetsXml {
    #[serde(rename = "ResourceRecordSet", default)]
    resource_record_set: Vec<ResourceRecordSetXml>,
}

#[derive(Debug, Deserialize)]
struct ResourceRecordSetXml {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    record_type: String,
    #[serde(rename = "TTL")]
    ttl: Option<u32>,
    #[serde(rename = "ResourceRecords")]
    resource_records: Option<ResourceRecordsXml>,
    #[serde(rename = "AliasTarget")]
    alias_target: Option<AliasTargetXml>,
}

#[derive(Debug, Default, Deserialize)]
struct ResourceRecordsXml {
    #[serde(rename = "ResourceRecord", default)]
    resource_record: Vec<ResourceRecordXml>,
}

#[derive(Debug, Deserialize)]
struct ResourceRecordXml {
    #[serde(rename = "Value")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AliasTargetXml {
    #[serde(rename = "DNSName")]
    dns_name: String,
}

/// Where the next page of record sets starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSetCursor {
    pub name: String,
    pub record_type: String,
    pub identifier: Option<String>,
}

/// One page of resource record sets
#[derive(Debug)]
pub struct RecordSetPage {
    pub records: Vec<ResourceRecord>,
    /// Start of the next page, when the listing is truncated
    pub next: Option<RecordSetCursor>,
}

/// Parse a `ListResourceRecordSetsResponse` document
///
/// Alias record sets and record types this CLI does not know are
/// skipped.
pub fn parse_record_sets(body: &str) -> Result<RecordSetPage> {
    let parsed: ListResourceRecordSetsXml = quick_xml::de::from_str(body)
        .map_err(|e| Error::xml(format!("Failed to parse resource record sets: {}", e)))?;

    let mut records = Vec::new();
    for set in parsed.resource_record_sets.resource_record_set {
        if let Some(alias) = set.alias_target {
            tracing::debug!(
                "Skipping alias record set {} ({}) -> {}",
                set.name,
                set.record_type,
                alias.dns_name
            );
            continue;
        }

        let record_type: RecordType = match set.record_type.parse() {
            Ok(t) => t,
            Err(_) => {
                tracing::warn!(
                    "Skipping record set {} with unsupported type {}",
                    set.name,
                    set.record_type
                );
                continue;
            }
        };

        let values = set
            .resource_records
            .unwrap_or_default()
            .resource_record
            .into_iter()
            .map(|rr| rr.value)
            .collect();

        records.push(ResourceRecord {
            name: set.name,
            record_type,
            ttl: set.ttl.unwrap_or(0),
            values,
        });
    }

    let next = match (parsed.is_truncated, parsed.next_record_name) {
        (true, Some(name)) => Some(RecordSetCursor {
            name,
            record_type: parsed.next_record_type.unwrap_or_default(),
            identifier: parsed.next_record_identifier,
        }),
        _ => None,
    };

    Ok(RecordSetPage { records, next })
}

#[derive(Debug, Deserialize)]
struct ChangeResponseXml {
    #[serde(rename = "ChangeInfo")]
    change_info: ChangeInfoXml,
}

#[derive(Debug, Deserialize)]
struct ChangeInfoXml {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "SubmittedAt")]
    submitted_at: String,
    #[serde(rename = "Comment")]
    comment: Option<String>,
}

/// Parse a `ChangeResourceRecordSetsResponse` document
pub fn parse_change_info(body: &str) -> Result<ChangeInfo> {
    let parsed: ChangeResponseXml = quick_xml::de::from_str(body)
        .map_err(|e| Error::xml(format!("Failed to parse change info: {}", e)))?;
    let info = parsed.change_info;

    let submitted_at: DateTime<Utc> = DateTime::parse_from_rfc3339(info.submitted_at.trim())
        .map_err(|e| Error::xml(format!("Invalid SubmittedAt '{}': {}", info.submitted_at, e)))?
        .with_timezone(&Utc);

    Ok(ChangeInfo {
        id: info.id.trim().trim_start_matches(CHANGE_PREFIX).to_string(),
        status: info.status.parse()?,
        submitted_at,
        comment: info.comment,
    })
}

#[derive(Debug, Deserialize)]
struct ErrorResponseXml {
    #[serde(rename = "Error")]
    error: Option<ErrorDetailXml>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetailXml {
    #[serde(rename = "Code")]
    code: Option<String>,
    #[serde(rename = "Message")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InvalidChangeBatchXml {
    #[serde(rename = "Messages")]
    messages: Option<MessagesXml>,
    #[serde(rename = "Message")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesXml {
    #[serde(rename = "Message", default)]
    message: Vec<String>,
}

/// Provider error code and message from an error body
///
/// Understands `ErrorResponse` and `InvalidChangeBatch` documents; any
/// other body is returned as the message with an empty code.
pub fn parse_error(body: &str) -> (String, String) {
    if body.contains("<InvalidChangeBatch") {
        if let Ok(parsed) = quick_xml::de::from_str::<InvalidChangeBatchXml>(body) {
            let mut messages = parsed.messages.map(|m| m.message).unwrap_or_default();
            messages.extend(parsed.message);
            return ("InvalidChangeBatch".to_string(), messages.join("; "));
        }
    }

    if body.contains("<ErrorResponse") {
        if let Ok(ErrorResponseXml { error: Some(detail) }) =
            quick_xml::de::from_str::<ErrorResponseXml>(body)
        {
            return (
                detail.code.unwrap_or_default(),
                detail.message.unwrap_or_default(),
            );
        }
    }

    (String::new(), body.trim().to_string())
}
