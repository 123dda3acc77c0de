//! DNS data model: hosted zones, resource records and change status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Caa,
    Cname,
    Ds,
    Mx,
    Naptr,
    Ns,
    Ptr,
    Soa,
    Spf,
    Srv,
    Txt,
}

impl RecordType {
    /// Wire name as Route 53 spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Caa => "CAA",
            RecordType::Cname => "CNAME",
            RecordType::Ds => "DS",
            RecordType::Mx => "MX",
            RecordType::Naptr => "NAPTR",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Soa => "SOA",
            RecordType::Spf => "SPF",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            "CAA" => Ok(RecordType::Caa),
            "CNAME" => Ok(RecordType::Cname),
            "DS" => Ok(RecordType::Ds),
            "MX" => Ok(RecordType::Mx),
            "NAPTR" => Ok(RecordType::Naptr),
            "NS" => Ok(RecordType::Ns),
            "PTR" => Ok(RecordType::Ptr),
            "SOA" => Ok(RecordType::Soa),
            "SPF" => Ok(RecordType::Spf),
            "SRV" => Ok(RecordType::Srv),
            "TXT" => Ok(RecordType::Txt),
            other => Err(crate::Error::invalid_input(format!(
                "Unsupported record type: {}",
                other
            ))),
        }
    }
}

/// One DNS resource record set: a name, a type, a TTL and its values
///
/// Values keep the order they were given in; Route 53 treats the set as
/// unordered but the XML request preserves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Fully-qualified domain name
    pub name: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Record values (e.g. IP addresses)
    pub values: Vec<String>,
}

impl ResourceRecord {
    /// Create a record
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        ttl: u32,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            ttl,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Check the record can be submitted
    pub fn validate(&self) -> crate::Result<()> {
        if normalize_name(&self.name).is_empty() {
            return Err(crate::Error::invalid_input("Record name cannot be empty"));
        }
        if self.name.len() > 255 {
            return Err(crate::Error::invalid_input(format!(
                "Record name too long: {} chars (max 255)",
                self.name.len()
            )));
        }
        if self.values.is_empty() {
            return Err(crate::Error::invalid_input(format!(
                "Record {} ({}) needs at least one value",
                self.name, self.record_type
            )));
        }
        if self.values.iter().any(|v| v.trim().is_empty()) {
            return Err(crate::Error::invalid_input(format!(
                "Record {} ({}) has an empty value",
                self.name, self.record_type
            )));
        }
        Ok(())
    }

    /// Whether `other` names the same record set (name and type)
    pub fn same_set(&self, other: &ResourceRecord) -> bool {
        self.record_type == other.record_type
            && normalize_name(&self.name) == normalize_name(&other.name)
    }
}

/// A hosted zone: the container of all record sets of one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZone {
    /// Zone id without the `/hostedzone/` prefix
    pub id: String,
    /// Zone name as returned by Route 53 (usually with a trailing dot)
    pub name: String,
    /// Caller reference given when the zone was created
    pub caller_reference: Option<String>,
    /// Zone comment
    pub comment: Option<String>,
    /// Whether this is a private (VPC) zone
    pub private_zone: bool,
    /// Number of record sets in the zone
    pub record_set_count: Option<u64>,
}

/// Propagation status of a submitted change batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeStatus {
    /// Accepted, not yet on all authoritative servers
    Pending,
    /// Propagated
    Insync,
}

impl ChangeStatus {
    /// Wire form (`PENDING` or `INSYNC`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Pending => "PENDING",
            ChangeStatus::Insync => "INSYNC",
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(ChangeStatus::Pending),
            "INSYNC" => Ok(ChangeStatus::Insync),
            other => Err(crate::Error::invalid_input(format!(
                "Unknown change status: {}",
                other
            ))),
        }
    }
}

/// Result of submitting a change batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInfo {
    /// Change id without the `/change/` prefix
    pub id: String,
    /// Propagation status
    pub status: ChangeStatus,
    /// When Route 53 accepted the batch
    pub submitted_at: DateTime<Utc>,
    /// Comment echoed back from the batch
    pub comment: Option<String>,
}

/// Normalize a domain name for comparison (escapes decoded, no trailing
/// dot, lowercase)
pub fn normalize_name(name: &str) -> String {
    decode_octal_escapes(name.trim())
        .trim_end_matches('.')
        .to_lowercase()
}

/// Decode the `\NNN` octal escapes Route 53 uses in listed names
///
/// `\052.example.com.` becomes `*.example.com.`. Anything that is not a
/// backslash followed by three octal digits is kept as is.
pub fn decode_octal_escapes(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                if let Ok(byte) = u8::try_from(value) {
                    out.push(byte);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}
