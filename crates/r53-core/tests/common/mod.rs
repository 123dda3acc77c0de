//! Test doubles and common utilities for contract tests
//!
//! These doubles count and record calls so tests can assert on what was
//! sent without any network.

#![allow(dead_code)]

use r53_core::change_batch::ChangeBatch;
use r53_core::error::{Error, Result};
use r53_core::record::{ChangeInfo, ChangeStatus, HostedZone, RecordType, ResourceRecord};
use r53_core::traits::{DateSource, Route53Api};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const GOLDEN_DATE: &str = "Mon, 26 Mar 2012 19:37:58 GMT";

/// What a `CountingDateSource` answers with
#[derive(Clone)]
pub enum DateReply {
    Date(String),
    Unreachable,
    NoDateHeader,
}

/// A DateSource that counts fetches
pub struct CountingDateSource {
    reply: Mutex<DateReply>,
    fetch_count: Arc<AtomicUsize>,
    delay: Duration,
}

impl CountingDateSource {
    pub fn new(date: &str) -> Self {
        Self::with_reply(DateReply::Date(date.to_string()))
    }

    pub fn with_reply(reply: DateReply) -> Self {
        Self {
            reply: Mutex::new(reply),
            fetch_count: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
        }
    }

    /// Make every fetch take `delay` (to widen race windows)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Change what later fetches answer with
    pub fn set_reply(&self, reply: DateReply) {
        *self.reply.lock().unwrap() = reply;
    }

    /// Get the number of times fetch_date() was called
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DateSource for CountingDateSource {
    async fn fetch_date(&self) -> Result<String> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            DateReply::Date(date) => Ok(date),
            DateReply::Unreachable => Err(Error::network("connection refused")),
            DateReply::NoDateHeader => Err(Error::missing_date_header("test://date")),
        }
    }

    fn describe(&self) -> &str {
        "test://date"
    }
}

/// A Route53Api that serves fixed zones and record sets and records
/// every submitted batch
pub struct RecordingRoute53 {
    zones: Vec<HostedZone>,
    record_sets: Mutex<Vec<ResourceRecord>>,
    submitted: Arc<Mutex<Vec<(String, ChangeBatch)>>>,
    list_call_count: Arc<AtomicUsize>,
    reject_with: Mutex<Option<String>>,
}

impl RecordingRoute53 {
    pub fn new() -> Self {
        Self {
            zones: Vec::new(),
            record_sets: Mutex::new(Vec::new()),
            submitted: Arc::new(Mutex::new(Vec::new())),
            list_call_count: Arc::new(AtomicUsize::new(0)),
            reject_with: Mutex::new(None),
        }
    }

    pub fn with_zones(mut self, zones: Vec<HostedZone>) -> Self {
        self.zones = zones;
        self
    }

    pub fn with_record_sets(self, record_sets: Vec<ResourceRecord>) -> Self {
        *self.record_sets.lock().unwrap() = record_sets;
        self
    }

    /// Reject every later submission with an InvalidChangeBatch error
    pub fn reject_submissions(&self, message: &str) {
        *self.reject_with.lock().unwrap() = Some(message.to_string());
    }

    /// Batches submitted so far, with the zone they were sent to
    pub fn submitted(&self) -> Vec<(String, ChangeBatch)> {
        self.submitted.lock().unwrap().clone()
    }

    /// Get the number of times list_resource_record_sets() was called
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Route53Api for RecordingRoute53 {
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>> {
        Ok(self.zones.clone())
    }

    async fn list_resource_record_sets(&self, _hosted_zone_id: &str) -> Result<Vec<ResourceRecord>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.record_sets.lock().unwrap().clone())
    }

    async fn submit_changes(&self, hosted_zone_id: &str, batch: &ChangeBatch) -> Result<ChangeInfo> {
        if let Some(message) = self.reject_with.lock().unwrap().clone() {
            return Err(Error::api(400, "InvalidChangeBatch", message));
        }

        let mut submitted = self.submitted.lock().unwrap();
        submitted.push((hosted_zone_id.to_string(), batch.clone()));

        Ok(ChangeInfo {
            id: format!("C{:04}", submitted.len()),
            status: ChangeStatus::Pending,
            submitted_at: chrono::DateTime::parse_from_rfc3339("2012-03-26T19:37:58Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
            comment: batch.comment().map(str::to_string),
        })
    }
}

/// Helper to build a hosted zone
pub fn zone(id: &str, name: &str) -> HostedZone {
    HostedZone {
        id: id.to_string(),
        name: name.to_string(),
        caller_reference: None,
        comment: None,
        private_zone: false,
        record_set_count: None,
    }
}

/// Helper to build a single-value A record
pub fn a_record(name: &str, ttl: u32, ip: &str) -> ResourceRecord {
    ResourceRecord::new(name, RecordType::A, ttl, [ip])
}
