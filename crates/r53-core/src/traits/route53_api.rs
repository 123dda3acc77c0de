// # Route 53 API Trait
//
// Defines the operations the CLI performs against Route 53.
//
// ## Implementations
//
// - Legacy signed HTTPS transport: `r53-client` crate
//
// ## Usage
//
// ```rust,ignore
// use r53_core::Route53Api;
// use r53_core::record::{RecordType, ResourceRecord};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let api = /* Route53Api implementation */;
//
//     let zone = api.get_zone("example.com").await?.expect("zone exists");
//     let record = ResourceRecord::new("www.example.com", RecordType::A, 300, ["1.2.3.4"]);
//     api.create_resource_record_set(&zone.id, record).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::change_batch::{ChangeBatch, ChangeBatchBuilder};
use crate::record::{ChangeInfo, HostedZone, ResourceRecord};

/// Result of an upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// Record set did not exist and was created
    Created {
        /// Submitted change
        change: ChangeInfo,
    },
    /// Record set existed with different values or TTL and was replaced
    Updated {
        /// The record set as it was before the replace
        previous: ResourceRecord,
        /// Submitted change
        change: ChangeInfo,
    },
    /// Record set already matched (no request was sent)
    Unchanged {
        /// The current record set
        current: ResourceRecord,
    },
}

/// Trait for Route 53 transports
///
/// Implementors provide the three remote calls. Creating, replacing and
/// upserting are built on top of them and always go through
/// [`ChangeBatchBuilder`], so every implementation submits replacements
/// as DELETE followed by CREATE.
///
/// # Errors
///
/// Implementations must not retry, and must not log-and-continue: a
/// rejected batch is returned as an [`Error`](crate::Error).
///
/// # Thread Safety
///
/// Implementations must be usable across async tasks.
#[async_trait]
pub trait Route53Api: Send + Sync {
    /// List every hosted zone of the account (all pages)
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>, crate::Error>;

    /// List every resource record set of a zone (all pages)
    ///
    /// # Parameters
    ///
    /// - `hosted_zone_id`: Zone id, with or without the `/hostedzone/` prefix
    async fn list_resource_record_sets(
        &self,
        hosted_zone_id: &str,
    ) -> Result<Vec<ResourceRecord>, crate::Error>;

    /// Submit a change batch as one atomic request
    ///
    /// # Returns
    ///
    /// - `Ok(ChangeInfo)`: The batch was accepted
    /// - `Err(Error)`: The batch was rejected or never reached Route 53
    async fn submit_changes(
        &self,
        hosted_zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, crate::Error>;

    /// Find the first zone whose name starts with `domain_name`
    /// (case-insensitive)
    async fn get_zone(&self, domain_name: &str) -> Result<Option<HostedZone>, crate::Error> {
        let prefix = domain_name.to_lowercase();
        let zones = self.list_hosted_zones().await?;
        Ok(zones
            .into_iter()
            .find(|zone| zone.name.to_lowercase().starts_with(&prefix)))
    }

    /// Create a new record set
    async fn create_resource_record_set(
        &self,
        hosted_zone_id: &str,
        new_record: ResourceRecord,
    ) -> Result<ChangeInfo, crate::Error> {
        let batch = ChangeBatchBuilder::build_create(new_record);
        batch.validate()?;
        self.submit_changes(hosted_zone_id, &batch).await
    }

    /// Replace an existing record set in one atomic batch
    ///
    /// `old_record` must match the existing set exactly (name, type, TTL
    /// and values), otherwise Route 53 rejects the DELETE.
    async fn replace_resource_record_set(
        &self,
        hosted_zone_id: &str,
        old_record: ResourceRecord,
        new_record: ResourceRecord,
    ) -> Result<ChangeInfo, crate::Error> {
        let batch = ChangeBatchBuilder::build_replace(old_record, new_record);
        batch.validate()?;
        self.submit_changes(hosted_zone_id, &batch).await
    }

    /// Make the zone hold exactly `record` for its (name, type)
    ///
    /// - No set with that name and type → create it
    /// - Set exists with the same TTL and values → `Unchanged`, nothing sent
    /// - Set exists and differs → replace the listed set with `record`
    async fn upsert_resource_record_set(
        &self,
        hosted_zone_id: &str,
        record: ResourceRecord,
    ) -> Result<UpdateResult, crate::Error> {
        record.validate()?;

        let existing = self
            .list_resource_record_sets(hosted_zone_id)
            .await?
            .into_iter()
            .find(|current| current.same_set(&record));

        match existing {
            None => {
                tracing::debug!(
                    "No {} record set for {}, creating",
                    record.record_type,
                    record.name
                );
                let change = self.create_resource_record_set(hosted_zone_id, record).await?;
                Ok(UpdateResult::Created { change })
            }
            Some(current) if same_content(&current, &record) => {
                tracing::debug!(
                    "{} record set for {} already up to date",
                    record.record_type,
                    record.name
                );
                Ok(UpdateResult::Unchanged { current })
            }
            Some(current) => {
                let change = self
                    .replace_resource_record_set(hosted_zone_id, current.clone(), record)
                    .await?;
                Ok(UpdateResult::Updated {
                    previous: current,
                    change,
                })
            }
        }
    }
}

/// TTL equal and the same values regardless of order
fn same_content(current: &ResourceRecord, desired: &ResourceRecord) -> bool {
    if current.ttl != desired.ttl {
        return false;
    }
    let mut a: Vec<&str> = current.values.iter().map(|v| v.trim()).collect();
    let mut b: Vec<&str> = desired.values.iter().map(|v| v.trim()).collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}
