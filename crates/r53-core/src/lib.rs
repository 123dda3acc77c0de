// # r53-core
//
// Core library for the r53 Route 53 command-line wrapper.
//
// ## Architecture Overview
//
// - **Signer**: Produces the legacy `AWS3-HTTPS` auth headers from a
//   provider-issued date (cached once) and an HMAC-SHA1 signature
// - **ChangeBatchBuilder**: Turns create/replace intents into ordered
//   change batches (a replace is always DELETE then CREATE)
// - **Route53Api**: Trait for transports; create, replace and upsert are
//   built on its three remote calls
// - **DateSource** / **MetadataSource**: Traits for the remote time
//   endpoint and the instance metadata service
//
// ## Design Principles
//
// 1. **Explicit configuration**: Nothing below the binary reads
//    environment or global state
// 2. **Typed failures**: Every failure is returned, never only logged
// 3. **Library-first**: The CLI is a thin layer over these crates

pub mod change_batch;
pub mod config;
pub mod error;
pub mod record;
pub mod signer;
pub mod traits;

// Re-export core types for convenience
pub use change_batch::{ChangeAction, ChangeBatch, ChangeBatchBuilder, ChangeOperation};
pub use config::{Credentials, Route53Config};
pub use error::{Error, Result};
pub use record::{ChangeInfo, ChangeStatus, HostedZone, RecordType, ResourceRecord};
pub use signer::{SignedHeaders, Signer, SigningDateCache, compute_authorization_header};
pub use traits::{DateSource, MetadataSource, Route53Api, UpdateResult};
