//! Core traits for the r53 workspace
//!
//! - [`Route53Api`]: Zone listing and change submission
//! - [`DateSource`]: Provider-issued dates for request signing
//! - [`MetadataSource`]: Instance metadata lookups

pub mod date_source;
pub mod metadata_source;
pub mod route53_api;

pub use date_source::DateSource;
pub use metadata_source::{LOCAL_IPV4_KEY, MetadataSource, PUBLIC_IPV4_KEY};
pub use route53_api::{Route53Api, UpdateResult};
