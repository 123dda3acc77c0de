// # Instance Metadata Trait
//
// Looks up values about the host the CLI runs on, typically so a record
// can be pointed at the current machine.
//
// ## Implementations
//
// - EC2 instance metadata service: `r53-ip-metadata` crate

use async_trait::async_trait;
use std::net::IpAddr;

/// Metadata key of the public IPv4 address
pub const PUBLIC_IPV4_KEY: &str = "public-ipv4";

/// Metadata key of the private IPv4 address
pub const LOCAL_IPV4_KEY: &str = "local-ipv4";

/// Trait for instance metadata lookups
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Get the raw metadata value for `key` (e.g. "public-ipv4")
    async fn get_metadata(&self, key: &str) -> Result<String, crate::Error>;

    /// Public IP address of this instance
    async fn public_ip(&self) -> Result<IpAddr, crate::Error> {
        parse_ip(PUBLIC_IPV4_KEY, &self.get_metadata(PUBLIC_IPV4_KEY).await?)
    }

    /// Private IP address of this instance
    async fn local_ip(&self) -> Result<IpAddr, crate::Error> {
        parse_ip(LOCAL_IPV4_KEY, &self.get_metadata(LOCAL_IPV4_KEY).await?)
    }
}

fn parse_ip(key: &str, value: &str) -> Result<IpAddr, crate::Error> {
    let value = value.trim();
    value
        .parse()
        .map_err(|_| crate::Error::metadata(format!("{} is not an IP address: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    #[async_trait]
    impl MetadataSource for Fixed {
        async fn get_metadata(&self, _key: &str) -> Result<String, crate::Error> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn public_ip_is_trimmed_and_parsed() {
        let ip = Fixed("54.1.2.3\n").public_ip().await.unwrap();
        assert_eq!(ip, IpAddr::from([54, 1, 2, 3]));
    }

    #[tokio::test]
    async fn garbage_is_a_metadata_error() {
        let err = Fixed("<html>").local_ip().await.unwrap_err();
        assert!(matches!(err, crate::Error::Metadata(_)));
    }
}
