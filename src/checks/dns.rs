//! DNS resolution
//!
//! A scan resolves its target exactly once, before any handshake, so every
//! connection of the scan lands on the same address.

use crate::utils::DnsError;
use async_trait::async_trait;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::Resolver;
use std::net::IpAddr;
use std::time::Duration;

/// Type alias for the Tokio async resolver
type TokioResolver = Resolver<TokioConnectionProvider>;

/// Resolves a host name to the address a scan connects to
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, host: &str) -> Result<IpAddr, DnsError>;
}

/// Resolver backed by the system DNS configuration
pub struct SystemResolver {
    timeout: Duration,
}

impl SystemResolver {
    /// Create a new system resolver with the given query timeout
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> Result<IpAddr, DnsError> {
        let resolver: TokioResolver = TokioResolver::builder_tokio()
            .map_err(|e| DnsError::ResolverUnavailable {
                message: e.to_string(),
            })?
            .build();

        match tokio::time::timeout(self.timeout, resolver.lookup_ip(host)).await {
            Ok(Ok(lookup)) => lookup.iter().next().ok_or_else(|| DnsError::NoRecords {
                domain: host.to_string(),
            }),
            Ok(Err(e)) => Err(DnsError::ResolutionFailed {
                domain: host.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(DnsError::Timeout {
                domain: host.to_string(),
            }),
        }
    }
}

/// Resolver that answers every host with one fixed address.
///
/// Used for `--ip` overrides and for tests against local servers.
pub struct FixedResolver {
    ip: IpAddr,
}

impl FixedResolver {
    pub fn new(ip: IpAddr) -> Self {
        Self { ip }
    }
}

#[async_trait]
impl HostResolver for FixedResolver {
    async fn resolve(&self, _host: &str) -> Result<IpAddr, DnsError> {
        Ok(self.ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_resolver_ignores_host() {
        let resolver = FixedResolver::new("192.0.2.10".parse().unwrap());
        let ip = resolver.resolve("anything.example").await.unwrap();
        assert_eq!(ip, "192.0.2.10".parse::<IpAddr>().unwrap());
    }
}
