//! Scan orchestration
//!
//! Resolves the target once, then runs the capability probe and the chain
//! handshake against the same address and SNI name.

use super::dns::{HostResolver, SystemResolver};
use super::tls::TlsProber;
use crate::certificate::{walk_chain, OidRegistry};
use crate::config::Settings;
use crate::models::{Domain, ProbeResult, TlsProtocol};
use crate::utils::DnsError;
use std::sync::Arc;

/// Produces a [`ProbeResult`] for a domain
pub struct Prober {
    resolver: Arc<dyn HostResolver>,
    tls: TlsProber,
    registry: Arc<OidRegistry>,
}

impl Prober {
    /// Create a prober using the system resolver
    pub fn new(settings: &Settings, registry: Arc<OidRegistry>) -> Self {
        Self {
            resolver: Arc::new(SystemResolver::new(settings.probe.dns_timeout())),
            tls: TlsProber::new(settings.probe.clone()),
            registry,
        }
    }

    /// Replace the resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Scan a domain.
    ///
    /// Fails only when the domain cannot be resolved. Unsupported versions,
    /// a failed chain handshake or an absent certificate are all reported
    /// inside the result.
    pub async fn probe(&self, domain: &Domain) -> Result<ProbeResult, DnsError> {
        let host = domain.as_str();
        let ip = self.resolver.resolve(host).await?;
        tracing::info!("Probing {} at {}:{}", host, ip, self.tls.port());

        let (capabilities, chain_handshake) = tokio::join!(
            self.tls.probe_versions(ip, host),
            self.tls.handshake(ip, host, None)
        );

        let tls12_supported = capabilities
            .protocols
            .iter()
            .any(|p| p.protocol == TlsProtocol::Tls12 && p.supported);
        // A server rustls cannot talk to may still answer the legacy hello
        let chain_handshake = match chain_handshake {
            Err(e) if tls12_supported => {
                tracing::debug!("Unconstrained handshake with {} failed: {}", host, e);
                self.tls.legacy_tls12_handshake(ip, host).await
            }
            other => other,
        };

        let mut result = ProbeResult::new(domain.clone(), ip, self.tls.port());
        result.tls.min_version = capabilities.min_version;
        result.protocols = capabilities.protocols;
        result.ciphers = capabilities.ciphers;

        match chain_handshake {
            Ok(handshake) => {
                result.tls.negotiated_version = handshake.protocol;
                result.certificate_chain = walk_chain(&handshake.certificate_chain, &self.registry);
                tracing::debug!(
                    "{} presented {} certificate(s), {} walked",
                    host,
                    handshake.certificate_chain.len(),
                    result.certificate_chain.len()
                );
            }
            Err(e) => {
                tracing::warn!("Unconstrained handshake with {} failed: {}", host, e);
            }
        }

        Ok(result)
    }
}
