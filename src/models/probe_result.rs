//! Probe result types

use super::{CertificateNode, Domain};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::net::IpAddr;

/// TLS protocol versions the prober can negotiate.
///
/// Nothing below TLS 1.2 is listed: the rustls client stack has no TLS 1.0,
/// TLS 1.1 or SSLv3 implementation, so legacy versions can never be probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TlsProtocol {
    #[serde(rename = "TLSv1.2")]
    Tls12,
    #[serde(rename = "TLSv1.3")]
    Tls13,
}

impl TlsProtocol {
    /// Every probed version, in ascending order
    pub const PROBED: [TlsProtocol; 2] = [TlsProtocol::Tls12, TlsProtocol::Tls13];
}

impl fmt::Display for TlsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsProtocol::Tls12 => write!(f, "TLS 1.2"),
            TlsProtocol::Tls13 => write!(f, "TLS 1.3"),
        }
    }
}

/// Minimum accepted and freely negotiated protocol versions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsVersions {
    /// Lowest probed version that completed a handshake
    pub min_version: Option<TlsProtocol>,
    /// Version chosen by the server when no constraint was applied
    pub negotiated_version: Option<TlsProtocol>,
}

/// Outcome of a single pinned-version handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolSupport {
    pub protocol: TlsProtocol,
    pub supported: bool,
    /// Why the handshake failed, when it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProtocolSupport {
    pub fn supported(protocol: TlsProtocol) -> Self {
        Self {
            protocol,
            supported: true,
            error: None,
        }
    }

    pub fn unsupported(protocol: TlsProtocol, error: impl Into<String>) -> Self {
        Self {
            protocol,
            supported: false,
            error: Some(error.into()),
        }
    }
}

/// Cipher suite negotiated while a protocol version was pinned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CipherObservation {
    pub protocol_version: TlsProtocol,
    /// IANA cipher suite name, e.g. `TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256`
    pub cipher_suite_name: String,
}

impl CipherObservation {
    pub fn new(protocol_version: TlsProtocol, cipher_suite_name: impl Into<String>) -> Self {
        Self {
            protocol_version,
            cipher_suite_name: cipher_suite_name.into(),
        }
    }

    /// Whether the suite name advertises an ephemeral (EC)DHE key exchange
    pub fn has_ephemeral_key_exchange(&self) -> bool {
        // "DHE" also matches "ECDHE"
        self.cipher_suite_name.contains("DHE")
    }
}

/// Everything observed about one target during a scan
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub domain: Domain,
    pub ip: IpAddr,
    pub port: u16,
    pub tls: TlsVersions,
    /// One entry per attempted protocol version, ascending
    pub protocols: Vec<ProtocolSupport>,
    pub ciphers: Vec<CipherObservation>,
    /// Ordered leaf to root; empty when no certificate was presented
    pub certificate_chain: Vec<CertificateNode>,
    pub scanned_at: DateTime<Utc>,
}

impl ProbeResult {
    /// An empty result for a target, before any handshake facts are known
    pub fn new(domain: Domain, ip: IpAddr, port: u16) -> Self {
        Self {
            domain,
            ip,
            port,
            tls: TlsVersions::default(),
            protocols: Vec::new(),
            ciphers: Vec::new(),
            certificate_chain: Vec::new(),
            scanned_at: Utc::now(),
        }
    }

    /// Whether any probed protocol version completed a handshake
    pub fn any_protocol_supported(&self) -> bool {
        self.protocols.iter().any(|p| p.supported)
    }
}
