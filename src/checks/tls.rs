//! TLS capability prober
//!
//! Drives raw handshakes against a resolved address with an explicit SNI
//! name. Certificate verification is always disabled: the goal is to observe
//! what a server offers, including expired and self-signed chains, not to
//! authenticate it.
//!
//! Only TLS 1.2 and TLS 1.3 can be probed. rustls implements nothing older,
//! so SSLv3, TLS 1.0 and TLS 1.1 support can neither be confirmed nor ruled
//! out; the scoring engine carries a disclaimer for this.
//!
//! rustls also offers only ECDHE AEAD suites for TLS 1.2. When a pinned
//! TLS 1.2 handshake fails, a plaintext hello offering static RSA, DHE and
//! CBC suites (see [`super::hello`]) decides whether the server speaks
//! TLS 1.2 at all.

use super::hello::{self, TLS12_VERSION};
use crate::config::settings::ProbeSettings;
use crate::models::{CipherObservation, ProtocolSupport, TlsProtocol};
use crate::utils::SslError;
use futures::future::join_all;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{
    ClientConfig, DigitallySignedStruct, Error as RustlsError, SignatureScheme,
    SupportedProtocolVersion,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

static TLS12_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS12];
static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS13];

/// A certificate verifier that accepts any certificate.
///
/// The scheme list includes the SHA-1 schemes rustls leaves out of its own
/// verifiers. Without them, a TLS 1.2 server that signs its key exchange
/// with RSA-SHA1 or ECDSA-SHA1 aborts the handshake, and its TLS 1.2
/// support and chain would go unreported.
#[derive(Debug)]
struct AcceptAnyCertVerifier;

impl ServerCertVerifier for AcceptAnyCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA1,
            SignatureScheme::ECDSA_SHA1_Legacy,
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
            SignatureScheme::ED448,
        ]
    }
}

/// Facts from one completed handshake
#[derive(Debug, Clone)]
pub struct Handshake {
    pub protocol: Option<TlsProtocol>,
    /// IANA cipher suite name
    pub cipher_suite: Option<String>,
    /// Certificates in the order the server presented them (DER encoded)
    pub certificate_chain: Vec<Vec<u8>>,
}

/// Per-version capability results
#[derive(Debug, Clone, Default)]
pub struct CapabilityReport {
    pub min_version: Option<TlsProtocol>,
    pub protocols: Vec<ProtocolSupport>,
    pub ciphers: Vec<CipherObservation>,
}

/// TLS handshake prober
pub struct TlsProber {
    settings: ProbeSettings,
    provider: Arc<CryptoProvider>,
}

impl TlsProber {
    /// Create a new prober with the given settings
    pub fn new(settings: ProbeSettings) -> Self {
        Self {
            settings,
            provider: Arc::new(rustls::crypto::ring::default_provider()),
        }
    }

    pub fn port(&self) -> u16 {
        self.settings.port
    }

    /// Attempt one handshake per probed version, each pinned to
    /// `min = max = version`.
    ///
    /// A failed attempt only marks that version unsupported. Attempts share
    /// no state and run concurrently. TLS 1.2 falls back to the legacy hello
    /// before being marked unsupported; the rustls error is kept if both fail.
    pub async fn probe_versions(&self, ip: IpAddr, server_name: &str) -> CapabilityReport {
        let attempts = TlsProtocol::PROBED.iter().map(|&protocol| async move {
            let outcome = self.attempt(ip, server_name, protocol).await;
            (protocol, outcome)
        });

        let mut report = CapabilityReport::default();

        // join_all keeps input order, so versions are visited ascending
        for (protocol, outcome) in join_all(attempts).await {
            match outcome {
                Ok(handshake) => {
                    tracing::debug!("{} supported by {} ({})", protocol, server_name, ip);
                    if report.min_version.is_none() {
                        report.min_version = Some(protocol);
                    }
                    if let Some(cipher) = handshake.cipher_suite {
                        report
                            .ciphers
                            .push(CipherObservation::new(protocol, cipher));
                    }
                    report.protocols.push(ProtocolSupport::supported(protocol));
                }
                Err(e) => {
                    tracing::debug!("{} not supported by {} ({}): {}", protocol, server_name, ip, e);
                    report
                        .protocols
                        .push(ProtocolSupport::unsupported(protocol, e.to_string()));
                }
            }
        }

        report
    }

    async fn attempt(
        &self,
        ip: IpAddr,
        server_name: &str,
        protocol: TlsProtocol,
    ) -> Result<Handshake, SslError> {
        let error = match self.handshake(ip, server_name, Some(protocol)).await {
            Ok(handshake) => return Ok(handshake),
            Err(e) => e,
        };
        if protocol != TlsProtocol::Tls12 {
            return Err(error);
        }

        match self.legacy_tls12_handshake(ip, server_name).await {
            Ok(handshake) => {
                tracing::debug!(
                    "{} ({}) accepted TLS 1.2 only with a legacy suite",
                    server_name,
                    ip
                );
                Ok(handshake)
            }
            Err(legacy) => {
                tracing::trace!("Legacy TLS 1.2 hello to {} failed: {}", server_name, legacy);
                Err(error)
            }
        }
    }

    /// Perform one handshake, optionally pinned to a single protocol version.
    ///
    /// Connects to `ip` while sending `server_name` as SNI. Connect and
    /// handshake are each bounded by the configured timeouts.
    pub async fn handshake(
        &self,
        ip: IpAddr,
        server_name: &str,
        pinned: Option<TlsProtocol>,
    ) -> Result<Handshake, SslError> {
        let connector = TlsConnector::from(Arc::new(self.client_config(pinned)?));

        let name = ServerName::try_from(server_name.to_string()).map_err(|_| {
            SslError::ConfigurationError {
                message: format!("Invalid server name: {}", server_name),
            }
        })?;

        let stream = self.connect(ip).await?;

        let tls_stream = tokio::time::timeout(
            self.settings.handshake_timeout(),
            connector.connect(name, stream),
        )
        .await
        .map_err(|_| SslError::HandshakeTimeout)?
        .map_err(|e| SslError::HandshakeFailed {
            message: e.to_string(),
        })?;

        let (_, connection) = tls_stream.get_ref();

        let protocol = match connection.protocol_version() {
            Some(rustls::ProtocolVersion::TLSv1_3) => Some(TlsProtocol::Tls13),
            Some(rustls::ProtocolVersion::TLSv1_2) => Some(TlsProtocol::Tls12),
            _ => None,
        };

        let cipher_suite = connection
            .negotiated_cipher_suite()
            .map(|cs| iana_cipher_suite_name(&format!("{:?}", cs.suite())));

        let certificate_chain = connection
            .peer_certificates()
            .map(|certs| certs.iter().map(|c| c.as_ref().to_vec()).collect())
            .unwrap_or_default();

        Ok(Handshake {
            protocol,
            cipher_suite,
            certificate_chain,
        })
    }

    /// TLS 1.2 hello offering only the suites rustls lacks.
    ///
    /// Reads the server's plaintext reply and stops before key exchange.
    /// Yields the chosen suite and the presented chain.
    pub async fn legacy_tls12_handshake(
        &self,
        ip: IpAddr,
        server_name: &str,
    ) -> Result<Handshake, SslError> {
        let mut random = [0u8; 32];
        self.provider
            .secure_random
            .fill(&mut random)
            .map_err(|_| SslError::ConfigurationError {
                message: "secure random source unavailable".to_string(),
            })?;
        let client_hello = hello::build_client_hello(Some(server_name), &random);

        let mut stream = self.connect(ip).await?;
        let reply = tokio::time::timeout(self.settings.handshake_timeout(), async {
            stream
                .write_all(&client_hello)
                .await
                .map_err(|e| SslError::HandshakeFailed {
                    message: e.to_string(),
                })?;
            hello::read_hello_reply(&mut stream).await
        })
        .await
        .map_err(|_| SslError::HandshakeTimeout)??;

        let hello::ServerHello {
            version,
            cipher_suite,
        } = reply.server_hello;
        if version != TLS12_VERSION {
            return Err(SslError::HandshakeFailed {
                message: format!("server answered with version {:#06x}", version),
            });
        }
        let name = hello::cipher_suite_name(cipher_suite).ok_or_else(|| {
            SslError::HandshakeFailed {
                message: format!("server chose unoffered cipher suite {:#06x}", cipher_suite),
            }
        })?;

        Ok(Handshake {
            protocol: Some(TlsProtocol::Tls12),
            cipher_suite: Some(name.to_string()),
            certificate_chain: reply.certificate_chain,
        })
    }

    async fn connect(&self, ip: IpAddr) -> Result<TcpStream, SslError> {
        let port = self.settings.port;
        let addr = SocketAddr::new(ip, port);
        tokio::time::timeout(self.settings.connect_timeout(), TcpStream::connect(addr))
            .await
            .map_err(|_| SslError::ConnectTimeout { ip, port })?
            .map_err(|e| SslError::ConnectionError {
                ip,
                port,
                message: e.to_string(),
            })
    }

    fn client_config(&self, pinned: Option<TlsProtocol>) -> Result<ClientConfig, SslError> {
        let versions: &[&'static SupportedProtocolVersion] = match pinned {
            Some(TlsProtocol::Tls12) => TLS12_ONLY,
            Some(TlsProtocol::Tls13) => TLS13_ONLY,
            None => rustls::ALL_VERSIONS,
        };

        let config = ClientConfig::builder_with_provider(Arc::clone(&self.provider))
            .with_protocol_versions(versions)
            .map_err(|e| SslError::ConfigurationError {
                message: e.to_string(),
            })?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertVerifier))
            .with_no_client_auth();

        Ok(config)
    }
}

/// rustls names TLS 1.3 suites `TLS13_*`; the registry spelling is `TLS_*`
pub fn iana_cipher_suite_name(rustls_name: &str) -> String {
    match rustls_name.strip_prefix("TLS13_") {
        Some(rest) => format!("TLS_{}", rest),
        None => rustls_name.to_string(),
    }
}
