use async_trait::async_trait;
use rustls::crypto::{ring, CryptoProvider};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ServerConfig, SupportedCipherSuite, SupportedProtocolVersion};
use std::net::IpAddr;
use std::sync::Arc;
use tls_posture::checks::{FixedResolver, HostResolver, Prober};
use tls_posture::config::{ProbeSettings, Settings};
use tls_posture::models::{CipherObservation, Domain, Grade, TlsProtocol};
use tls_posture::output::to_json_output;
use tls_posture::utils::DnsError;
use tls_posture::{scoring, OidRegistry};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

const CERT: &[u8] = include_bytes!("fixtures/self-signed-rsa.der");
const KEY: &[u8] = include_bytes!("fixtures/self-signed-rsa.key.der");

/// TLS 1.3 only server offering a single cipher suite
async fn spawn_tls13_server() -> u16 {
    spawn_server(
        vec![ring::cipher_suite::TLS13_AES_256_GCM_SHA384],
        &[&rustls::version::TLS13],
    )
    .await
}

/// TLS 1.2 and 1.3 server offering one suite per version
async fn spawn_tls12_and_13_server() -> u16 {
    spawn_server(
        vec![
            ring::cipher_suite::TLS13_AES_128_GCM_SHA256,
            ring::cipher_suite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
        ],
        &[&rustls::version::TLS12, &rustls::version::TLS13],
    )
    .await
}

async fn spawn_server(
    cipher_suites: Vec<SupportedCipherSuite>,
    versions: &[&'static SupportedProtocolVersion],
) -> u16 {
    let provider = CryptoProvider {
        cipher_suites,
        ..ring::default_provider()
    };
    let config = ServerConfig::builder_with_provider(Arc::new(provider))
        .with_protocol_versions(versions)
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(
            vec![CertificateDer::from(CERT.to_vec())],
            PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(KEY.to_vec())),
        )
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                if let Ok(mut tls) = acceptor.accept(stream).await {
                    let _ = tls.shutdown().await;
                }
            });
        }
    });

    port
}

/// Answers every ClientHello with a TLS 1.2 ServerHello choosing
/// TLS_RSA_WITH_AES_128_GCM_SHA256, the fixture certificate and
/// ServerHelloDone, as a server without ECDHE suites would.
async fn spawn_static_rsa_server() -> u16 {
    fn handshake_message(msg_type: u8, body: &[u8]) -> Vec<u8> {
        let mut out = vec![msg_type];
        out.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        out.extend_from_slice(body);
        out
    }

    let mut server_hello = vec![0x03, 0x03];
    server_hello.extend_from_slice(&[0x11; 32]);
    server_hello.push(0);
    server_hello.extend_from_slice(&[0x00, 0x9c]);
    server_hello.push(0);

    let mut certificate = (CERT.len() as u32 + 3).to_be_bytes()[1..].to_vec();
    certificate.extend_from_slice(&(CERT.len() as u32).to_be_bytes()[1..]);
    certificate.extend_from_slice(CERT);

    let mut flight = handshake_message(2, &server_hello);
    flight.extend(handshake_message(11, &certificate));
    flight.extend(handshake_message(14, &[]));

    let mut reply = vec![0x16, 0x03, 0x03];
    reply.extend_from_slice(&(flight.len() as u16).to_be_bytes());
    reply.extend_from_slice(&flight);
    let reply = Arc::new(reply);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let reply = Arc::clone(&reply);
            tokio::spawn(async move {
                let mut header = [0u8; 5];
                if stream.read_exact(&mut header).await.is_err() {
                    return;
                }
                let mut hello = vec![0u8; u16::from_be_bytes([header[3], header[4]]) as usize];
                if stream.read_exact(&mut hello).await.is_err() {
                    return;
                }
                if stream.write_all(&reply).await.is_err() {
                    return;
                }
                let _ = tokio::io::copy(&mut stream, &mut tokio::io::sink()).await;
            });
        }
    });

    port
}

fn local_prober(port: u16) -> Prober {
    let settings = Settings {
        probe: ProbeSettings {
            port,
            connect_timeout_secs: 5,
            handshake_timeout_secs: 5,
            ..ProbeSettings::default()
        },
        ..Settings::default()
    };
    Prober::new(&settings, Arc::new(OidRegistry::builtin()))
        .with_resolver(Arc::new(FixedResolver::new("127.0.0.1".parse().unwrap())))
}

fn localhost() -> Domain {
    Domain::parse("localhost").unwrap()
}

#[tokio::test]
async fn test_tls13_only_server() {
    let port = spawn_tls13_server().await;
    let probe = local_prober(port).probe(&localhost()).await.unwrap();

    assert_eq!(probe.port, port);
    assert_eq!(probe.ip, "127.0.0.1".parse::<IpAddr>().unwrap());
    assert_eq!(probe.tls.min_version, Some(TlsProtocol::Tls13));
    assert_eq!(probe.tls.negotiated_version, Some(TlsProtocol::Tls13));

    assert_eq!(probe.protocols.len(), 2);
    assert_eq!(probe.protocols[0].protocol, TlsProtocol::Tls12);
    assert!(!probe.protocols[0].supported);
    assert!(probe.protocols[0].error.is_some());
    assert_eq!(probe.protocols[1].protocol, TlsProtocol::Tls13);
    assert!(probe.protocols[1].supported);

    assert_eq!(
        probe.ciphers,
        vec![CipherObservation::new(
            TlsProtocol::Tls13,
            "TLS_AES_256_GCM_SHA384"
        )]
    );

    assert_eq!(probe.certificate_chain.len(), 1);
    let leaf = &probe.certificate_chain[0];
    assert_eq!(leaf.subject.common_name.as_deref(), Some("localhost"));
    assert_eq!(leaf.subject, leaf.issuer);
    assert_eq!(
        leaf.signature_algorithm_name.as_deref(),
        Some("sha256WithRSAEncryption")
    );
    assert_eq!(leaf.signature_hash_algorithm.as_deref(), Some("SHA-256"));
    assert_eq!(leaf.public_key_bit_length, Some(2048));

    let report = scoring::score(&probe);
    assert_eq!(report.breakdown().tls_version_hygiene, 20);
    assert_eq!(report.breakdown().forward_secrecy, 20);
    assert_eq!(report.score(), 40);
    assert_eq!(report.grade(), Grade::WeakLegacy);
}

#[tokio::test]
async fn test_tls12_and_13_server() {
    let port = spawn_tls12_and_13_server().await;
    let scan = local_prober(port).probe(&localhost()).await.unwrap();

    assert_eq!(scan.tls.min_version, Some(TlsProtocol::Tls12));
    assert_eq!(scan.tls.negotiated_version, Some(TlsProtocol::Tls13));
    assert!(scan.protocols.iter().all(|p| p.supported && p.error.is_none()));

    // One observation per supported version, ascending
    assert_eq!(
        scan.ciphers,
        vec![
            CipherObservation::new(TlsProtocol::Tls12, "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384"),
            CipherObservation::new(TlsProtocol::Tls13, "TLS_AES_128_GCM_SHA256"),
        ]
    );
    assert_eq!(scan.certificate_chain.len(), 1);

    let report = scoring::score(&scan);
    assert_eq!(report.breakdown().tls_version_hygiene, 15);
    assert_eq!(report.breakdown().forward_secrecy, 20);
    assert_eq!(report.score(), 35);
    assert_eq!(report.grade(), Grade::WeakLegacy);
}

#[tokio::test]
async fn test_static_rsa_only_server() {
    let port = spawn_static_rsa_server().await;
    let scan = local_prober(port).probe(&localhost()).await.unwrap();

    assert_eq!(scan.protocols.len(), 2);
    assert_eq!(scan.protocols[0].protocol, TlsProtocol::Tls12);
    assert!(scan.protocols[0].supported);
    assert_eq!(scan.protocols[1].protocol, TlsProtocol::Tls13);
    assert!(!scan.protocols[1].supported);
    assert_eq!(scan.tls.min_version, Some(TlsProtocol::Tls12));
    assert_eq!(scan.tls.negotiated_version, Some(TlsProtocol::Tls12));

    assert_eq!(
        scan.ciphers,
        vec![CipherObservation::new(
            TlsProtocol::Tls12,
            "TLS_RSA_WITH_AES_128_GCM_SHA256"
        )]
    );

    assert_eq!(scan.certificate_chain.len(), 1);
    assert_eq!(
        scan.certificate_chain[0].subject.common_name.as_deref(),
        Some("localhost")
    );

    let report = scoring::score(&scan);
    assert_eq!(report.breakdown().tls_version_hygiene, 10);
    assert_eq!(report.breakdown().forward_secrecy, 0);
    assert_eq!(report.score(), 10);
    assert_eq!(report.grade(), Grade::Critical);
    assert!(report.notes().iter().any(|n| n.starts_with("CRITICAL")));
    assert!(report
        .recommendations()
        .iter()
        .any(|r| r.starts_with("Enable forward-secret")));
    assert!(report
        .recommendations()
        .iter()
        .any(|r| r.starts_with("Enable TLS 1.3")));
}

#[tokio::test]
async fn test_json_envelope_for_local_scan() {
    let port = spawn_tls13_server().await;
    let probe = local_prober(port).probe(&localhost()).await.unwrap();
    let report = scoring::score(&probe);

    let json: serde_json::Value =
        serde_json::from_str(&to_json_output(&probe, &report).unwrap()).unwrap();
    let data = &json["data"];

    assert_eq!(json["success"], true);
    assert_eq!(data["probe"]["domain"], "localhost");
    assert_eq!(data["probe"]["tls"]["minVersion"], "TLSv1.3");
    assert_eq!(data["probe"]["tls"]["negotiatedVersion"], "TLSv1.3");
    assert_eq!(
        data["probe"]["ciphers"][0]["cipherSuiteName"],
        "TLS_AES_256_GCM_SHA384"
    );
    assert_eq!(
        data["probe"]["certificateChain"][0]["signatureHashAlgorithm"],
        "SHA-256"
    );
    assert_eq!(data["score"]["score"], 40);
    assert_eq!(data["score"]["grade"], "Weak Legacy");
    assert_eq!(data["score"]["breakdown"]["forwardSecrecy"], 20);
}

#[tokio::test]
async fn test_closed_port_yields_empty_result() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let probe = local_prober(port).probe(&localhost()).await.unwrap();

    assert!(!probe.any_protocol_supported());
    assert_eq!(probe.tls.min_version, None);
    assert_eq!(probe.tls.negotiated_version, None);
    assert!(probe.ciphers.is_empty());
    assert!(probe.certificate_chain.is_empty());

    let report = scoring::score(&probe);
    assert_eq!(report.score(), 0);
    assert_eq!(report.grade(), Grade::Critical);
}

struct FailingResolver;

#[async_trait]
impl HostResolver for FailingResolver {
    async fn resolve(&self, host: &str) -> Result<IpAddr, DnsError> {
        Err(DnsError::NoRecords {
            domain: host.to_string(),
        })
    }
}

#[tokio::test]
async fn test_resolution_failure_is_fatal() {
    let prober = local_prober(443).with_resolver(Arc::new(FailingResolver));
    let err = prober
        .probe(&Domain::parse("nonexistent.invalid").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, DnsError::NoRecords { ref domain } if domain == "nonexistent.invalid"));
}
