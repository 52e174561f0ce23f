use tls_posture::certificate::OidRegistry;
use tls_posture::config::{OidSettings, Settings};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const SAMPLE_CFG: &str = "\
# dumpasn1 Object Identifier configuration file
#
# Comments and unrelated keys are ignored.

OID = 06 09 2A 86 48 86 F7 0D 01 01 0B
Comment = PKCS #1
Description = sha256WithRSAEncryption (1 2 840 113549 1 1 11)

OID = 06 03 55 04 03
Description = commonName (2 5 4 3)
Warning

OID = 06 05 2B 06 01 04 01
Description = enterprises (1 3 6 1 4 1)

OID = 06 09 2B 06 01 04 01 FF FF FF 7F
Description = madeUpTestAlgorithm
";

#[test]
fn test_dumpasn1_cfg_parsing() {
    let registry = OidRegistry::from_dumpasn1_cfg(SAMPLE_CFG);
    assert_eq!(registry.len(), 4);
    assert_eq!(
        registry.resolve("1 2 840 113549 1 1 11"),
        Some("sha256WithRSAEncryption")
    );
    assert_eq!(registry.resolve("2.5.4.3"), Some("commonName"));
    assert_eq!(registry.resolve("1.3.6.1.4.1"), Some("enterprises"));
    assert_eq!(
        registry.resolve("1.3.6.1.4.1.268435455"),
        Some("madeUpTestAlgorithm")
    );
}

#[test]
fn test_dumpasn1_cfg_skips_malformed_entries() {
    let cfg = "\
OID = 06 05 2A 86
Description = lengthMismatch

OID = zz
Description = notHex

Description = orphanDescription
";
    assert!(OidRegistry::from_dumpasn1_cfg(cfg).is_empty());
}

#[test]
fn test_merge_overrides_builtin_names() {
    let mut registry = OidRegistry::builtin();
    let before = registry.len();
    registry.merge(OidRegistry::from_dumpasn1_cfg(SAMPLE_CFG));

    // Two new entries; the other two replace built-in names
    assert_eq!(registry.len(), before + 2);
    assert_eq!(registry.resolve("2.5.4.3"), Some("commonName"));
    assert_eq!(
        registry.resolve("1.3.6.1.4.1.268435455"),
        Some("madeUpTestAlgorithm")
    );
}

#[tokio::test]
async fn test_load_without_fetch_is_builtin() {
    let registry = OidRegistry::load(&OidSettings::default()).await;
    assert_eq!(registry.len(), OidRegistry::builtin().len());
}

#[tokio::test]
async fn test_unreachable_registry_falls_back_to_builtin() {
    let settings = Settings::load_from_file("tests/fixtures/posture.toml").unwrap();
    assert!(settings.oid.fetch_registry);

    let registry = OidRegistry::load(&settings.oid).await;
    assert_eq!(registry.len(), OidRegistry::builtin().len());
    assert_eq!(
        registry.resolve("1.2.840.113549.1.1.11"),
        Some("sha256WithRSAEncryption")
    );
}

#[tokio::test]
async fn test_fetched_registry_is_merged() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; 4096];
        let _ = socket.read(&mut request).await;
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            SAMPLE_CFG.len(),
            SAMPLE_CFG
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    let settings = OidSettings {
        fetch_registry: true,
        registry_url: format!("http://127.0.0.1:{}/dumpasn1.cfg", port),
        fetch_timeout_secs: 5,
    };
    let registry = OidRegistry::load(&settings).await;

    assert_eq!(registry.len(), OidRegistry::builtin().len() + 2);
    assert_eq!(registry.resolve("1.3.6.1.4.1"), Some("enterprises"));
}
