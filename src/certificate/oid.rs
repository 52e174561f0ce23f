//! Object identifier registry
//!
//! Maps OIDs to human-readable algorithm and attribute names. OIDs are keyed
//! in space-separated arc form (`1 2 840 113549 1 1 11`); lookups also accept
//! dotted form. The registry is built once, then shared read-only.

use crate::config::settings::OidSettings;
use std::collections::HashMap;
use std::time::Duration;

/// Built-in entries, in dotted form
const BUILTIN_OIDS: &[(&str, &str)] = &[
    // PKCS #1
    ("1.2.840.113549.1.1.1", "rsaEncryption"),
    ("1.2.840.113549.1.1.2", "md2WithRSAEncryption"),
    ("1.2.840.113549.1.1.4", "md5WithRSAEncryption"),
    ("1.2.840.113549.1.1.5", "sha1WithRSAEncryption"),
    ("1.2.840.113549.1.1.10", "rsaPSS"),
    ("1.2.840.113549.1.1.11", "sha256WithRSAEncryption"),
    ("1.2.840.113549.1.1.12", "sha384WithRSAEncryption"),
    ("1.2.840.113549.1.1.13", "sha512WithRSAEncryption"),
    ("1.2.840.113549.1.1.14", "sha224WithRSAEncryption"),
    // ANSI X9.62 / SEC
    ("1.2.840.10045.2.1", "ecPublicKey"),
    ("1.2.840.10045.4.1", "ecdsaWithSHA1"),
    ("1.2.840.10045.4.3.1", "ecdsaWithSHA224"),
    ("1.2.840.10045.4.3.2", "ecdsaWithSHA256"),
    ("1.2.840.10045.4.3.3", "ecdsaWithSHA384"),
    ("1.2.840.10045.4.3.4", "ecdsaWithSHA512"),
    ("1.2.840.10045.3.1.7", "prime256v1"),
    ("1.3.132.0.34", "secp384r1"),
    ("1.3.132.0.35", "secp521r1"),
    // DSA
    ("1.2.840.10040.4.1", "dsa"),
    ("1.2.840.10040.4.3", "dsaWithSha1"),
    ("2.16.840.1.101.3.4.3.2", "dsaWithSha256"),
    // Edwards curves
    ("1.3.101.110", "X25519"),
    ("1.3.101.111", "X448"),
    ("1.3.101.112", "Ed25519"),
    ("1.3.101.113", "Ed448"),
    // Hash algorithms
    ("1.2.840.113549.2.5", "md5"),
    ("1.3.14.3.2.26", "sha1"),
    ("2.16.840.1.101.3.4.2.1", "sha256"),
    ("2.16.840.1.101.3.4.2.2", "sha384"),
    ("2.16.840.1.101.3.4.2.3", "sha512"),
    ("2.16.840.1.101.3.4.2.4", "sha224"),
    // SHA-3 signatures
    ("2.16.840.1.101.3.4.3.10", "ecdsaWithSHA3-256"),
    ("2.16.840.1.101.3.4.3.11", "ecdsaWithSHA3-384"),
    ("2.16.840.1.101.3.4.3.14", "rsaWithSHA3-256"),
    ("2.16.840.1.101.3.4.3.15", "rsaWithSHA3-384"),
    // FIPS 204 / 205 / 203
    ("2.16.840.1.101.3.4.3.17", "id-ml-dsa-44"),
    ("2.16.840.1.101.3.4.3.18", "id-ml-dsa-65"),
    ("2.16.840.1.101.3.4.3.19", "id-ml-dsa-87"),
    ("2.16.840.1.101.3.4.3.20", "id-slh-dsa-sha2-128s"),
    ("2.16.840.1.101.3.4.3.21", "id-slh-dsa-sha2-128f"),
    ("2.16.840.1.101.3.4.3.22", "id-slh-dsa-sha2-192s"),
    ("2.16.840.1.101.3.4.3.23", "id-slh-dsa-sha2-192f"),
    ("2.16.840.1.101.3.4.3.24", "id-slh-dsa-sha2-256s"),
    ("2.16.840.1.101.3.4.3.25", "id-slh-dsa-sha2-256f"),
    ("2.16.840.1.101.3.4.4.1", "id-alg-ml-kem-512"),
    ("2.16.840.1.101.3.4.4.2", "id-alg-ml-kem-768"),
    ("2.16.840.1.101.3.4.4.3", "id-alg-ml-kem-1024"),
    // X.520 attributes
    ("2.5.4.3", "commonName"),
    ("2.5.4.6", "countryName"),
    ("2.5.4.7", "localityName"),
    ("2.5.4.8", "stateOrProvinceName"),
    ("2.5.4.10", "organizationName"),
    ("2.5.4.11", "organizationalUnitName"),
    ("1.2.840.113549.1.9.1", "emailAddress"),
    // Certificate extensions
    ("2.5.29.14", "subjectKeyIdentifier"),
    ("2.5.29.15", "keyUsage"),
    ("2.5.29.17", "subjectAltName"),
    ("2.5.29.19", "basicConstraints"),
    ("2.5.29.31", "cRLDistributionPoints"),
    ("2.5.29.32", "certificatePolicies"),
    ("2.5.29.35", "authorityKeyIdentifier"),
    ("2.5.29.37", "extKeyUsage"),
    ("1.3.6.1.5.5.7.1.1", "authorityInfoAccess"),
    ("1.3.6.1.4.1.11129.2.4.2", "googleSignedCertificateTimestamp"),
];

/// Read-only OID to name mapping
#[derive(Debug, Clone, Default)]
pub struct OidRegistry {
    entries: HashMap<String, String>,
}

impl OidRegistry {
    /// A registry with no entries; every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    /// The compiled-in table
    pub fn builtin() -> Self {
        let entries = BUILTIN_OIDS
            .iter()
            .map(|(oid, name)| (normalize_oid(oid), name.to_string()))
            .collect();
        Self { entries }
    }

    /// Parse a `dumpasn1.cfg` style configuration.
    ///
    /// Entries are `OID = 06 03 55 04 03` (hex DER including tag and length)
    /// followed by `Description = commonName (2 5 4 3)`. Entries whose OID
    /// cannot be decoded are skipped.
    pub fn from_dumpasn1_cfg(text: &str) -> Self {
        let mut entries = HashMap::new();
        let mut current: Option<String> = None;

        for line in text.lines() {
            let line = line.trim();
            if let Some(value) = line.strip_prefix("OID =") {
                current = parse_cfg_oid(value.trim());
            } else if let Some(value) = line.strip_prefix("Description =") {
                if let Some(oid) = current.take() {
                    let name = strip_arc_suffix(value.trim());
                    if !name.is_empty() {
                        entries.insert(oid, name.to_string());
                    }
                }
            }
        }

        Self { entries }
    }

    /// Built-in table, optionally overlaid with a fetched `dumpasn1.cfg`.
    ///
    /// Never fails: a fetch error is logged and the built-in table is used.
    pub async fn load(settings: &OidSettings) -> Self {
        let mut registry = Self::builtin();
        if !settings.fetch_registry {
            return registry;
        }

        match fetch_dumpasn1_cfg(&settings.registry_url, settings.fetch_timeout()).await {
            Ok(text) => {
                let fetched = Self::from_dumpasn1_cfg(&text);
                tracing::info!(
                    "Loaded {} OID descriptions from {}",
                    fetched.len(),
                    settings.registry_url
                );
                registry.merge(fetched);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch OID registry from {}, using built-in table: {}",
                    settings.registry_url,
                    e
                );
            }
        }

        registry
    }

    /// Overlay `other` on top of this registry
    pub fn merge(&mut self, other: OidRegistry) {
        self.entries.extend(other.entries);
    }

    /// Look up an OID in dotted or space-separated form
    pub fn resolve(&self, oid: &str) -> Option<&str> {
        self.entries.get(&normalize_oid(oid)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

async fn fetch_dumpasn1_cfg(url: &str, timeout: Duration) -> Result<String, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

/// Decode the content octets of an OBJECT IDENTIFIER into space-separated arcs.
///
/// Returns `None` for empty input, a dangling continuation byte, or a
/// subidentifier wider than 128 bits.
pub fn decode_oid(content: &[u8]) -> Option<String> {
    let mut subidentifiers: Vec<u128> = Vec::new();
    let mut value: u128 = 0;
    let mut pending = false;

    for &byte in content {
        value = value.checked_mul(128)? | u128::from(byte & 0x7f);
        if byte & 0x80 != 0 {
            pending = true;
        } else {
            subidentifiers.push(value);
            value = 0;
            pending = false;
        }
    }

    if pending {
        return None;
    }

    let (&first, rest) = subidentifiers.split_first()?;
    let (arc1, arc2) = if first < 80 {
        (first / 40, first % 40)
    } else {
        (2, first - 80)
    };

    let arcs: Vec<String> = [arc1, arc2]
        .iter()
        .chain(rest)
        .map(|arc| arc.to_string())
        .collect();
    Some(arcs.join(" "))
}

fn normalize_oid(oid: &str) -> String {
    oid.split(|c: char| c == '.' || c.is_whitespace())
        .filter(|arc| !arc.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_cfg_oid(value: &str) -> Option<String> {
    let bytes = value
        .split_whitespace()
        .map(|b| u8::from_str_radix(b, 16))
        .collect::<Result<Vec<u8>, _>>()
        .ok()?;

    match bytes.as_slice() {
        [0x06, len, content @ ..] if usize::from(*len) == content.len() => decode_oid(content),
        _ => None,
    }
}

/// `sha256WithRSAEncryption (1 2 840 113549 1 1 11)` -> `sha256WithRSAEncryption`
fn strip_arc_suffix(description: &str) -> &str {
    match description.rfind(" (") {
        Some(idx) if description.ends_with(')') => description[..idx].trim_end(),
        _ => description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_sha256_with_rsa() {
        let bytes = [0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B];
        assert_eq!(decode_oid(&bytes).unwrap(), "1 2 840 113549 1 1 11");
    }

    #[test]
    fn test_decode_first_byte_split() {
        assert_eq!(decode_oid(&[0x55, 0x04, 0x03]).unwrap(), "2 5 4 3");
        assert_eq!(decode_oid(&[0x00]).unwrap(), "0 0");
    }

    #[test]
    fn test_decode_large_first_arc_two() {
        // 2.999.3 encodes its first subidentifier (1079) in two bytes
        assert_eq!(decode_oid(&[0x88, 0x37, 0x03]).unwrap(), "2 999 3");
    }

    #[test]
    fn test_decode_rejects_dangling_continuation() {
        assert_eq!(decode_oid(&[0x2A, 0x86]), None);
        assert_eq!(decode_oid(&[]), None);
    }

    #[test]
    fn test_decode_rejects_overflow() {
        let mut bytes = vec![0x2A];
        bytes.extend(std::iter::repeat(0xFF).take(20));
        bytes.push(0x01);
        assert_eq!(decode_oid(&bytes), None);
    }

    #[test]
    fn test_builtin_resolves_dotted_and_spaced() {
        let registry = OidRegistry::builtin();
        assert_eq!(
            registry.resolve("1.2.840.113549.1.1.11"),
            Some("sha256WithRSAEncryption")
        );
        assert_eq!(
            registry.resolve("1 2 840 10045 4 3 2"),
            Some("ecdsaWithSHA256")
        );
        assert_eq!(registry.resolve("1 2 3 4 5"), None);
    }

    #[test]
    fn test_empty_registry_misses() {
        let registry = OidRegistry::empty();
        assert!(registry.is_empty());
        assert_eq!(registry.resolve("2 5 4 3"), None);
    }

    #[test]
    fn test_strip_arc_suffix() {
        assert_eq!(
            strip_arc_suffix("sha256WithRSAEncryption (1 2 840 113549 1 1 11)"),
            "sha256WithRSAEncryption"
        );
        assert_eq!(strip_arc_suffix("commonName"), "commonName");
    }

    #[test]
    fn test_parse_cfg_oid_checks_length() {
        assert_eq!(
            parse_cfg_oid("06 03 55 04 03").as_deref(),
            Some("2 5 4 3")
        );
        assert_eq!(parse_cfg_oid("06 04 55 04 03"), None);
        assert_eq!(parse_cfg_oid("not hex"), None);
    }
}
