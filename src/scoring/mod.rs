//! Quantum-readiness scoring
//!
//! Maps probe facts onto fixed categories, sums them, and grades the total.
//! Everything here is pure: the same probe result always yields the same
//! report.

use crate::models::{
    CertificateNode, CipherObservation, ProbeResult, ScoreBreakdown, ScoreReport, TlsProtocol,
};

pub const TLS_VERSION_HYGIENE_MAX: u32 = 20;
pub const FORWARD_SECRECY_MAX: u32 = 20;

/// Attached to every report: the prober cannot negotiate below TLS 1.2
pub const LEGACY_PROTOCOL_DISCLAIMER: &str = "Protocol versions below TLS 1.2 cannot be probed; \
     a low TLS version score does not prove legacy protocol support, only that it could not be ruled out.";

/// Points and commentary produced by one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryScore {
    pub points: u32,
    pub max_points: u32,
    pub recommendations: Vec<String>,
    pub notes: Vec<String>,
}

/// Score a probe result
pub fn score(probe: &ProbeResult) -> ScoreReport {
    let tls = score_tls_versions(probe.tls.min_version, probe.tls.negotiated_version);
    let forward_secrecy = score_forward_secrecy(&probe.ciphers);
    let hybrid_pq = assess_hybrid_key_exchange();
    let certificate_pq = assess_certificate_pq_readiness(&probe.certificate_chain);
    let hash_hygiene = assess_hash_algorithms(&probe.certificate_chain);

    let breakdown = ScoreBreakdown {
        tls_version_hygiene: tls.points,
        forward_secrecy: forward_secrecy.points,
        hybrid_pq_key_exchange: hybrid_pq.points,
        certificate_pq_readiness: certificate_pq.points,
        hash_algorithm_hygiene: hash_hygiene.points,
    };

    let mut recommendations = Vec::new();
    let mut notes = Vec::new();
    for category in [tls, forward_secrecy, hybrid_pq, certificate_pq, hash_hygiene] {
        recommendations.extend(category.recommendations);
        notes.extend(category.notes);
    }

    ScoreReport::new(breakdown, recommendations, notes)
}

/// TLS version hygiene (20 points max)
pub fn score_tls_versions(
    min_version: Option<TlsProtocol>,
    negotiated_version: Option<TlsProtocol>,
) -> CategoryScore {
    use TlsProtocol::{Tls12, Tls13};

    let points = match (min_version, negotiated_version) {
        (Some(Tls13), Some(Tls13)) => 20,
        (Some(Tls12), Some(Tls13)) => 15,
        (Some(Tls12), Some(Tls12)) => 10,
        _ => 0,
    };

    let mut result = CategoryScore {
        points,
        max_points: TLS_VERSION_HYGIENE_MAX,
        ..Default::default()
    };

    if min_version.is_none() {
        result
            .notes
            .push("No probed protocol version (TLS 1.2 or TLS 1.3) completed a handshake.".to_string());
    }
    if negotiated_version == Some(Tls12) {
        result
            .recommendations
            .push("Enable TLS 1.3 so clients negotiate it by default.".to_string());
    }
    result.notes.push(LEGACY_PROTOCOL_DISCLAIMER.to_string());

    result
}

/// Forward-secrecy policy for one observed cipher.
///
/// TLS 1.3 key exchange is always ephemeral, so its suites count as
/// forward-secret even though their names carry no `ECDHE`/`DHE` marker.
pub fn is_forward_secret(observation: &CipherObservation) -> bool {
    observation.protocol_version == TlsProtocol::Tls13 || observation.has_ephemeral_key_exchange()
}

/// Forward secrecy (20 points max)
pub fn score_forward_secrecy(ciphers: &[CipherObservation]) -> CategoryScore {
    let mut result = CategoryScore {
        max_points: FORWARD_SECRECY_MAX,
        ..Default::default()
    };

    if ciphers.is_empty() {
        result
            .notes
            .push("No cipher suites were observed; forward secrecy could not be assessed.".to_string());
        return result;
    }

    let (secret, not_secret): (Vec<&CipherObservation>, Vec<&CipherObservation>) =
        ciphers.iter().partition(|c| is_forward_secret(c));

    let tls13_by_policy: Vec<&str> = secret
        .iter()
        .filter(|c| c.protocol_version == TlsProtocol::Tls13 && !c.has_ephemeral_key_exchange())
        .map(|c| c.cipher_suite_name.as_str())
        .collect();
    if !tls13_by_policy.is_empty() {
        result.notes.push(format!(
            "TLS 1.3 cipher suites counted as forward-secret (TLS 1.3 key exchange is always ephemeral): {}.",
            tls13_by_policy.join(", ")
        ));
    }

    if not_secret.is_empty() {
        result.points = FORWARD_SECRECY_MAX;
    } else if secret.is_empty() {
        result.points = 0;
        result.notes.push(
            "CRITICAL: no observed cipher suite provides forward secrecy; recorded traffic can be \
             decrypted if the server key is ever compromised."
                .to_string(),
        );
        result.recommendations.push(
            "Enable forward-secret (ECDHE) cipher suites and prefer them over static RSA key exchange."
                .to_string(),
        );
    } else {
        result.points = FORWARD_SECRECY_MAX / 2;
        for cipher in not_secret {
            result.recommendations.push(format!(
                "Remove non-forward-secret cipher suite {} ({}).",
                cipher.cipher_suite_name, cipher.protocol_version
            ));
        }
    }

    result
}

/// Hybrid post-quantum key exchange (not scored yet)
pub fn assess_hybrid_key_exchange() -> CategoryScore {
    CategoryScore {
        notes: vec!["Hybrid post-quantum key exchange is not scored yet.".to_string()],
        ..Default::default()
    }
}

/// Certificate post-quantum readiness (not scored yet)
pub fn assess_certificate_pq_readiness(chain: &[CertificateNode]) -> CategoryScore {
    let mut result = CategoryScore::default();

    if chain.is_empty() {
        result.notes.push(
            "No certificate chain was observed; certificate post-quantum readiness is not applicable."
                .to_string(),
        );
        return result;
    }

    let pq_signed: Vec<String> = chain
        .iter()
        .filter(|node| {
            node.signature_algorithm_name
                .as_deref()
                .is_some_and(is_post_quantum_signature)
        })
        .map(|node| node.subject.display_name())
        .collect();
    if !pq_signed.is_empty() {
        result.notes.push(format!(
            "Post-quantum signatures observed on: {}.",
            pq_signed.join(", ")
        ));
    }
    result
        .notes
        .push("Certificate post-quantum readiness is not scored yet.".to_string());

    result
}

/// Hash algorithm hygiene (not scored yet).
///
/// Weak hashes on the chain still produce recommendations.
pub fn assess_hash_algorithms(chain: &[CertificateNode]) -> CategoryScore {
    let mut result = CategoryScore::default();

    if chain.is_empty() {
        result.notes.push(
            "No certificate chain was observed; hash algorithm hygiene is not applicable.".to_string(),
        );
        return result;
    }

    for node in chain {
        let name = node.subject.display_name();
        match (
            node.signature_algorithm_name.as_deref(),
            node.signature_hash_algorithm.as_deref(),
        ) {
            (None, _) => result.notes.push(format!(
                "Signature algorithm of certificate '{}' could not be decoded.",
                name
            )),
            (Some(algorithm), Some("SHA-1")) => result.recommendations.push(format!(
                "Reissue certificate '{}' signed with {}; SHA-1 is broken for signatures.",
                name, algorithm
            )),
            (Some(algorithm), _) if algorithm.to_ascii_lowercase().starts_with("md") => {
                result.recommendations.push(format!(
                    "Reissue certificate '{}' signed with {}; MD-family hashes are broken.",
                    name, algorithm
                ))
            }
            _ => {}
        }
    }
    result
        .notes
        .push("Hash algorithm hygiene is not scored yet.".to_string());

    result
}

fn is_post_quantum_signature(algorithm: &str) -> bool {
    let lower = algorithm.to_ascii_lowercase();
    lower.contains("ml-dsa") || lower.contains("slh-dsa")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tls12(name: &str) -> CipherObservation {
        CipherObservation::new(TlsProtocol::Tls12, name)
    }

    #[test]
    fn test_tls_version_table() {
        use TlsProtocol::{Tls12, Tls13};
        assert_eq!(score_tls_versions(Some(Tls13), Some(Tls13)).points, 20);
        assert_eq!(score_tls_versions(Some(Tls12), Some(Tls13)).points, 15);
        assert_eq!(score_tls_versions(Some(Tls12), Some(Tls12)).points, 10);
        assert_eq!(score_tls_versions(Some(Tls13), Some(Tls12)).points, 0);
        assert_eq!(score_tls_versions(Some(Tls12), None).points, 0);
        assert_eq!(score_tls_versions(None, Some(Tls13)).points, 0);
        assert_eq!(score_tls_versions(None, None).points, 0);
    }

    #[test]
    fn test_tls_disclaimer_always_attached() {
        use TlsProtocol::Tls13;
        for (min, negotiated) in [(Some(Tls13), Some(Tls13)), (None, None)] {
            let result = score_tls_versions(min, negotiated);
            assert!(result
                .notes
                .iter()
                .any(|n| n == LEGACY_PROTOCOL_DISCLAIMER));
        }
    }

    #[test]
    fn test_all_forward_secret() {
        let result = score_forward_secrecy(&[
            tls12("TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256"),
            tls12("TLS_DHE_RSA_WITH_AES_256_GCM_SHA384"),
        ]);
        assert_eq!(result.points, 20);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_partially_forward_secret() {
        let result = score_forward_secrecy(&[
            tls12("TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256"),
            tls12("TLS_RSA_WITH_AES_128_GCM_SHA256"),
        ]);
        assert_eq!(result.points, 10);
        assert_eq!(result.recommendations.len(), 1);
        assert!(result.recommendations[0].contains("TLS_RSA_WITH_AES_128_GCM_SHA256"));
    }

    #[test]
    fn test_no_forward_secrecy() {
        let result = score_forward_secrecy(&[tls12("TLS_RSA_WITH_AES_128_GCM_SHA256")]);
        assert_eq!(result.points, 0);
        assert_eq!(
            result
                .notes
                .iter()
                .filter(|n| n.starts_with("CRITICAL"))
                .count(),
            1
        );
        assert_eq!(result.recommendations.len(), 1);
        assert!(result.recommendations[0].starts_with("Enable forward-secret"));
    }

    #[test]
    fn test_tls13_suite_is_forward_secret_by_policy() {
        let result = score_forward_secrecy(&[CipherObservation::new(
            TlsProtocol::Tls13,
            "TLS_AES_256_GCM_SHA384",
        )]);
        assert_eq!(result.points, 20);
        assert!(result.notes.iter().any(|n| n.contains("TLS_AES_256_GCM_SHA384")));
    }

    #[test]
    fn test_no_ciphers_is_not_applicable() {
        let result = score_forward_secrecy(&[]);
        assert_eq!(result.points, 0);
        assert!(result.recommendations.is_empty());
        assert_eq!(result.notes.len(), 1);
    }

    #[test]
    fn test_post_quantum_signature_detection() {
        assert!(is_post_quantum_signature("id-ml-dsa-65"));
        assert!(is_post_quantum_signature("id-slh-dsa-sha2-128s"));
        assert!(!is_post_quantum_signature("sha256WithRSAEncryption"));
    }
}
