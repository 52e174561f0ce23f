//! Certificate chain walking
//!
//! Orders the certificates a server presented from leaf to root by following
//! issuer links. Presentation order is not trusted beyond the leaf: each hop
//! searches the presented set for the certificate whose subject matches the
//! current certificate's issuer.

use super::oid::OidRegistry;
use super::signature::{resolve_signature_algorithm, signature_hash_algorithm};
use crate::models::{CertificateNode, DistinguishedName};
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

/// A presented certificate with the fields needed for linking
struct PresentedCert<'a> {
    der: &'a [u8],
    subject_raw: Option<&'a [u8]>,
    issuer_raw: Option<&'a [u8]>,
    subject: DistinguishedName,
    issuer: DistinguishedName,
    public_key_bits: Option<u32>,
}

impl<'a> PresentedCert<'a> {
    fn parse(der: &'a [u8]) -> Self {
        match X509Certificate::from_der(der) {
            Ok((_, cert)) => Self {
                der,
                // Borrow from the input buffer, not from `cert`
                subject_raw: Some(cert.tbs_certificate.subject.as_raw()),
                issuer_raw: Some(cert.tbs_certificate.issuer.as_raw()),
                subject: extract_distinguished_name(cert.subject()),
                issuer: extract_distinguished_name(cert.issuer()),
                public_key_bits: extract_key_size(&cert),
            },
            Err(e) => {
                tracing::debug!("Failed to parse presented certificate: {}", e);
                Self {
                    der,
                    subject_raw: None,
                    issuer_raw: None,
                    subject: DistinguishedName::default(),
                    issuer: DistinguishedName::default(),
                    public_key_bits: None,
                }
            }
        }
    }

    /// Issuer and subject are the same name (root or self-signed leaf)
    fn is_self_issued(&self) -> bool {
        self.subject_raw.is_some() && self.subject_raw == self.issuer_raw
    }

    fn to_node(&self, registry: &OidRegistry) -> CertificateNode {
        let signature_algorithm_name = resolve_signature_algorithm(self.der, registry);
        let signature_hash_algorithm = signature_hash_algorithm(signature_algorithm_name.as_deref());
        CertificateNode {
            subject: self.subject.clone(),
            issuer: self.issuer.clone(),
            signature_algorithm_name,
            signature_hash_algorithm,
            public_key_bit_length: self.public_key_bits,
        }
    }
}

/// Walk a presented chain from its leaf (the first certificate) to its root.
///
/// The walk ends when the current certificate is self-issued, when its issuer
/// was not presented, or when the next hop would revisit a certificate, so it
/// takes at most `presented.len()` steps on any input.
pub fn walk_chain<C: AsRef<[u8]>>(presented: &[C], registry: &OidRegistry) -> Vec<CertificateNode> {
    let certs: Vec<PresentedCert<'_>> = presented
        .iter()
        .map(|der| PresentedCert::parse(der.as_ref()))
        .collect();

    let mut visited = vec![false; certs.len()];
    let mut nodes = Vec::with_capacity(certs.len());
    let mut current = if certs.is_empty() { None } else { Some(0) };

    while let Some(index) = current {
        visited[index] = true;
        let cert = &certs[index];
        nodes.push(cert.to_node(registry));

        if cert.is_self_issued() {
            break;
        }

        current = cert.issuer_raw.and_then(|issuer| {
            certs
                .iter()
                .enumerate()
                .find(|(i, candidate)| !visited[*i] && candidate.subject_raw == Some(issuer))
                .map(|(i, _)| i)
        });

        if current.is_none() {
            tracing::debug!(
                "Chain walk stopped after {} certificate(s): issuer '{}' not presented",
                nodes.len(),
                cert.issuer
            );
        }
    }

    if nodes.len() < certs.len() {
        tracing::debug!(
            "{} presented certificate(s) not linked into the chain",
            certs.len() - nodes.len()
        );
    }

    nodes
}

fn extract_distinguished_name(name: &X509Name<'_>) -> DistinguishedName {
    DistinguishedName {
        common_name: attribute_value(name.iter_common_name().next()),
        organization: attribute_value(name.iter_organization().next()),
        organizational_unit: attribute_value(name.iter_organizational_unit().next()),
        country: attribute_value(name.iter_country().next()),
        state: attribute_value(name.iter_state_or_province().next()),
        locality: attribute_value(name.iter_locality().next()),
    }
}

fn attribute_value(attr: Option<&AttributeTypeAndValue<'_>>) -> Option<String> {
    attr.and_then(|a| a.as_str().ok()).map(str::to_string)
}

fn extract_key_size(cert: &X509Certificate<'_>) -> Option<u32> {
    let spki = cert.public_key();
    let bits = match spki.parsed() {
        Ok(PublicKey::RSA(rsa)) => rsa.key_size(),
        Ok(PublicKey::EC(point)) => point.key_size(),
        Ok(PublicKey::DSA(y)) => y.len() * 8,
        // Ed25519/Ed448 and unrecognised keys: size of the raw key bits
        Ok(_) => spki.subject_public_key.data.len() * 8,
        Err(_) => return None,
    };
    u32::try_from(bits).ok()
}
