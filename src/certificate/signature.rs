//! Signature algorithm resolution
//!
//! Finds the signature algorithm identifier of a DER certificate with the
//! in-house decoder and turns it into a registry name and a hash label.

use super::asn1::{Asn1Tree, NodeId, TAG_OID, TAG_SEQUENCE};
use super::oid::{decode_oid, OidRegistry};

/// Decoded OID of the first SEQUENCE, in document order, that has a direct
/// OBJECT IDENTIFIER child.
///
/// In an X.509 certificate that is the TBSCertificate `signature`
/// AlgorithmIdentifier, which precedes the issuer, subject and extensions.
pub fn find_signature_oid(tree: &Asn1Tree<'_>) -> Option<String> {
    let oid_node = tree
        .depth_first()
        .filter(|(_, node)| node.tag_number() == TAG_SEQUENCE)
        .find_map(|(_, node)| first_oid_child(tree, &node.children))?;
    decode_oid(tree.value(oid_node))
}

fn first_oid_child(tree: &Asn1Tree<'_>, children: &[NodeId]) -> Option<NodeId> {
    children.iter().copied().find(|&child| {
        tree.node(child)
            .is_some_and(|node| node.tag_number() == TAG_OID)
    })
}

/// Signature algorithm name of a DER certificate.
///
/// Unregistered OIDs come back as their numeric arc string. Malformed DER
/// yields `None`.
pub fn resolve_signature_algorithm(der: &[u8], registry: &OidRegistry) -> Option<String> {
    let tree = match Asn1Tree::parse(der) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::debug!("Could not decode certificate DER: {}", e);
            return None;
        }
    };

    let oid = find_signature_oid(&tree)?;
    match registry.resolve(&oid) {
        Some(name) => Some(name.to_string()),
        None => {
            tracing::debug!("Signature algorithm OID {} is not registered", oid);
            Some(oid)
        }
    }
}

/// Canonical hash label for a signature algorithm name.
///
/// `None` when there is no name; `Unknown` when the name carries no
/// `sha<digits>` marker.
pub fn signature_hash_algorithm(algorithm_name: Option<&str>) -> Option<String> {
    let name = algorithm_name?;
    let label = match sha_digits(name) {
        Some("1") => "SHA-1".to_string(),
        Some("256") => "SHA-256".to_string(),
        Some("384") => "SHA-384".to_string(),
        Some("512") => "SHA-512".to_string(),
        Some(bits) => format!("SHA-{}", bits),
        None => "Unknown".to_string(),
    };
    Some(label)
}

/// Digits following the first case-insensitive `sha` that has any
fn sha_digits(name: &str) -> Option<&str> {
    let lower = name.to_ascii_lowercase();
    let mut search_from = 0;

    while let Some(pos) = lower[search_from..].find("sha") {
        let digits_start = search_from + pos + 3;
        let digits_len = lower[digits_start..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits_len > 0 {
            // ASCII lowercasing keeps byte offsets identical
            return name.get(digits_start..digits_start + digits_len);
        }
        search_from = digits_start;
    }

    None
}
