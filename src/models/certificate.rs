//! Certificate chain node types

use serde::Serialize;
use std::fmt;

/// Distinguished Name components
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistinguishedName {
    pub common_name: Option<String>,
    pub organization: Option<String>,
    pub organizational_unit: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
}

impl DistinguishedName {
    /// Best single label for display: CN, then O, then the full DN
    pub fn display_name(&self) -> String {
        self.common_name
            .clone()
            .or_else(|| self.organization.clone())
            .unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(cn) = &self.common_name {
            parts.push(format!("CN={}", cn));
        }
        if let Some(o) = &self.organization {
            parts.push(format!("O={}", o));
        }
        if let Some(ou) = &self.organizational_unit {
            parts.push(format!("OU={}", ou));
        }
        if let Some(c) = &self.country {
            parts.push(format!("C={}", c));
        }
        if let Some(st) = &self.state {
            parts.push(format!("ST={}", st));
        }
        if let Some(l) = &self.locality {
            parts.push(format!("L={}", l));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// One certificate of the presented chain, as observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateNode {
    pub subject: DistinguishedName,
    pub issuer: DistinguishedName,
    /// Registry name of the signature algorithm, or its numeric OID when
    /// unregistered; `None` when the DER could not be decoded
    pub signature_algorithm_name: Option<String>,
    /// Canonical hash label (`SHA-256`), `Unknown`, or `None` when the
    /// signature algorithm itself is unresolved
    pub signature_hash_algorithm: Option<String>,
    pub public_key_bit_length: Option<u32>,
}
