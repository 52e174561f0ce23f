//! Validated target host name

use crate::utils::DomainError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A normalized host name: scheme, credentials, port and path stripped,
/// lowercased, trailing dot removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    /// Normalize and validate user input such as `https://Example.COM/path`
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let mut host = input.trim();

        if let Some((_, rest)) = host.split_once("://") {
            host = rest;
        }

        let end = host
            .find(|c| matches!(c, '/' | '?' | '#'))
            .unwrap_or(host.len());
        host = &host[..end];

        if let Some((_, rest)) = host.rsplit_once('@') {
            host = rest;
        }

        if let Some((name, port)) = host.rsplit_once(':') {
            if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) {
                host = name;
            }
        }

        let host = host.trim_end_matches('.').to_ascii_lowercase();
        validate(&host)?;
        Ok(Self(host))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate(host: &str) -> Result<(), DomainError> {
    if host.is_empty() {
        return Err(DomainError::Empty);
    }
    if host.len() > MAX_DOMAIN_LEN {
        return Err(DomainError::TooLong { length: host.len() });
    }

    for label in host.split('.') {
        if label.is_empty()
            || label.len() > MAX_LABEL_LEN
            || label.starts_with('-')
            || label.ends_with('-')
        {
            return Err(DomainError::InvalidLabel {
                label: label.to_string(),
            });
        }
        if let Some(character) = label
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(DomainError::InvalidCharacter { character });
        }
    }

    Ok(())
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Domain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
