//! Utility modules for tls-posture
//!
//! This module contains the error types shared across the crate.

pub mod error;

pub use error::{Asn1Error, ConfigError, DnsError, DomainError, Result, SslError, ToolkitError};
