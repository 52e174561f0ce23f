//! Custom error types for tls-posture
//!
//! This module defines domain-specific error types using `thiserror` for
//! the failure modes of a posture scan. Only resolution and input errors are
//! fatal for a scan; handshake and decoding errors are recorded and recovered
//! by the caller.

use std::net::IpAddr;
use thiserror::Error;

/// Top-level error type for the tls-posture application
#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("DNS resolution error: {0}")]
    Dns(#[from] DnsError),

    #[error("Invalid domain: {0}")]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// DNS resolution errors
#[derive(Error, Debug)]
pub enum DnsError {
    #[error("No address records found for domain: {domain}")]
    NoRecords { domain: String },

    #[error("DNS query timed out for {domain}")]
    Timeout { domain: String },

    #[error("DNS resolution failed for {domain}: {message}")]
    ResolutionFailed { domain: String, message: String },

    #[error("System resolver unavailable: {message}")]
    ResolverUnavailable { message: String },
}

/// SSL/TLS handshake errors, scoped to a single connection attempt
#[derive(Error, Debug)]
pub enum SslError {
    #[error("TCP connection to {ip}:{port} failed: {message}")]
    ConnectionError {
        ip: IpAddr,
        port: u16,
        message: String,
    },

    #[error("TCP connection to {ip}:{port} timed out")]
    ConnectTimeout { ip: IpAddr, port: u16 },

    #[error("TLS handshake timed out")]
    HandshakeTimeout,

    #[error("TLS handshake failed: {message}")]
    HandshakeFailed { message: String },

    #[error("TLS configuration error: {message}")]
    ConfigurationError { message: String },
}

/// DER decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Asn1Error {
    #[error("truncated TLV header at offset {offset}")]
    TruncatedHeader { offset: usize },

    #[error("indefinite length at offset {offset} is not valid DER")]
    IndefiniteLength { offset: usize },

    #[error("length field of {bytes} bytes at offset {offset} is too wide")]
    LengthTooWide { offset: usize, bytes: usize },

    #[error("declared length {declared} at offset {offset} exceeds the {available} bytes available")]
    LengthOutOfBounds {
        offset: usize,
        declared: usize,
        available: usize,
    },
}

/// Domain validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain is empty")]
    Empty,

    #[error("domain is {length} bytes long, the maximum is 253")]
    TooLong { length: usize },

    #[error("invalid label '{label}'")]
    InvalidLabel { label: String },

    #[error("invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ParseError { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias using ToolkitError
pub type Result<T> = std::result::Result<T, ToolkitError>;
