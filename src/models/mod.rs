//! Data models for tls-posture
//!
//! This module contains the data structures produced by a scan and consumed
//! by the scoring engine and the output formatters.

pub mod certificate;
pub mod domain;
pub mod probe_result;
pub mod score_report;

pub use certificate::{CertificateNode, DistinguishedName};
pub use domain::Domain;
pub use probe_result::{CipherObservation, ProbeResult, ProtocolSupport, TlsProtocol, TlsVersions};
pub use score_report::{Grade, ScoreBreakdown, ScoreReport};
