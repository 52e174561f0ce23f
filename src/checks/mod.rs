//! Check modules for tls-posture
//!
//! DNS resolution, TLS handshake probing and the scan orchestration that
//! combines them into a probe result.

pub mod dns;
pub mod hello;
pub mod probe;
pub mod tls;

pub use dns::{FixedResolver, HostResolver, SystemResolver};
pub use probe::Prober;
pub use tls::{CapabilityReport, Handshake, TlsProber};
