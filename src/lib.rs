//! tls-posture library
//!
//! Probes a server's TLS configuration and grades its readiness for
//! post-quantum cryptography:
//! - Per-version handshakes (TLS 1.2, TLS 1.3) with cipher observation
//! - Certificate chain walking with signature algorithm decoding
//! - A pure scoring engine producing a graded report
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tls_posture::{checks::Prober, scoring, Domain, OidRegistry, Settings};
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = Settings::default();
//!     let prober = Prober::new(&settings, Arc::new(OidRegistry::builtin()));
//!     let domain = Domain::parse("example.com").unwrap();
//!     let probe = prober.probe(&domain).await.unwrap();
//!     let report = scoring::score(&probe);
//!     println!("{} ({})", report.grade(), report.score());
//! }
//! ```

pub mod certificate;
pub mod checks;
pub mod cli;
pub mod config;
pub mod models;
pub mod output;
pub mod scoring;
pub mod utils;

// Re-export commonly used types
pub use certificate::OidRegistry;
pub use cli::Cli;
pub use config::Settings;
pub use models::{Domain, Grade, ProbeResult, ScoreReport};
pub use utils::{Result, ToolkitError};
