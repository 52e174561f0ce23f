//! CLI argument definitions using clap

use crate::config::Settings;
use crate::models::Domain;
use crate::utils::DomainError;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tls-posture")]
#[command(version)]
#[command(
    about = "Probe a server's TLS configuration and grade its quantum readiness",
    long_about = None
)]
pub struct Cli {
    /// Domain to probe (scheme, path and port are stripped)
    #[arg(value_name = "DOMAIN")]
    pub domain: String,

    /// Connect to this address instead of resolving the domain
    #[arg(long, value_name = "IP")]
    pub ip: Option<IpAddr>,

    /// Port to probe (default: 443, or the config file value)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Connect and handshake timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print a JSON envelope instead of the terminal summary
    #[arg(long)]
    pub json: bool,

    /// Fetch the dumpasn1 OID registry to extend the built-in table
    #[arg(long)]
    pub fetch_oids: bool,

    /// Verbose output (also raises the log level to debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Normalize and validate the domain argument
    pub fn normalized_domain(&self) -> Result<Domain, DomainError> {
        Domain::parse(&self.domain)
    }

    /// Apply command-line overrides on top of file settings
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(port) = self.port {
            settings.probe.port = port;
        }
        if let Some(timeout) = self.timeout {
            settings.probe.connect_timeout_secs = timeout;
            settings.probe.handshake_timeout_secs = timeout;
        }
        if self.fetch_oids {
            settings.oid.fetch_registry = true;
        }
    }
}
