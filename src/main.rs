//! tls-posture - TLS posture and quantum-readiness prober
//!
//! Connects to a domain, records which TLS versions and cipher suites it
//! accepts, decodes the certificate chain it presents, and grades the result.

use clap::Parser;
use std::sync::Arc;
use tls_posture::checks::{FixedResolver, Prober};
use tls_posture::{config, output, scoring, Cli, OidRegistry, ToolkitError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Install the ring crypto provider for rustls; a second install is harmless
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli).await {
        if cli.json {
            if let Err(print_err) = output::print_json_error(&e.to_string()) {
                output::print_error(&print_err.to_string());
            }
        } else {
            output::print_error(&format!("Error: {}", e));
        }
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    // Handle color preference
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let domain = cli.normalized_domain().map_err(ToolkitError::from)?;

    let mut settings = config::load(cli.config.as_deref()).map_err(ToolkitError::from)?;
    cli.apply_overrides(&mut settings);
    settings.validate().map_err(ToolkitError::from)?;

    let registry = Arc::new(OidRegistry::load(&settings.oid).await);
    tracing::debug!("OID registry holds {} entries", registry.len());

    let mut prober = Prober::new(&settings, registry);
    if let Some(ip) = cli.ip {
        prober = prober.with_resolver(Arc::new(FixedResolver::new(ip)));
    }

    let probe = prober.probe(&domain).await.map_err(ToolkitError::from)?;
    let report = scoring::score(&probe);

    if cli.json {
        output::print_json(&probe, &report)?;
    } else {
        if !probe.any_protocol_supported() {
            output::print_warning(&format!(
                "No TLS handshake with {} succeeded on port {}",
                domain, probe.port
            ));
        }
        output::print_report(&probe, &report, cli.verbose);
    }

    Ok(())
}
