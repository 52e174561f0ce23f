//! Rich terminal output formatting

use super::grade::format_grade;
use crate::models::{CertificateNode, ProbeResult, ScoreReport};
use console::style;

/// Points available per scoring category
const CATEGORY_MAX_POINTS: u32 = 20;

fn header(title: &str) -> String {
    format!("\n{}\n\n", style(format!("━━━ {} ━━━", title)).cyan().bold())
}

/// Format a complete scan summary
pub fn format_report(probe: &ProbeResult, report: &ScoreReport, verbose: bool) -> String {
    let mut out = String::new();

    out.push_str(&header("Target"));
    out.push_str(&format!(
        "  {} {}:{} ({})\n",
        style("•").cyan(),
        style(probe.domain.as_str()).bold(),
        probe.port,
        probe.ip
    ));
    out.push_str(&format!(
        "  {} Scanned at {}\n",
        style("ℹ").blue(),
        probe.scanned_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out.push_str(&header("Protocols"));
    for support in &probe.protocols {
        let status = if support.supported {
            style("Supported").green()
        } else {
            style("Not supported").red()
        };
        out.push_str(&format!("  {:<8} {}\n", support.protocol.to_string(), status));
        if verbose {
            if let Some(error) = &support.error {
                out.push_str(&format!("           {}\n", style(error).dim()));
            }
        }
    }
    let negotiated = probe
        .tls
        .negotiated_version
        .map(|v| v.to_string())
        .unwrap_or_else(|| "none".to_string());
    out.push_str(&format!(
        "  {} Negotiated by default: {}\n",
        style("ℹ").blue(),
        negotiated
    ));

    if !probe.ciphers.is_empty() {
        out.push_str(&header("Cipher Suites"));
        for cipher in &probe.ciphers {
            out.push_str(&format!(
                "  {} {} ({})\n",
                style("•").cyan(),
                cipher.cipher_suite_name,
                cipher.protocol_version
            ));
        }
    }

    out.push_str(&header("Certificate Chain"));
    if probe.certificate_chain.is_empty() {
        out.push_str(&format!("  {}\n", style("No certificate observed").yellow()));
    }
    for (i, node) in probe.certificate_chain.iter().enumerate() {
        out.push_str(&format_chain_node(i, node, verbose));
    }

    out.push_str(&format_grade(report.grade(), report.score()));

    out.push_str(&format!("\n{}\n", style("Score Breakdown:").bold()));
    for (label, points) in report.breakdown().entries() {
        let icon = if points == CATEGORY_MAX_POINTS {
            style("✓").green()
        } else if points > 0 {
            style("!").yellow()
        } else {
            style("✗").red()
        };
        out.push_str(&format!(
            "  {} {}: {}/{}\n",
            icon,
            style(label).bold(),
            points,
            CATEGORY_MAX_POINTS
        ));
    }

    if !report.recommendations().is_empty() {
        out.push_str(&format!("\n{}\n", style("Recommendations:").bold()));
        for recommendation in report.recommendations() {
            out.push_str(&format!("  {} {}\n", style("→").yellow(), recommendation));
        }
    }

    if !report.notes().is_empty() {
        out.push_str(&format!("\n{}\n", style("Notes:").bold()));
        for note in report.notes() {
            out.push_str(&format!("  {} {}\n", style("ℹ").blue(), note));
        }
    }

    out
}

fn format_chain_node(index: usize, node: &CertificateNode, verbose: bool) -> String {
    let prefix = if index == 0 { "└─ [Leaf]" } else { "└─ [Issuer]" };
    let indent = "   ".repeat(index);
    let algorithm = node
        .signature_algorithm_name
        .as_deref()
        .unwrap_or("unknown signature");
    let hash = node.signature_hash_algorithm.as_deref().unwrap_or("-");

    let mut line = format!(
        "{}{} {} {}\n",
        indent,
        style(prefix).cyan(),
        style(node.subject.display_name()).bold(),
        style(format!("({}, {})", algorithm, hash)).dim()
    );
    if verbose {
        let key = node
            .public_key_bit_length
            .map(|bits| format!("{} bits", bits))
            .unwrap_or_else(|| "unknown".to_string());
        line.push_str(&format!("{}      Subject: {}\n", indent, node.subject));
        line.push_str(&format!("{}      Issuer:  {}\n", indent, node.issuer));
        line.push_str(&format!("{}      Key:     {}\n", indent, key));
    }
    line
}

/// Print a complete scan summary
pub fn print_report(probe: &ProbeResult, report: &ScoreReport, verbose: bool) {
    print!("{}", format_report(probe, report, verbose));
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}
