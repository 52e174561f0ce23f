//! JSON output formatter

use crate::models::{ProbeResult, ScoreReport};
use serde::Serialize;

/// Payload of a successful scan
#[derive(Serialize)]
pub struct ScanOutput<'a> {
    pub probe: &'a ProbeResult,
    pub score: &'a ScoreReport,
}

/// Envelope wrapping every JSON response
#[derive(Serialize)]
pub struct JsonEnvelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> JsonEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonEnvelope<()> {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Render a successful scan as pretty JSON
pub fn to_json_output(probe: &ProbeResult, score: &ScoreReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonEnvelope::ok(ScanOutput { probe, score }))
}

/// Print a successful scan as JSON to stdout
pub fn print_json(probe: &ProbeResult, score: &ScoreReport) -> anyhow::Result<()> {
    println!("{}", to_json_output(probe, score)?);
    Ok(())
}

/// Print a failure envelope to stdout
pub fn print_json_error(message: &str) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&JsonEnvelope::failure(message))?;
    println!("{}", json);
    Ok(())
}
