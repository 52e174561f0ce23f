//! Configuration module for tls-posture
//!
//! Handles loading settings from TOML files.

pub mod settings;

pub use settings::{OidSettings, ProbeSettings, Settings, DEFAULT_OID_REGISTRY_URL};

use crate::utils::ConfigError;
use std::path::Path;

/// Load settings from an explicit file, or from the default path when none
/// is given
pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
    match path {
        Some(path) => Settings::load_from_file(path),
        None => Settings::load_default(),
    }
}
