//! Application settings configuration
//!
//! Defines probe timeouts, the target port, and OID registry refresh.

use crate::utils::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Source of the extended OID description table
pub const DEFAULT_OID_REGISTRY_URL: &str = "https://www.cs.auckland.ac.nz/~pgut001/dumpasn1.cfg";

/// Handshake probing settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_secs: u64,
    #[serde(default = "default_dns_timeout")]
    pub dns_timeout_secs: u64,
}

fn default_port() -> u16 {
    443
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_handshake_timeout() -> u64 {
    10
}

fn default_dns_timeout() -> u64 {
    5
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            connect_timeout_secs: default_connect_timeout(),
            handshake_timeout_secs: default_handshake_timeout(),
            dns_timeout_secs: default_dns_timeout(),
        }
    }
}

impl ProbeSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }
}

/// OID registry settings
#[derive(Debug, Clone, Deserialize)]
pub struct OidSettings {
    /// Overlay the built-in table with a fetched `dumpasn1.cfg`
    #[serde(default)]
    pub fetch_registry: bool,
    #[serde(default = "default_registry_url")]
    pub registry_url: String,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_registry_url() -> String {
    DEFAULT_OID_REGISTRY_URL.to_string()
}

fn default_fetch_timeout() -> u64 {
    10
}

impl Default for OidSettings {
    fn default() -> Self {
        Self {
            fetch_registry: false,
            registry_url: default_registry_url(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl OidSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Application settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub probe: ProbeSettings,
    #[serde(default)]
    pub oid: OidSettings,
}

impl Settings {
    /// Load settings from the default config file
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_path = Path::new("config/default.toml");
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make every probe fail
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "probe.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }
        for (key, value) in [
            ("probe.connect_timeout_secs", self.probe.connect_timeout_secs),
            ("probe.handshake_timeout_secs", self.probe.handshake_timeout_secs),
            ("probe.dns_timeout_secs", self.probe.dns_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "timeout must be at least one second".to_string(),
                });
            }
        }
        Ok(())
    }
}
