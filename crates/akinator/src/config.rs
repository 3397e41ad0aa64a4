//! Client configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration for the session client and its HTTP transport.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct ClientConfig {
    /// Region selector used when none is given on the command line.
    default_region: Option<String>,

    /// Page scraped for the ephemeral client identity tokens.
    identity_url: String,

    /// Per-request timeout in seconds.
    timeout_secs: u64,

    /// User agent sent with every request.
    user_agent: String,

    /// Progression at which the CLI offers a guess. Advisory only.
    guess_threshold: f64,

    /// Endpoint overrides keyed by language code (e.g. `en = "srv3.example:9000"`).
    servers: HashMap<String, String>,
}

#[instrument]
fn default_identity_url() -> String {
    "https://en.akinator.com/game".to_string()
}

#[instrument]
fn default_user_agent() -> String {
    concat!("akinator-rs/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_region: None,
            identity_url: default_identity_url(),
            timeout_secs: 10,
            user_agent: default_user_agent(),
            guess_threshold: 85.0,
            servers: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(
            default_region = ?config.default_region,
            overrides = config.servers.len(),
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but cannot be used.
    ///
    /// Run by [`ClientConfig::from_toml`]; configs assembled through the
    /// `with_` setters are checked when a client or transport is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::new("timeout_secs must be positive"));
        }
        if !(0.0..=100.0).contains(&self.guess_threshold) {
            return Err(ConfigError::new(format!(
                "guess_threshold must be within 0..=100, got {}",
                self.guess_threshold
            )));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
