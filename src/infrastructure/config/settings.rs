//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application
//! settings. Configuration is loaded from a TOML file; Telegram credentials
//! come from the environment only.
//!
//! # Example
//!
//! ```no_run
//! use dustsweep::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::general::GeneralConfig;
use super::logging::LoggingConfig;
use super::scenario::{BridgeConfig, CollectorConfig, SellConfig, SenderConfig, TokenSenderConfig};
use super::telegram::TelegramAppConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Sections for scenarios that need a chain or token (`token_sender`,
/// `bridge`, `sell`) are optional; the matching scenario refuses to start
/// without them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub collector: CollectorConfig,

    #[serde(default)]
    pub sender: SenderConfig,

    #[serde(default)]
    pub token_sender: Option<TokenSenderConfig>,

    #[serde(default)]
    pub bridge: Option<BridgeConfig>,

    #[serde(default)]
    pub sell: Option<SellConfig>,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Telegram notification configuration.
    #[serde(default)]
    pub telegram: TelegramAppConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or any section
    /// fails validation.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate every section, building each policy once.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        self.general.validate()?;
        self.logging.validate()?;
        self.collector.policy()?;
        self.sender.policy()?;
        if let Some(bridge) = &self.bridge {
            bridge.policy()?;
        }
        if let Some(sell) = &self.sell {
            sell.policy()?;
        }
        if let Some(token_sender) = &self.token_sender {
            if token_sender.routes.is_empty() {
                return Err(ConfigError::MissingField {
                    field: "token_sender.routes",
                }
                .into());
            }
        }
        Ok(())
    }

    /// The `[token_sender]` section, required by the `send-token` scenario.
    #[allow(clippy::result_large_err)]
    pub fn token_sender(&self) -> std::result::Result<&TokenSenderConfig, ConfigError> {
        self.token_sender
            .as_ref()
            .ok_or(ConfigError::MissingField { field: "token_sender" })
    }

    /// The `[bridge]` section, required by the `bridge` scenario.
    #[allow(clippy::result_large_err)]
    pub fn bridge(&self) -> std::result::Result<&BridgeConfig, ConfigError> {
        self.bridge
            .as_ref()
            .ok_or(ConfigError::MissingField { field: "bridge" })
    }

    /// The `[sell]` section, required by the `sell` scenario.
    #[allow(clippy::result_large_err)]
    pub fn sell(&self) -> std::result::Result<&SellConfig, ConfigError> {
        self.sell
            .as_ref()
            .ok_or(ConfigError::MissingField { field: "sell" })
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
