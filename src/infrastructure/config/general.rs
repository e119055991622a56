//! Run-wide settings shared by every scenario.

use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::adapter::outbound::http::HttpSettings;
use crate::application::orchestrator::ExecutionSettings;
use crate::application::pacing::{PacingSettings, SleepRange};
use crate::application::retry::RetryPolicy;
use crate::error::ConfigError;

const fn default_true() -> bool {
    true
}

const fn default_max_attempts() -> u32 {
    2
}

const fn default_retry_interval_secs() -> u64 {
    10
}

const fn default_gas_gate_max_wait_secs() -> u64 {
    3600
}

const fn default_gas_gate_interval_secs() -> u64 {
    30
}

const fn default_confirmation_timeout_secs() -> u64 {
    180
}

fn default_gas_multiplier() -> Decimal {
    Decimal::new(13, 1)
}

fn default_wallets_file() -> PathBuf {
    PathBuf::from("wallets.txt")
}

const fn default_http_timeout_secs() -> u64 {
    30
}

/// `[general]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Total attempts per step, the first one included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
    #[serde(default = "default_true")]
    pub shuffle_wallets: bool,
    #[serde(default = "default_true")]
    pub shuffle_chains: bool,
    /// Ethereum gas ceiling before a wallet starts; zero disables the gate.
    #[serde(default)]
    pub good_gwei: Decimal,
    #[serde(default = "default_gas_gate_max_wait_secs")]
    pub gas_gate_max_wait_secs: u64,
    #[serde(default = "default_gas_gate_interval_secs")]
    pub gas_gate_interval_secs: u64,
    #[serde(default)]
    pub sleep_between_actions: SleepRange,
    #[serde(default)]
    pub sleep_between_wallets: SleepRange,
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    /// Safety factor on gas cost estimates.
    #[serde(default = "default_gas_multiplier")]
    pub gas_multiplier: Decimal,
    /// One wallet per line: `key` or `key,destination`.
    #[serde(default = "default_wallets_file")]
    pub wallets_file: PathBuf,
    /// HTTP proxies for API calls; the first entry is used.
    #[serde(default)]
    pub proxies: Vec<String>,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Fixed seed for shuffling, pauses and value draws. Random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_interval_secs: default_retry_interval_secs(),
            shuffle_wallets: true,
            shuffle_chains: true,
            good_gwei: Decimal::ZERO,
            gas_gate_max_wait_secs: default_gas_gate_max_wait_secs(),
            gas_gate_interval_secs: default_gas_gate_interval_secs(),
            sleep_between_actions: SleepRange::default(),
            sleep_between_wallets: SleepRange::default(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            gas_multiplier: default_gas_multiplier(),
            wallets_file: default_wallets_file(),
            proxies: Vec::new(),
            http_timeout_secs: default_http_timeout_secs(),
            seed: None,
        }
    }
}

impl GeneralConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.good_gwei < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "general.good_gwei",
                reason: "must be 0 or greater".to_string(),
            });
        }
        if self.good_gwei > Decimal::ZERO && self.gas_gate_max_wait_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.gas_gate_max_wait_secs",
                reason: "must be greater than 0 when good_gwei is set".to_string(),
            });
        }
        if self.gas_multiplier < Decimal::ONE {
            return Err(ConfigError::InvalidValue {
                field: "general.gas_multiplier",
                reason: "must be >= 1.0".to_string(),
            });
        }
        if self.confirmation_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.confirmation_timeout_secs",
                reason: "must be greater than 0".to_string(),
            });
        }
        self.sleep_between_actions
            .validate("general.sleep_between_actions")?;
        self.sleep_between_wallets
            .validate("general.sleep_between_wallets")?;
        Ok(())
    }

    #[must_use]
    pub fn retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.retry_interval_secs))
    }

    #[must_use]
    pub fn pacing(&self) -> PacingSettings {
        PacingSettings {
            between_actions: self.sleep_between_actions,
            between_wallets: self.sleep_between_wallets,
            shuffle_wallets: self.shuffle_wallets,
            shuffle_chains: self.shuffle_chains,
        }
    }

    /// Execution knobs; `settlement_wait` comes from the bridge section.
    #[must_use]
    pub fn execution(&self, settlement_wait: Duration) -> ExecutionSettings {
        ExecutionSettings {
            retry: self.retry(),
            gas_multiplier: self.gas_multiplier,
            confirmation_timeout: Duration::from_secs(self.confirmation_timeout_secs),
            settlement_wait,
            ..ExecutionSettings::default()
        }
    }

    #[must_use]
    pub fn http(&self) -> HttpSettings {
        HttpSettings {
            timeout: Duration::from_secs(self.http_timeout_secs),
            proxy: self.proxies.first().cloned(),
            ..HttpSettings::default()
        }
    }
}
