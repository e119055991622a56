//! Configuration projections for operator-facing adapters.

use rust_decimal::Decimal;

use crate::error::Result;

/// One scenario section of a configuration view.
#[derive(Debug, Clone)]
pub struct ConfigScenarioView {
    pub name: &'static str,
    /// Human-readable policy line, e.g. `Arbitrum, Optimism -> Base`.
    pub target: String,
    pub routes: Vec<String>,
    pub min_value_usd: Decimal,
}

/// Full configuration projection for operator-facing output.
#[derive(Debug, Clone)]
pub struct ConfigView {
    pub wallets_file: String,
    pub max_attempts: u32,
    pub retry_interval_secs: u64,
    pub gas_multiplier: Decimal,
    /// Zero when the gas gate is disabled.
    pub good_gwei: Decimal,
    pub shuffle_wallets: bool,
    pub shuffle_chains: bool,
    pub proxy_configured: bool,
    pub scenarios: Vec<ConfigScenarioView>,
    pub telegram_enabled: bool,
    pub log_level: String,
    pub log_format: String,
}

/// Configuration use-cases for operator-facing adapters.
pub trait ConfigurationOperator: Send + Sync {
    /// Build a projection for `config show`.
    fn show_config(&self, config_toml: &str) -> Result<ConfigView>;
}
