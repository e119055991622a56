//! Diagnostic projections for operator-facing adapters.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Result;

/// Summary output for `check config`.
#[derive(Debug, Clone)]
pub struct ConfigCheckReport {
    pub wallets_file: String,
    /// `None` when the file is missing or unreadable.
    pub wallets: Option<usize>,
    /// Wallet entries with a destination address.
    pub destinations: usize,
    /// Optional scenario sections present in the file.
    pub sections: Vec<&'static str>,
    pub telegram_enabled: bool,
    pub telegram_token_present: bool,
    pub telegram_chat_present: bool,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

/// Static facts about a supported chain.
#[derive(Debug, Clone)]
pub struct ChainView {
    pub name: &'static str,
    pub id: u64,
    pub native_symbol: &'static str,
    pub rpc_url: &'static str,
    pub has_wrapped_native: bool,
    pub has_token_list: bool,
}

/// Health status item for operator checks.
#[derive(Debug, Clone)]
pub enum HealthCheckStatus {
    Healthy,
    Unhealthy(String),
}

/// RPC reachability of one chain.
#[derive(Debug, Clone)]
pub struct RpcProbe {
    pub chain: &'static str,
    pub status: HealthCheckStatus,
    pub gas_price_gwei: Option<Decimal>,
}

impl RpcProbe {
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self.status, HealthCheckStatus::Healthy)
    }
}

/// Diagnostics use-cases for operator-facing adapters.
#[async_trait]
pub trait DiagnosticOperator: Send + Sync {
    /// Build `check config` summary.
    fn check_config(&self, config_toml: &str) -> Result<ConfigCheckReport>;

    /// Every supported chain.
    fn chains(&self) -> Vec<ChainView>;

    /// Ask each named chain (every chain when empty) for its gas price.
    async fn probe_rpc(&self, chains: &[String]) -> Result<Vec<RpcProbe>>;
}
