//! Runtime control projection types for operator-facing adapters.
//!
//! Defines request and response types for running a named scenario over the
//! configured wallets.

use std::fmt;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::outcome::RunSummary;
use crate::error::Result;

/// Scenarios an operator can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    /// Swap dust tokens into native coin.
    Collect,
    /// Send native coin to each wallet's destination.
    Send,
    /// Send one ERC-20 token to each wallet's destination.
    SendToken,
    /// Bridge native coin onto one chain.
    Bridge,
    /// Sell one token above a price floor.
    Sell,
    /// Report balances without sending anything.
    Balances,
    /// Collect, then send the proceeds.
    CollectThenSend,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 7] = [
        Self::Collect,
        Self::Send,
        Self::SendToken,
        Self::Bridge,
        Self::Sell,
        Self::Balances,
        Self::CollectThenSend,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Collect => "collect",
            Self::Send => "send",
            Self::SendToken => "send-token",
            Self::Bridge => "bridge",
            Self::Sell => "sell",
            Self::Balances => "balances",
            Self::CollectThenSend => "collect-then-send",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Collect => "Swap dust tokens into native coin",
            Self::Send => "Send native coin to each wallet's destination",
            Self::SendToken => "Send a token's full balance to each wallet's destination",
            Self::Bridge => "Bridge native coin from several chains onto one",
            Self::Sell => "Sell one token for native coin above a price floor",
            Self::Balances => "Show native and token balances with USD value",
            Self::CollectThenSend => "Collect dust, then send native coin onward",
        }
    }

    /// Whether every wallet must carry a destination address.
    #[must_use]
    pub const fn needs_destination(self) -> bool {
        matches!(self, Self::Send | Self::SendToken | Self::CollectThenSend)
    }

    /// Whether the scenario only reads chain state.
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::Balances)
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime configuration overrides from CLI flags.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Raw TOML configuration content.
    pub config_toml: String,

    pub scenario: ScenarioKind,

    /// Override for the wallets file location.
    pub wallets_file: Option<String>,

    /// Override for log level (e.g., "debug", "info", "warn").
    pub log_level: Option<String>,

    /// Whether to output logs as JSON.
    pub json_logs: bool,

    /// Force Telegram notifications on.
    pub telegram_enabled: bool,

    /// Override for the shuffle/pause/value seed.
    pub seed: Option<u64>,
}

impl RunRequest {
    #[must_use]
    pub fn new(config_toml: String, scenario: ScenarioKind) -> Self {
        Self {
            config_toml,
            scenario,
            wallets_file: None,
            log_level: None,
            json_logs: false,
            telegram_enabled: false,
            seed: None,
        }
    }
}

/// Startup information snapshot for display.
#[derive(Debug, Clone)]
pub struct RunStartupSnapshot {
    pub scenario: ScenarioKind,
    pub wallets: usize,
    pub wallets_file: String,
    /// Chains visited for each wallet, before shuffling.
    pub chains: Vec<String>,
    /// Route names in priority order.
    pub routes: Vec<String>,
    pub telegram_enabled: bool,
}

/// One line of a balance report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceLine {
    pub wallet: String,
    pub chain: String,
    pub symbol: String,
    pub amount: Decimal,
    pub value_usd: Option<Decimal>,
}

/// Result of a finished run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub summary: RunSummary,
    /// Filled by the balances scenario only.
    pub balances: Vec<BalanceLine>,
}

/// Runtime control use-cases for operator-facing adapters.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait RuntimeOperator: Send + Sync {
    /// Validate the request and describe what the run will do.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or wallets file is invalid.
    fn prepare_run(&self, request: &RunRequest) -> Result<RunStartupSnapshot>;

    /// Run the scenario over every wallet.
    ///
    /// # Errors
    ///
    /// Returns configuration errors; per-action failures are counted in the
    /// report instead.
    async fn execute_run(&self, request: RunRequest) -> Result<RunReport>;
}
