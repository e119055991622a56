//! Per-scenario configuration sections.
//!
//! Each section turns into a [`ChainPolicy`] once at load time, so malformed
//! value expressions, chain names or addresses fail before any wallet runs.

use std::time::Duration;

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::adapter::outbound::route::stargate::StargateMode;
use crate::domain::chain::Chain;
use crate::domain::policy::{ChainPolicy, IgnoreList, PriceGuard};
use crate::domain::selection::ChainSelection;
use crate::domain::token::to_base_units;
use crate::domain::value::ValueRange;
use crate::error::ConfigError;

const fn default_true() -> bool {
    true
}

fn default_swap_routes() -> Vec<String> {
    vec!["odos".into(), "sushiswap".into()]
}

fn default_transfer_routes() -> Vec<String> {
    vec!["direct".into()]
}

fn default_bridge_routes() -> Vec<String> {
    vec!["stargate".into(), "relay".into()]
}

fn default_whole_balance() -> ValueRange {
    ValueRange::new("100%", "100%")
}

const fn default_unwrap_min_wei() -> u128 {
    10_000_000_000_000
}

const fn default_settlement_wait_secs() -> u64 {
    600
}

fn default_max_slippage() -> Decimal {
    Decimal::new(5, 2)
}

fn parse_addresses(field: &'static str, raw: &[String]) -> Result<Vec<Address>, ConfigError> {
    raw.iter()
        .map(|entry| {
            entry
                .trim()
                .to_lowercase()
                .parse::<Address>()
                .map_err(|_| ConfigError::InvalidValue {
                    field,
                    reason: format!("'{entry}' is not an address"),
                })
        })
        .collect()
}

fn non_negative(field: &'static str, value: Decimal) -> Result<(), ConfigError> {
    if value < Decimal::ZERO {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be 0 or greater".to_string(),
        });
    }
    Ok(())
}

fn non_empty_routes(field: &'static str, routes: &[String]) -> Result<(), ConfigError> {
    if routes.is_empty() {
        return Err(ConfigError::MissingField { field });
    }
    Ok(())
}

/// `[collector]`: swap dust tokens into native coin.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    #[serde(default)]
    pub chains: Vec<String>,
    /// Token addresses never touched.
    #[serde(default)]
    pub tokens_to_ignore: Vec<String>,
    /// Token addresses scanned even when missing from the token list.
    #[serde(default)]
    pub extra_tokens: Vec<String>,
    #[serde(default)]
    pub min_value_usd: Decimal,
    #[serde(default = "default_swap_routes")]
    pub routes: Vec<String>,
    #[serde(default = "default_unwrap_min_wei")]
    pub unwrap_min_wei: u128,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            chains: Vec::new(),
            tokens_to_ignore: Vec::new(),
            extra_tokens: Vec::new(),
            min_value_usd: Decimal::ZERO,
            routes: default_swap_routes(),
            unwrap_min_wei: default_unwrap_min_wei(),
        }
    }
}

impl CollectorConfig {
    pub fn policy(&self) -> Result<ChainPolicy, ConfigError> {
        non_negative("collector.min_value_usd", self.min_value_usd)?;
        non_empty_routes("collector.routes", &self.routes)?;
        Ok(ChainPolicy {
            selection: ChainSelection::parse(&self.chains)?,
            ignore: IgnoreList::new(parse_addresses("collector.tokens_to_ignore", &self.tokens_to_ignore)?),
            include: parse_addresses("collector.extra_tokens", &self.extra_tokens)?,
            min_value_usd: self.min_value_usd,
            ..ChainPolicy::whole_balance(self.routes.clone())
        })
    }

    #[must_use]
    pub fn unwrap_min(&self) -> U256 {
        U256::from(self.unwrap_min_wei)
    }
}

/// `[sender]`: forward native coin to each wallet's destination.
#[derive(Debug, Clone, Deserialize)]
pub struct SenderConfig {
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default)]
    pub min_value_usd: Decimal,
    #[serde(default = "default_whole_balance")]
    pub values: ValueRange,
    #[serde(default = "default_true")]
    pub deduct_fee: bool,
    #[serde(default = "default_transfer_routes")]
    pub routes: Vec<String>,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            chains: Vec::new(),
            min_value_usd: Decimal::ZERO,
            values: default_whole_balance(),
            deduct_fee: true,
            routes: default_transfer_routes(),
        }
    }
}

impl SenderConfig {
    pub fn policy(&self) -> Result<ChainPolicy, ConfigError> {
        non_negative("sender.min_value_usd", self.min_value_usd)?;
        non_empty_routes("sender.routes", &self.routes)?;
        Ok(ChainPolicy {
            selection: ChainSelection::parse(&self.chains)?,
            min_value_usd: self.min_value_usd,
            deduct_fee: self.deduct_fee,
            value: self.values.parse()?,
            ..ChainPolicy::whole_balance(self.routes.clone())
        })
    }
}

/// `[token_sender]`: forward the full balance of one ERC-20 token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSenderConfig {
    pub chain: Chain,
    pub token: Address,
    #[serde(default = "default_transfer_routes")]
    pub routes: Vec<String>,
}

/// `[bridge]`: consolidate native coin from several chains onto one.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    pub from_chains: Vec<Chain>,
    pub to_chain: Chain,
    #[serde(default = "default_bridge_routes")]
    pub routes: Vec<String>,
    #[serde(default)]
    pub min_value_usd: Decimal,
    #[serde(default = "default_whole_balance")]
    pub values: ValueRange,
    #[serde(default = "default_true")]
    pub deduct_fee: bool,
    #[serde(default)]
    pub stargate_mode: StargateMode,
    /// Upper bound on waiting for delivery; zero does not wait.
    #[serde(default = "default_settlement_wait_secs")]
    pub settlement_wait_secs: u64,
    /// Largest acceptable route fee, in whole native coin.
    #[serde(default)]
    pub max_route_fee: Option<Decimal>,
}

impl BridgeConfig {
    pub fn policy(&self) -> Result<ChainPolicy, ConfigError> {
        non_negative("bridge.min_value_usd", self.min_value_usd)?;
        non_empty_routes("bridge.routes", &self.routes)?;
        if self.from_chains.is_empty() {
            return Err(ConfigError::MissingField {
                field: "bridge.from_chains",
            });
        }
        let max_route_fee = match self.max_route_fee {
            Some(fee) => Some(
                to_base_units(fee, self.to_chain.descriptor().native.decimals).ok_or_else(|| {
                    ConfigError::InvalidValue {
                        field: "bridge.max_route_fee",
                        reason: format!("'{fee}' is not a valid amount"),
                    }
                })?,
            ),
            None => None,
        };
        Ok(ChainPolicy {
            min_value_usd: self.min_value_usd,
            deduct_fee: self.deduct_fee,
            value: self.values.parse()?,
            max_route_fee,
            ..ChainPolicy::whole_balance(self.routes.clone())
        })
    }

    #[must_use]
    pub const fn settlement_wait(&self) -> Duration {
        Duration::from_secs(self.settlement_wait_secs)
    }
}

/// `[sell]`: sell one token for native coin above a price floor.
#[derive(Debug, Clone, Deserialize)]
pub struct SellConfig {
    pub chain: Chain,
    pub token: Address,
    #[serde(default)]
    pub min_unit_price_usd: Option<Decimal>,
    #[serde(default = "default_max_slippage")]
    pub max_slippage: Decimal,
    #[serde(default)]
    pub min_value_usd: Decimal,
    #[serde(default = "default_swap_routes")]
    pub routes: Vec<String>,
}

impl SellConfig {
    pub fn policy(&self) -> Result<ChainPolicy, ConfigError> {
        non_negative("sell.min_value_usd", self.min_value_usd)?;
        non_empty_routes("sell.routes", &self.routes)?;
        if self.max_slippage < Decimal::ZERO || self.max_slippage > Decimal::ONE {
            return Err(ConfigError::InvalidValue {
                field: "sell.max_slippage",
                reason: "must be between 0 and 1".to_string(),
            });
        }
        if let Some(floor) = self.min_unit_price_usd {
            non_negative("sell.min_unit_price_usd", floor)?;
        }
        Ok(ChainPolicy {
            min_value_usd: self.min_value_usd,
            guard: PriceGuard {
                min_unit_price_usd: self.min_unit_price_usd,
                max_slippage: Some(self.max_slippage),
            },
            ..ChainPolicy::whole_balance(self.routes.clone())
        })
    }
}
