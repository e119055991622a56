//! Chain access ports: balances, gas and transaction submission.

use std::fmt;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::domain::chain::Chain;
use crate::domain::intent::TxIntent;
use crate::domain::token::Asset;
use crate::error::Result;

/// Reads balances.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// Balance of `asset` held by `wallet`, in base units.
    async fn balance(&self, chain: Chain, wallet: Address, asset: Asset) -> Result<U256>;

    /// ERC-20 allowance granted by `owner` to `spender`.
    async fn allowance(&self, chain: Chain, token: Address, owner: Address, spender: Address) -> Result<U256>;
}

/// Estimates gas usage and price.
#[async_trait]
pub trait GasEstimator: Send + Sync {
    /// Gas limit `intent` would consume if sent from `from`.
    async fn estimate_gas(&self, chain: Chain, from: Address, intent: &TxIntent) -> Result<u64>;

    /// Current price per gas unit, in wei.
    async fn gas_price(&self, chain: Chain) -> Result<u128>;
}

/// Terminal status of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Failed,
    /// Not observed before the wait bound; it may still land.
    Unknown,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Success => f.write_str("success"),
            TxStatus::Failed => f.write_str("failed"),
            TxStatus::Unknown => f.write_str("unknown"),
        }
    }
}

/// Signs, submits and tracks transactions.
#[async_trait]
pub trait TransactionExecutor: Send + Sync {
    /// Sign `intent` with the key for `from` and submit it. Returns the hash.
    async fn send(&self, chain: Chain, from: Address, intent: &TxIntent) -> Result<String>;

    /// Wait for `tx_hash` to reach a terminal status, for at most `max_wait`.
    async fn wait_for_status(
        &self,
        chain: Chain,
        tx_hash: &str,
        max_wait: Duration,
    ) -> Result<TxStatus>;
}
