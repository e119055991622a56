//! Token discovery port.

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::domain::chain::Chain;
use crate::domain::token::TokenBalance;
use crate::error::Result;

/// Finds the ERC-20 tokens a wallet holds.
#[async_trait]
pub trait TokenDiscovery: Send + Sync {
    /// Non-zero ERC-20 balances of `wallet` on `chain`, including metadata.
    ///
    /// `extra` lists token addresses to check even if no token list names them.
    async fn nonzero_balances(
        &self,
        chain: Chain,
        wallet: Address,
        extra: &[Address],
    ) -> Result<Vec<TokenBalance>>;
}
