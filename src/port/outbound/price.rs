//! Price oracle port.

use std::collections::HashMap;

use alloy_primitives::Address;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::chain::Chain;
use crate::error::Result;

/// USD prices for native coins and tokens.
///
/// A price of zero, or an address missing from the returned map, means the
/// price is unknown, never that the asset is worthless.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// USD price of the chain's native coin.
    async fn native_price(&self, chain: Chain) -> Result<Decimal>;

    /// USD prices for a batch of ERC-20 tokens on one chain.
    async fn token_prices(
        &self,
        chain: Chain,
        tokens: &[Address],
    ) -> Result<HashMap<Address, Decimal>>;
}
