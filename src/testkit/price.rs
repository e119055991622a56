//! Fixed price table.

use std::collections::HashMap;

use alloy_primitives::Address;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::chain::Chain;
use crate::error::Result;
use crate::port::outbound::price::PriceOracle;

/// Prices set up front. Anything not listed is unknown.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceOracle {
    native: HashMap<Chain, Decimal>,
    tokens: HashMap<(Chain, Address), Decimal>,
}

impl StaticPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_native(mut self, chain: Chain, price: Decimal) -> Self {
        self.native.insert(chain, price);
        self
    }

    pub fn with_token(mut self, chain: Chain, token: Address, price: Decimal) -> Self {
        self.tokens.insert((chain, token), price);
        self
    }
}

#[async_trait]
impl PriceOracle for StaticPriceOracle {
    async fn native_price(&self, chain: Chain) -> Result<Decimal> {
        Ok(self.native.get(&chain).copied().unwrap_or_default())
    }

    async fn token_prices(&self, chain: Chain, tokens: &[Address]) -> Result<HashMap<Address, Decimal>> {
        Ok(tokens
            .iter()
            .filter_map(|t| self.tokens.get(&(chain, *t)).map(|p| (*t, *p)))
            .collect())
    }
}
