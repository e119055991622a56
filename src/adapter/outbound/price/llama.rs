//! DefiLlama `coins` price oracle.

use std::collections::HashMap;

use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::adapter::outbound::http::send_json;
use crate::domain::chain::Chain;
use crate::error::Result;
use crate::port::outbound::price::PriceOracle;

const DEFAULT_API_URL: &str = "https://coins.llama.fi";

/// Coins per request; keeps the URL well under common length limits.
const BATCH_SIZE: usize = 60;

#[derive(Debug, Deserialize)]
struct PricesReply {
    #[serde(default)]
    coins: HashMap<String, CoinPrice>,
}

#[derive(Debug, Deserialize)]
struct CoinPrice {
    price: Decimal,
}

/// Current USD prices from DefiLlama.
pub struct LlamaPriceOracle {
    http: HttpClient,
    base_url: String,
}

impl LlamaPriceOracle {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            base_url: DEFAULT_API_URL.into(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch(&self, keys: &[String]) -> Result<HashMap<String, CoinPrice>> {
        let url = format!("{}/prices/current/{}", self.base_url, keys.join(","));
        let reply: PricesReply = send_json(self.http.get(&url)).await?;
        Ok(reply.coins)
    }
}

fn token_key(chain: Chain, token: Address) -> String {
    format!("{}:{token}", chain.descriptor().price_slug)
}

/// Parse `slug:0xaddress` keys back into addresses.
fn collect_prices(coins: HashMap<String, CoinPrice>) -> HashMap<Address, Decimal> {
    coins
        .into_iter()
        .filter_map(|(key, coin)| {
            let (_, raw) = key.split_once(':')?;
            let address = raw.parse::<Address>().ok()?;
            Some((address, coin.price))
        })
        .collect()
}

#[async_trait]
impl PriceOracle for LlamaPriceOracle {
    async fn native_price(&self, chain: Chain) -> Result<Decimal> {
        let key = format!("coingecko:{}", chain.descriptor().native_price_id);
        let coins = self.fetch(std::slice::from_ref(&key)).await?;
        Ok(coins.get(&key).map_or(Decimal::ZERO, |coin| coin.price))
    }

    async fn token_prices(&self, chain: Chain, tokens: &[Address]) -> Result<HashMap<Address, Decimal>> {
        let mut prices = HashMap::with_capacity(tokens.len());
        for batch in tokens.chunks(BATCH_SIZE) {
            let keys: Vec<String> = batch.iter().map(|token| token_key(chain, *token)).collect();
            prices.extend(collect_prices(self.fetch(&keys).await?));
        }
        debug!(chain = %chain, requested = tokens.len(), priced = prices.len(), "Token prices");
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn keys_use_price_slug() {
        let key = token_key(Chain::Arbitrum, Address::repeat_byte(0xab));
        assert!(key.starts_with("arbitrum:0x"));
    }

    #[test]
    fn reply_keys_map_back_to_addresses() {
        let reply: PricesReply = serde_json::from_value(serde_json::json!({
            "coins": {
                "base:0x0101010101010101010101010101010101010101": { "price": 1.25, "symbol": "A", "decimals": 18 },
                "base:not-an-address": { "price": 3.0 }
            }
        }))
        .unwrap();
        let prices = collect_prices(reply.coins);
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[&Address::repeat_byte(1)], dec!(1.25));
    }
}
