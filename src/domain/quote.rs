//! Route requests and the quotes providers answer them with.

use std::fmt;

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use super::chain::Chain;
use super::token::Asset;

/// Immutable context for one quote/assemble round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub chain: Chain,
    /// Destination chain for bridges; `None` for same-chain swaps and transfers.
    pub dest_chain: Option<Chain>,
    pub wallet: Address,
    pub recipient: Address,
    pub token_in: Asset,
    pub token_out: Asset,
    /// Decimals of `token_in`.
    pub decimals_in: u8,
    pub amount_in: U256,
}

impl RouteRequest {
    /// Same request with a different input amount.
    #[must_use]
    pub fn with_amount(&self, amount_in: U256) -> Self {
        Self {
            amount_in,
            ..self.clone()
        }
    }

    /// True when input and output denote the same asset on the same chain.
    #[must_use]
    pub fn is_same_asset(&self) -> bool {
        self.token_in == self.token_out && self.dest_chain.map_or(true, |d| d == self.chain)
    }
}

/// A priced route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Name of the provider that produced the quote.
    pub provider: &'static str,
    pub request: RouteRequest,
    pub amount_out: U256,
    /// Fee charged by the route, in native base units on the source chain.
    pub route_fee: U256,
    pub value_in_usd: Option<Decimal>,
    pub value_out_usd: Option<Decimal>,
    /// Provider-specific identifier needed to assemble the route.
    pub path: String,
    pub gas_estimate: Option<u64>,
    pub quoted_at: DateTime<Utc>,
    pub valid_for: Duration,
}

impl Quote {
    /// True once the quote is older than its validity window.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.quoted_at > self.valid_for
    }

    /// Relative loss between quoted input and output value, if both are priced.
    #[must_use]
    pub fn slippage(&self) -> Option<Decimal> {
        let value_in = self.value_in_usd.filter(|v| *v > Decimal::ZERO)?;
        let value_out = self.value_out_usd?;
        Some((value_in - value_out) / value_in)
    }
}

/// Why a provider declined to quote. Expected and frequent; not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    SameAsset,
    UnsupportedChain(Chain),
    BelowNoiseFloor { value_usd: Decimal },
    NoLiquidity,
    UnprofitableAfterGas,
    Other(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SameAsset => f.write_str("same asset"),
            Self::UnsupportedChain(chain) => write!(f, "{chain} not supported"),
            Self::BelowNoiseFloor { value_usd } => write!(f, "output worth {value_usd} USD"),
            Self::NoLiquidity => f.write_str("no liquidity"),
            Self::UnprofitableAfterGas => f.write_str("gas exceeds output"),
            Self::Other(reason) => f.write_str(reason),
        }
    }
}

/// Answer to a quote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteResponse {
    Available(Quote),
    Unavailable(Unavailable),
}

impl QuoteResponse {
    #[must_use]
    pub fn into_quote(self) -> Option<Quote> {
        match self {
            Self::Available(quote) => Some(quote),
            Self::Unavailable(_) => None,
        }
    }
}
