//! Routes that need no external service: plain transfers and unwrapping.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::domain::chain::Chain;
use crate::domain::intent::TxIntent;
use crate::domain::quote::{Quote, QuoteResponse, RouteRequest, Unavailable};
use crate::domain::token::Asset;
use crate::error::Result;
use crate::port::outbound::route::RouteProvider;

fn quote_one_to_one(provider: &'static str, request: &RouteRequest) -> Quote {
    Quote {
        provider,
        request: request.clone(),
        amount_out: request.amount_in,
        route_fee: U256::ZERO,
        value_in_usd: None,
        value_out_usd: None,
        path: String::new(),
        gas_estimate: None,
        quoted_at: Utc::now(),
        valid_for: Duration::days(1),
    }
}

/// Same asset, same chain, to the recipient.
pub struct DirectTransfer;

#[async_trait]
impl RouteProvider for DirectTransfer {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn quote(&self, request: &RouteRequest) -> Result<QuoteResponse> {
        if request.dest_chain.is_some_and(|dest| dest != request.chain) {
            return Ok(QuoteResponse::Unavailable(Unavailable::Other(
                "direct transfer cannot cross chains".into(),
            )));
        }
        if request.token_in != request.token_out {
            return Ok(QuoteResponse::Unavailable(Unavailable::Other(
                "direct transfer cannot convert assets".into(),
            )));
        }
        Ok(QuoteResponse::Available(quote_one_to_one(self.name(), request)))
    }

    async fn assemble(&self, quote: &Quote) -> Result<Vec<TxIntent>> {
        let request = &quote.request;
        let intent = match request.token_in {
            Asset::Native => TxIntent::native_transfer(request.recipient, request.amount_in),
            Asset::Erc20(token) => TxIntent::erc20_transfer(token, request.recipient, request.amount_in),
        };
        Ok(vec![intent])
    }
}

/// Wrapped native to native via the wrapper's `withdraw`.
pub struct Unwrapper;

impl Unwrapper {
    fn wrapper(chain: Chain, token: Asset) -> Option<Address> {
        let wrapped = chain.descriptor().wrapped_native?;
        (token == Asset::Erc20(wrapped)).then_some(wrapped)
    }
}

#[async_trait]
impl RouteProvider for Unwrapper {
    fn name(&self) -> &'static str {
        "unwrap"
    }

    async fn quote(&self, request: &RouteRequest) -> Result<QuoteResponse> {
        if Self::wrapper(request.chain, request.token_in).is_none() || !request.token_out.is_native() {
            return Ok(QuoteResponse::Unavailable(Unavailable::Other(
                "not the wrapped native token".into(),
            )));
        }
        Ok(QuoteResponse::Available(quote_one_to_one(self.name(), request)))
    }

    async fn assemble(&self, quote: &Quote) -> Result<Vec<TxIntent>> {
        let request = &quote.request;
        Ok(Self::wrapper(request.chain, request.token_in)
            .map(|wrapper| vec![TxIntent::unwrap_native(wrapper, request.amount_in)])
            .unwrap_or_default())
    }
}
