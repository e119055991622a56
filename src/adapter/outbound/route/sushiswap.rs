//! SushiSwap V2 router: direct two-hop-free pair swaps.
//!
//! Quotes come from the router's `getAmountsOut` over a single pair, with the
//! native side replaced by the chain's wrapped native token. Swaps use the
//! fee-on-transfer tolerant entry points.

use std::sync::Arc;

use alloy_primitives::{address, Address, U256};
use alloy_provider::ProviderBuilder;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use tracing::debug;
use url::Url;

use super::approval::approval_if_needed;
use crate::adapter::outbound::evm::contracts::IUniswapV2Router02;
use crate::domain::chain::Chain;
use crate::domain::intent::{IntentKind, TxIntent};
use crate::domain::quote::{Quote, QuoteResponse, RouteRequest, Unavailable};
use crate::domain::token::Asset;
use crate::error::{Error, Result};
use crate::port::outbound::chain::BalanceReader;
use crate::port::outbound::route::RouteProvider;

/// Share of the quoted output accepted as minimum, in percent.
const MIN_OUT_PERCENT: u64 = 98;

/// Swap deadline window in seconds from assembly.
const DEADLINE_WINDOW_SECS: std::ops::Range<u64> = 30 * 60..60 * 60;

/// V2 router deployment per chain.
#[must_use]
pub fn router_address(chain: Chain) -> Option<Address> {
    let router = match chain {
        Chain::Ethereum => address!("d9e1cE17f2641f24aE83637ab66a2cca9C378B9F"),
        Chain::Arbitrum
        | Chain::Bsc
        | Chain::Polygon
        | Chain::Avalanche
        | Chain::Gnosis
        | Chain::Fantom
        | Chain::Nova => address!("1b02dA8Cb0d097eB8D57A175b88c7D8b47997506"),
        Chain::Optimism | Chain::Linea => address!("2ABf469074dc0b54d793850807E6eb5Faf2625b1"),
        Chain::Base => address!("6BDED42c6DA8FBf0d2bA55B2fa120C5e0c8D7891"),
        Chain::Scroll | Chain::Core => address!("9B3336186a38E1b6c21955d112dbb0343Ee061eE"),
        Chain::Blast => address!("54CF3d259a06601b5bC45F61A16443ed5404DD64"),
        Chain::Celo => address!("1421bDe4B10e8dd459b3BCb598810B1337D56842"),
        _ => return None,
    };
    Some(router)
}

/// Which router entry point a swap uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwapKind {
    NativeForTokens,
    TokensForNative,
    TokensForTokens,
}

impl SwapKind {
    fn of(request: &RouteRequest) -> Option<Self> {
        match (request.token_in, request.token_out) {
            (Asset::Native, Asset::Native) => None,
            (Asset::Native, Asset::Erc20(_)) => Some(Self::NativeForTokens),
            (Asset::Erc20(_), Asset::Native) => Some(Self::TokensForNative),
            (Asset::Erc20(_), Asset::Erc20(_)) => Some(Self::TokensForTokens),
        }
    }
}

fn pair_path(chain: Chain, token_in: Asset, token_out: Asset) -> Option<Vec<Address>> {
    let wrapped = chain.descriptor().wrapped_native;
    let side = |asset: Asset| match asset {
        Asset::Native => wrapped,
        Asset::Erc20(address) => Some(address),
    };
    Some(vec![side(token_in)?, side(token_out)?])
}

fn swap_calldata(kind: SwapKind, request: &RouteRequest, min_out: U256, path: Vec<Address>, deadline: U256) -> Vec<u8> {
    let to = request.recipient;
    match kind {
        SwapKind::NativeForTokens => IUniswapV2Router02::swapExactETHForTokensSupportingFeeOnTransferTokensCall {
            amountOutMin: min_out,
            path,
            to,
            deadline,
        }
        .abi_encode(),
        SwapKind::TokensForNative => IUniswapV2Router02::swapExactTokensForETHSupportingFeeOnTransferTokensCall {
            amountIn: request.amount_in,
            amountOutMin: min_out,
            path,
            to,
            deadline,
        }
        .abi_encode(),
        SwapKind::TokensForTokens => IUniswapV2Router02::swapExactTokensForTokensSupportingFeeOnTransferTokensCall {
            amountIn: request.amount_in,
            amountOutMin: min_out,
            path,
            to,
            deadline,
        }
        .abi_encode(),
    }
}

/// SushiSwap V2 adapter.
pub struct SushiSwap {
    balances: Arc<dyn BalanceReader>,
}

impl SushiSwap {
    #[must_use]
    pub fn new(balances: Arc<dyn BalanceReader>) -> Self {
        Self { balances }
    }

    async fn amounts_out(chain: Chain, router: Address, amount_in: U256, path: Vec<Address>) -> Result<Vec<U256>> {
        let url = Url::parse(chain.descriptor().rpc_url())?;
        let provider = ProviderBuilder::new().connect_http(url);
        IUniswapV2Router02::new(router, &provider)
            .getAmountsOut(amount_in, path)
            .call()
            .await
            .map_err(|e| Error::Rpc(format!("getAmountsOut: {e}")))
    }
}

#[async_trait]
impl RouteProvider for SushiSwap {
    fn name(&self) -> &'static str {
        "sushiswap"
    }

    async fn quote(&self, request: &RouteRequest) -> Result<QuoteResponse> {
        let Some(router) = router_address(request.chain) else {
            return Ok(QuoteResponse::Unavailable(Unavailable::UnsupportedChain(request.chain)));
        };
        if request.dest_chain.is_some_and(|dest| dest != request.chain) {
            return Ok(QuoteResponse::Unavailable(Unavailable::Other(
                "sushiswap does not bridge".into(),
            )));
        }
        if SwapKind::of(request).is_none() || request.is_same_asset() {
            return Ok(QuoteResponse::Unavailable(Unavailable::SameAsset));
        }
        let Some(path) = pair_path(request.chain, request.token_in, request.token_out) else {
            return Ok(QuoteResponse::Unavailable(Unavailable::Other(
                "no wrapped native token".into(),
            )));
        };

        let amounts = Self::amounts_out(request.chain, router, request.amount_in, path.clone()).await?;
        let amount_out = amounts.get(1).copied().unwrap_or_default();
        if amount_out.is_zero() {
            return Ok(QuoteResponse::Unavailable(Unavailable::NoLiquidity));
        }
        debug!(chain = %request.chain, amount_in = %request.amount_in, amount_out = %amount_out, "SushiSwap quote");

        Ok(QuoteResponse::Available(Quote {
            provider: self.name(),
            request: request.clone(),
            amount_out,
            route_fee: U256::ZERO,
            value_in_usd: None,
            value_out_usd: None,
            path: path.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
            gas_estimate: None,
            quoted_at: Utc::now(),
            valid_for: Duration::seconds(60),
        }))
    }

    async fn assemble(&self, quote: &Quote) -> Result<Vec<TxIntent>> {
        let request = &quote.request;
        let (Some(router), Some(kind), Some(path)) = (
            router_address(request.chain),
            SwapKind::of(request),
            pair_path(request.chain, request.token_in, request.token_out),
        ) else {
            return Err(Error::Parse(format!("sushiswap quote for unsupported route on {}", request.chain)));
        };

        let mut intents = Vec::with_capacity(2);
        intents.extend(approval_if_needed(self.balances.as_ref(), request, router).await?);

        let min_out = quote.amount_out * U256::from(MIN_OUT_PERCENT) / U256::from(100u64);
        let window = rand::thread_rng().gen_range(DEADLINE_WINDOW_SECS);
        let deadline = U256::from(Utc::now().timestamp().unsigned_abs() + window);
        let value = if kind == SwapKind::NativeForTokens {
            request.amount_in
        } else {
            U256::ZERO
        };
        intents.push(TxIntent {
            kind: IntentKind::Swap,
            to: router,
            value,
            data: swap_calldata(kind, request, min_out, path, deadline).into(),
            gas_limit: None,
            gas_price: None,
        });
        Ok(intents)
    }
}
