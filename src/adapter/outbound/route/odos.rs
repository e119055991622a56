//! Odos smart order router.
//!
//! Quotes through `sor/quote/v3`, assembles a simulated transaction through
//! `sor/assemble`, and approves the router looked up from the contract-info
//! endpoint when the allowance is short.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use reqwest::Client as HttpClient;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::approval::approval_if_needed;
use crate::adapter::outbound::http::send_json;
use crate::domain::chain::Chain;
use crate::domain::fee::pad_gas_limit;
use crate::domain::intent::{IntentKind, TxIntent};
use crate::domain::quote::{Quote, QuoteResponse, RouteRequest, Unavailable};
use crate::error::{Error, ExecutionError, Result};
use crate::port::outbound::chain::BalanceReader;
use crate::port::outbound::route::RouteProvider;

const DEFAULT_API_URL: &str = "https://api.odos.xyz";

/// Quotes worth less than this many USD after gas are not worth sending.
const NOISE_FLOOR_USD: Decimal = dec!(0.01);

/// Headroom on the gas limit returned by the assembler.
const GAS_LIMIT_PADDING: Decimal = dec!(1.1);

const SLIPPAGE_LIMIT_PERCENT: u32 = 10;

const SUPPORTED_CHAINS: &[Chain] = &[
    Chain::Ethereum,
    Chain::Arbitrum,
    Chain::Avalanche,
    Chain::Polygon,
    Chain::Bsc,
    Chain::Optimism,
    Chain::Base,
    Chain::Fantom,
    Chain::Zksync,
    Chain::Linea,
    Chain::Scroll,
    Chain::Mantle,
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteBody {
    chain_id: u64,
    input_tokens: Vec<InputToken>,
    output_tokens: Vec<OutputToken>,
    user_addr: Address,
    slippage_limit_percent: u32,
    path_viz: bool,
    referral_code: u32,
    simple: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputToken {
    token_address: Address,
    amount: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputToken {
    token_address: Address,
    proportion: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteReply {
    path_id: String,
    out_amounts: Vec<String>,
    #[serde(default)]
    in_values: Vec<Decimal>,
    #[serde(default)]
    out_values: Vec<Decimal>,
    net_out_value: Decimal,
    #[serde(default)]
    gas_estimate: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssembleBody<'a> {
    user_addr: Address,
    path_id: &'a str,
    simulate: bool,
}

#[derive(Debug, Deserialize)]
struct AssembleReply {
    transaction: Option<AssembledTx>,
    simulation: Option<Simulation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Simulation {
    is_success: bool,
    #[serde(default)]
    simulation_error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct AssembledTx {
    to: Address,
    data: Bytes,
    value: String,
    #[serde(default)]
    gas: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractInfo {
    router_address: Address,
}

/// Odos aggregator adapter.
pub struct OdosAggregator {
    http: HttpClient,
    base_url: String,
    balances: Arc<dyn BalanceReader>,
    routers: Mutex<HashMap<Chain, Address>>,
}

impl OdosAggregator {
    #[must_use]
    pub fn new(http: HttpClient, balances: Arc<dyn BalanceReader>) -> Self {
        Self {
            http,
            base_url: DEFAULT_API_URL.into(),
            balances,
            routers: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn is_supported(chain: Chain) -> bool {
        SUPPORTED_CHAINS.contains(&chain)
    }

    async fn router(&self, chain: Chain) -> Result<Address> {
        if let Some(router) = self.routers.lock().get(&chain).copied() {
            return Ok(router);
        }
        let url = format!("{}/info/contract-info/v3/{}", self.base_url, chain.id());
        let info: ContractInfo = send_json(self.http.get(&url)).await?;
        self.routers.lock().insert(chain, info.router_address);
        debug!(chain = %chain, router = %info.router_address, "Resolved Odos router");
        Ok(info.router_address)
    }

    fn quote_body(request: &RouteRequest) -> QuoteBody {
        QuoteBody {
            chain_id: request.chain.id(),
            input_tokens: vec![InputToken {
                token_address: request.token_in.api_address(),
                amount: request.amount_in.to_string(),
            }],
            output_tokens: vec![OutputToken {
                token_address: request.token_out.api_address(),
                proportion: 1,
            }],
            user_addr: request.wallet,
            slippage_limit_percent: SLIPPAGE_LIMIT_PERCENT,
            path_viz: false,
            referral_code: 1,
            simple: true,
        }
    }

    fn interpret(&self, request: &RouteRequest, reply: QuoteReply) -> Result<QuoteResponse> {
        if reply.net_out_value < NOISE_FLOOR_USD {
            return Ok(QuoteResponse::Unavailable(Unavailable::BelowNoiseFloor {
                value_usd: reply.net_out_value,
            }));
        }
        let amount_out = reply
            .out_amounts
            .first()
            .ok_or_else(|| Error::Parse("odos quote without output amount".into()))?
            .parse::<U256>()
            .map_err(|e| Error::Parse(format!("odos output amount: {e}")))?;
        if amount_out.is_zero() {
            return Ok(QuoteResponse::Unavailable(Unavailable::NoLiquidity));
        }
        Ok(QuoteResponse::Available(Quote {
            provider: self.name(),
            request: request.clone(),
            amount_out,
            route_fee: U256::ZERO,
            value_in_usd: reply.in_values.first().copied(),
            value_out_usd: reply.out_values.first().copied(),
            path: reply.path_id,
            gas_estimate: reply.gas_estimate.and_then(|gas| gas.to_u64()),
            quoted_at: Utc::now(),
            valid_for: Duration::seconds(60),
        }))
    }

    fn swap_intent(reply: AssembleReply) -> Result<TxIntent> {
        let simulated = reply.simulation.as_ref().map_or(true, |s| s.is_success);
        let tx = match (simulated, reply.transaction) {
            (true, Some(tx)) => tx,
            _ => {
                let reason = reply
                    .simulation
                    .and_then(|s| s.simulation_error)
                    .map_or_else(|| "odos simulation failed".to_string(), |e| e.to_string());
                return Err(ExecutionError::SimulationFailed(reason).into());
            }
        };
        let value = tx
            .value
            .parse::<U256>()
            .map_err(|e| Error::Parse(format!("odos tx value: {e}")))?;
        Ok(TxIntent {
            kind: IntentKind::Swap,
            to: tx.to,
            value,
            data: tx.data,
            gas_limit: tx.gas.map(|gas| pad_gas_limit(gas, GAS_LIMIT_PADDING)),
            gas_price: None,
        })
    }
}

#[async_trait]
impl RouteProvider for OdosAggregator {
    fn name(&self) -> &'static str {
        "odos"
    }

    async fn quote(&self, request: &RouteRequest) -> Result<QuoteResponse> {
        if !Self::is_supported(request.chain) {
            return Ok(QuoteResponse::Unavailable(Unavailable::UnsupportedChain(request.chain)));
        }
        if request.dest_chain.is_some_and(|dest| dest != request.chain) {
            return Ok(QuoteResponse::Unavailable(Unavailable::Other(
                "odos does not bridge".into(),
            )));
        }
        if request.is_same_asset() {
            return Ok(QuoteResponse::Unavailable(Unavailable::SameAsset));
        }

        let url = format!("{}/sor/quote/v3", self.base_url);
        let reply: QuoteReply = send_json(self.http.post(&url).json(&Self::quote_body(request))).await?;
        self.interpret(request, reply)
    }

    async fn assemble(&self, quote: &Quote) -> Result<Vec<TxIntent>> {
        let request = &quote.request;
        let mut intents = Vec::with_capacity(2);
        if !request.token_in.is_native() {
            let router = self.router(request.chain).await?;
            intents.extend(approval_if_needed(self.balances.as_ref(), request, router).await?);
        }

        let url = format!("{}/sor/assemble", self.base_url);
        let body = AssembleBody {
            user_addr: request.wallet,
            path_id: &quote.path,
            simulate: true,
        };
        let reply: AssembleReply = send_json(self.http.post(&url).json(&body)).await?;
        let swap = Self::swap_intent(reply)?;
        info!(chain = %request.chain, provider = self.name(), router = %swap.to, "Swap assembled");
        intents.push(swap);
        Ok(intents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::Asset;
    use crate::testkit::chain::MemoryBalances;

    fn aggregator() -> OdosAggregator {
        OdosAggregator::new(HttpClient::new(), Arc::new(MemoryBalances::new()))
    }

    fn request(chain: Chain) -> RouteRequest {
        RouteRequest {
            chain,
            dest_chain: None,
            wallet: Address::repeat_byte(1),
            recipient: Address::repeat_byte(1),
            token_in: Asset::Erc20(Address::repeat_byte(5)),
            token_out: Asset::Native,
            decimals_in: 18,
            amount_in: U256::from(10u64).pow(U256::from(18u64)),
        }
    }

    #[tokio::test]
    async fn unsupported_chain_is_declined_without_a_request() {
        let response = aggregator()
            .with_base_url("http://127.0.0.1:9")
            .quote(&request(Chain::Celo))
            .await
            .unwrap();
        assert_eq!(
            response,
            QuoteResponse::Unavailable(Unavailable::UnsupportedChain(Chain::Celo))
        );
    }

    #[test]
    fn quote_body_uses_zero_address_for_native() {
        let body = serde_json::to_value(OdosAggregator::quote_body(&request(Chain::Base))).unwrap();
        assert_eq!(body["chainId"], 8453);
        assert_eq!(
            body["outputTokens"][0]["tokenAddress"],
            "0x0000000000000000000000000000000000000000"
        );
        assert_eq!(body["inputTokens"][0]["amount"], "1000000000000000000");
        assert_eq!(body["slippageLimitPercent"], 10);
    }

    #[test]
    fn dust_output_is_below_noise_floor() {
        let reply: QuoteReply = serde_json::from_value(serde_json::json!({
            "pathId": "abc",
            "outAmounts": ["100"],
            "inValues": [0.02],
            "outValues": [0.015],
            "netOutValue": 0.004,
            "gasEstimate": 150000.0
        }))
        .unwrap();
        let response = aggregator().interpret(&request(Chain::Base), reply).unwrap();
        assert!(matches!(
            response,
            QuoteResponse::Unavailable(Unavailable::BelowNoiseFloor { .. })
        ));
    }

    #[test]
    fn priced_quote_keeps_path_and_values() {
        let reply: QuoteReply = serde_json::from_value(serde_json::json!({
            "pathId": "path-1",
            "outAmounts": ["123456"],
            "inValues": [5.0],
            "outValues": [4.9],
            "netOutValue": 4.8,
            "gasEstimate": 180000
        }))
        .unwrap();
        let quote = aggregator()
            .interpret(&request(Chain::Base), reply)
            .unwrap()
            .into_quote()
            .unwrap();
        assert_eq!(quote.path, "path-1");
        assert_eq!(quote.amount_out, U256::from(123_456u64));
        assert_eq!(quote.value_in_usd, Some(dec!(5)));
        assert_eq!(quote.gas_estimate, Some(180_000));
    }

    #[test]
    fn failed_simulation_is_an_error() {
        let reply: AssembleReply = serde_json::from_value(serde_json::json!({
            "transaction": { "to": "0x0000000000000000000000000000000000000009", "data": "0x", "value": "0", "gas": 100 },
            "simulation": { "isSuccess": false, "simulationError": { "type": "other", "errorMessage": "reverted" } }
        }))
        .unwrap();
        let err = OdosAggregator::swap_intent(reply).unwrap_err();
        assert!(matches!(err, Error::Execution(ExecutionError::SimulationFailed(_))));
    }

    #[test]
    fn assembled_gas_is_padded() {
        let reply: AssembleReply = serde_json::from_value(serde_json::json!({
            "transaction": { "to": "0x0000000000000000000000000000000000000009", "data": "0x1234", "value": "5", "gas": 200000 },
            "simulation": { "isSuccess": true }
        }))
        .unwrap();
        let intent = OdosAggregator::swap_intent(reply).unwrap();
        assert_eq!(intent.gas_limit, Some(220_000));
        assert_eq!(intent.value, U256::from(5u8));
        assert_eq!(intent.kind, IntentKind::Swap);
    }
}
