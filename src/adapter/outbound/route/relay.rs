//! Relay bridge.
//!
//! One `quote` call returns both the price and the ready-to-send deposit
//! transaction. The transaction is kept in [`Quote::path`] so `assemble`
//! needs no second round trip. Relay's fee is netted out of the output.

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::outbound::http::send_json;
use crate::domain::intent::{IntentKind, TxIntent};
use crate::domain::quote::{Quote, QuoteResponse, RouteRequest, Unavailable};
use crate::error::{Error, Result};
use crate::port::outbound::route::RouteProvider;

const DEFAULT_API_URL: &str = "https://api.relay.link";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteBody {
    user: Address,
    origin_chain_id: u64,
    destination_chain_id: u64,
    origin_currency: Address,
    destination_currency: Address,
    recipient: Address,
    trade_type: &'static str,
    amount: String,
    use_permit: bool,
    use_external_liquidity: bool,
    use_deposit_address: bool,
    referrer: &'static str,
}

#[derive(Debug, Deserialize)]
struct QuoteReply {
    #[serde(default)]
    steps: Vec<Step>,
    #[serde(default)]
    details: Option<Details>,
}

#[derive(Debug, Deserialize)]
struct Step {
    #[serde(default)]
    items: Vec<StepItem>,
}

#[derive(Debug, Deserialize)]
struct StepItem {
    data: Option<DepositTx>,
}

/// Deposit transaction as returned by the API and stored in the quote path.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DepositTx {
    to: Address,
    #[serde(default)]
    data: Bytes,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Details {
    currency_out: Option<CurrencyAmount>,
}

#[derive(Debug, Deserialize)]
struct CurrencyAmount {
    amount: String,
}

/// Relay bridge adapter.
pub struct RelayBridge {
    http: HttpClient,
    base_url: String,
}

impl RelayBridge {
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

    fn quote_body(request: &RouteRequest, dest_chain_id: u64) -> QuoteBody {
        QuoteBody {
            user: request.wallet,
            origin_chain_id: request.chain.id(),
            destination_chain_id: dest_chain_id,
            origin_currency: Address::ZERO,
            destination_currency: Address::ZERO,
            recipient: request.recipient,
            trade_type: "EXACT_INPUT",
            amount: request.amount_in.to_string(),
            use_permit: false,
            use_external_liquidity: false,
            use_deposit_address: false,
            referrer: "relay.link/bridge",
        }
    }

    fn interpret(&self, request: &RouteRequest, reply: QuoteReply) -> Result<QuoteResponse> {
        let Some(tx) = reply
            .steps
            .into_iter()
            .next()
            .and_then(|step| step.items.into_iter().next())
            .and_then(|item| item.data)
        else {
            return Ok(QuoteResponse::Unavailable(Unavailable::NoLiquidity));
        };
        let amount_out = match reply.details.and_then(|d| d.currency_out) {
            Some(out) => out
                .amount
                .parse::<U256>()
                .map_err(|e| Error::Parse(format!("relay output amount: {e}")))?,
            None => request.amount_in,
        };
        if amount_out.is_zero() {
            return Ok(QuoteResponse::Unavailable(Unavailable::NoLiquidity));
        }

        Ok(QuoteResponse::Available(Quote {
            provider: self.name(),
            request: request.clone(),
            amount_out,
            route_fee: U256::ZERO,
            value_in_usd: None,
            value_out_usd: None,
            path: serde_json::to_string(&tx)?,
            gas_estimate: None,
            quoted_at: Utc::now(),
            valid_for: Duration::seconds(30),
        }))
    }
}

#[async_trait]
impl RouteProvider for RelayBridge {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn quote(&self, request: &RouteRequest) -> Result<QuoteResponse> {
        let Some(dest) = request.dest_chain.filter(|dest| *dest != request.chain) else {
            return Ok(QuoteResponse::Unavailable(Unavailable::Other(
                "relay needs a different destination chain".into(),
            )));
        };
        if !request.token_in.is_native() || !request.token_out.is_native() {
            return Ok(QuoteResponse::Unavailable(Unavailable::Other(
                "relay bridges the native coin only".into(),
            )));
        }

        let url = format!("{}/quote", self.base_url);
        let body = Self::quote_body(request, dest.id());
        let reply: QuoteReply = send_json(self.http.post(&url).json(&body)).await?;
        let response = self.interpret(request, reply)?;
        if let QuoteResponse::Available(quote) = &response {
            debug!(chain = %request.chain, dest = %dest, amount_out = %quote.amount_out, "Relay quote");
        }
        Ok(response)
    }

    async fn assemble(&self, quote: &Quote) -> Result<Vec<TxIntent>> {
        let tx: DepositTx = serde_json::from_str(&quote.path)?;
        let value = tx
            .value
            .parse::<U256>()
            .map_err(|e| Error::Parse(format!("relay tx value: {e}")))?;
        Ok(vec![TxIntent {
            kind: IntentKind::Bridge,
            to: tx.to,
            value,
            data: tx.data,
            gas_limit: None,
            gas_price: None,
        }])
    }
}
