//! Stargate V2 native pools.
//!
//! Quotes read the LayerZero messaging fee (`quoteSend`) and the delivered
//! amount (`quoteOFT`) from the source pool. Economy mode rides the bus and
//! can be tracked through the bus-queue API until a driver picks it up.

use alloy_primitives::{address, Address, Bytes, FixedBytes, U256};
use alloy_provider::ProviderBuilder;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::adapter::outbound::evm::contracts::IStargatePool::{self, MessagingFee, SendParam};
use crate::adapter::outbound::http::send_json;
use crate::domain::chain::Chain;
use crate::domain::intent::{IntentKind, TxIntent};
use crate::domain::quote::{Quote, QuoteResponse, RouteRequest, Unavailable};
use crate::error::{Error, Result};
use crate::port::outbound::route::{RouteProvider, Settlement};

const BUS_QUEUE_URL: &str = "https://d3k4i7b673n27r.cloudfront.net/v1/buses/bus-queue";

/// Minimum delivered share, in per-mille of the sent amount.
const MIN_AMOUNT_PER_MILLE: u64 = 995;

/// Delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StargateMode {
    /// Batched "bus" delivery; cheaper, settles when the bus drives.
    #[default]
    Economy,
    /// Dedicated "taxi" message.
    Fast,
}

impl StargateMode {
    fn oft_cmd(self) -> Bytes {
        match self {
            Self::Economy => Bytes::from_static(&[0x01]),
            Self::Fast => Bytes::new(),
        }
    }
}

/// Native pool address and LayerZero endpoint id.
#[must_use]
pub fn pool(chain: Chain) -> Option<(Address, u32)> {
    let entry = match chain {
        Chain::Ethereum => (address!("77b2043768d28E9C9aB44E1aBfC95944bcE57931"), 30101),
        Chain::Arbitrum => (address!("A45B5130f36CDcA45667738e2a258AB09f4A5f7F"), 30110),
        Chain::Optimism => (address!("e8CDF27AcD73a434D661C84887215F7598e7d0d3"), 30111),
        Chain::Base => (address!("dc181Bd607330aeeBEF6ea62e03e5e1Fb4B6F7C7"), 30184),
        Chain::Linea => (address!("81F6138153d473E8c5EcebD3DC8Cd4903506B075"), 30183),
        Chain::Scroll => (address!("C2b638Cb5042c1B3c5d5C969361fB50569840583"), 30214),
        _ => return None,
    };
    Some(entry)
}

#[derive(Debug, Deserialize)]
struct BusEntry {
    #[serde(default)]
    bus: Option<BusBody>,
    #[serde(default)]
    queue: Option<BusBody>,
}

#[derive(Debug, Deserialize)]
struct BusBody {
    #[serde(default)]
    passengers: Vec<Passenger>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Passenger {
    ride_status: String,
}

/// Interpret a bus-queue reply.
fn bus_settlement(entries: &[BusEntry]) -> Settlement {
    let Some(body) = entries.first().and_then(|entry| entry.bus.as_ref().or(entry.queue.as_ref())) else {
        return Settlement::Unknown;
    };
    match body.passengers.first().map(|p| p.ride_status.as_str()) {
        Some("DRIVABLE" | "NOT_DRIVEN") => Settlement::Pending,
        Some(_) => Settlement::Settled,
        None => Settlement::Unknown,
    }
}

/// Stargate V2 bridge adapter.
pub struct StargateBridge {
    http: HttpClient,
    mode: StargateMode,
    bus_url: String,
}

impl StargateBridge {
    #[must_use]
    pub fn new(http: HttpClient, mode: StargateMode) -> Self {
        Self {
            http,
            mode,
            bus_url: BUS_QUEUE_URL.into(),
        }
    }

    fn send_param(&self, request: &RouteRequest, dst_eid: u32) -> SendParam {
        SendParam {
            dstEid: dst_eid,
            to: FixedBytes::left_padding_from(request.recipient.as_slice()),
            amountLD: request.amount_in,
            minAmountLD: request.amount_in * U256::from(MIN_AMOUNT_PER_MILLE) / U256::from(1000u64),
            extraOptions: Bytes::new(),
            composeMsg: Bytes::new(),
            oftCmd: self.mode.oft_cmd(),
        }
    }

    fn route(request: &RouteRequest) -> std::result::Result<(Address, u32), Unavailable> {
        let dest = request
            .dest_chain
            .ok_or_else(|| Unavailable::Other("stargate needs a destination chain".into()))?;
        if dest == request.chain {
            return Err(Unavailable::SameAsset);
        }
        if !request.token_in.is_native() || !request.token_out.is_native() {
            return Err(Unavailable::Other("stargate bridges the native coin only".into()));
        }
        let (pool_addr, _) = pool(request.chain).ok_or(Unavailable::UnsupportedChain(request.chain))?;
        let (_, dst_eid) = pool(dest).ok_or(Unavailable::UnsupportedChain(dest))?;
        Ok((pool_addr, dst_eid))
    }
}

#[async_trait]
impl RouteProvider for StargateBridge {
    fn name(&self) -> &'static str {
        "stargate"
    }

    async fn quote(&self, request: &RouteRequest) -> Result<QuoteResponse> {
        let (pool, dst_eid) = match Self::route(request) {
            Ok(route) => route,
            Err(reason) => return Ok(QuoteResponse::Unavailable(reason)),
        };
        let param = self.send_param(request, dst_eid);

        let url = Url::parse(request.chain.descriptor().rpc_url())?;
        let provider = ProviderBuilder::new().connect_http(url);
        let contract = IStargatePool::new(pool, &provider);
        let fee = contract
            .quoteSend(param.clone(), false)
            .call()
            .await
            .map_err(|e| Error::Rpc(format!("quoteSend: {e}")))?;
        let oft = contract
            .quoteOFT(param)
            .call()
            .await
            .map_err(|e| Error::Rpc(format!("quoteOFT: {e}")))?;

        let amount_out = oft.receipt.amountReceivedLD;
        if amount_out.is_zero() {
            return Ok(QuoteResponse::Unavailable(Unavailable::NoLiquidity));
        }
        debug!(
            chain = %request.chain,
            amount_in = %request.amount_in,
            amount_out = %amount_out,
            native_fee = %fee.nativeFee,
            mode = ?self.mode,
            "Stargate quote"
        );

        Ok(QuoteResponse::Available(Quote {
            provider: self.name(),
            request: request.clone(),
            amount_out,
            route_fee: fee.nativeFee,
            value_in_usd: None,
            value_out_usd: None,
            path: format!("{pool}:{dst_eid}"),
            gas_estimate: None,
            quoted_at: Utc::now(),
            valid_for: Duration::seconds(60),
        }))
    }

    async fn assemble(&self, quote: &Quote) -> Result<Vec<TxIntent>> {
        let request = &quote.request;
        let (pool, dst_eid) = Self::route(request)
            .map_err(|reason| Error::Parse(format!("stargate quote no longer routable: {reason}")))?;
        let call = IStargatePool::sendCall {
            sendParam: self.send_param(request, dst_eid),
            fee: MessagingFee {
                nativeFee: quote.route_fee,
                lzTokenFee: U256::ZERO,
            },
            refundAddress: request.wallet,
        };
        Ok(vec![TxIntent {
            kind: IntentKind::Bridge,
            to: pool,
            value: request.amount_in + quote.route_fee,
            data: call.abi_encode().into(),
            gas_limit: None,
            gas_price: None,
        }])
    }

    fn tracks_settlement(&self) -> bool {
        self.mode == StargateMode::Economy
    }

    async fn settlement(&self, _quote: &Quote, tx_hash: &str) -> Result<Settlement> {
        let url = format!("{}/{tx_hash}", self.bus_url);
        let entries: Vec<BusEntry> = send_json(self.http.get(&url)).await?;
        Ok(bus_settlement(&entries))
    }
}
