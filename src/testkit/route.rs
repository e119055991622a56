//! Scripted route provider.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::domain::intent::TxIntent;
use crate::domain::quote::{Quote, QuoteResponse, RouteRequest, Unavailable};
use crate::domain::token::Asset;
use crate::error::{Error, Result};
use crate::port::outbound::route::{RouteProvider, Settlement};

/// What one `quote` call answers.
#[derive(Debug, Clone)]
pub enum Script {
    /// Quote the request one to one.
    Quote,
    Unavailable(Unavailable),
    /// Fail with a transient RPC error.
    Fail(String),
}

/// Route provider answering from a script, then from its default.
///
/// Quotes are one to one: `amount_out == amount_in`. Assembled intents are a
/// plain transfer to the recipient carrying the amount plus the route fee.
pub struct ScriptedRouteProvider {
    name: &'static str,
    script: Mutex<VecDeque<Script>>,
    fallback: Script,
    value_usd: Option<Decimal>,
    route_fee: U256,
    settlement: Mutex<VecDeque<Settlement>>,
    tracks: bool,
    quote_calls: Arc<AtomicU32>,
    assemble_calls: Arc<AtomicU32>,
}

impl ScriptedRouteProvider {
    fn with_fallback(name: &'static str, fallback: Script) -> Self {
        Self {
            name,
            script: Mutex::new(VecDeque::new()),
            fallback,
            value_usd: None,
            route_fee: U256::ZERO,
            settlement: Mutex::new(VecDeque::new()),
            tracks: false,
            quote_calls: Arc::new(AtomicU32::new(0)),
            assemble_calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Always quotes.
    pub fn passthrough(name: &'static str) -> Self {
        Self::with_fallback(name, Script::Quote)
    }

    /// Always declines with `reason`.
    pub fn unavailable(name: &'static str, reason: Unavailable) -> Self {
        Self::with_fallback(name, Script::Unavailable(reason))
    }

    /// Answer the next `quote` call with `step` before the default.
    pub fn then(self, step: Script) -> Self {
        self.script.lock().push_back(step);
        self
    }

    /// USD value reported on both sides of every quote.
    pub fn with_value_usd(mut self, value: Decimal) -> Self {
        self.value_usd = Some(value);
        self
    }

    pub fn with_route_fee(mut self, fee: U256) -> Self {
        self.route_fee = fee;
        self
    }

    /// Successive settlement answers; the last one repeats.
    pub fn with_settlement(mut self, answers: Vec<Settlement>) -> Self {
        self.tracks = true;
        *self.settlement.lock() = answers.into();
        self
    }

    pub fn quote_calls(&self) -> u32 {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn assemble_calls(&self) -> u32 {
        self.assemble_calls.load(Ordering::SeqCst)
    }

    fn quote_for(&self, request: &RouteRequest) -> Quote {
        Quote {
            provider: self.name,
            request: request.clone(),
            amount_out: request.amount_in,
            route_fee: self.route_fee,
            value_in_usd: self.value_usd,
            value_out_usd: self.value_usd,
            path: format!("{}-path", self.name),
            gas_estimate: None,
            quoted_at: Utc::now(),
            valid_for: Duration::seconds(60),
        }
    }
}

#[async_trait]
impl RouteProvider for ScriptedRouteProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn quote(&self, request: &RouteRequest) -> Result<QuoteResponse> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().pop_front().unwrap_or_else(|| self.fallback.clone());
        match step {
            Script::Quote => Ok(QuoteResponse::Available(self.quote_for(request))),
            Script::Unavailable(reason) => Ok(QuoteResponse::Unavailable(reason)),
            Script::Fail(reason) => Err(Error::Rpc(reason)),
        }
    }

    async fn assemble(&self, quote: &Quote) -> Result<Vec<TxIntent>> {
        self.assemble_calls.fetch_add(1, Ordering::SeqCst);
        let request = &quote.request;
        let intent = match request.token_in {
            Asset::Native => {
                TxIntent::native_transfer(request.recipient, request.amount_in.saturating_add(quote.route_fee))
            }
            Asset::Erc20(token) => TxIntent::erc20_transfer(token, request.recipient, request.amount_in),
        };
        Ok(vec![intent])
    }

    fn tracks_settlement(&self) -> bool {
        self.tracks
    }

    async fn settlement(&self, _quote: &Quote, _tx_hash: &str) -> Result<Settlement> {
        let mut answers = self.settlement.lock();
        let answer = if answers.len() > 1 {
            answers.pop_front()
        } else {
            answers.front().copied()
        };
        Ok(answer.unwrap_or(Settlement::Settled))
    }
}
