//! Route provider port: swap aggregators, DEX routers, bridges and plain transfers.

use async_trait::async_trait;

use crate::domain::intent::TxIntent;
use crate::domain::quote::{Quote, QuoteResponse, RouteRequest};
use crate::error::Result;

/// Progress of a cross-chain transfer after the source transaction landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Pending,
    Settled,
    /// The provider cannot tell; treat as possibly in flight.
    Unknown,
}

/// One way to move value.
///
/// `quote` must answer [`QuoteResponse::Unavailable`] for expected declines
/// (same asset, unsupported chain, dust output) and reserve `Err` for
/// failures worth retrying or reporting.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Stable name used in configuration and logs.
    fn name(&self) -> &'static str;

    /// Price the request.
    async fn quote(&self, request: &RouteRequest) -> Result<QuoteResponse>;

    /// Turn a quote into the transactions that execute it, in order.
    async fn assemble(&self, quote: &Quote) -> Result<Vec<TxIntent>>;

    /// Whether [`RouteProvider::settlement`] reports anything useful.
    fn tracks_settlement(&self) -> bool {
        false
    }

    /// Probe delivery of a submitted cross-chain transfer.
    async fn settlement(&self, _quote: &Quote, _tx_hash: &str) -> Result<Settlement> {
        Ok(Settlement::Settled)
    }
}
