//! Sell one configured token for native coin, guarded by a unit-price floor.

use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;

use super::send::find_token;
use crate::application::driver::{Scenario, WalletRun};
use crate::application::orchestrator::Action;
use crate::domain::chain::Chain;
use crate::domain::outcome::{ActionOutcome, SkipReason};
use crate::domain::policy::ChainPolicy;
use crate::domain::token::Asset;
use crate::error::Result;
use crate::port::outbound::discovery::TokenDiscovery;
use crate::port::outbound::route::RouteProvider;

pub struct Seller {
    chain: Chain,
    token: Address,
    policy: ChainPolicy,
    routes: Vec<Arc<dyn RouteProvider>>,
    discovery: Arc<dyn TokenDiscovery>,
}

impl Seller {
    /// `policy.guard` carries the price floor and slippage bound.
    #[must_use]
    pub fn new(
        chain: Chain,
        token: Address,
        policy: ChainPolicy,
        routes: Vec<Arc<dyn RouteProvider>>,
        discovery: Arc<dyn TokenDiscovery>,
    ) -> Self {
        Self {
            chain,
            token,
            policy,
            routes,
            discovery,
        }
    }
}

#[async_trait]
impl Scenario for Seller {
    fn name(&self) -> &'static str {
        "sell"
    }

    fn chains(&self) -> Vec<Chain> {
        vec![self.chain]
    }

    async fn run_chain(&self, run: &mut WalletRun<'_>, chain: Chain) -> Result<()> {
        let Some(balance) = find_token(run, self.discovery.as_ref(), chain, self.token).await? else {
            run.report(
                chain,
                format!("sell {}", self.token),
                ActionOutcome::Skipped(SkipReason::NothingToMove),
            )
            .await;
            return Ok(());
        };

        let wallet = run.wallet();
        let action = Action {
            label: format!("sell {}", balance.token.symbol),
            chain,
            dest_chain: None,
            wallet,
            recipient: wallet,
            token: balance.token,
            token_out: Asset::Native,
            source_balance: Some(balance.balance),
            policy: &self.policy,
            providers: &self.routes,
        };
        run.perform(&action).await?;
        Ok(())
    }
}
