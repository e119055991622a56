//! Forward native coins or a token to each wallet's destination address.

use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::application::driver::{Scenario, WalletRun};
use crate::application::orchestrator::Action;
use crate::domain::chain::Chain;
use crate::domain::outcome::{ActionOutcome, SkipReason};
use crate::domain::policy::ChainPolicy;
use crate::domain::token::{Asset, Token};
use crate::error::Result;
use crate::port::outbound::discovery::TokenDiscovery;
use crate::port::outbound::route::RouteProvider;

/// Sends native coin on every selected chain.
pub struct NativeSender {
    policy: ChainPolicy,
    routes: Vec<Arc<dyn RouteProvider>>,
}

impl NativeSender {
    #[must_use]
    pub fn new(policy: ChainPolicy, routes: Vec<Arc<dyn RouteProvider>>) -> Self {
        Self { policy, routes }
    }
}

#[async_trait]
impl Scenario for NativeSender {
    fn name(&self) -> &'static str {
        "send"
    }

    fn needs_destination(&self) -> bool {
        true
    }

    fn chains(&self) -> Vec<Chain> {
        self.policy.selection.apply(&Chain::ALL)
    }

    async fn run_chain(&self, run: &mut WalletRun<'_>, chain: Chain) -> Result<()> {
        let native = chain.descriptor().native;
        let label = format!("send {}", native.symbol);
        let Some(recipient) = run.ctx.destination else {
            run.report(chain, label, ActionOutcome::Failed("wallet has no destination".into()))
                .await;
            return Ok(());
        };

        let action = Action {
            label,
            chain,
            dest_chain: None,
            wallet: run.wallet(),
            recipient,
            token: Token::native(native.symbol, native.decimals),
            token_out: Asset::Native,
            source_balance: None,
            policy: &self.policy,
            providers: &self.routes,
        };
        run.perform(&action).await?;
        Ok(())
    }
}

/// Sends the whole balance of one ERC-20 token on one chain.
pub struct TokenSender {
    chain: Chain,
    token: Address,
    policy: ChainPolicy,
    routes: Vec<Arc<dyn RouteProvider>>,
    discovery: Arc<dyn TokenDiscovery>,
}

impl TokenSender {
    #[must_use]
    pub fn new(
        chain: Chain,
        token: Address,
        routes: Vec<Arc<dyn RouteProvider>>,
        discovery: Arc<dyn TokenDiscovery>,
    ) -> Self {
        let names = routes.iter().map(|r| r.name().to_string()).collect();
        Self {
            chain,
            token,
            policy: ChainPolicy::whole_balance(names),
            routes,
            discovery,
        }
    }
}

#[async_trait]
impl Scenario for TokenSender {
    fn name(&self) -> &'static str {
        "send-token"
    }

    fn needs_destination(&self) -> bool {
        true
    }

    fn chains(&self) -> Vec<Chain> {
        vec![self.chain]
    }

    async fn run_chain(&self, run: &mut WalletRun<'_>, chain: Chain) -> Result<()> {
        let label = format!("send {}", self.token);
        let Some(recipient) = run.ctx.destination else {
            run.report(chain, label, ActionOutcome::Failed("wallet has no destination".into()))
                .await;
            return Ok(());
        };

        let Some(balance) = find_token(run, self.discovery.as_ref(), chain, self.token).await? else {
            run.report(chain, label, ActionOutcome::Skipped(SkipReason::NothingToMove))
                .await;
            return Ok(());
        };

        let action = Action {
            label: format!("send {}", balance.token.symbol),
            chain,
            dest_chain: None,
            wallet: run.wallet(),
            recipient,
            token: balance.token,
            token_out: Asset::Erc20(self.token),
            source_balance: Some(balance.balance),
            policy: &self.policy,
            providers: &self.routes,
        };
        run.perform(&action).await?;
        Ok(())
    }
}

/// Balance and metadata of one token held by the current wallet.
pub(super) async fn find_token(
    run: &WalletRun<'_>,
    discovery: &dyn TokenDiscovery,
    chain: Chain,
    token: Address,
) -> Result<Option<crate::domain::token::TokenBalance>> {
    let wallet = run.wallet();
    let extra = [token];
    let found = run
        .orchestrator()
        .settings()
        .retry
        .run("token lookup", || discovery.nonzero_balances(chain, wallet, &extra))
        .await?;
    Ok(found
        .unwrap_or_default()
        .into_iter()
        .find(|b| b.token.asset == Asset::Erc20(token) && !b.balance.is_zero()))
}
