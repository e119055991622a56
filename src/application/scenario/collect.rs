//! Dust collection: swap every discovered token into the chain's native coin.

use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::application::driver::{Scenario, WalletRun};
use crate::application::orchestrator::Action;
use crate::domain::chain::Chain;
use crate::domain::outcome::{ActionOutcome, SkipReason};
use crate::domain::policy::ChainPolicy;
use crate::domain::token::{Asset, TokenBalance};
use crate::error::Result;
use crate::port::outbound::discovery::TokenDiscovery;
use crate::port::outbound::route::RouteProvider;

/// Smallest wrapped-native balance worth unwrapping (1e13 wei).
pub const DEFAULT_UNWRAP_MIN: u64 = 10_000_000_000_000;

pub struct Collector {
    discovery: Arc<dyn TokenDiscovery>,
    policy: ChainPolicy,
    swap_routes: Vec<Arc<dyn RouteProvider>>,
    unwrap_policy: ChainPolicy,
    unwrap_routes: Vec<Arc<dyn RouteProvider>>,
    unwrap_min: U256,
}

impl Collector {
    #[must_use]
    pub fn new(
        discovery: Arc<dyn TokenDiscovery>,
        policy: ChainPolicy,
        swap_routes: Vec<Arc<dyn RouteProvider>>,
        unwrap_route: Arc<dyn RouteProvider>,
        unwrap_min: U256,
    ) -> Self {
        Self {
            discovery,
            policy,
            swap_routes,
            unwrap_policy: ChainPolicy::whole_balance(vec![unwrap_route.name().to_string()]),
            unwrap_routes: vec![unwrap_route],
            unwrap_min,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &ChainPolicy {
        &self.policy
    }

    /// Discovered balances for `chain`, fetched once per wallet.
    async fn discovered(&self, run: &mut WalletRun<'_>, chain: Chain) -> Result<Option<Vec<TokenBalance>>> {
        if let Some(cached) = run.ctx.discovered(chain) {
            return Ok(Some(cached.to_vec()));
        }
        let wallet = run.wallet();
        let discovery = &self.discovery;
        let include = self.policy.include.as_slice();
        let found = run
            .orchestrator()
            .settings()
            .retry
            .run("discovery", || discovery.nonzero_balances(chain, wallet, include))
            .await?;
        if let Some(balances) = &found {
            info!(chain = %chain, wallet = %wallet, tokens = balances.len(), "Nonzero tokens found");
            run.ctx.store(chain, balances.clone());
        }
        Ok(found)
    }
}

#[async_trait]
impl Scenario for Collector {
    fn name(&self) -> &'static str {
        "collect"
    }

    fn chains(&self) -> Vec<Chain> {
        self.policy.selection.apply(&Chain::ALL)
    }

    async fn run_chain(&self, run: &mut WalletRun<'_>, chain: Chain) -> Result<()> {
        let Some(found) = self.discovered(run, chain).await? else {
            run.report(
                chain,
                "discover tokens",
                ActionOutcome::Skipped(SkipReason::Unreachable("token discovery".into())),
            )
            .await;
            return Ok(());
        };
        let (mut remaining, mut tokens): (Vec<_>, Vec<_>) =
            found.into_iter().partition(|t| t.token.asset.is_native());
        tokens.retain(|t| !t.balance.is_zero());
        run.shuffle(&mut tokens);

        let wallet = run.wallet();
        let wrapped_native = chain.descriptor().wrapped_native;

        for balance in tokens {
            let Asset::Erc20(address) = balance.token.asset else {
                continue;
            };
            if self.policy.ignore.contains(&address) {
                debug!(chain = %chain, token = %balance.token.symbol, "Ignored");
                run.report(
                    chain,
                    format!("swap {}", balance.token.symbol),
                    ActionOutcome::Skipped(SkipReason::Ignored),
                )
                .await;
                remaining.push(balance);
                continue;
            }

            let unwrapping = Some(address) == wrapped_native;
            if unwrapping && balance.balance < self.unwrap_min {
                debug!(chain = %chain, balance = %balance.balance, "Wrapped native below unwrap minimum");
                remaining.push(balance);
                continue;
            }

            let (label, policy, providers) = if unwrapping {
                (
                    format!("unwrap {}", balance.token.symbol),
                    &self.unwrap_policy,
                    self.unwrap_routes.as_slice(),
                )
            } else {
                (
                    format!("swap {}", balance.token.symbol),
                    &self.policy,
                    self.swap_routes.as_slice(),
                )
            };
            let action = Action {
                label,
                chain,
                dest_chain: None,
                wallet,
                recipient: wallet,
                token: balance.token.clone(),
                token_out: Asset::Native,
                source_balance: Some(balance.balance),
                policy,
                providers,
            };
            if !run.perform(&action).await?.is_success() {
                remaining.push(balance);
            }
        }

        run.ctx.store(chain, remaining);
        Ok(())
    }
}
