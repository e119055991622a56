//! Move native coin from several source chains to one destination chain.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::driver::{Scenario, WalletRun};
use crate::application::orchestrator::Action;
use crate::domain::chain::Chain;
use crate::domain::policy::ChainPolicy;
use crate::domain::token::{Asset, Token};
use crate::error::{ConfigError, Result};
use crate::port::outbound::route::RouteProvider;

pub struct Bridger {
    from_chains: Vec<Chain>,
    to_chain: Chain,
    policy: ChainPolicy,
    routes: Vec<Arc<dyn RouteProvider>>,
}

impl Bridger {
    /// Source chains equal to `to_chain` are dropped. Every source must share
    /// the destination's native coin.
    pub fn new(
        from_chains: Vec<Chain>,
        to_chain: Chain,
        policy: ChainPolicy,
        routes: Vec<Arc<dyn RouteProvider>>,
    ) -> std::result::Result<Self, ConfigError> {
        let target = to_chain.descriptor().native.symbol;
        let mut sources = Vec::with_capacity(from_chains.len());
        for chain in from_chains {
            if chain == to_chain || sources.contains(&chain) {
                continue;
            }
            let symbol = chain.descriptor().native.symbol;
            if symbol != target {
                return Err(ConfigError::InvalidValue {
                    field: "bridge.from_chains",
                    reason: format!("{chain} holds {symbol}, {to_chain} holds {target}"),
                });
            }
            sources.push(chain);
        }
        if sources.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "bridge.from_chains",
                reason: format!("no source chain other than {to_chain}"),
            });
        }
        Ok(Self {
            from_chains: sources,
            to_chain,
            policy,
            routes,
        })
    }

    #[must_use]
    pub const fn to_chain(&self) -> Chain {
        self.to_chain
    }
}

#[async_trait]
impl Scenario for Bridger {
    fn name(&self) -> &'static str {
        "bridge"
    }

    fn chains(&self) -> Vec<Chain> {
        self.from_chains.clone()
    }

    async fn run_chain(&self, run: &mut WalletRun<'_>, chain: Chain) -> Result<()> {
        let native = chain.descriptor().native;
        let wallet = run.wallet();
        let action = Action {
            label: format!("bridge {} to {}", native.symbol, self.to_chain),
            chain,
            dest_chain: Some(self.to_chain),
            wallet,
            recipient: wallet,
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
