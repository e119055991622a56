//! Read-only balance report: native and token holdings with USD value.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::application::driver::{Scenario, WalletRun};
use crate::domain::chain::Chain;
use crate::domain::outcome::{ActionOutcome, SkipReason};
use crate::domain::selection::ChainSelection;
use crate::domain::token::{from_base_units, usd_value, Asset, TokenBalance};
use crate::error::Result;
use crate::port::outbound::discovery::TokenDiscovery;

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRow {
    pub wallet: Address,
    pub chain: Chain,
    pub symbol: String,
    pub amount: Decimal,
    /// `None` when no price is known.
    pub value_usd: Option<Decimal>,
}

pub struct BalanceChecker {
    discovery: Arc<dyn TokenDiscovery>,
    selection: ChainSelection,
    rows: Mutex<Vec<BalanceRow>>,
}

impl BalanceChecker {
    #[must_use]
    pub fn new(discovery: Arc<dyn TokenDiscovery>, selection: ChainSelection) -> Self {
        Self {
            discovery,
            selection,
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Rows collected so far, leaving the report empty.
    pub fn take_rows(&self) -> Vec<BalanceRow> {
        std::mem::take(&mut *self.rows.lock())
    }
}

#[async_trait]
impl Scenario for BalanceChecker {
    fn name(&self) -> &'static str {
        "balances"
    }

    fn chains(&self) -> Vec<Chain> {
        self.selection.apply(&Chain::ALL)
    }

    async fn run_chain(&self, run: &mut WalletRun<'_>, chain: Chain) -> Result<()> {
        let wallet = run.wallet();
        let orchestrator = run.orchestrator();
        let retry = orchestrator.settings().retry;
        let collab = orchestrator.collaborators();
        let native = chain.descriptor().native;

        let Some(native_balance) = retry
            .run("balance", || collab.balances.balance(chain, wallet, Asset::Native))
            .await?
        else {
            run.report(
                chain,
                "check balances",
                ActionOutcome::Skipped(SkipReason::Unreachable("balance read".into())),
            )
            .await;
            return Ok(());
        };

        let discovery = &self.discovery;
        let tokens: Vec<TokenBalance> = retry
            .run("discovery", || discovery.nonzero_balances(chain, wallet, &[]))
            .await?
            .unwrap_or_default()
            .into_iter()
            .filter(|b| !b.token.asset.is_native() && !b.balance.is_zero())
            .collect();

        let native_price = retry
            .run("native price", || collab.prices.native_price(chain))
            .await
            .unwrap_or_else(|err| {
                warn!(chain = %chain, error = %err, "Native price lookup failed");
                None
            })
            .unwrap_or_default();
        let addresses: Vec<Address> = tokens
            .iter()
            .filter_map(|b| match b.token.asset {
                Asset::Erc20(address) => Some(address),
                Asset::Native => None,
            })
            .collect();
        let token_prices = if addresses.is_empty() {
            Default::default()
        } else {
            retry
                .run("token prices", || collab.prices.token_prices(chain, &addresses))
                .await
                .unwrap_or_else(|err| {
                    warn!(chain = %chain, error = %err, "Token price lookup failed");
                    None
                })
                .unwrap_or_default()
        };

        let mut rows = Vec::with_capacity(tokens.len() + 1);
        if !native_balance.is_zero() {
            rows.push(row(wallet, chain, native.symbol, native_balance, native.decimals, native_price));
        }
        for balance in &tokens {
            let price = match balance.token.asset {
                Asset::Erc20(address) => token_prices.get(&address).copied().unwrap_or_default(),
                Asset::Native => Decimal::ZERO,
            };
            rows.push(row(
                wallet,
                chain,
                &balance.token.symbol,
                balance.balance,
                balance.token.decimals,
                price,
            ));
        }

        let total: Decimal = rows.iter().filter_map(|r| r.value_usd).sum();
        info!(chain = %chain, wallet = %wallet, assets = rows.len(), total_usd = %total.round_dp(2), "Balances");
        self.rows.lock().extend(rows);
        Ok(())
    }
}

fn row(wallet: Address, chain: Chain, symbol: &str, balance: U256, decimals: u8, price: Decimal) -> BalanceRow {
    BalanceRow {
        wallet,
        chain,
        symbol: symbol.to_string(),
        amount: from_base_units(balance, decimals).unwrap_or_default(),
        value_usd: usd_value(balance, decimals, price).map(|v| v.round_dp(2)),
    }
}
