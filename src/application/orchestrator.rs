//! Per-action decision engine.
//!
//! One call to [`Orchestrator::execute`] drives a single (wallet, chain,
//! action) through
//!
//! ```text
//! Start → ValueResolved → ThresholdChecked → Quoted → FeeAdjusted → Executed
//!       → Succeeded | SkippedBelowThreshold | SkippedNoRoute
//!       | SkippedInsufficientAfterFee | Failed
//! ```
//!
//! Every transition is logged. Only configuration errors escape; everything
//! else is folded into an [`ActionOutcome`] so the driver can move on.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::polling::{poll_until, PollOutcome};
use super::retry::RetryPolicy;
use super::routing::{select_route, RouteSelection};
use crate::domain::chain::Chain;
use crate::domain::fee::{adjust_for_fee, pad_gas_limit, scale_gas_price, FeeBreakdown, GasPlan, InsufficientValue};
use crate::domain::intent::TxIntent;
use crate::domain::outcome::{ActionOutcome, ActionState, Receipt, SkipReason};
use crate::domain::policy::ChainPolicy;
use crate::domain::quote::{Quote, QuoteResponse, RouteRequest};
use crate::domain::token::{usd_value, Asset, Token};
use crate::error::{ExecutionError, Result};
use crate::port::outbound::chain::{BalanceReader, GasEstimator, TransactionExecutor, TxStatus};
use crate::port::outbound::notifier::{ActionEvent, Event, NotifierRegistry};
use crate::port::outbound::price::PriceOracle;
use crate::port::outbound::route::{RouteProvider, Settlement};

/// External services the orchestrator calls into.
#[derive(Clone)]
pub struct Collaborators {
    pub balances: Arc<dyn BalanceReader>,
    pub gas: Arc<dyn GasEstimator>,
    pub executor: Arc<dyn TransactionExecutor>,
    pub prices: Arc<dyn PriceOracle>,
}

/// Run-wide execution knobs.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionSettings {
    pub retry: RetryPolicy,
    /// Safety factor applied to the gas price and to estimated contract-call limits.
    pub gas_multiplier: Decimal,
    pub confirmation_timeout: Duration,
    /// Upper bound on waiting for cross-chain delivery; zero disables the wait.
    pub settlement_wait: Duration,
    pub settlement_interval: Duration,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            gas_multiplier: Decimal::new(13, 1),
            confirmation_timeout: Duration::from_secs(180),
            settlement_wait: Duration::ZERO,
            settlement_interval: Duration::from_secs(15),
        }
    }
}

/// One unit of work: move some of `token` on `chain` towards `token_out`.
pub struct Action<'a> {
    /// Short description for logs and notifications, e.g. `swap DUST`.
    pub label: String,
    pub chain: Chain,
    /// Target chain for bridges.
    pub dest_chain: Option<Chain>,
    pub wallet: Address,
    pub recipient: Address,
    pub token: Token,
    pub token_out: Asset,
    /// Known balance of `token`; read from the chain when absent.
    pub source_balance: Option<U256>,
    pub policy: &'a ChainPolicy,
    /// Routes in priority order.
    pub providers: &'a [Arc<dyn RouteProvider>],
}

/// Drives actions from value resolution to a terminal outcome.
pub struct Orchestrator {
    collab: Collaborators,
    settings: ExecutionSettings,
    notifier: Arc<NotifierRegistry>,
    rng: Mutex<StdRng>,
}

/// Short-circuits `drive` with a terminal outcome.
macro_rules! settle {
    ($action:expr, $state:expr, $outcome:expr) => {{
        let outcome = $outcome;
        log_state($action, $state);
        return Ok(outcome);
    }};
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        collab: Collaborators,
        settings: ExecutionSettings,
        notifier: Arc<NotifierRegistry>,
        rng: StdRng,
    ) -> Self {
        Self {
            collab,
            settings,
            notifier,
            rng: Mutex::new(rng),
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    #[must_use]
    pub const fn collaborators(&self) -> &Collaborators {
        &self.collab
    }

    #[must_use]
    pub fn notifier(&self) -> &NotifierRegistry {
        &self.notifier
    }

    /// Run one action to completion and report it.
    ///
    /// # Errors
    ///
    /// Only configuration errors are returned; every other failure becomes
    /// [`ActionOutcome::Failed`].
    pub async fn execute(&self, action: &Action<'_>) -> Result<ActionOutcome> {
        log_state(action, ActionState::Start);
        let outcome = match self.drive(action).await {
            Ok(outcome) => outcome,
            Err(err) if err.is_config() => return Err(err),
            Err(err) => {
                log_state(action, ActionState::Failed);
                ActionOutcome::Failed(err.to_string())
            }
        };

        let explorer_link = outcome
            .tx_hash()
            .map(|hash| action.chain.descriptor().tx_link(hash));
        self.notifier.notify_all(Event::ActionCompleted(ActionEvent {
            wallet: action.wallet,
            chain: action.chain,
            action: action.label.clone(),
            outcome: outcome.clone(),
            explorer_link,
        }));
        Ok(outcome)
    }

    async fn drive(&self, action: &Action<'_>) -> Result<ActionOutcome> {
        let retry = &self.settings.retry;
        let policy = action.policy;

        let Some(source) = self.source_balance(action).await? else {
            settle!(
                action,
                ActionState::Failed,
                ActionOutcome::Skipped(SkipReason::Unreachable("balance read".into()))
            );
        };

        let destination = if policy.value.needs_destination() {
            match self.destination_balance(action).await? {
                Some(balance) => Some(balance),
                None => settle!(
                    action,
                    ActionState::Failed,
                    ActionOutcome::Skipped(SkipReason::Unreachable("destination balance read".into()))
                ),
            }
        } else {
            None
        };

        let raw = {
            let mut rng = self.rng.lock();
            policy
                .value
                .resolve(source, destination, action.token.decimals, &mut *rng)?
        };
        info!(
            chain = %action.chain,
            wallet = %action.wallet,
            action = %action.label,
            balance = %source,
            amount = %raw,
            policy = %policy.value,
            "Value resolved"
        );
        log_state(action, ActionState::ValueResolved);

        if raw.is_zero() {
            settle!(
                action,
                ActionState::SkippedBelowThreshold,
                ActionOutcome::Skipped(SkipReason::NothingToMove)
            );
        }

        if policy.min_value_usd > Decimal::ZERO {
            let price = self.unit_price(action.chain, action.token.asset).await;
            match price.and_then(|p| usd_value(raw, action.token.decimals, p)) {
                Some(value_usd) if value_usd < policy.min_value_usd => settle!(
                    action,
                    ActionState::SkippedBelowThreshold,
                    ActionOutcome::Skipped(SkipReason::BelowThreshold {
                        value_usd: value_usd.round_dp(4),
                        min_usd: policy.min_value_usd,
                    })
                ),
                Some(_) => {}
                None => warn!(
                    chain = %action.chain,
                    token = %action.token.symbol,
                    "Price unknown, minimum value check skipped"
                ),
            }
        }
        log_state(action, ActionState::ThresholdChecked);

        let request = RouteRequest {
            chain: action.chain,
            dest_chain: action.dest_chain,
            wallet: action.wallet,
            recipient: action.recipient,
            token_in: action.token.asset,
            token_out: action.token_out,
            decimals_in: action.token.decimals,
            amount_in: raw,
        };
        let (provider, mut quote) = match select_route(action.providers, &request, retry).await? {
            RouteSelection::Found { provider, quote } => (provider, quote),
            RouteSelection::NoRoute(declines) => settle!(
                action,
                ActionState::SkippedNoRoute,
                ActionOutcome::Skipped(SkipReason::NoRoute(declines))
            ),
        };
        self.value_output(policy, &mut quote).await;
        if let Some(veto) = veto(policy, &quote) {
            settle!(action, ActionState::Failed, veto);
        }
        log_state(action, ActionState::Quoted);

        let Some(mut intents) = retry.run("assemble", || provider.assemble(&quote)).await? else {
            settle!(
                action,
                ActionState::Failed,
                ActionOutcome::Skipped(SkipReason::Unreachable(format!("{} assemble", provider.name())))
            );
        };

        let Some(plan) = self.plan_gas(action, &intents).await? else {
            settle!(
                action,
                ActionState::Failed,
                ActionOutcome::Skipped(SkipReason::Unreachable("gas estimate".into()))
            );
        };
        let fees = FeeBreakdown {
            gas: plan.cost(),
            route: quote.route_fee,
        };

        let amount = if action.token.asset.is_native() {
            match adjust_for_fee(raw, &fees, policy.deduct_fee) {
                Ok(amount) => amount,
                Err(short) => settle!(
                    action,
                    ActionState::SkippedInsufficientAfterFee,
                    ActionOutcome::Skipped(SkipReason::InsufficientAfterFee(short))
                ),
            }
        } else {
            if action.token_out.is_native() && action.dest_chain.is_none() && fees.gas >= quote.amount_out {
                settle!(
                    action,
                    ActionState::SkippedInsufficientAfterFee,
                    ActionOutcome::Skipped(SkipReason::InsufficientAfterFee(InsufficientValue {
                        amount: quote.amount_out,
                        fees: fees.gas,
                    }))
                );
            }
            raw
        };
        info!(
            chain = %action.chain,
            action = %action.label,
            gas_fee = %fees.gas,
            route_fee = %fees.route,
            amount = %amount,
            deduct_fee = policy.deduct_fee,
            "Fees estimated"
        );

        if amount != raw || quote.is_stale(Utc::now()) {
            let request = request.with_amount(amount);
            match retry.run("requote", || provider.quote(&request)).await? {
                Some(QuoteResponse::Available(fresh)) => quote = fresh,
                Some(QuoteResponse::Unavailable(reason)) => settle!(
                    action,
                    ActionState::SkippedNoRoute,
                    ActionOutcome::Skipped(SkipReason::NoRoute(vec![(provider.name().to_string(), reason)]))
                ),
                None => settle!(
                    action,
                    ActionState::Failed,
                    ActionOutcome::Skipped(SkipReason::Unreachable(format!("{} requote", provider.name())))
                ),
            }
            self.value_output(policy, &mut quote).await;
            if let Some(veto) = veto(policy, &quote) {
                settle!(action, ActionState::Failed, veto);
            }
            intents = match retry.run("assemble", || provider.assemble(&quote)).await? {
                Some(intents) => intents,
                None => settle!(
                    action,
                    ActionState::Failed,
                    ActionOutcome::Skipped(SkipReason::Unreachable(format!("{} assemble", provider.name())))
                ),
            };
        }
        let intents = match plan.pin(&intents) {
            Some(pinned) => pinned,
            None => {
                let Some(replanned) = self.plan_gas(action, &intents).await? else {
                    settle!(
                        action,
                        ActionState::Failed,
                        ActionOutcome::Skipped(SkipReason::Unreachable("gas estimate".into()))
                    );
                };
                if action.token.asset.is_native() && policy.deduct_fee && replanned.cost() > fees.gas {
                    settle!(
                        action,
                        ActionState::Failed,
                        ActionOutcome::Failed(format!(
                            "gas after requote {} exceeds deducted {}",
                            replanned.cost(),
                            fees.gas
                        ))
                    );
                }
                replanned.pin(&intents).unwrap_or(intents)
            }
        };
        log_state(action, ActionState::FeeAdjusted);

        let Some((tx_hash, confirmed)) = self.submit(action, &intents).await? else {
            settle!(
                action,
                ActionState::Failed,
                ActionOutcome::Failed(format!("{} produced no transactions", provider.name()))
            );
        };
        log_state(action, ActionState::Executed);

        if provider.tracks_settlement() && !self.settings.settlement_wait.is_zero() {
            self.await_settlement(action, provider.as_ref(), &quote, &tx_hash)
                .await;
        }

        info!(
            chain = %action.chain,
            wallet = %action.wallet,
            action = %action.label,
            route = provider.name(),
            amount = %amount,
            tx_hash = %tx_hash,
            confirmed,
            "Action succeeded"
        );
        settle!(
            action,
            ActionState::Succeeded,
            ActionOutcome::Success(Receipt {
                tx_hash,
                route: provider.name().to_string(),
                amount,
                confirmed,
            })
        );
    }

    async fn source_balance(&self, action: &Action<'_>) -> Result<Option<U256>> {
        if let Some(balance) = action.source_balance {
            return Ok(Some(balance));
        }
        let balances = &self.collab.balances;
        self.settings
            .retry
            .run("balance", || {
                balances.balance(action.chain, action.wallet, action.token.asset)
            })
            .await
    }

    async fn destination_balance(&self, action: &Action<'_>) -> Result<Option<U256>> {
        let chain = action.dest_chain.unwrap_or(action.chain);
        let balances = &self.collab.balances;
        self.settings
            .retry
            .run("destination balance", || {
                balances.balance(chain, action.recipient, action.token_out)
            })
            .await
    }

    /// USD price of one whole unit, if known.
    async fn unit_price(&self, chain: Chain, asset: Asset) -> Option<Decimal> {
        let prices = &self.collab.prices;
        let retry = &self.settings.retry;
        let looked_up = match asset {
            Asset::Native => retry.run("native price", || prices.native_price(chain)).await,
            Asset::Erc20(token) => retry
                .run("token price", || {
                    prices.token_prices(chain, std::slice::from_ref(&token))
                })
                .await
                .map(|found| found.and_then(|map| map.get(&token).copied())),
        };
        match looked_up {
            Ok(price) => price.filter(|p| *p > Decimal::ZERO),
            Err(err) => {
                warn!(chain = %chain, error = %err, "Price lookup failed");
                None
            }
        }
    }

    /// Value a native-coin output through the oracle when the route quoted
    /// no USD figure and a unit-price floor needs one.
    async fn value_output(&self, policy: &ChainPolicy, quote: &mut Quote) {
        if quote.value_out_usd.is_some()
            || policy.guard.min_unit_price_usd.is_none()
            || !quote.request.token_out.is_native()
        {
            return;
        }
        let chain = quote.request.dest_chain.unwrap_or(quote.request.chain);
        let Some(price) = self.unit_price(chain, Asset::Native).await else {
            return;
        };
        quote.value_out_usd = usd_value(quote.amount_out, chain.descriptor().native.decimals, price);
        debug!(
            chain = %chain,
            provider = quote.provider,
            value_out_usd = ?quote.value_out_usd,
            "Output valued from oracle"
        );
    }

    /// Fix a gas limit for every intent and one multiplied price for all.
    ///
    /// Preset limits are kept. Estimated contract calls get the multiplier as
    /// headroom; a plain value transfer uses its estimate as is.
    async fn plan_gas(&self, action: &Action<'_>, intents: &[TxIntent]) -> Result<Option<GasPlan>> {
        let gas = &self.collab.gas;
        let retry = &self.settings.retry;
        let multiplier = self.settings.gas_multiplier;

        let Some(price) = retry.run("gas price", || gas.gas_price(action.chain)).await? else {
            return Ok(None);
        };

        let mut limits = Vec::with_capacity(intents.len());
        for intent in intents {
            let limit = match intent.gas_limit {
                Some(limit) => limit,
                None => {
                    let Some(estimate) = retry
                        .run("estimate gas", || gas.estimate_gas(action.chain, action.wallet, intent))
                        .await?
                    else {
                        return Ok(None);
                    };
                    if intent.data.is_empty() {
                        estimate
                    } else {
                        pad_gas_limit(estimate, multiplier)
                    }
                }
            };
            limits.push(limit);
        }

        Ok(Some(GasPlan {
            price: scale_gas_price(price, multiplier),
            limits,
        }))
    }

    /// Submit intents in order and wait for each. Returns the last hash.
    async fn submit(&self, action: &Action<'_>, intents: &[TxIntent]) -> Result<Option<(String, bool)>> {
        let executor = &self.collab.executor;
        let mut last = None;
        let mut confirmed = true;

        for intent in intents {
            let tx_hash = self
                .settings
                .retry
                .run_or_raise("send", || executor.send(action.chain, action.wallet, intent))
                .await?;
            info!(
                chain = %action.chain,
                wallet = %action.wallet,
                kind = ?intent.kind,
                tx_hash = %tx_hash,
                link = %action.chain.descriptor().tx_link(&tx_hash),
                "Transaction submitted"
            );

            let status = executor
                .wait_for_status(action.chain, &tx_hash, self.settings.confirmation_timeout)
                .await
                .unwrap_or_else(|err| {
                    warn!(chain = %action.chain, tx_hash = %tx_hash, error = %err, "Status check failed");
                    TxStatus::Unknown
                });
            match status {
                TxStatus::Success => {}
                TxStatus::Failed => return Err(ExecutionError::Reverted { tx_hash }.into()),
                TxStatus::Unknown => {
                    warn!(
                        chain = %action.chain,
                        tx_hash = %tx_hash,
                        waited_secs = self.settings.confirmation_timeout.as_secs(),
                        "Status unknown, assuming it may still succeed"
                    );
                    confirmed = false;
                }
            }
            last = Some(tx_hash);
        }

        Ok(last.map(|hash| (hash, confirmed)))
    }

    async fn await_settlement(
        &self,
        action: &Action<'_>,
        provider: &dyn RouteProvider,
        quote: &Quote,
        tx_hash: &str,
    ) {
        info!(
            chain = %action.chain,
            route = provider.name(),
            tx_hash,
            max_wait_secs = self.settings.settlement_wait.as_secs(),
            "Waiting for settlement"
        );
        let outcome = poll_until(
            "settlement",
            self.settings.settlement_interval,
            self.settings.settlement_wait,
            move || async move {
                match provider.settlement(quote, tx_hash).await {
                    Ok(Settlement::Settled) => Some(()),
                    Ok(Settlement::Pending | Settlement::Unknown) => None,
                    Err(err) => {
                        warn!(tx_hash, error = %err, "Settlement check failed");
                        None
                    }
                }
            },
        )
        .await;

        match outcome {
            PollOutcome::Ready(()) => info!(chain = %action.chain, tx_hash, "Settled"),
            PollOutcome::TimedOut => self.notifier.notify_all(Event::SettlementUnknown {
                chain: action.chain,
                tx_hash: tx_hash.to_string(),
            }),
        }
    }
}

fn veto(policy: &ChainPolicy, quote: &Quote) -> Option<ActionOutcome> {
    let checked = policy
        .check_route_fee(quote.route_fee)
        .and_then(|()| policy.guard.check(quote));
    match checked {
        Ok(()) => None,
        Err(err) => {
            warn!(
                chain = %quote.request.chain,
                provider = quote.provider,
                reason = %err,
                "Route vetoed"
            );
            Some(ActionOutcome::Failed(format!("vetoed: {err}")))
        }
    }
}

fn log_state(action: &Action<'_>, state: ActionState) {
    info!(
        chain = %action.chain,
        wallet = %action.wallet,
        action = %action.label,
        state = %state,
        "State"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value::ValueExpression;
    use crate::testkit::chain::{FixedGas, MemoryBalances, RecordingExecutor};
    use crate::testkit::price::StaticPriceOracle;
    use crate::testkit::route::ScriptedRouteProvider;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    const WALLET: Address = Address::repeat_byte(0x11);

    fn orchestrator(balances: MemoryBalances, executor: RecordingExecutor) -> Orchestrator {
        orchestrator_with_prices(balances, executor, StaticPriceOracle::new())
    }

    fn orchestrator_with_prices(
        balances: MemoryBalances,
        executor: RecordingExecutor,
        prices: StaticPriceOracle,
    ) -> Orchestrator {
        Orchestrator::new(
            Collaborators {
                balances: Arc::new(balances),
                gas: Arc::new(FixedGas::new(21_000, 1_000_000_000)),
                executor: Arc::new(executor),
                prices: Arc::new(prices.with_native(Chain::Base, dec!(2000))),
            },
            ExecutionSettings {
                retry: RetryPolicy::once(),
                ..ExecutionSettings::default()
            },
            Arc::new(NotifierRegistry::new()),
            StdRng::seed_from_u64(7),
        )
    }

    fn send_action<'a>(policy: &'a ChainPolicy, providers: &'a [Arc<dyn RouteProvider>]) -> Action<'a> {
        Action {
            label: "send ETH".into(),
            chain: Chain::Base,
            dest_chain: None,
            wallet: WALLET,
            recipient: Address::repeat_byte(0x22),
            token: Token::native("ETH", 18),
            token_out: Asset::Native,
            source_balance: None,
            policy,
            providers,
        }
    }

    #[tokio::test]
    async fn deducts_gas_from_native_amount() {
        let one_eth = U256::from(10u64).pow(U256::from(18u64));
        let balances = MemoryBalances::new().with(Chain::Base, WALLET, Asset::Native, one_eth);
        let executor = RecordingExecutor::new();
        let sent = executor.handle();
        let orch = orchestrator(balances, executor);

        let mut policy = ChainPolicy::whole_balance(vec!["direct".into()]);
        policy.deduct_fee = true;
        let providers: Vec<Arc<dyn RouteProvider>> = vec![Arc::new(ScriptedRouteProvider::passthrough("direct"))];

        let outcome = orch.execute(&send_action(&policy, &providers)).await.unwrap();

        // 21000 gas * 1 gwei * 1.3
        let fee = U256::from(27_300_000_000_000u64);
        match outcome {
            ActionOutcome::Success(receipt) => assert_eq!(receipt.amount, one_eth - fee),
            other => panic!("unexpected outcome: {other}"),
        }
        assert_eq!(sent.intents()[0].value, one_eth - fee);
    }

    #[tokio::test]
    async fn full_balance_send_pins_the_deducted_gas() {
        let one_eth = U256::from(10u64).pow(U256::from(18u64));
        let balances = MemoryBalances::new().with(Chain::Base, WALLET, Asset::Native, one_eth);
        let executor = RecordingExecutor::new();
        let sent = executor.handle();
        let orch = orchestrator(balances, executor);

        let mut policy = ChainPolicy::whole_balance(vec!["direct".into()]);
        policy.deduct_fee = true;
        let providers: Vec<Arc<dyn RouteProvider>> = vec![Arc::new(ScriptedRouteProvider::passthrough("direct"))];

        orch.execute(&send_action(&policy, &providers)).await.unwrap();

        let intent = &sent.intents()[0];
        assert_eq!(intent.gas_limit, Some(21_000));
        assert_eq!(intent.gas_price, Some(1_300_000_000));
        let max_gas = U256::from(intent.gas_limit.unwrap()) * U256::from(intent.gas_price.unwrap());
        // value plus the most the node can charge is exactly the balance
        assert_eq!(intent.value + max_gas, one_eth);
    }

    fn sell_action<'a>(policy: &'a ChainPolicy, providers: &'a [Arc<dyn RouteProvider>]) -> Action<'a> {
        Action {
            label: "sell DUST".into(),
            token: Token {
                asset: Asset::Erc20(Address::repeat_byte(0xd0)),
                symbol: "DUST".into(),
                name: "Dust".into(),
                decimals: 18,
            },
            // 1000 DUST
            source_balance: Some(U256::from(10u64).pow(U256::from(21u64))),
            ..send_action(policy, providers)
        }
    }

    fn floor_policy(floor: Decimal) -> ChainPolicy {
        let mut policy = ChainPolicy::whole_balance(vec!["sushiswap".into()]);
        policy.guard.min_unit_price_usd = Some(floor);
        policy
    }

    #[tokio::test]
    async fn floor_uses_oracle_when_route_has_no_usd_value() {
        let executor = RecordingExecutor::new();
        let sent = executor.handle();
        let orch = orchestrator(MemoryBalances::new(), executor);
        let policy = floor_policy(dec!(0.05));
        // quotes one to one with no USD figures: 1000 DUST -> 1000 ETH at 2000 USD
        let providers: Vec<Arc<dyn RouteProvider>> = vec![Arc::new(ScriptedRouteProvider::passthrough("sushiswap"))];

        let outcome = orch.execute(&sell_action(&policy, &providers)).await.unwrap();
        assert!(matches!(outcome, ActionOutcome::Success(_)), "{outcome}");
        assert_eq!(sent.len(), 1);
    }

    #[tokio::test]
    async fn oracle_valued_output_below_floor_is_vetoed() {
        let executor = RecordingExecutor::new();
        let sent = executor.handle();
        let orch = orchestrator(MemoryBalances::new(), executor);
        let policy = floor_policy(dec!(2500));
        let providers: Vec<Arc<dyn RouteProvider>> = vec![Arc::new(ScriptedRouteProvider::passthrough("sushiswap"))];

        let outcome = orch.execute(&sell_action(&policy, &providers)).await.unwrap();
        match outcome {
            ActionOutcome::Failed(reason) => assert!(reason.contains("below floor"), "{reason}"),
            other => panic!("unexpected outcome: {other}"),
        }
        assert!(sent.is_empty());
    }

    #[tokio::test]
    async fn floor_vetoes_when_oracle_has_no_price_either() {
        let executor = RecordingExecutor::new();
        let sent = executor.handle();
        let orch = orchestrator(MemoryBalances::new(), executor);
        let policy = floor_policy(dec!(0.05));
        let providers: Vec<Arc<dyn RouteProvider>> = vec![Arc::new(ScriptedRouteProvider::passthrough("sushiswap"))];
        let action = Action {
            chain: Chain::Linea,
            ..sell_action(&policy, &providers)
        };

        let outcome = orch.execute(&action).await.unwrap();
        match outcome {
            ActionOutcome::Failed(reason) => assert!(reason.contains("no price available"), "{reason}"),
            other => panic!("unexpected outcome: {other}"),
        }
        assert!(sent.is_empty());
    }

    #[tokio::test]
    async fn amount_below_fee_is_skipped() {
        let balances = MemoryBalances::new().with(Chain::Base, WALLET, Asset::Native, U256::from(1_000u64));
        let executor = RecordingExecutor::new();
        let sent = executor.handle();
        let orch = orchestrator(balances, executor);

        let mut policy = ChainPolicy::whole_balance(vec!["direct".into()]);
        policy.deduct_fee = true;
        let providers: Vec<Arc<dyn RouteProvider>> = vec![Arc::new(ScriptedRouteProvider::passthrough("direct"))];

        let outcome = orch.execute(&send_action(&policy, &providers)).await.unwrap();
        assert!(matches!(
            outcome,
            ActionOutcome::Skipped(SkipReason::InsufficientAfterFee(_))
        ));
        assert!(sent.intents().is_empty());
    }

    #[tokio::test]
    async fn usd_threshold_skips_small_values() {
        // 0.0001 ETH at 2000 USD = 0.2 USD
        let balances = MemoryBalances::new().with(
            Chain::Base,
            WALLET,
            Asset::Native,
            U256::from(100_000_000_000_000u64),
        );
        let orch = orchestrator(balances, RecordingExecutor::new());
        let mut policy = ChainPolicy::whole_balance(vec!["direct".into()]);
        policy.min_value_usd = dec!(1);
        let provider = Arc::new(ScriptedRouteProvider::passthrough("direct"));
        let providers: Vec<Arc<dyn RouteProvider>> = vec![provider.clone()];

        let outcome = orch.execute(&send_action(&policy, &providers)).await.unwrap();
        assert!(matches!(
            outcome,
            ActionOutcome::Skipped(SkipReason::BelowThreshold { .. })
        ));
        assert_eq!(provider.quote_calls(), 0);
    }

    #[tokio::test]
    async fn usd_threshold_prices_tokens_through_the_oracle() {
        // 1000 DUST at 0.0005 USD = 0.5 USD
        let dust = Address::repeat_byte(0xd0);
        let prices = StaticPriceOracle::new().with_token(Chain::Base, dust, dec!(0.0005));
        let orch = orchestrator_with_prices(MemoryBalances::new(), RecordingExecutor::new(), prices);
        let mut policy = ChainPolicy::whole_balance(vec!["sushiswap".into()]);
        policy.min_value_usd = dec!(1);
        let provider = Arc::new(ScriptedRouteProvider::passthrough("sushiswap"));
        let providers: Vec<Arc<dyn RouteProvider>> = vec![provider.clone()];

        let outcome = orch.execute(&sell_action(&policy, &providers)).await.unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Skipped(SkipReason::BelowThreshold {
                value_usd: dec!(0.5),
                min_usd: dec!(1),
            })
        );
        assert_eq!(provider.quote_calls(), 0);
    }

    #[tokio::test]
    async fn reverted_transaction_fails_the_action() {
        let balances = MemoryBalances::new().with(Chain::Base, WALLET, Asset::Native, U256::from(10u64).pow(U256::from(17u64)));
        let executor = RecordingExecutor::new().with_status(TxStatus::Failed);
        let orch = orchestrator(balances, executor);
        let policy = ChainPolicy::whole_balance(vec!["direct".into()]);
        let providers: Vec<Arc<dyn RouteProvider>> = vec![Arc::new(ScriptedRouteProvider::passthrough("direct"))];

        let outcome = orch.execute(&send_action(&policy, &providers)).await.unwrap();
        match outcome {
            ActionOutcome::Failed(reason) => assert!(reason.contains("reverted")),
            other => panic!("unexpected outcome: {other}"),
        }
    }

    #[tokio::test]
    async fn unknown_status_is_unconfirmed_success() {
        let balances = MemoryBalances::new().with(Chain::Base, WALLET, Asset::Native, U256::from(10u64).pow(U256::from(17u64)));
        let executor = RecordingExecutor::new().with_status(TxStatus::Unknown);
        let orch = orchestrator(balances, executor);
        let policy = ChainPolicy::whole_balance(vec!["direct".into()]);
        let providers: Vec<Arc<dyn RouteProvider>> = vec![Arc::new(ScriptedRouteProvider::passthrough("direct"))];

        let outcome = orch.execute(&send_action(&policy, &providers)).await.unwrap();
        match outcome {
            ActionOutcome::Success(receipt) => assert!(!receipt.confirmed),
            other => panic!("unexpected outcome: {other}"),
        }
    }

    #[tokio::test]
    async fn top_up_already_met_moves_nothing() {
        let recipient = Address::repeat_byte(0x22);
        let balances = MemoryBalances::new()
            .with(Chain::Base, WALLET, Asset::Native, U256::from(10u64).pow(U256::from(18u64)))
            .with(Chain::Base, recipient, Asset::Native, U256::from(10u64).pow(U256::from(18u64)));
        let orch = orchestrator(balances, RecordingExecutor::new());
        let mut policy = ChainPolicy::whole_balance(vec!["direct".into()]);
        policy.value = ValueExpression::TopUpTo {
            from: dec!(0.5),
            to: dec!(0.6),
        };
        let providers: Vec<Arc<dyn RouteProvider>> = vec![Arc::new(ScriptedRouteProvider::passthrough("direct"))];

        let outcome = orch.execute(&send_action(&policy, &providers)).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Skipped(SkipReason::NothingToMove));
    }
}
