//! Wallet and chain iteration.
//!
//! Wallets run strictly one after another, and within a wallet chains run
//! one after another. Only configuration errors abort the run.

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::{info, warn};

use super::gas_gate::GasGate;
use super::orchestrator::{Action, Orchestrator};
use super::pacing::Pacer;
use crate::domain::chain::Chain;
use crate::domain::outcome::{ActionOutcome, RunSummary};
use crate::domain::wallet::{WalletContext, WalletEntry};
use crate::error::Result;
use crate::port::outbound::notifier::{ActionEvent, Event};

/// A named set of actions applied to every wallet.
#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether wallets must carry a destination address.
    fn needs_destination(&self) -> bool {
        false
    }

    /// Chains visited for each wallet, before shuffling.
    fn chains(&self) -> Vec<Chain>;

    /// Perform this scenario's actions on one chain for the current wallet.
    async fn run_chain(&self, run: &mut WalletRun<'_>, chain: Chain) -> Result<()>;
}

/// Per-wallet handle passed to scenarios.
pub struct WalletRun<'a> {
    pub ctx: &'a mut WalletContext,
    orchestrator: &'a Orchestrator,
    pacer: &'a mut Pacer,
    summary: RunSummary,
    acted: bool,
}

impl<'a> WalletRun<'a> {
    pub fn new(ctx: &'a mut WalletContext, orchestrator: &'a Orchestrator, pacer: &'a mut Pacer) -> Self {
        Self {
            ctx,
            orchestrator,
            pacer,
            summary: RunSummary::default(),
            acted: false,
        }
    }

    #[must_use]
    pub fn wallet(&self) -> Address {
        self.ctx.address
    }

    #[must_use]
    pub fn orchestrator(&self) -> &'a Orchestrator {
        self.orchestrator
    }

    #[must_use]
    pub const fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Whether any action of this wallet succeeded.
    #[must_use]
    pub const fn acted(&self) -> bool {
        self.acted
    }

    /// Shuffle per-chain work the same way chains are shuffled.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        self.pacer.order_chains(items);
    }

    /// Execute an action, tally it, and pace.
    pub async fn perform(&mut self, action: &Action<'_>) -> Result<ActionOutcome> {
        let outcome = self.orchestrator.execute(action).await?;
        self.record(&outcome).await;
        Ok(outcome)
    }

    /// Report an outcome decided without the orchestrator.
    pub async fn report(&mut self, chain: Chain, label: impl Into<String>, outcome: ActionOutcome) {
        self.orchestrator
            .notifier()
            .notify_all(Event::ActionCompleted(ActionEvent {
                wallet: self.ctx.address,
                chain,
                action: label.into(),
                outcome: outcome.clone(),
                explorer_link: None,
            }));
        self.record(&outcome).await;
    }

    async fn record(&mut self, outcome: &ActionOutcome) {
        self.summary.record(outcome);
        if outcome.is_success() {
            self.acted = true;
        }
        self.pacer.after_action(outcome).await;
    }
}

/// Runs a scenario over a batch of wallets.
pub struct Driver<'a> {
    orchestrator: &'a Orchestrator,
    pacer: Pacer,
    gate: GasGate,
}

impl<'a> Driver<'a> {
    #[must_use]
    pub fn new(orchestrator: &'a Orchestrator, pacer: Pacer, gate: GasGate) -> Self {
        Self {
            orchestrator,
            pacer,
            gate,
        }
    }

    /// # Errors
    ///
    /// Returns the first configuration error raised by a scenario.
    pub async fn run(&mut self, scenario: &dyn Scenario, mut wallets: Vec<WalletEntry>) -> Result<RunSummary> {
        let orchestrator = self.orchestrator;
        let notifier = orchestrator.notifier();
        notifier.notify_all(Event::RunStarted {
            scenario: scenario.name().to_string(),
            wallets: wallets.len(),
        });

        self.pacer.order_wallets(&mut wallets);
        let total = wallets.len();
        let mut summary = RunSummary::default();
        let mut slot: Option<WalletContext> = None;
        let mut previous_acted = false;

        for (i, entry) in wallets.iter().enumerate() {
            if i > 0 {
                self.pacer.between_wallets(previous_acted).await;
            }
            notifier.notify_all(Event::WalletStarted {
                index: i + 1,
                total,
                address: entry.address,
            });
            self.gate.wait().await;

            let ctx = slot.get_or_insert_with(|| WalletContext::new(entry));
            ctx.switch_to(entry);

            let mut chains = scenario.chains();
            self.pacer.order_chains(&mut chains);

            let mut run = WalletRun::new(ctx, orchestrator, &mut self.pacer);
            for chain in chains {
                match scenario.run_chain(&mut run, chain).await {
                    Ok(()) => {}
                    Err(err) if err.is_config() => return Err(err),
                    Err(err) => {
                        warn!(
                            wallet = %entry.address,
                            chain = %chain,
                            error = %err,
                            "Chain aborted"
                        );
                        run.report(chain, scenario.name(), ActionOutcome::Failed(err.to_string()))
                            .await;
                    }
                }
            }

            previous_acted = run.acted();
            summary.merge(run.summary());
            summary.wallets += 1;
            info!(wallet = %entry.address, summary = %run.summary(), "Wallet done");
        }

        notifier.notify_all(Event::RunCompleted(summary));
        Ok(summary)
    }
}
