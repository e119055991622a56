//! Notifier port for run events.
//!
//! Every action outcome, wallet boundary and run summary is broadcast through
//! a [`NotifierRegistry`] so that logs, chat bots and tests all see the same
//! stream.

use alloy_primitives::Address;

use crate::domain::chain::Chain;
use crate::domain::outcome::{ActionOutcome, RunSummary};

/// Events that can trigger notifications.
#[derive(Debug, Clone)]
pub enum Event {
    /// A run started.
    RunStarted {
        /// Scenario name.
        scenario: String,
        /// Number of wallets queued.
        wallets: usize,
    },
    /// Processing moved to the next wallet.
    WalletStarted {
        /// 1-based position in the run.
        index: usize,
        /// Total wallets in the run.
        total: usize,
        address: Address,
    },
    /// One action reached a terminal state.
    ActionCompleted(ActionEvent),
    /// A bridge transfer was submitted but arrival could not be confirmed.
    SettlementUnknown {
        chain: Chain,
        tx_hash: String,
    },
    /// The run finished.
    RunCompleted(RunSummary),
}

/// Terminal state of one action.
#[derive(Debug, Clone)]
pub struct ActionEvent {
    pub wallet: Address,
    pub chain: Chain,
    /// What was attempted, e.g. `swap DUST`, `send ETH`.
    pub action: String,
    pub outcome: ActionOutcome,
    /// Explorer link when a transaction was submitted.
    pub explorer_link: Option<String>,
}

/// Trait for notification handlers.
///
/// Notifications are fire-and-forget. Implementations must return quickly and
/// move slow I/O onto a background task.
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier for when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        use tracing::{info, warn};
        match event {
            Event::RunStarted { scenario, wallets } => {
                info!(scenario = %scenario, wallets, "Run started");
            }
            Event::WalletStarted {
                index,
                total,
                address,
            } => {
                info!(wallet = %address, "Wallet {index}/{total}");
            }
            Event::ActionCompleted(e) => match &e.outcome {
                ActionOutcome::Success(receipt) => info!(
                    wallet = %e.wallet,
                    chain = %e.chain,
                    action = %e.action,
                    route = %receipt.route,
                    tx_hash = %receipt.tx_hash,
                    link = e.explorer_link.as_deref().unwrap_or_default(),
                    confirmed = receipt.confirmed,
                    "Action succeeded"
                ),
                ActionOutcome::Skipped(reason) => info!(
                    wallet = %e.wallet,
                    chain = %e.chain,
                    action = %e.action,
                    reason = %reason,
                    "Action skipped"
                ),
                ActionOutcome::Failed(reason) => warn!(
                    wallet = %e.wallet,
                    chain = %e.chain,
                    action = %e.action,
                    reason = %reason,
                    "Action failed"
                ),
            },
            Event::SettlementUnknown { chain, tx_hash } => {
                info!(chain = %chain, tx_hash = %tx_hash, "Settlement not observed in time; may still complete");
            }
            Event::RunCompleted(summary) => {
                info!(
                    wallets = summary.wallets,
                    succeeded = summary.succeeded,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "Run completed"
                );
            }
        }
    }
}
