use std::sync::Arc;
use std::time::Duration;

use dustsweep::application::driver::Driver;
use dustsweep::application::gas_gate::GasGate;
use dustsweep::application::orchestrator::{Collaborators, ExecutionSettings, Orchestrator};
use dustsweep::application::pacing::{Pacer, PacingSettings, SleepRange};
use dustsweep::application::retry::RetryPolicy;
use dustsweep::domain::chain::Chain;
use dustsweep::port::outbound::notifier::NotifierRegistry;
use dustsweep::testkit::chain::{FixedGas, MemoryBalances, RecordingExecutor, SentLog};
use dustsweep::testkit::notifier::RecordingNotifier;
use dustsweep::testkit::price::StaticPriceOracle;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal_macros::dec;

/// 21000 gas at 1 gwei, times the default 1.3 multiplier.
pub const TRANSFER_FEE_WEI: u64 = 27_300_000_000_000;

/// Orchestrator wired to in-memory collaborators.
pub struct Harness {
    pub orchestrator: Orchestrator,
    pub notifier: RecordingNotifier,
    pub sent: SentLog,
}

impl Harness {
    pub fn new(balances: MemoryBalances, executor: RecordingExecutor) -> Self {
        Self::with_settings(balances, executor, ExecutionSettings::default())
    }

    pub fn with_settings(
        balances: MemoryBalances,
        executor: RecordingExecutor,
        settings: ExecutionSettings,
    ) -> Self {
        let notifier = RecordingNotifier::new();
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(notifier.clone()));
        let sent = executor.handle();

        let orchestrator = Orchestrator::new(
            Collaborators {
                balances: Arc::new(balances),
                gas: Arc::new(FixedGas::new(21_000, 1_000_000_000)),
                executor: Arc::new(executor),
                prices: Arc::new(
                    StaticPriceOracle::new()
                        .with_native(Chain::Base, dec!(2000))
                        .with_native(Chain::Arbitrum, dec!(2000)),
                ),
            },
            ExecutionSettings {
                retry: RetryPolicy::new(2, Duration::from_millis(10)),
                ..settings
            },
            Arc::new(registry),
            StdRng::seed_from_u64(7),
        );

        Self {
            orchestrator,
            notifier,
            sent,
        }
    }

    /// Driver with no pauses, no shuffling and no gas gate.
    pub fn driver(&self) -> Driver<'_> {
        let pacing = PacingSettings {
            between_actions: SleepRange::new(0, 0),
            between_wallets: SleepRange::new(0, 0),
            shuffle_wallets: false,
            shuffle_chains: false,
        };
        Driver::new(
            &self.orchestrator,
            Pacer::new(pacing, StdRng::seed_from_u64(1)),
            GasGate::disabled(),
        )
    }
}
