//! Randomised ordering and pauses between actions and wallets.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use tracing::info;

use crate::domain::outcome::ActionOutcome;
use crate::error::ConfigError;

/// Inclusive range of whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SleepRange {
    pub from: u64,
    pub to: u64,
}

impl SleepRange {
    #[must_use]
    pub const fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }

    pub fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.from > self.to {
            return Err(ConfigError::InvalidValue {
                field,
                reason: format!("from ({}) must not exceed to ({})", self.from, self.to),
            });
        }
        Ok(())
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.to == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs(rng.gen_range(self.from..=self.to))
    }
}

/// Pacing knobs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingSettings {
    pub between_actions: SleepRange,
    pub between_wallets: SleepRange,
    pub shuffle_wallets: bool,
    pub shuffle_chains: bool,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            between_actions: SleepRange::new(0, 0),
            between_wallets: SleepRange::new(0, 0),
            shuffle_wallets: true,
            shuffle_chains: true,
        }
    }
}

pub struct Pacer {
    settings: PacingSettings,
    rng: StdRng,
}

impl Pacer {
    #[must_use]
    pub fn new(settings: PacingSettings, rng: StdRng) -> Self {
        Self { settings, rng }
    }

    #[must_use]
    pub const fn settings(&self) -> &PacingSettings {
        &self.settings
    }

    /// Pause after an action. Skips and failures do not pause.
    pub async fn after_action(&mut self, outcome: &ActionOutcome) {
        if !outcome.is_success() {
            return;
        }
        let pause = self.settings.between_actions.draw(&mut self.rng);
        if !pause.is_zero() {
            info!(secs = pause.as_secs(), "Sleeping before next action");
            tokio::time::sleep(pause).await;
        }
    }

    /// Pause before the next wallet, only if the previous one did something.
    pub async fn between_wallets(&mut self, previous_acted: bool) {
        if !previous_acted {
            return;
        }
        let pause = self.settings.between_wallets.draw(&mut self.rng);
        if !pause.is_zero() {
            info!(secs = pause.as_secs(), "Sleeping before next wallet");
            tokio::time::sleep(pause).await;
        }
    }

    pub fn order_wallets<T>(&mut self, wallets: &mut [T]) {
        if self.settings.shuffle_wallets {
            wallets.shuffle(&mut self.rng);
        }
    }

    pub fn order_chains<T>(&mut self, chains: &mut [T]) {
        if self.settings.shuffle_chains {
            chains.shuffle(&mut self.rng);
        }
    }
}
