//! Waits for acceptable Ethereum gas before a wallet starts.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::polling::{poll_until, PollOutcome};
use crate::domain::chain::Chain;
use crate::port::outbound::chain::GasEstimator;

const GWEI: u64 = 1_000_000_000;

/// Bounded wait on the mainnet gas price.
pub struct GasGate {
    gas: Option<Arc<dyn GasEstimator>>,
    ceiling_wei: u128,
    interval: Duration,
    max_wait: Duration,
}

impl GasGate {
    /// A ceiling of zero disables the gate.
    #[must_use]
    pub fn new(
        gas: Arc<dyn GasEstimator>,
        good_gwei: Decimal,
        interval: Duration,
        max_wait: Duration,
    ) -> Self {
        let ceiling_wei = (good_gwei * Decimal::from(GWEI)).to_u128().unwrap_or(0);
        Self {
            gas: (ceiling_wei > 0).then_some(gas),
            ceiling_wei,
            interval,
            max_wait,
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            gas: None,
            ceiling_wei: 0,
            interval: Duration::ZERO,
            max_wait: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.gas.is_some()
    }

    /// Returns `true` when gas is acceptable and `false` when the bound
    /// elapsed first. Either way the caller proceeds.
    pub async fn wait(&self) -> bool {
        let Some(gas) = self.gas.as_deref() else {
            return true;
        };
        let ceiling = self.ceiling_wei;

        match gas.gas_price(Chain::Ethereum).await {
            Ok(price) if price <= ceiling => return true,
            Ok(price) => info!(
                gwei = price / u128::from(GWEI),
                ceiling_gwei = ceiling / u128::from(GWEI),
                "Gas too high, waiting"
            ),
            Err(err) => {
                warn!(error = %err, "Gas price unavailable, not waiting");
                return true;
            }
        }

        let outcome = poll_until("gas gate", self.interval, self.max_wait, move || async move {
            match gas.gas_price(Chain::Ethereum).await {
                Ok(price) if price <= ceiling => Some(()),
                _ => None,
            }
        })
        .await;

        match outcome {
            PollOutcome::Ready(()) => true,
            PollOutcome::TimedOut => {
                warn!(
                    waited_secs = self.max_wait.as_secs(),
                    "Gas still high, proceeding anyway"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::chain::FixedGas;
    use rust_decimal_macros::dec;
    use tokio::time::Instant;

    fn gwei(n: u128) -> u128 {
        n * u128::from(GWEI)
    }

    #[tokio::test(start_paused = true)]
    async fn passes_immediately_when_cheap() {
        let gas = Arc::new(FixedGas::new(21_000, gwei(10)));
        let gate = GasGate::new(gas, dec!(20), Duration::from_secs(60), Duration::from_secs(600));
        let start = Instant::now();
        assert!(gate.wait().await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_until_gas_drops() {
        let gas = Arc::new(FixedGas::new(21_000, gwei(10)).with_prices(vec![gwei(50), gwei(40), gwei(15)]));
        let gate = GasGate::new(gas, dec!(20), Duration::from_secs(60), Duration::from_secs(600));
        let start = Instant::now();
        assert!(gate.wait().await);
        assert_eq!(start.elapsed(), Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn proceeds_after_bound() {
        let gas = Arc::new(FixedGas::new(21_000, gwei(100)));
        let gate = GasGate::new(gas, dec!(20), Duration::from_secs(60), Duration::from_secs(300));
        let start = Instant::now();
        assert!(!gate.wait().await);
        assert_eq!(start.elapsed(), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn zero_ceiling_disables_gate() {
        let gas = Arc::new(FixedGas::new(21_000, gwei(100)));
        let gate = GasGate::new(gas, Decimal::ZERO, Duration::from_secs(60), Duration::from_secs(300));
        assert!(!gate.is_enabled());
        assert!(gate.wait().await);
    }
}
