//! Per-action results and the run tally built from them.

use std::fmt;

use alloy_primitives::U256;
use rust_decimal::Decimal;

use super::fee::InsufficientValue;
use super::quote::Unavailable;

/// Why an action did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Resolved value is zero.
    NothingToMove,
    /// Resolved value is worth less than the configured minimum.
    BelowThreshold { value_usd: Decimal, min_usd: Decimal },
    /// Every configured route declined.
    NoRoute(Vec<(String, Unavailable)>),
    /// Fees would consume the whole amount.
    InsufficientAfterFee(InsufficientValue),
    /// Token is on the ignore list.
    Ignored,
    /// A collaborator kept failing and the retry budget ran out.
    Unreachable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToMove => f.write_str("nothing to move"),
            Self::BelowThreshold { value_usd, min_usd } => {
                write!(f, "value {value_usd} USD below minimum {min_usd} USD")
            }
            Self::NoRoute(declines) => {
                f.write_str("no route")?;
                for (provider, reason) in declines {
                    write!(f, "; {provider}: {reason}")?;
                }
                Ok(())
            }
            Self::InsufficientAfterFee(err) => write!(f, "{err}"),
            Self::Ignored => f.write_str("ignored"),
            Self::Unreachable(reason) => write!(f, "gave up: {reason}"),
        }
    }
}

/// Submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: String,
    pub route: String,
    pub amount: U256,
    /// False when the confirmation wait timed out; the transaction may still land.
    pub confirmed: bool,
}

/// Result of one (wallet, chain, action) attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Skipped(SkipReason),
    Success(Receipt),
    Failed(String),
}

impl ActionOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub fn tx_hash(&self) -> Option<&str> {
        match self {
            Self::Success(receipt) => Some(&receipt.tx_hash),
            _ => None,
        }
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Success(receipt) if receipt.confirmed => {
                write!(f, "succeeded via {}: {}", receipt.route, receipt.tx_hash)
            }
            Self::Success(receipt) => {
                write!(f, "submitted via {} (unconfirmed): {}", receipt.route, receipt.tx_hash)
            }
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Orchestrator states, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Start,
    ValueResolved,
    ThresholdChecked,
    Quoted,
    FeeAdjusted,
    Executed,
    Succeeded,
    SkippedBelowThreshold,
    SkippedNoRoute,
    SkippedInsufficientAfterFee,
    Failed,
}

impl ActionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ValueResolved => "value_resolved",
            Self::ThresholdChecked => "threshold_checked",
            Self::Quoted => "quoted",
            Self::FeeAdjusted => "fee_adjusted",
            Self::Executed => "executed",
            Self::Succeeded => "succeeded",
            Self::SkippedBelowThreshold => "skipped_below_threshold",
            Self::SkippedNoRoute => "skipped_no_route",
            Self::SkippedInsufficientAfterFee => "skipped_insufficient_after_fee",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts of outcomes over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub wallets: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &ActionOutcome) {
        match outcome {
            ActionOutcome::Success(_) => self.succeeded += 1,
            ActionOutcome::Skipped(_) => self.skipped += 1,
            ActionOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn merge(&mut self, other: &RunSummary) {
        self.wallets += other.wallets;
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    #[must_use]
    pub const fn actions(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} wallets, {} succeeded, {} skipped, {} failed",
            self.wallets, self.succeeded, self.skipped, self.failed
        )
    }
}
