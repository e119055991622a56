//! Fee-adjusted amount calculation.

use alloy_primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use super::intent::TxIntent;

/// Per-mille resolution of gas multipliers.
const MULTIPLIER_SCALE: u64 = 1000;

/// The moved amount would be zero or negative once fees are taken out.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("amount {amount} does not cover fees {fees}")]
pub struct InsufficientValue {
    pub amount: U256,
    pub fees: U256,
}

/// Fees attached to one action, in the chain's native base units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeBreakdown {
    /// Gas limit times gas price, already multiplied for headroom.
    pub gas: U256,
    /// Fee charged by the route itself, e.g. a bridge messaging fee.
    pub route: U256,
}

impl FeeBreakdown {
    #[must_use]
    pub const fn gas_only(gas: U256) -> Self {
        Self {
            gas,
            route: U256::ZERO,
        }
    }

    #[must_use]
    pub fn total(&self) -> U256 {
        self.gas.saturating_add(self.route)
    }
}

/// Gas price with a safety multiplier applied.
///
/// The multiplier is applied at per-mille precision; values below 1 are
/// clamped to 1 so the price never shrinks.
#[must_use]
pub fn scale_gas_price(gas_price: u128, multiplier: Decimal) -> u128 {
    let per_mille = (multiplier * Decimal::from(MULTIPLIER_SCALE))
        .round()
        .to_u64()
        .unwrap_or(MULTIPLIER_SCALE)
        .max(MULTIPLIER_SCALE);
    gas_price.saturating_mul(u128::from(per_mille)) / u128::from(MULTIPLIER_SCALE)
}

/// Gas limits and price fixed for an action's transactions.
///
/// The cost charged against the moved amount is exactly what the pinned
/// transactions may spend, so a full-balance send still covers its own gas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPlan {
    /// Price per gas unit, in wei, already multiplied.
    pub price: u128,
    /// One limit per intent, in submission order.
    pub limits: Vec<u64>,
}

impl GasPlan {
    /// Upper bound on gas spent by the planned transactions.
    #[must_use]
    pub fn cost(&self) -> U256 {
        self.limits.iter().fold(U256::ZERO, |total, limit| {
            total.saturating_add(U256::from(*limit).saturating_mul(U256::from(self.price)))
        })
    }

    /// Write the planned limits and price onto `intents`.
    ///
    /// Returns `None` when the intents do not line up with the plan.
    #[must_use]
    pub fn pin(&self, intents: &[TxIntent]) -> Option<Vec<TxIntent>> {
        if intents.len() != self.limits.len() {
            return None;
        }
        Some(
            intents
                .iter()
                .zip(&self.limits)
                .map(|(intent, limit)| intent.clone().with_gas_limit(*limit).with_gas_price(self.price))
                .collect(),
        )
    }
}

/// Scale a gas limit by `multiplier` (e.g. 1.1 headroom on an estimate).
#[must_use]
pub fn pad_gas_limit(gas_limit: u64, multiplier: Decimal) -> u64 {
    (Decimal::from(gas_limit) * multiplier)
        .ceil()
        .to_u64()
        .unwrap_or(gas_limit)
        .max(gas_limit)
}

/// Final amount to move.
///
/// When `deduct_fee` is false the fees are paid from the wallet's reserve and
/// `raw` is returned unchanged. Otherwise both gas and route fee come out of
/// the moved amount, and anything not strictly positive is rejected.
pub fn adjust_for_fee(
    raw: U256,
    fees: &FeeBreakdown,
    deduct_fee: bool,
) -> Result<U256, InsufficientValue> {
    if !deduct_fee {
        return Ok(raw);
    }
    let total = fees.total();
    match raw.checked_sub(total) {
        Some(left) if !left.is_zero() => Ok(left),
        _ => Err(InsufficientValue {
            amount: raw,
            fees: total,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn gas_price_applies_multiplier() {
        assert_eq!(scale_gas_price(10_000_000_000, dec!(1.3)), 13_000_000_000);
    }

    #[test]
    fn gas_price_never_shrinks() {
        assert_eq!(scale_gas_price(7, dec!(0.5)), 7);
    }

    #[test]
    fn plan_cost_sums_every_transaction() {
        let plan = GasPlan {
            price: scale_gas_price(10_000_000_000, dec!(1.3)),
            limits: vec![21_000, 50_000],
        };
        assert_eq!(plan.cost(), U256::from(71_000u64 * 13_000_000_000));
    }

    #[test]
    fn pin_writes_limit_and_price_per_intent() {
        use alloy_primitives::Address;

        let plan = GasPlan {
            price: 1_300_000_000,
            limits: vec![46_000, 21_000],
        };
        let intents = vec![
            TxIntent::erc20_approve(Address::repeat_byte(1), Address::repeat_byte(2), U256::MAX),
            TxIntent::native_transfer(Address::repeat_byte(3), U256::from(9u8)),
        ];
        let pinned = plan.pin(&intents).unwrap();
        assert_eq!(pinned[0].gas_limit, Some(46_000));
        assert_eq!(pinned[1].gas_limit, Some(21_000));
        assert!(pinned.iter().all(|i| i.gas_price == Some(1_300_000_000)));
        let spendable: U256 = pinned
            .iter()
            .map(|i| U256::from(i.gas_limit.unwrap()) * U256::from(i.gas_price.unwrap()))
            .fold(U256::ZERO, |a, b| a + b);
        assert_eq!(spendable, plan.cost());
    }

    #[test]
    fn pin_rejects_mismatched_intents() {
        let plan = GasPlan {
            price: 1,
            limits: vec![21_000],
        };
        assert!(plan.pin(&[]).is_none());
    }

    #[test]
    fn pad_gas_limit_rounds_up() {
        assert_eq!(pad_gas_limit(100_001, dec!(1.1)), 110_002);
        assert_eq!(pad_gas_limit(21_000, dec!(1)), 21_000);
    }

    #[test]
    fn no_deduction_returns_raw_amount() {
        let fees = FeeBreakdown::gas_only(U256::from(500u64));
        assert_eq!(adjust_for_fee(U256::from(100u64), &fees, false), Ok(U256::from(100u64)));
    }

    #[test]
    fn deduction_subtracts_gas_and_route_fee() {
        let fees = FeeBreakdown {
            gas: U256::from(30u64),
            route: U256::from(20u64),
        };
        assert_eq!(adjust_for_fee(U256::from(100u64), &fees, true), Ok(U256::from(50u64)));
    }

    #[test]
    fn amount_not_exceeding_fees_is_insufficient() {
        for (amount, gas) in [(0u64, 0u64), (5, 5), (4, 5), (0, 1)] {
            let fees = FeeBreakdown::gas_only(U256::from(gas));
            assert!(
                adjust_for_fee(U256::from(amount), &fees, true).is_err(),
                "amount {amount} gas {gas}"
            );
        }
    }

    #[test]
    fn adjustment_is_pure() {
        let fees = FeeBreakdown::gas_only(U256::from(7u64));
        let once = adjust_for_fee(U256::from(100u64), &fees, true).unwrap();
        let again = adjust_for_fee(once + fees.gas, &fees, true).unwrap();
        assert_eq!(once, again);
    }
}
