//! Value policies: how much of a balance an action should move.
//!
//! A policy is written in configuration as a `from`/`to` pair of strings whose
//! prefix or suffix selects the mode:
//!
//! | Written as          | Mode                                        |
//! |---------------------|---------------------------------------------|
//! | `0.1` .. `0.2`      | [`ValueExpression::Absolute`]               |
//! | `80%` .. `100%`     | [`ValueExpression::Percentage`]             |
//! | `-0.1` .. `-0.2`    | [`ValueExpression::LeaveBehind`]            |
//! | `+0.5` .. `+1`      | [`ValueExpression::TopUpTo`]                |
//!
//! Parsing happens once at load time. Resolution draws fresh random values on
//! every call against the live balances.

use std::fmt;

use alloy_primitives::U256;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::token::to_base_units;
use crate::error::ConfigError;

/// Upper bound on rejection-sampling redraws before resolving to zero.
pub const MAX_REDRAW_ATTEMPTS: usize = 10;

/// Decimal digits kept when drawing whole-coin amounts.
pub const AMOUNT_PRECISION: u32 = 6;

/// Decimal digits kept when drawing a percentage.
pub const PERCENT_PRECISION: u32 = 3;

/// A value policy with its bounds in whole-coin units (or percent).
///
/// Bounds are always non-negative and `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueExpression {
    /// Random amount in `[from, to]`.
    Absolute { from: Decimal, to: Decimal },
    /// Random percentage of the source balance in `[from, to]`.
    Percentage { from: Decimal, to: Decimal },
    /// Random amount to retain on the source; the rest is moved.
    LeaveBehind { from: Decimal, to: Decimal },
    /// Random balance the destination should end up with.
    TopUpTo { from: Decimal, to: Decimal },
}

/// Raw configuration shape: `{ from = "...", to = "..." }`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ValueRange {
    pub from: String,
    pub to: String,
}

impl ValueRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Parse into a typed expression.
    pub fn parse(&self) -> Result<ValueExpression, ConfigError> {
        ValueExpression::parse(&self.from, &self.to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Absolute,
    Percentage,
    LeaveBehind,
    TopUpTo,
}

fn classify(raw: &str) -> Result<(Mode, Decimal), String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty bound".into());
    }
    let (mode, digits) = if let Some(rest) = raw.strip_suffix('%') {
        (Mode::Percentage, rest.trim())
    } else if let Some(rest) = raw.strip_prefix('-') {
        (Mode::LeaveBehind, rest.trim())
    } else if let Some(rest) = raw.strip_prefix('+') {
        (Mode::TopUpTo, rest.trim())
    } else {
        (Mode::Absolute, raw)
    };
    let magnitude: Decimal = digits
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if magnitude.is_sign_negative() && !magnitude.is_zero() {
        return Err(format!("'{raw}' is negative"));
    }
    Ok((mode, magnitude))
}

impl ValueExpression {
    /// Parse a `from`/`to` pair. Both bounds must use the same mode.
    pub fn parse(from: &str, to: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::ValueExpression {
            from: from.to_string(),
            to: to.to_string(),
            reason,
        };

        let (from_mode, lo) = classify(from).map_err(invalid)?;
        let (to_mode, hi) = classify(to).map_err(invalid)?;

        if from_mode != to_mode {
            return Err(invalid("both bounds must use the same mode".into()));
        }
        if lo > hi {
            return Err(invalid("'from' must not exceed 'to'".into()));
        }

        match from_mode {
            Mode::Absolute => Ok(Self::Absolute { from: lo, to: hi }),
            Mode::Percentage => {
                if hi > Decimal::ONE_HUNDRED {
                    return Err(invalid("percentage above 100".into()));
                }
                Ok(Self::Percentage { from: lo, to: hi })
            }
            Mode::LeaveBehind => Ok(Self::LeaveBehind { from: lo, to: hi }),
            Mode::TopUpTo => Ok(Self::TopUpTo { from: lo, to: hi }),
        }
    }

    /// True when resolution needs the destination balance.
    #[must_use]
    pub const fn needs_destination(&self) -> bool {
        matches!(self, Self::TopUpTo { .. })
    }

    #[must_use]
    pub const fn bounds(&self) -> (Decimal, Decimal) {
        match *self {
            Self::Absolute { from, to }
            | Self::Percentage { from, to }
            | Self::LeaveBehind { from, to }
            | Self::TopUpTo { from, to } => (from, to),
        }
    }

    /// Resolve to a concrete amount of base units.
    ///
    /// `source` is the balance the value is taken from; `destination` is the
    /// current balance at the receiving end and is required only for
    /// [`ValueExpression::TopUpTo`]. A result of zero means nothing to move.
    ///
    /// An absolute amount the source cannot cover resolves to zero.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        source: U256,
        destination: Option<U256>,
        decimals: u8,
        rng: &mut R,
    ) -> Result<U256, ConfigError> {
        match *self {
            Self::Absolute { from, to } => {
                let amount = draw_base_units(from, to, decimals, rng)?;
                Ok(if amount > source { U256::ZERO } else { amount })
            }
            Self::Percentage { from, to } => {
                let scale = 10u64.pow(PERCENT_PRECISION);
                let portion = draw_scaled(from, to, PERCENT_PRECISION, rng)?;
                let portion = U256::from(u64::try_from(portion).map_err(|_| overflow("percentage"))?);
                let denominator = U256::from(100u64 * scale);
                Ok(source.saturating_mul(portion) / denominator)
            }
            Self::LeaveBehind { from, to } => {
                for _ in 0..MAX_REDRAW_ATTEMPTS {
                    let retained = draw_base_units(from, to, decimals, rng)?;
                    if let Some(amount) = source.checked_sub(retained) {
                        return Ok(amount);
                    }
                }
                Ok(U256::ZERO)
            }
            Self::TopUpTo { from, to } => {
                let destination = destination.ok_or(ConfigError::InvalidValue {
                    field: "values",
                    reason: "top-up mode requires a destination balance".into(),
                })?;
                let floor = to_base_units(from, decimals).ok_or_else(|| overflow("top-up"))?;
                if destination >= floor {
                    return Ok(U256::ZERO);
                }
                for _ in 0..MAX_REDRAW_ATTEMPTS {
                    let target = draw_base_units(from, to, decimals, rng)?;
                    match target.checked_sub(destination) {
                        Some(needed) if !needed.is_zero() && needed <= source => return Ok(needed),
                        _ => continue,
                    }
                }
                Ok(U256::ZERO)
            }
        }
    }
}

impl fmt::Display for ValueExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute { from, to } => write!(f, "{from}..{to}"),
            Self::Percentage { from, to } => write!(f, "{from}%..{to}%"),
            Self::LeaveBehind { from, to } => write!(f, "leave {from}..{to}"),
            Self::TopUpTo { from, to } => write!(f, "top up to {from}..{to}"),
        }
    }
}

fn overflow(what: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: "values",
        reason: format!("{what} bound out of range"),
    }
}

/// Uniform integer draw in `[from * 10^p, to * 10^p]`.
fn draw_scaled<R: Rng + ?Sized>(
    from: Decimal,
    to: Decimal,
    precision: u32,
    rng: &mut R,
) -> Result<i128, ConfigError> {
    let factor = Decimal::from(10i64.pow(precision));
    let lo = (from * factor).ceil().to_i128().ok_or_else(|| overflow("lower"))?;
    let hi = (to * factor).floor().to_i128().ok_or_else(|| overflow("upper"))?;
    // No grid point strictly inside: never go above `to`.
    if lo >= hi {
        return Ok(hi.max(0));
    }
    Ok(rng.gen_range(lo..=hi))
}

/// Draw a whole-coin amount at [`AMOUNT_PRECISION`] and convert it to base units.
fn draw_base_units<R: Rng + ?Sized>(
    from: Decimal,
    to: Decimal,
    decimals: u8,
    rng: &mut R,
) -> Result<U256, ConfigError> {
    let scaled = draw_scaled(from, to, AMOUNT_PRECISION, rng)?;
    let amount = Decimal::try_from_i128_with_scale(scaled, AMOUNT_PRECISION)
        .map_err(|_| overflow("amount"))?;
    to_base_units(amount, decimals).ok_or_else(|| overflow("amount"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn eth(whole: Decimal) -> U256 {
        to_base_units(whole, 18).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn range_narrower_than_precision_stays_within_upper_bound() {
        // 1.1e-6 ..= 1.9e-6 holds no 1e-6 grid point
        let scaled = draw_scaled(dec!(0.0000011), dec!(0.0000019), AMOUNT_PRECISION, &mut rng()).unwrap();
        assert_eq!(scaled, 1);

        let expr = ValueExpression::Absolute {
            from: dec!(0.0000011),
            to: dec!(0.0000019),
        };
        let amount = expr.resolve(eth(dec!(1)), None, 18, &mut rng()).unwrap();
        assert!(amount <= eth(dec!(0.0000019)), "{amount}");
    }

    #[test]
    fn single_point_range_is_exact() {
        assert_eq!(draw_scaled(dec!(0.25), dec!(0.25), AMOUNT_PRECISION, &mut rng()).unwrap(), 250_000);
    }

    #[test]
    fn parses_each_mode() {
        assert_eq!(
            ValueExpression::parse("0.1", "0.2").unwrap(),
            ValueExpression::Absolute { from: dec!(0.1), to: dec!(0.2) }
        );
        assert_eq!(
            ValueExpression::parse("80%", "100%").unwrap(),
            ValueExpression::Percentage { from: dec!(80), to: dec!(100) }
        );
        assert_eq!(
            ValueExpression::parse("-0.0015", "-0.004").unwrap(),
            ValueExpression::LeaveBehind { from: dec!(0.0015), to: dec!(0.004) }
        );
        assert_eq!(
            ValueExpression::parse(" +0.5 ", "+1").unwrap(),
            ValueExpression::TopUpTo { from: dec!(0.5), to: dec!(1) }
        );
    }

    #[test]
    fn rejects_mixed_modes() {
        let err = ValueExpression::parse("80%", "0.5").unwrap_err();
        assert!(matches!(err, ConfigError::ValueExpression { .. }));
        assert!(ValueExpression::parse("-0.1", "0.2").is_err());
        assert!(ValueExpression::parse("+0.1", "-0.2").is_err());
    }

    #[test]
    fn rejects_negative_and_inverted_bounds() {
        assert!(ValueExpression::parse("-5%", "10%").is_err());
        assert!(ValueExpression::parse("0.3", "0.2").is_err());
        assert!(ValueExpression::parse("90%", "101%").is_err());
        assert!(ValueExpression::parse("abc", "1").is_err());
        assert!(ValueExpression::parse("", "1").is_err());
    }

    #[test]
    fn percentage_stays_within_band_and_balance() {
        let expr = ValueExpression::parse("80%", "100%").unwrap();
        let balance = U256::from(123_456_789_012_345u64);
        let mut rng = rng();
        for _ in 0..500 {
            let amount = expr.resolve(balance, None, 18, &mut rng).unwrap();
            assert!(amount <= balance);
            assert!(amount >= balance * U256::from(80u8) / U256::from(100u8));
        }
    }

    #[test]
    fn full_percentage_moves_whole_balance() {
        let expr = ValueExpression::parse("100%", "100%").unwrap();
        let balance = U256::from(987_654_321u64);
        assert_eq!(expr.resolve(balance, None, 18, &mut rng()).unwrap(), balance);
    }

    #[test]
    fn leave_behind_keeps_requested_reserve() {
        let expr = ValueExpression::parse("-0.1", "-0.2").unwrap();
        let balance = eth(dec!(1.5));
        let mut rng = rng();
        for _ in 0..500 {
            let amount = expr.resolve(balance, None, 18, &mut rng).unwrap();
            assert!(amount >= balance - eth(dec!(0.2)));
            assert!(amount <= balance - eth(dec!(0.1)));
        }
    }

    #[test]
    fn leave_behind_exhausts_to_zero_when_balance_too_small() {
        let expr = ValueExpression::parse("-0.1", "-0.2").unwrap();
        let balance = eth(dec!(0.05));
        assert_eq!(expr.resolve(balance, None, 18, &mut rng()).unwrap(), U256::ZERO);
    }

    #[test]
    fn top_up_short_circuits_when_destination_already_funded() {
        let expr = ValueExpression::parse("+0.5", "+1").unwrap();
        let amount = expr
            .resolve(eth(dec!(10)), Some(eth(dec!(0.6))), 18, &mut rng())
            .unwrap();
        assert_eq!(amount, U256::ZERO);
    }

    #[test]
    fn top_up_tops_up_within_target_band() {
        let expr = ValueExpression::parse("+0.5", "+1").unwrap();
        let destination = eth(dec!(0.2));
        let mut rng = rng();
        for _ in 0..200 {
            let amount = expr
                .resolve(eth(dec!(10)), Some(destination), 18, &mut rng)
                .unwrap();
            let after = amount + destination;
            assert!(after >= eth(dec!(0.5)) && after <= eth(dec!(1)));
        }
    }

    #[test]
    fn top_up_capped_by_source_balance() {
        let expr = ValueExpression::parse("+5", "+6").unwrap();
        let amount = expr
            .resolve(eth(dec!(1)), Some(U256::ZERO), 18, &mut rng())
            .unwrap();
        assert_eq!(amount, U256::ZERO);
    }

    #[test]
    fn top_up_without_destination_is_config_error() {
        let expr = ValueExpression::parse("+0.5", "+1").unwrap();
        assert!(expr.resolve(eth(dec!(1)), None, 18, &mut rng()).is_err());
    }

    #[test]
    fn absolute_draws_in_range_and_respects_decimals() {
        let expr = ValueExpression::parse("1", "2").unwrap();
        let mut rng = rng();
        let amount = expr
            .resolve(U256::from(5_000_000u64), None, 6, &mut rng)
            .unwrap();
        assert!(amount >= U256::from(1_000_000u64) && amount <= U256::from(2_000_000u64));
    }

    #[test]
    fn zero_balance_resolves_to_zero_in_every_mode() {
        let mut rng = rng();
        for (from, to) in [("0.1", "0.2"), ("80%", "100%"), ("-0.1", "-0.2"), ("+0.1", "+0.2")] {
            let expr = ValueExpression::parse(from, to).unwrap();
            let amount = expr
                .resolve(U256::ZERO, Some(U256::ZERO), 18, &mut rng)
                .unwrap();
            assert_eq!(amount, U256::ZERO, "{from}..{to}");
        }
    }

    #[test]
    fn display_shows_mode() {
        let expr = ValueExpression::parse("95%", "100%").unwrap();
        assert_eq!(expr.to_string(), "95%..100%");
    }
}
