//! Tokens, assets and unit conversion between whole-coin decimals and base units.

use std::fmt;

use alloy_primitives::{address, Address, U256};
use rust_decimal::Decimal;

use super::chain::Chain;

/// Placeholder address aggregators use for the native coin.
pub const NATIVE_PLACEHOLDER: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Polygon exposes its native coin as an ERC-20 at this system address.
pub const POLYGON_NATIVE_TOKEN: Address = address!("0000000000000000000000000000000000001010");

/// Either the chain's native coin or an ERC-20 contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    Native,
    Erc20(Address),
}

impl Asset {
    #[must_use]
    pub const fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    /// Address to hand to an aggregator API.
    #[must_use]
    pub const fn api_address(&self) -> Address {
        match self {
            Asset::Native => Address::ZERO,
            Asset::Erc20(address) => *address,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => f.write_str("native"),
            Asset::Erc20(address) => write!(f, "{address}"),
        }
    }
}

/// True when `address` denotes the native coin on `chain`.
#[must_use]
pub fn is_native_address(chain: Chain, address: Address) -> bool {
    address == Address::ZERO
        || address == NATIVE_PLACEHOLDER
        || (chain == Chain::Polygon && address == POLYGON_NATIVE_TOKEN)
}

/// Token metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub asset: Asset,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

impl Token {
    #[must_use]
    pub fn native(symbol: &str, decimals: u8) -> Self {
        Self {
            asset: Asset::Native,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            decimals,
        }
    }
}

/// A token together with a wallet's balance of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub token: Token,
    pub balance: U256,
}

impl TokenBalance {
    /// Balance in whole-coin units, if it fits a decimal.
    #[must_use]
    pub fn amount(&self) -> Option<Decimal> {
        from_base_units(self.balance, self.token.decimals)
    }
}

fn pow10(exp: u32) -> U256 {
    U256::from(10u8).pow(U256::from(exp))
}

/// Convert a non-negative whole-coin amount into base units, truncating any
/// precision beyond `decimals`. Returns `None` for negative input.
#[must_use]
pub fn to_base_units(amount: Decimal, decimals: u8) -> Option<U256> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return None;
    }
    let mantissa = U256::from(amount.mantissa().unsigned_abs());
    let scale = amount.scale();
    let decimals = u32::from(decimals);
    if decimals >= scale {
        mantissa.checked_mul(pow10(decimals - scale))
    } else {
        Some(mantissa / pow10(scale - decimals))
    }
}

/// Convert base units into whole-coin units. Returns `None` when the value
/// exceeds what a decimal can hold.
#[must_use]
pub fn from_base_units(value: U256, decimals: u8) -> Option<Decimal> {
    let raw: u128 = value.try_into().ok()?;
    let raw = i128::try_from(raw).ok()?;
    let scale = u32::from(decimals);
    if scale <= 28 {
        Decimal::try_from_i128_with_scale(raw, scale).ok()
    } else {
        let shifted = raw / 10i128.pow(scale - 28);
        Decimal::try_from_i128_with_scale(shifted, 28).ok()
    }
}

/// USD value of `value` base units at `unit_price`. `None` when the price is
/// unknown (zero) or the amount does not fit.
#[must_use]
pub fn usd_value(value: U256, decimals: u8, unit_price: Decimal) -> Option<Decimal> {
    if unit_price <= Decimal::ZERO {
        return None;
    }
    from_base_units(value, decimals)?.checked_mul(unit_price)
}
