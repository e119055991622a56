//! Per-run action policies, built once from configuration and shared read-only.

use std::collections::HashSet;

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;

use super::quote::Quote;
use super::selection::ChainSelection;
use super::token::from_base_units;
use super::value::ValueExpression;
use crate::error::VetoError;

/// Tokens never touched by the collector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList(HashSet<Address>);

impl IgnoreList {
    pub fn new(addresses: impl IntoIterator<Item = Address>) -> Self {
        Self(addresses.into_iter().collect())
    }

    #[must_use]
    pub fn contains(&self, address: &Address) -> bool {
        self.0.contains(address)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Market sanity bounds on a quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceGuard {
    /// Minimum acceptable unit price of the input token, in USD.
    pub min_unit_price_usd: Option<Decimal>,
    /// Maximum relative loss between quoted input and output value.
    pub max_slippage: Option<Decimal>,
}

impl PriceGuard {
    /// Check a quote against the bounds.
    ///
    /// The unit price is the quoted output value divided by the input amount.
    pub fn check(&self, quote: &Quote) -> Result<(), VetoError> {
        if let Some(floor) = self.min_unit_price_usd {
            let amount_in = from_base_units(quote.request.amount_in, quote.request.decimals_in)
                .filter(|a| *a > Decimal::ZERO);
            let price = match (quote.value_out_usd, amount_in) {
                (Some(value), Some(amount)) => value / amount,
                _ => return Err(VetoError::PriceUnknown { floor }),
            };
            if price < floor {
                return Err(VetoError::PriceBelowFloor { price, floor });
            }
        }

        if let Some(max) = self.max_slippage {
            if let Some(actual) = quote.slippage() {
                if actual > max {
                    return Err(VetoError::SlippageTooHigh { actual, max });
                }
            }
        }

        Ok(())
    }
}

/// Everything an action needs to decide what to do on one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPolicy {
    pub selection: ChainSelection,
    pub ignore: IgnoreList,
    /// Extra token addresses to check besides the discovered ones.
    pub include: Vec<Address>,
    /// Minimum USD value worth moving; zero disables the check.
    pub min_value_usd: Decimal,
    pub deduct_fee: bool,
    pub value: ValueExpression,
    /// Route names in priority order.
    pub routes: Vec<String>,
    pub guard: PriceGuard,
    /// Upper bound on a route's own fee, in native base units.
    pub max_route_fee: Option<U256>,
}

impl ChainPolicy {
    /// Move the whole balance, no threshold, no fee deduction.
    #[must_use]
    pub fn whole_balance(routes: Vec<String>) -> Self {
        Self {
            selection: ChainSelection::All,
            ignore: IgnoreList::default(),
            include: Vec::new(),
            min_value_usd: Decimal::ZERO,
            deduct_fee: false,
            value: ValueExpression::Percentage {
                from: Decimal::ONE_HUNDRED,
                to: Decimal::ONE_HUNDRED,
            },
            routes,
            guard: PriceGuard::default(),
            max_route_fee: None,
        }
    }

    /// Check a quoted route fee against the configured cap.
    pub fn check_route_fee(&self, fee: U256) -> Result<(), VetoError> {
        match self.max_route_fee {
            Some(limit) if fee > limit => Err(VetoError::RouteFeeTooHigh {
                fee: fee.to_string(),
                limit: limit.to_string(),
            }),
            _ => Ok(()),
        }
    }
}
