//! Unsigned transaction intents produced by routes and senders.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};

sol! {
    function transfer(address to, uint256 amount) external returns (bool);
    function approve(address spender, uint256 amount) external returns (bool);
    function withdraw(uint256 amount) external;
}

/// What an intent does, for logs and receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Transfer,
    Approve,
    Unwrap,
    Swap,
    Bridge,
}

/// A transaction the executor should sign and submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIntent {
    pub kind: IntentKind,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    /// Pre-computed gas limit; estimated by the gateway when `None`.
    pub gas_limit: Option<u64>,
    /// Legacy gas price in wei; filled by the gateway when `None`.
    pub gas_price: Option<u128>,
}

impl TxIntent {
    /// Plain native transfer.
    #[must_use]
    pub fn native_transfer(to: Address, value: U256) -> Self {
        Self {
            kind: IntentKind::Transfer,
            to,
            value,
            data: Bytes::new(),
            gas_limit: None,
            gas_price: None,
        }
    }

    /// ERC-20 `transfer`.
    #[must_use]
    pub fn erc20_transfer(token: Address, to: Address, amount: U256) -> Self {
        Self {
            kind: IntentKind::Transfer,
            to: token,
            value: U256::ZERO,
            data: transferCall { to, amount }.abi_encode().into(),
            gas_limit: None,
            gas_price: None,
        }
    }

    /// ERC-20 `approve`.
    #[must_use]
    pub fn erc20_approve(token: Address, spender: Address, amount: U256) -> Self {
        Self {
            kind: IntentKind::Approve,
            to: token,
            value: U256::ZERO,
            data: approveCall { spender, amount }.abi_encode().into(),
            gas_limit: None,
            gas_price: None,
        }
    }

    /// Wrapped-native `withdraw`.
    #[must_use]
    pub fn unwrap_native(wrapper: Address, amount: U256) -> Self {
        Self {
            kind: IntentKind::Unwrap,
            to: wrapper,
            value: U256::ZERO,
            data: withdrawCall { amount }.abi_encode().into(),
            gas_limit: None,
            gas_price: None,
        }
    }

    #[must_use]
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    #[must_use]
    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    /// Return a copy that moves `value` instead.
    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn erc20_transfer_encodes_selector() {
        let intent = TxIntent::erc20_transfer(
            address!("1111111111111111111111111111111111111111"),
            address!("2222222222222222222222222222222222222222"),
            U256::from(5u8),
        );
        assert_eq!(&intent.data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(intent.data.len(), 4 + 32 * 2);
        assert!(intent.value.is_zero());
    }

    #[test]
    fn unwrap_encodes_withdraw() {
        let intent = TxIntent::unwrap_native(Address::ZERO, U256::from(1u8));
        assert_eq!(&intent.data[..4], &[0x2e, 0x1a, 0x7d, 0x4d]);
        assert_eq!(intent.kind, IntentKind::Unwrap);
    }
}
