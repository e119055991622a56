//! Builders for domain primitives used across tests.

use alloy_primitives::{Address, B256, U256};
use rust_decimal::Decimal;

use crate::domain::token::{to_base_units, Asset, Token, TokenBalance};
use crate::domain::wallet::WalletEntry;

/// Wallet whose address and key repeat `byte`.
pub fn wallet(byte: u8) -> WalletEntry {
    WalletEntry {
        address: Address::repeat_byte(byte),
        private_key: B256::repeat_byte(byte),
        destination: None,
    }
}

/// Wallet with a destination address repeating `dest`.
pub fn wallet_to(byte: u8, dest: u8) -> WalletEntry {
    WalletEntry {
        destination: Some(Address::repeat_byte(dest)),
        ..wallet(byte)
    }
}

/// ERC-20 token at an address repeating `byte`.
pub fn token(byte: u8, symbol: &str, decimals: u8) -> Token {
    Token {
        asset: Asset::Erc20(Address::repeat_byte(byte)),
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        decimals,
    }
}

pub fn holding(token: Token, balance: U256) -> TokenBalance {
    TokenBalance { token, balance }
}

/// Whole coins to 18-decimal base units.
pub fn eth(amount: Decimal) -> U256 {
    to_base_units(amount, 18).unwrap_or_default()
}
