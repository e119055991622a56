//! Wallet identities and per-wallet transient state.

use std::collections::HashMap;
use std::fmt;

use alloy_primitives::{Address, B256};

use super::chain::Chain;
use super::token::TokenBalance;

/// One validated line of the wallet file.
#[derive(Clone, PartialEq, Eq)]
pub struct WalletEntry {
    pub address: Address,
    pub private_key: B256,
    /// Where native funds should be sent, e.g. an exchange deposit address.
    pub destination: Option<Address>,
}

impl fmt::Debug for WalletEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletEntry")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .field("destination", &self.destination)
            .finish()
    }
}

/// The wallet currently being processed and what has been discovered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletContext {
    pub address: Address,
    pub destination: Option<Address>,
    discovered: HashMap<Chain, Vec<TokenBalance>>,
}

impl WalletContext {
    #[must_use]
    pub fn new(entry: &WalletEntry) -> Self {
        Self {
            address: entry.address,
            destination: entry.destination,
            discovered: HashMap::new(),
        }
    }

    /// Point at another wallet, dropping everything discovered so far.
    pub fn switch_to(&mut self, entry: &WalletEntry) {
        self.address = entry.address;
        self.destination = entry.destination;
        self.discovered.clear();
    }

    /// Non-zero balances found on `chain`, if discovery already ran there.
    #[must_use]
    pub fn discovered(&self, chain: Chain) -> Option<&[TokenBalance]> {
        self.discovered.get(&chain).map(Vec::as_slice)
    }

    pub fn store(&mut self, chain: Chain, balances: Vec<TokenBalance>) {
        self.discovered.insert(chain, balances);
    }
}
