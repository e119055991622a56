//! Fixed token discovery and wallet sources.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::domain::chain::Chain;
use crate::domain::token::TokenBalance;
use crate::domain::wallet::WalletEntry;
use crate::error::{ConfigError, Result};
use crate::port::outbound::discovery::TokenDiscovery;
use crate::port::outbound::wallet::WalletSource;

/// Returns preset balances per (chain, wallet).
#[derive(Default)]
pub struct StaticDiscovery {
    balances: HashMap<(Chain, Address), Vec<TokenBalance>>,
    calls: Arc<AtomicU32>,
}

impl StaticDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, chain: Chain, wallet: Address, balances: Vec<TokenBalance>) -> Self {
        self.balances.insert((chain, wallet), balances);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenDiscovery for StaticDiscovery {
    async fn nonzero_balances(&self, chain: Chain, wallet: Address, _extra: &[Address]) -> Result<Vec<TokenBalance>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .balances
            .get(&(chain, wallet))
            .map(|found| found.iter().filter(|b| !b.balance.is_zero()).cloned().collect())
            .unwrap_or_default())
    }
}

/// In-memory wallet list.
#[derive(Debug, Clone, Default)]
pub struct StaticWallets(pub Vec<WalletEntry>);

impl WalletSource for StaticWallets {
    fn load(&self, require_destination: bool) -> Result<Vec<WalletEntry>> {
        if require_destination {
            if let Some(line) = self.0.iter().position(|w| w.destination.is_none()) {
                return Err(ConfigError::WalletEntry {
                    line: line + 1,
                    reason: "missing destination address".into(),
                }
                .into());
            }
        }
        Ok(self.0.clone())
    }
}
