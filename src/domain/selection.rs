//! Chain inclusion/exclusion.
//!
//! Written in configuration as a list of chain names:
//!
//! - `["!Linea"]` runs Linea only,
//! - `["Ethereum", "Celo"]` runs everything except those two,
//! - `[]` runs every chain.

use std::collections::BTreeSet;

use super::chain::Chain;
use crate::error::ConfigError;

/// Marker that turns an entry into "only this chain".
pub const ONLY_MARKER: char = '!';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChainSelection {
    #[default]
    All,
    Only(Chain),
    Exclude(BTreeSet<Chain>),
}

impl ChainSelection {
    /// Parse a configured list. Entries are trimmed; names match case-insensitively
    /// and errors quote them as written.
    ///
    /// A negated entry must be the only entry in the list.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, ConfigError> {
        let entries: Vec<String> = entries
            .iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();

        let Some(first) = entries.first() else {
            return Ok(Self::All);
        };

        if let Some(name) = first.strip_prefix(ONLY_MARKER) {
            if entries.len() > 1 {
                return Err(ConfigError::InvalidValue {
                    field: "chains",
                    reason: format!("'{ONLY_MARKER}{name}' selects a single chain and cannot be combined with other entries"),
                });
            }
            return Ok(Self::Only(name.parse()?));
        }

        let mut excluded = BTreeSet::new();
        for entry in &entries {
            if entry.starts_with(ONLY_MARKER) {
                return Err(ConfigError::InvalidValue {
                    field: "chains",
                    reason: format!("'{entry}' must be the only entry"),
                });
            }
            excluded.insert(entry.parse::<Chain>()?);
        }
        Ok(Self::Exclude(excluded))
    }

    #[must_use]
    pub fn selects(&self, chain: Chain) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => *only == chain,
            Self::Exclude(excluded) => !excluded.contains(&chain),
        }
    }

    /// Filter `universe`, preserving its order.
    #[must_use]
    pub fn apply(&self, universe: &[Chain]) -> Vec<Chain> {
        universe.iter().copied().filter(|c| self.selects(*c)).collect()
    }
}
