//! Several scenarios chained on the same wallet, e.g. collect then send.

use async_trait::async_trait;

use crate::application::driver::{Scenario, WalletRun};
use crate::domain::chain::Chain;
use crate::error::Result;

pub struct Sequence {
    name: &'static str,
    parts: Vec<Box<dyn Scenario>>,
}

impl Sequence {
    #[must_use]
    pub fn new(name: &'static str, parts: Vec<Box<dyn Scenario>>) -> Self {
        Self { name, parts }
    }
}

#[async_trait]
impl Scenario for Sequence {
    fn name(&self) -> &'static str {
        self.name
    }

    fn needs_destination(&self) -> bool {
        self.parts.iter().any(|p| p.needs_destination())
    }

    /// Union of every part's chains, in first-seen order.
    fn chains(&self) -> Vec<Chain> {
        let mut chains = Vec::new();
        for part in &self.parts {
            for chain in part.chains() {
                if !chains.contains(&chain) {
                    chains.push(chain);
                }
            }
        }
        chains
    }

    async fn run_chain(&self, run: &mut WalletRun<'_>, chain: Chain) -> Result<()> {
        for part in &self.parts {
            if part.chains().contains(&chain) {
                part.run_chain(run, chain).await?;
            }
        }
        Ok(())
    }
}
