//! Interactive scenario menu shown when no subcommand is given.

use std::io::IsTerminal;

use dialoguer::{theme::ColorfulTheme, Confirm, Select};

use crate::error::{ConfigError, Result};
use crate::port::inbound::operator::runtime::{RunStartupSnapshot, ScenarioKind};

/// Ask the operator which scenario to run.
///
/// Fails when stdin is not a terminal, since there is nobody to ask.
pub fn pick_scenario() -> Result<ScenarioKind> {
    require_terminal()?;
    let items: Vec<String> = ScenarioKind::ALL
        .iter()
        .map(|kind| format!("{:<18} {}", kind.name(), kind.description()))
        .collect();

    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Scenario")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(ScenarioKind::ALL[index])
}

/// Ask before a scenario that submits transactions.
pub fn confirm_run(snapshot: &RunStartupSnapshot) -> Result<bool> {
    require_terminal()?;
    let prompt = format!(
        "Run {} for {} wallet(s) on {} chain(s)?",
        snapshot.scenario,
        snapshot.wallets,
        snapshot.chains.len()
    );
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

fn require_terminal() -> Result<()> {
    if std::io::stdin().is_terminal() {
        return Ok(());
    }
    Err(ConfigError::InvalidValue {
        field: "scenario",
        reason: "not a terminal; name the scenario and pass --yes".to_string(),
    }
    .into())
}
