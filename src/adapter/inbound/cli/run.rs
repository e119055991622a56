//! Handler for the `run` command.

use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::{menu, operator, output};
use crate::error::Result;
use crate::port::inbound::operator::runtime::{
    BalanceLine, RunReport, RunRequest, RunStartupSnapshot, ScenarioKind,
};

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let scenario = match args.scenario {
        Some(arg) => ScenarioKind::from(arg),
        None => menu::pick_scenario()?,
    };
    execute_scenario(args, scenario).await
}

/// Run `scenario` with the options in `args`.
pub async fn execute_scenario(args: &RunArgs, scenario: ScenarioKind) -> Result<()> {
    let config_toml = operator::read_config_toml(&args.config)?;
    let request = build_run_request(args, config_toml, scenario, output::is_json());
    let service = operator::operator();

    let startup = service.prepare_run(&request)?;
    print_startup(&startup);

    if !args.yes && !scenario.is_read_only() && !menu::confirm_run(&startup)? {
        output::warning("Run cancelled");
        return Ok(());
    }

    output::action("Running", scenario.name());
    let report = service.execute_run(request).await?;
    output::action_done("Finished", scenario.name());
    print_report(&report);
    Ok(())
}

fn build_run_request(
    args: &RunArgs,
    config_toml: String,
    scenario: ScenarioKind,
    force_json_logs: bool,
) -> RunRequest {
    RunRequest {
        wallets_file: args
            .wallets
            .as_ref()
            .map(|path| path.to_string_lossy().to_string()),
        log_level: args.log_level.clone(),
        json_logs: args.json_logs || force_json_logs,
        telegram_enabled: args.telegram_enabled,
        seed: args.seed,
        ..RunRequest::new(config_toml, scenario)
    }
}

/// Print startup configuration using Astral-style output.
fn print_startup(snapshot: &RunStartupSnapshot) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Scenario", output::highlight(snapshot.scenario));
    output::field(
        "Wallets",
        format!("{} from {}", snapshot.wallets, snapshot.wallets_file),
    );
    output::field("Chains", join_or_none(&snapshot.chains));
    if !snapshot.routes.is_empty() {
        output::field("Routes", snapshot.routes.join(" > "));
    }
    if output::verbosity() > 0 {
        output::field(
            "Telegram",
            if snapshot.telegram_enabled { "enabled" } else { "disabled" },
        );
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

#[derive(Tabled)]
struct BalanceRow {
    #[tabled(rename = "Wallet")]
    wallet: String,
    #[tabled(rename = "Chain")]
    chain: String,
    #[tabled(rename = "Asset")]
    symbol: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "USD")]
    value: String,
}

impl From<&BalanceLine> for BalanceRow {
    fn from(line: &BalanceLine) -> Self {
        Self {
            wallet: line.wallet.clone(),
            chain: line.chain.clone(),
            symbol: line.symbol.clone(),
            amount: line.amount.normalize().to_string(),
            value: line
                .value_usd
                .map_or_else(|| "?".to_string(), |usd| format!("${}", usd.round_dp(2))),
        }
    }
}

fn print_report(report: &RunReport) {
    let summary = &report.summary;

    if output::is_json() {
        let balances: Vec<_> = report
            .balances
            .iter()
            .map(|line| {
                json!({
                    "wallet": line.wallet,
                    "chain": line.chain,
                    "symbol": line.symbol,
                    "amount": line.amount.to_string(),
                    "value_usd": line.value_usd.map(|usd| usd.to_string()),
                })
            })
            .collect();
        output::json_output(json!({
            "summary": {
                "wallets": summary.wallets,
                "succeeded": summary.succeeded,
                "skipped": summary.skipped,
                "failed": summary.failed,
            },
            "balances": balances,
        }));
        return;
    }

    if !report.balances.is_empty() {
        output::section("Balances");
        let rows: Vec<BalanceRow> = report.balances.iter().map(BalanceRow::from).collect();
        output::table(&Table::new(rows).with(Style::rounded()).to_string());
    }

    output::section("Summary");
    output::field("Wallets", summary.wallets);
    output::field("Succeeded", output::positive(summary.succeeded));
    output::field("Skipped", summary.skipped);
    if summary.failed > 0 {
        output::field("Failed", output::negative(summary.failed));
        output::hint("failed actions are logged with their reason; rerun to retry them");
    } else {
        output::success("No failed actions");
    }
}
