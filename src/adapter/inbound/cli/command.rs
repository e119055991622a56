//! Command-line interface definitions.
//!
//! Defines the CLI structure for dustsweep using `clap`. Without a
//! subcommand the binary opens an interactive scenario menu.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::paths;
use crate::port::inbound::operator::runtime::ScenarioKind;

/// Multi-chain dust collection, consolidation and bridging for EVM wallets
#[derive(Parser, Debug)]
#[command(name = "dustsweep")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the dustsweep CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scenario over every configured wallet
    Run(RunArgs),

    /// List supported chains
    Chains,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Scenario names accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScenarioArg {
    /// Swap dust tokens into native coin
    Collect,
    /// Send native coin to each wallet's destination
    Send,
    /// Send one token's full balance to each wallet's destination
    SendToken,
    /// Bridge native coin onto one chain
    Bridge,
    /// Sell one token above a price floor
    Sell,
    /// Show balances without sending anything
    Balances,
    /// Collect, then send native coin onward
    CollectThenSend,
}

impl From<ScenarioArg> for ScenarioKind {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::Collect => Self::Collect,
            ScenarioArg::Send => Self::Send,
            ScenarioArg::SendToken => Self::SendToken,
            ScenarioArg::Bridge => Self::Bridge,
            ScenarioArg::Sell => Self::Sell,
            ScenarioArg::Balances => Self::Balances,
            ScenarioArg::CollectThenSend => Self::CollectThenSend,
        }
    }
}

/// Subcommands for `dustsweep config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a new configuration file from template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
}

/// Subcommands for `dustsweep check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration and wallets file.
    Config(ConfigPathArg),
    /// Ask each chain's RPC endpoint for its gas price.
    Rpc(RpcCheckArgs),
}

/// Shared argument for commands that read the configuration file.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for `config init`.
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Output path for the generated configuration file.
    #[arg(default_value_os_t = paths::default_config())]
    pub path: PathBuf,
    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `check rpc`.
#[derive(Parser, Debug)]
pub struct RpcCheckArgs {
    /// Chains to probe (all when omitted).
    #[arg(value_name = "CHAIN")]
    pub chains: Vec<String>,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenario to run; asks interactively when omitted.
    #[arg(value_enum)]
    pub scenario: Option<ScenarioArg>,

    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Wallets file, overriding `general.wallets_file`.
    #[arg(long, value_name = "PATH")]
    pub wallets: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,

    /// Enable Telegram notifications regardless of config.
    #[arg(long = "telegram")]
    pub telegram_enabled: bool,

    /// Seed for shuffling, pauses and value draws.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_opens_menu() {
        let cli = Cli::try_parse_from(["dustsweep"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(cli.color, ColorChoice::Auto));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["dustsweep", "chains", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Commands::Chains)));
    }

    #[test]
    fn run_takes_kebab_case_scenarios() {
        let cli = Cli::try_parse_from(["dustsweep", "run", "collect-then-send", "--seed", "42", "-y"])
            .unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.scenario, Some(ScenarioArg::CollectThenSend));
        assert_eq!(args.seed, Some(42));
        assert!(args.yes);
        assert_eq!(
            ScenarioKind::from(ScenarioArg::SendToken).name(),
            "send-token"
        );
    }

    #[test]
    fn run_without_scenario_is_allowed() {
        let cli = Cli::try_parse_from(["dustsweep", "run", "--wallets", "w.txt"]).unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert!(args.scenario.is_none());
        assert_eq!(args.wallets, Some(PathBuf::from("w.txt")));
    }

    #[test]
    fn unknown_scenario_is_rejected() {
        assert!(Cli::try_parse_from(["dustsweep", "run", "yolo"]).is_err());
    }

    #[test]
    fn check_rpc_accepts_chain_list() {
        let cli = Cli::try_parse_from(["dustsweep", "check", "rpc", "Base", "Arbitrum"]).unwrap();
        let Some(Commands::Check(CheckCommand::Rpc(args))) = cli.command else {
            panic!("expected check rpc");
        };
        assert_eq!(args.chains, vec!["Base", "Arbitrum"]);
    }

    #[test]
    fn every_scenario_has_an_argument() {
        let names: Vec<&str> = ScenarioArg::value_variants()
            .iter()
            .map(|arg| ScenarioKind::from(*arg).name())
            .collect();
        let expected: Vec<&str> = ScenarioKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, expected);
    }
}
