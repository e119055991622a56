use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use dustsweep::adapter::inbound::cli::command::{
    CheckCommand, Cli, ColorChoice, Commands, ConfigCommand, RunArgs,
};
use dustsweep::adapter::inbound::cli::output::{self, OutputConfig};
use dustsweep::adapter::inbound::cli::{chains, check, config, diagnostic, menu, operator, run};
use dustsweep::error::Result;
use dustsweep::infrastructure::operator::entry::Operator;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    apply_color(&cli.color);
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));
    if operator::install(Box::new(Operator::new())).is_err() {
        eprintln!("operator already installed");
        return ExitCode::FAILURE;
    }

    match dispatch(cli.command.as_ref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let config = cli.command.as_ref().and_then(config_path);
            eprintln!("{:?}", diagnostic::report(err, config));
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(command: Option<&Commands>) -> Result<()> {
    match command {
        None => {
            let scenario = menu::pick_scenario()?;
            let args = RunArgs::parse_from(["run"]);
            run::execute_scenario(&args, scenario).await
        }
        Some(Commands::Run(args)) => run::execute(args).await,
        Some(Commands::Chains) => chains::execute(),
        Some(Commands::Config(ConfigCommand::Init(args))) => {
            config::execute_init(&args.path, args.force)
        }
        Some(Commands::Config(ConfigCommand::Show(args))) => config::execute_show(&args.config),
        Some(Commands::Check(CheckCommand::Config(args))) => {
            check::config::execute_config(&args.config)
        }
        Some(Commands::Check(CheckCommand::Rpc(args))) => check::rpc::execute_rpc(&args.chains).await,
    }
}

fn config_path(command: &Commands) -> Option<&Path> {
    match command {
        Commands::Run(args) => Some(args.config.as_path()),
        Commands::Config(ConfigCommand::Show(args))
        | Commands::Check(CheckCommand::Config(args)) => Some(args.config.as_path()),
        Commands::Chains
        | Commands::Config(ConfigCommand::Init(_))
        | Commands::Check(CheckCommand::Rpc(_)) => None,
    }
}

fn apply_color(choice: &ColorChoice) {
    match choice {
        ColorChoice::Auto => {}
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
}
