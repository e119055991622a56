//! Runtime operator implementation.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tokio::signal;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::adapter::outbound::discovery::tokenlist::TokenListDiscovery;
use crate::adapter::outbound::evm::gateway::EvmGateway;
use crate::adapter::outbound::http::build_client;
use crate::application::driver::Driver;
use crate::application::scenario::balances::{BalanceChecker, BalanceRow};
use crate::domain::chain::Chain;
use crate::domain::selection::ChainSelection;
use crate::error::{Error, Result};
use crate::infrastructure::bootstrap::{self, Runtime};
use crate::infrastructure::config::settings::Config;
use crate::port::inbound::operator::runtime::{
    BalanceLine, RunReport, RunRequest, RunStartupSnapshot, RuntimeOperator, ScenarioKind,
};
use crate::port::outbound::discovery::TokenDiscovery;

use super::{entry::Operator, shared};

#[async_trait]
impl RuntimeOperator for Operator {
    fn prepare_run(&self, request: &RunRequest) -> Result<RunStartupSnapshot> {
        let config = self.load_run_config(request)?;
        let kind = request.scenario;
        let wallets = shared::load_wallets(&config, kind.needs_destination())?;

        let chains = if kind == ScenarioKind::Balances {
            ChainSelection::parse(&config.collector.chains)?.apply(&Chain::ALL)
        } else {
            let http = build_client(&config.general.http());
            let routes =
                bootstrap::build_route_registry(&config, &http, Arc::new(EvmGateway::read_only()));
            let discovery: Arc<dyn TokenDiscovery> = Arc::new(TokenListDiscovery::new(HttpClient::new()));
            bootstrap::build_scenario(kind, &config, &routes, &discovery)?.chains()
        };

        Ok(RunStartupSnapshot {
            scenario: kind,
            wallets: wallets.len(),
            wallets_file: config.general.wallets_file.display().to_string(),
            chains: chains.iter().map(|chain| chain.name().to_string()).collect(),
            routes: bootstrap::scenario_routes(kind, &config)?,
            telegram_enabled: config.telegram.enabled,
        })
    }

    async fn execute_run(&self, request: RunRequest) -> Result<RunReport> {
        let config = self.load_run_config(&request)?;
        config.init_logging();

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id, scenario = %request.scenario);
        Self::run_scenario(request, config).instrument(span).await
    }
}

impl Operator {
    async fn run_scenario(request: RunRequest, config: Config) -> Result<RunReport> {
        let kind = request.scenario;
        let wallets = shared::load_wallets(&config, kind.needs_destination())?;
        info!(scenario = %kind, wallets = wallets.len(), "dustsweep starting");

        let Runtime {
            orchestrator,
            pacer,
            gas_gate,
            routes,
            discovery,
        } = bootstrap::build_runtime(&config, &wallets)?;
        let mut driver = Driver::new(&orchestrator, pacer, gas_gate);

        let report = if kind == ScenarioKind::Balances {
            let checker = BalanceChecker::new(discovery, ChainSelection::parse(&config.collector.chains)?);
            let summary = tokio::select! {
                result = driver.run(&checker, wallets) => result?,
                _ = signal::ctrl_c() => return Err(interrupted()),
            };
            RunReport {
                summary,
                balances: checker.take_rows().into_iter().map(balance_line).collect(),
            }
        } else {
            let scenario = bootstrap::build_scenario(kind, &config, &routes, &discovery)?;
            let summary = tokio::select! {
                result = driver.run(scenario.as_ref(), wallets) => result?,
                _ = signal::ctrl_c() => return Err(interrupted()),
            };
            RunReport {
                summary,
                balances: Vec::new(),
            }
        };

        info!(summary = %report.summary, "dustsweep stopped");
        Ok(report)
    }
}

fn interrupted() -> Error {
    info!("Shutdown signal received (Ctrl+C)");
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::Interrupted,
        "run interrupted by signal",
    ))
}

fn balance_line(row: BalanceRow) -> BalanceLine {
    BalanceLine {
        wallet: row.wallet.to_string(),
        chain: row.chain.name().to_string(),
        symbol: row.symbol,
        amount: row.amount,
        value_usd: row.value_usd,
    }
}

impl Operator {
    fn load_run_config(&self, request: &RunRequest) -> Result<Config> {
        let mut config = Config::parse_toml(&request.config_toml)?;
        Self::apply_run_overrides(&mut config, request);
        Ok(config)
    }

    fn apply_run_overrides(config: &mut Config, request: &RunRequest) {
        if let Some(ref wallets_file) = request.wallets_file {
            config.general.wallets_file = PathBuf::from(wallets_file);
        }

        if let Some(ref log_level) = request.log_level {
            config.logging.level = log_level.clone();
        }

        if request.json_logs {
            config.logging.format = "json".to_string();
        }

        if request.telegram_enabled {
            config.telegram.enabled = true;
        }

        if let Some(seed) = request.seed {
            config.general.seed = Some(seed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEY: &str = "0x4242424242424242424242424242424242424242424242424242424242424242";
    const DEST: &str = "0x00000000000000000000000000000000000000aa";

    fn request(config_toml: String, scenario: ScenarioKind) -> RunRequest {
        RunRequest::new(config_toml, scenario)
    }

    fn wallets_file(line: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{line}").unwrap();
        file
    }

    #[test]
    fn overrides_take_precedence() {
        let mut req = request(String::new(), ScenarioKind::Collect);
        req.wallets_file = Some("/tmp/other.txt".into());
        req.json_logs = true;
        req.seed = Some(9);
        let config = Operator.load_run_config(&req).unwrap();
        assert_eq!(config.general.wallets_file, PathBuf::from("/tmp/other.txt"));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.general.seed, Some(9));
    }

    #[test]
    fn prepare_describes_collect_run() {
        let file = wallets_file(KEY);
        let config = format!(
            "[general]\nwallets_file = {:?}\n[collector]\nchains = [\"!Base\"]\n",
            file.path().display().to_string()
        );
        let snapshot = Operator.prepare_run(&request(config, ScenarioKind::Collect)).unwrap();
        assert_eq!(snapshot.wallets, 1);
        assert_eq!(snapshot.chains, vec!["Base"]);
        assert_eq!(snapshot.routes, vec!["odos", "sushiswap"]);
    }

    #[test]
    fn send_requires_destinations() {
        let file = wallets_file(KEY);
        let config = format!("[general]\nwallets_file = {:?}\n", file.path().display().to_string());
        let err = Operator
            .prepare_run(&request(config, ScenarioKind::Send))
            .unwrap_err();
        assert!(err.is_config());

        let file = wallets_file(&format!("{KEY},{DEST}"));
        let config = format!("[general]\nwallets_file = {:?}\n", file.path().display().to_string());
        assert!(Operator.prepare_run(&request(config, ScenarioKind::Send)).is_ok());
    }
}
