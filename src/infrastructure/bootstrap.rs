//! Composition root: turns a [`Config`] into wired runtime components.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client as HttpClient;
use tracing::{info, warn};

use crate::adapter::outbound::discovery::tokenlist::TokenListDiscovery;
use crate::adapter::outbound::evm::gateway::EvmGateway;
use crate::adapter::outbound::http::build_client;
#[cfg(feature = "telegram")]
use crate::adapter::outbound::notifier::telegram::notifier::{TelegramConfig, TelegramNotifier};
use crate::adapter::outbound::price::llama::LlamaPriceOracle;
use crate::adapter::outbound::route::odos::OdosAggregator;
use crate::adapter::outbound::route::relay::RelayBridge;
use crate::adapter::outbound::route::stargate::StargateBridge;
use crate::adapter::outbound::route::sushiswap::SushiSwap;
use crate::adapter::outbound::route::transfer::{DirectTransfer, Unwrapper};
use crate::application::driver::Scenario;
use crate::application::gas_gate::GasGate;
use crate::application::orchestrator::{Collaborators, Orchestrator};
use crate::application::pacing::Pacer;
use crate::application::routing::RouteRegistry;
use crate::application::scenario::bridge::Bridger;
use crate::application::scenario::collect::Collector;
use crate::application::scenario::sell::Seller;
use crate::application::scenario::send::{NativeSender, TokenSender};
use crate::application::scenario::sequence::Sequence;
use crate::domain::wallet::WalletEntry;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::inbound::operator::runtime::ScenarioKind;
use crate::port::outbound::chain::BalanceReader;
use crate::port::outbound::discovery::TokenDiscovery;
use crate::port::outbound::notifier::{LogNotifier, NotifierRegistry};

/// Name of the route that unwraps wrapped native balances during collection.
const UNWRAP_ROUTE: &str = "unwrap";

/// Build notifier registry from configuration.
#[cfg(feature = "telegram")]
pub(crate) fn build_notifier_registry(config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));

    if config.telegram.enabled {
        if let Some(tg_config) = TelegramConfig::from_env() {
            let tg_config = TelegramConfig {
                notify_skips: tg_config.notify_skips || config.telegram.notify_skips,
                ..tg_config
            };
            registry.register(Box::new(TelegramNotifier::new(tg_config)));
            info!("Telegram notifier enabled");
        } else {
            warn!("Telegram enabled but TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set");
        }
    }

    registry
}

/// Build notifier registry from configuration (non-telegram variant).
#[cfg(not(feature = "telegram"))]
pub(crate) fn build_notifier_registry(config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    if config.telegram.enabled {
        warn!("Telegram enabled in config but the telegram feature is not compiled in");
    }
    registry
}

/// Every route provider, keyed by name.
pub(crate) fn build_route_registry(
    config: &Config,
    http: &HttpClient,
    balances: Arc<dyn BalanceReader>,
) -> RouteRegistry {
    let stargate_mode = config
        .bridge
        .as_ref()
        .map(|bridge| bridge.stargate_mode)
        .unwrap_or_default();

    let mut routes = RouteRegistry::new();
    routes.register(Arc::new(DirectTransfer));
    routes.register(Arc::new(Unwrapper));
    routes.register(Arc::new(OdosAggregator::new(http.clone(), Arc::clone(&balances))));
    routes.register(Arc::new(SushiSwap::new(balances)));
    routes.register(Arc::new(StargateBridge::new(http.clone(), stargate_mode)));
    routes.register(Arc::new(RelayBridge::new(http.clone())));
    routes
}

/// Route names the scenario tries, in priority order.
pub(crate) fn scenario_routes(kind: ScenarioKind, config: &Config) -> Result<Vec<String>> {
    let routes = match kind {
        ScenarioKind::Collect => config.collector.routes.clone(),
        ScenarioKind::Send => config.sender.routes.clone(),
        ScenarioKind::SendToken => config.token_sender()?.routes.clone(),
        ScenarioKind::Bridge => config.bridge()?.routes.clone(),
        ScenarioKind::Sell => config.sell()?.routes.clone(),
        ScenarioKind::Balances => Vec::new(),
        ScenarioKind::CollectThenSend => {
            let mut routes = config.collector.routes.clone();
            routes.extend(config.sender.routes.iter().cloned());
            routes
        }
    };
    Ok(routes)
}

/// Build the scenario for `kind`. Balances are handled by the caller.
pub(crate) fn build_scenario(
    kind: ScenarioKind,
    config: &Config,
    routes: &RouteRegistry,
    discovery: &Arc<dyn TokenDiscovery>,
) -> Result<Box<dyn Scenario>> {
    let scenario: Box<dyn Scenario> = match kind {
        ScenarioKind::Collect => Box::new(build_collector(config, routes, discovery)?),
        ScenarioKind::Send => {
            let policy = config.sender.policy()?;
            let providers = routes.resolve(&policy.routes)?;
            Box::new(NativeSender::new(policy, providers))
        }
        ScenarioKind::SendToken => {
            let section = config.token_sender()?;
            let providers = routes.resolve(&section.routes)?;
            Box::new(TokenSender::new(
                section.chain,
                section.token,
                providers,
                Arc::clone(discovery),
            ))
        }
        ScenarioKind::Bridge => {
            let section = config.bridge()?;
            let policy = section.policy()?;
            let providers = routes.resolve(&policy.routes)?;
            Box::new(Bridger::new(
                section.from_chains.clone(),
                section.to_chain,
                policy,
                providers,
            )?)
        }
        ScenarioKind::Sell => {
            let section = config.sell()?;
            let policy = section.policy()?;
            let providers = routes.resolve(&policy.routes)?;
            Box::new(Seller::new(
                section.chain,
                section.token,
                policy,
                providers,
                Arc::clone(discovery),
            ))
        }
        ScenarioKind::CollectThenSend => {
            let send = config.sender.policy()?;
            let send_routes = routes.resolve(&send.routes)?;
            Box::new(Sequence::new(
                kind.name(),
                vec![
                    Box::new(build_collector(config, routes, discovery)?),
                    Box::new(NativeSender::new(send, send_routes)),
                ],
            ))
        }
        ScenarioKind::Balances => {
            return Err(ConfigError::InvalidValue {
                field: "scenario",
                reason: "balances is a report, not an action scenario".to_string(),
            }
            .into())
        }
    };
    Ok(scenario)
}

fn build_collector(
    config: &Config,
    routes: &RouteRegistry,
    discovery: &Arc<dyn TokenDiscovery>,
) -> Result<Collector> {
    let policy = config.collector.policy()?;
    let providers = routes.resolve(&policy.routes)?;
    let unwrap = routes
        .get(UNWRAP_ROUTE)
        .ok_or_else(|| ConfigError::UnknownRoute(UNWRAP_ROUTE.to_string()))?;
    Ok(Collector::new(
        Arc::clone(discovery),
        policy,
        providers,
        unwrap,
        config.collector.unwrap_min(),
    ))
}

/// Source of the run's randomness: seeded when configured.
pub(crate) fn master_rng(config: &Config) -> StdRng {
    match config.general.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Components shared by every scenario of one run.
pub(crate) struct Runtime {
    pub orchestrator: Orchestrator,
    pub pacer: Pacer,
    pub gas_gate: GasGate,
    pub routes: RouteRegistry,
    pub discovery: Arc<dyn TokenDiscovery>,
}

/// Wire adapters, the orchestrator and pacing for `wallets`.
///
/// Must be called from within a Tokio runtime when Telegram is enabled.
pub(crate) fn build_runtime(config: &Config, wallets: &[WalletEntry]) -> Result<Runtime> {
    let http = build_client(&config.general.http());
    let gateway = Arc::new(EvmGateway::new(wallets)?);
    let balances: Arc<dyn BalanceReader> = gateway.clone();

    let collab = Collaborators {
        balances: Arc::clone(&balances),
        gas: gateway.clone(),
        executor: gateway.clone(),
        prices: Arc::new(LlamaPriceOracle::new(http.clone())),
    };
    let routes = build_route_registry(config, &http, balances);
    let discovery: Arc<dyn TokenDiscovery> = Arc::new(TokenListDiscovery::new(http));

    let settlement_wait = config
        .bridge
        .as_ref()
        .map_or(Duration::ZERO, |bridge| bridge.settlement_wait());
    let settings = config.general.execution(settlement_wait);

    let mut rng = master_rng(config);
    let orchestrator = Orchestrator::new(
        collab,
        settings,
        Arc::new(build_notifier_registry(config)),
        StdRng::seed_from_u64(rng.gen()),
    );
    let pacer = Pacer::new(config.general.pacing(), StdRng::seed_from_u64(rng.gen()));

    let general = &config.general;
    let gas_gate = GasGate::new(
        gateway,
        general.good_gwei,
        Duration::from_secs(general.gas_gate_interval_secs),
        Duration::from_secs(general.gas_gate_max_wait_secs),
    );

    info!(
        wallets = wallets.len(),
        routes = ?routes.names(),
        gas_gate = gas_gate.is_enabled(),
        "Runtime ready"
    );

    Ok(Runtime {
        orchestrator,
        pacer,
        gas_gate,
        routes,
        discovery,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(toml: &str) -> Config {
        Config::parse_toml(toml).unwrap()
    }

    fn registry(config: &Config) -> RouteRegistry {
        let http = build_client(&config.general.http());
        build_route_registry(config, &http, Arc::new(EvmGateway::read_only()))
    }

    fn discovery() -> Arc<dyn TokenDiscovery> {
        Arc::new(TokenListDiscovery::new(HttpClient::new()))
    }

    #[test]
    fn registry_knows_every_route() {
        let routes = registry(&Config::default());
        assert_eq!(
            routes.names(),
            vec!["direct", "odos", "relay", "stargate", "sushiswap", "unwrap"]
        );
    }

    #[test]
    fn collect_then_send_needs_destinations() {
        let config = Config::default();
        let scenario = build_scenario(
            ScenarioKind::CollectThenSend,
            &config,
            &registry(&config),
            &discovery(),
        )
        .unwrap();
        assert_eq!(scenario.name(), "collect-then-send");
        assert!(scenario.needs_destination());
    }

    #[test]
    fn missing_section_is_reported() {
        let config = Config::default();
        let err = build_scenario(ScenarioKind::Bridge, &config, &registry(&config), &discovery())
            .err()
            .unwrap();
        assert!(err.is_config());
        assert!(err.to_string().contains("bridge"));
    }

    #[test]
    fn unknown_route_name_is_a_config_error() {
        let config = config(
            r#"
            [collector]
            routes = ["odos", "uniswap"]
            "#,
        );
        let err = build_scenario(ScenarioKind::Collect, &config, &registry(&config), &discovery())
            .err()
            .unwrap();
        assert!(err.to_string().contains("uniswap"));
    }

    #[test]
    fn seeded_runs_draw_the_same_numbers() {
        let config = config("[general]\nseed = 7\n");
        let a: u64 = master_rng(&config).gen();
        let b: u64 = master_rng(&config).gen();
        assert_eq!(a, b);
    }
}
