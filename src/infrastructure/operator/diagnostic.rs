//! Diagnostic operator implementation.

use std::time::Duration;

use async_trait::async_trait;

use crate::adapter::outbound::evm::gateway::EvmGateway;
use crate::adapter::outbound::wallet::file::WalletFile;
use crate::domain::chain::Chain;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::inbound::operator::diagnostic::{
    ChainView, ConfigCheckReport, DiagnosticOperator, HealthCheckStatus, RpcProbe,
};
use crate::port::outbound::chain::GasEstimator;
use crate::port::outbound::wallet::WalletSource;

use super::{entry::Operator, shared};

/// Upper bound on one chain's RPC probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

fn chain_view(chain: Chain) -> ChainView {
    let descriptor = chain.descriptor();
    ChainView {
        name: chain.name(),
        id: chain.id(),
        native_symbol: descriptor.native.symbol,
        rpc_url: descriptor.rpc_url(),
        has_wrapped_native: descriptor.wrapped_native.is_some(),
        has_token_list: descriptor.token_list_slug.is_some(),
    }
}

#[async_trait]
impl DiagnosticOperator for Operator {
    fn check_config(&self, config_toml: &str) -> Result<ConfigCheckReport> {
        let config = Config::parse_toml(config_toml)?;
        let mut warnings = Vec::new();

        let (wallets, destinations) = match WalletFile::new(&config.general.wallets_file).load(false) {
            Ok(entries) => {
                let destinations = entries.iter().filter(|w| w.destination.is_some()).count();
                if destinations < entries.len() {
                    warnings.push(format!(
                        "{} of {} wallets have no destination; send scenarios will refuse to start",
                        entries.len() - destinations,
                        entries.len()
                    ));
                }
                (Some(entries.len()), destinations)
            }
            Err(err) => {
                warnings.push(format!("wallets file: {err}"));
                (None, 0)
            }
        };

        if config.general.good_gwei.is_zero() {
            warnings.push("gas gate disabled (general.good_gwei = 0)".to_string());
        }

        let mut sections = vec!["collector", "sender"];
        if config.token_sender.is_some() {
            sections.push("token_sender");
        }
        if config.bridge.is_some() {
            sections.push("bridge");
        }
        if config.sell.is_some() {
            sections.push("sell");
        }

        Ok(ConfigCheckReport {
            wallets_file: config.general.wallets_file.display().to_string(),
            wallets,
            destinations,
            sections,
            telegram_enabled: config.telegram.enabled,
            telegram_token_present: std::env::var("TELEGRAM_BOT_TOKEN").is_ok(),
            telegram_chat_present: std::env::var("TELEGRAM_CHAT_ID").is_ok(),
            warnings,
        })
    }

    fn chains(&self) -> Vec<ChainView> {
        Chain::ALL.into_iter().map(chain_view).collect()
    }

    async fn probe_rpc(&self, chains: &[String]) -> Result<Vec<RpcProbe>> {
        let targets: Vec<Chain> = if chains.is_empty() {
            Chain::ALL.to_vec()
        } else {
            chains
                .iter()
                .map(|name| name.parse::<Chain>())
                .collect::<std::result::Result<_, _>>()?
        };

        let gateway = EvmGateway::read_only();
        let mut probes = Vec::with_capacity(targets.len());
        for chain in targets {
            let probe = match tokio::time::timeout(PROBE_TIMEOUT, gateway.gas_price(chain)).await {
                Ok(Ok(price)) => RpcProbe {
                    chain: chain.name(),
                    status: HealthCheckStatus::Healthy,
                    gas_price_gwei: shared::wei_to_gwei(price),
                },
                Ok(Err(err)) => RpcProbe {
                    chain: chain.name(),
                    status: HealthCheckStatus::Unhealthy(err.to_string()),
                    gas_price_gwei: None,
                },
                Err(_) => RpcProbe {
                    chain: chain.name(),
                    status: HealthCheckStatus::Unhealthy(format!(
                        "no answer within {}s",
                        PROBE_TIMEOUT.as_secs()
                    )),
                    gas_price_gwei: None,
                },
            };
            probes.push(probe);
        }
        Ok(probes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_chain() {
        let chains = Operator.chains();
        assert_eq!(chains.len(), Chain::ALL.len());
        let ethereum = chains.iter().find(|c| c.name == "Ethereum").unwrap();
        assert_eq!(ethereum.id, 1);
        assert_eq!(ethereum.native_symbol, "ETH");
    }

    #[test]
    fn missing_wallet_file_is_a_warning() {
        let report = Operator
            .check_config("[general]\nwallets_file = \"/definitely/not/here.txt\"\n")
            .unwrap();
        assert!(report.wallets.is_none());
        assert!(report.warnings.iter().any(|w| w.starts_with("wallets file")));
    }

    #[tokio::test]
    async fn unknown_chain_name_is_rejected() {
        let err = Operator.probe_rpc(&["Atlantis".to_string()]).await.unwrap_err();
        assert!(err.is_config());
    }
}
