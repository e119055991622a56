//! Configuration operator implementation.

use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::inbound::operator::configuration::{
    ConfigScenarioView, ConfigView, ConfigurationOperator,
};

use super::entry::Operator;

fn chain_list(chains: &[String]) -> String {
    if chains.is_empty() {
        "all chains".to_string()
    } else {
        chains.join(", ")
    }
}

fn scenario_views(config: &Config) -> Vec<ConfigScenarioView> {
    let mut views = vec![
        ConfigScenarioView {
            name: "collector",
            target: chain_list(&config.collector.chains),
            routes: config.collector.routes.clone(),
            min_value_usd: config.collector.min_value_usd,
        },
        ConfigScenarioView {
            name: "sender",
            target: format!(
                "{} ({}..{})",
                chain_list(&config.sender.chains),
                config.sender.values.from,
                config.sender.values.to
            ),
            routes: config.sender.routes.clone(),
            min_value_usd: config.sender.min_value_usd,
        },
    ];

    if let Some(section) = &config.token_sender {
        views.push(ConfigScenarioView {
            name: "token_sender",
            target: format!("{} on {}", section.token, section.chain),
            routes: section.routes.clone(),
            min_value_usd: Default::default(),
        });
    }
    if let Some(section) = &config.bridge {
        let sources: Vec<&str> = section.from_chains.iter().map(|c| c.name()).collect();
        views.push(ConfigScenarioView {
            name: "bridge",
            target: format!("{} -> {}", sources.join(", "), section.to_chain),
            routes: section.routes.clone(),
            min_value_usd: section.min_value_usd,
        });
    }
    if let Some(section) = &config.sell {
        views.push(ConfigScenarioView {
            name: "sell",
            target: format!("{} on {}", section.token, section.chain),
            routes: section.routes.clone(),
            min_value_usd: section.min_value_usd,
        });
    }
    views
}

impl ConfigurationOperator for Operator {
    fn show_config(&self, config_toml: &str) -> Result<ConfigView> {
        let config = Config::parse_toml(config_toml)?;
        let general = &config.general;

        Ok(ConfigView {
            wallets_file: general.wallets_file.display().to_string(),
            max_attempts: general.max_attempts,
            retry_interval_secs: general.retry_interval_secs,
            gas_multiplier: general.gas_multiplier,
            good_gwei: general.good_gwei,
            shuffle_wallets: general.shuffle_wallets,
            shuffle_chains: general.shuffle_chains,
            proxy_configured: !general.proxies.is_empty(),
            scenarios: scenario_views(&config),
            telegram_enabled: config.telegram.enabled,
            log_level: config.logging.level.clone(),
            log_format: config.logging.format.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_sections_appear_when_present() {
        let view = Operator
            .show_config(
                r#"
                [bridge]
                from_chains = ["Arbitrum", "Optimism"]
                to_chain = "Base"
                "#,
            )
            .unwrap();
        let names: Vec<_> = view.scenarios.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["collector", "sender", "bridge"]);
        assert_eq!(view.scenarios[2].target, "Arbitrum, Optimism -> Base");
        assert_eq!(view.scenarios[0].target, "all chains");
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(Operator.show_config("[general]\nmax_attempts = 0\n").is_err());
    }
}
