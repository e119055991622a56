//! Handler for the `config` command group.

use std::fs;
use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{operator, output};
use crate::error::{ConfigError, Result};
use crate::port::inbound::operator::configuration::ConfigView;

/// Default config template with documentation.
const CONFIG_TEMPLATE: &str = include_str!("../../../../config.example.toml");

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, CONFIG_TEMPLATE)?;
    output::section("Config Initialized");
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::section("Next Steps");
    output::note(&format!("1. Edit {} with your settings", path.display()));
    output::note("2. List private keys in the wallets file, one per line");
    output::note(&format!("3. Run: dustsweep check config -c {}", path.display()));
    output::note(&format!("4. Run: dustsweep run balances -c {}", path.display()));
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config_toml = operator::read_config_toml(path)?;
    let view = operator::operator().show_config(&config_toml)?;

    if output::is_json() {
        output::json_output(view_json(&view));
        return Ok(());
    }

    output::section("Effective Configuration");
    output::field("Wallets", &view.wallets_file);
    output::field("Proxy", if view.proxy_configured { "configured" } else { "none" });

    output::section("Execution");
    output::field("Attempts", view.max_attempts);
    output::field("Retry", format!("{}s", view.retry_interval_secs));
    output::field("Gas x", view.gas_multiplier);
    if view.good_gwei.is_zero() {
        output::field("Gas gate", "disabled");
    } else {
        output::field("Gas gate", format!("{} gwei", view.good_gwei));
    }
    output::field("Shuffle", shuffle_label(view.shuffle_wallets, view.shuffle_chains));

    output::section("Scenarios");
    for scenario in &view.scenarios {
        output::field(scenario.name, &scenario.target);
        output::note(&format!(
            "routes: {}, min value: ${}",
            scenario.routes.join(" > "),
            scenario.min_value_usd
        ));
    }

    output::section("Logging");
    output::field("Level", &view.log_level);
    output::field("Format", &view.log_format);
    output::field(
        "Telegram",
        if view.telegram_enabled { "enabled" } else { "disabled" },
    );
    Ok(())
}

fn shuffle_label(wallets: bool, chains: bool) -> &'static str {
    match (wallets, chains) {
        (true, true) => "wallets and chains",
        (true, false) => "wallets",
        (false, true) => "chains",
        (false, false) => "off",
    }
}

fn view_json(view: &ConfigView) -> serde_json::Value {
    let scenarios: Vec<_> = view
        .scenarios
        .iter()
        .map(|scenario| {
            json!({
                "name": scenario.name,
                "target": scenario.target,
                "routes": scenario.routes,
                "min_value_usd": scenario.min_value_usd.to_string(),
            })
        })
        .collect();
    json!({
        "wallets_file": view.wallets_file,
        "max_attempts": view.max_attempts,
        "retry_interval_secs": view.retry_interval_secs,
        "gas_multiplier": view.gas_multiplier.to_string(),
        "good_gwei": view.good_gwei.to_string(),
        "shuffle_wallets": view.shuffle_wallets,
        "shuffle_chains": view.shuffle_chains,
        "proxy_configured": view.proxy_configured,
        "scenarios": scenarios,
        "telegram_enabled": view.telegram_enabled,
        "log_level": view.log_level,
        "log_format": view.log_format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::inbound::operator::configuration::ConfigScenarioView;
    use rust_decimal_macros::dec;

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "# mine").unwrap();

        let err = execute_init(&path, false).unwrap_err();
        assert!(err.is_config());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");

        execute_init(&path, true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[general]"));
    }

    #[test]
    fn shipped_template_mentions_every_section() {
        for section in ["[general]", "[collector]", "[sender]", "[logging]", "[telegram]"] {
            assert!(CONFIG_TEMPLATE.contains(section), "missing {section}");
        }
    }

    #[test]
    fn json_view_keeps_decimals_exact() {
        let view = ConfigView {
            wallets_file: "wallets.txt".into(),
            max_attempts: 2,
            retry_interval_secs: 10,
            gas_multiplier: dec!(1.3),
            good_gwei: dec!(0),
            shuffle_wallets: true,
            shuffle_chains: false,
            proxy_configured: false,
            scenarios: vec![ConfigScenarioView {
                name: "collector",
                target: "all chains".into(),
                routes: vec!["odos".into()],
                min_value_usd: dec!(0.5),
            }],
            telegram_enabled: false,
            log_level: "info".into(),
            log_format: "pretty".into(),
        };
        let value = view_json(&view);
        assert_eq!(value["gas_multiplier"], "1.3");
        assert_eq!(value["scenarios"][0]["min_value_usd"], "0.5");
        assert_eq!(shuffle_label(true, false), "wallets");
    }
}
