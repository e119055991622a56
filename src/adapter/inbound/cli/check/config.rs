use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{operator, output};
use crate::error::Result;
use crate::port::inbound::operator::diagnostic::ConfigCheckReport;

/// Validate configuration and wallets file without sending anything.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    let config_toml = operator::read_config_toml(path)?;
    let report = operator::operator().check_config(&config_toml)?;

    if output::is_json() {
        output::json_output(json!({
            "config": path.display().to_string(),
            "valid": true,
            "wallets_file": report.wallets_file,
            "wallets": report.wallets,
            "destinations": report.destinations,
            "sections": report.sections,
            "telegram_enabled": report.telegram_enabled,
            "warnings": report.warnings,
        }));
        return Ok(());
    }

    output::section("Configuration Check");
    output::field("Config", path.display());
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("Wallets", wallets_label(&report));
    output::field("Sections", sections_label(&report.sections));
    print_telegram(&report);

    for warning in &report.warnings {
        output::warning(warning);
    }

    output::success("Configuration check complete");
    Ok(())
}

fn wallets_label(report: &ConfigCheckReport) -> String {
    match report.wallets {
        Some(count) => format!(
            "{count} in {} ({} with destination)",
            report.wallets_file, report.destinations
        ),
        None => format!("{} (unreadable)", report.wallets_file),
    }
}

fn sections_label(sections: &[&str]) -> String {
    if sections.is_empty() {
        "collector, sender".to_string()
    } else {
        format!("collector, sender, {}", sections.join(", "))
    }
}

fn print_telegram(report: &ConfigCheckReport) {
    if !report.telegram_enabled {
        output::field("Telegram", "disabled");
        return;
    }
    if report.telegram_token_present && report.telegram_chat_present {
        output::success("Telegram integration configured");
        return;
    }
    output::warning("Telegram enabled but environment variables are missing");
    if !report.telegram_token_present {
        output::field("Missing", "TELEGRAM_BOT_TOKEN");
    }
    if !report.telegram_chat_present {
        output::field("Missing", "TELEGRAM_CHAT_ID");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(wallets: Option<usize>) -> ConfigCheckReport {
        ConfigCheckReport {
            wallets_file: "wallets.txt".into(),
            wallets,
            destinations: 1,
            sections: vec![],
            telegram_enabled: false,
            telegram_token_present: false,
            telegram_chat_present: false,
            warnings: vec![],
        }
    }

    #[test]
    fn wallet_label_counts_destinations() {
        assert_eq!(
            wallets_label(&report(Some(3))),
            "3 in wallets.txt (1 with destination)"
        );
        assert_eq!(wallets_label(&report(None)), "wallets.txt (unreadable)");
    }

    #[test]
    fn optional_sections_follow_the_defaults() {
        assert_eq!(sections_label(&[]), "collector, sender");
        assert_eq!(
            sections_label(&["bridge", "sell"]),
            "collector, sender, bridge, sell"
        );
    }
}
