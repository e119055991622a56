use std::fs;

use dustsweep::error::{ConfigError, Error};
use dustsweep::infrastructure::config::settings::Config;

fn load(contents: &str) -> dustsweep::error::Result<Config> {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("write temp config");
    Config::load(&path)
}

fn invalid_field(result: dustsweep::error::Result<Config>) -> &'static str {
    match result {
        Err(Error::Config(ConfigError::InvalidValue { field, .. })) => field,
        Err(err) => panic!("expected an invalid value, got {err}"),
        Ok(_) => panic!("expected the config to be rejected"),
    }
}

#[test]
fn shipped_template_is_valid() {
    let template = include_str!("../config.example.toml");
    let config = load(template).expect("template parses");
    assert_eq!(config.general.max_attempts, 2);
    assert!(!config.telegram.enabled);
    assert!(config.bridge.is_none());
}

#[test]
fn template_sections_parse_once_uncommented() {
    let template = include_str!("../config.example.toml");
    let uncommented: String = template
        .lines()
        .map(|line| line.strip_prefix("# ").filter(|rest| looks_like_toml(rest)).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n");
    let config = load(&uncommented).expect("uncommented template parses");
    assert!(config.bridge().is_ok());
    assert!(config.sell().is_ok());
    assert!(config.token_sender().is_ok());
}

fn looks_like_toml(line: &str) -> bool {
    line.starts_with('[') || line.split_once(" = ").is_some_and(|(key, _)| !key.contains(' '))
}

#[test]
fn zero_attempts_is_rejected() {
    let field = invalid_field(load("[general]\nmax_attempts = 0\n"));
    assert_eq!(field, "general.max_attempts");
}

#[test]
fn gas_multiplier_below_one_is_rejected() {
    let field = invalid_field(load("[general]\ngas_multiplier = 0.9\n"));
    assert_eq!(field, "general.gas_multiplier");
}

#[test]
fn gas_gate_needs_a_wait_bound() {
    let field = invalid_field(load(
        "[general]\ngood_gwei = 5\ngas_gate_max_wait_secs = 0\n",
    ));
    assert_eq!(field, "general.gas_gate_max_wait_secs");
}

#[test]
fn unknown_log_format_is_rejected() {
    let field = invalid_field(load("[logging]\nformat = \"xml\"\n"));
    assert_eq!(field, "logging.format");
}

#[test]
fn sell_slippage_outside_fraction_is_rejected() {
    let field = invalid_field(load(
        r#"
[sell]
chain = "Base"
token = "0x0101010101010101010101010101010101010101"
max_slippage = 1.5
"#,
    ));
    assert_eq!(field, "sell.max_slippage");
}

#[test]
fn bridge_section_round_trips_into_policy() {
    let config = load(
        r#"
[bridge]
from_chains = ["Arbitrum", "Optimism"]
to_chain = "Base"
routes = ["relay"]
values = { from = "-0.0005", to = "-0.001" }
settlement_wait_secs = 60
"#,
    )
    .expect("bridge config parses");

    let bridge = config.bridge().expect("bridge section");
    assert_eq!(bridge.from_chains.len(), 2);
    assert_eq!(bridge.settlement_wait().as_secs(), 60);
    assert_eq!(bridge.policy().expect("policy").routes, vec!["relay"]);
}

#[test]
fn bridge_without_sources_is_rejected() {
    let result = load("[bridge]\nfrom_chains = []\nto_chain = \"Base\"\n");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingField {
            field: "bridge.from_chains"
        }))
    ));
}

#[test]
fn wrong_value_type_is_a_parse_error() {
    let result = load("[general]\nmax_attempts = \"two\"\n");
    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}
