//! Handler for the `chains` command.

use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::{operator, output};
use crate::error::Result;
use crate::port::inbound::operator::diagnostic::ChainView;

#[derive(Tabled)]
struct ChainRow {
    #[tabled(rename = "Chain")]
    name: &'static str,
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Native")]
    native: &'static str,
    #[tabled(rename = "Unwrap")]
    unwrap: &'static str,
    #[tabled(rename = "Token list")]
    token_list: &'static str,
}

impl From<&ChainView> for ChainRow {
    fn from(view: &ChainView) -> Self {
        Self {
            name: view.name,
            id: view.id,
            native: view.native_symbol,
            unwrap: yes_no(view.has_wrapped_native),
            token_list: yes_no(view.has_token_list),
        }
    }
}

const fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "-"
    }
}

/// List every supported chain.
pub fn execute() -> Result<()> {
    let chains = operator::operator().chains();

    if output::is_json() {
        let rows: Vec<_> = chains
            .iter()
            .map(|view| {
                json!({
                    "name": view.name,
                    "id": view.id,
                    "native": view.native_symbol,
                    "rpc": view.rpc_url,
                    "wrapped_native": view.has_wrapped_native,
                    "token_list": view.has_token_list,
                })
            })
            .collect();
        output::json_output(json!({ "chains": rows }));
        return Ok(());
    }

    output::section("Supported Chains");
    let rows: Vec<ChainRow> = chains.iter().map(ChainRow::from).collect();
    output::table(&Table::new(rows).with(Style::rounded()).to_string());
    output::hint("select chains in config with names, or `!Name` to select all but one");
    Ok(())
}
