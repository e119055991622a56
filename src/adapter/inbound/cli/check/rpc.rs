//! Handler for `check rpc`.

use serde_json::json;

use crate::adapter::inbound::cli::{operator, output};
use crate::error::Result;
use crate::port::inbound::operator::diagnostic::{HealthCheckStatus, RpcProbe};

/// Probe each chain's RPC endpoint. Fails when any endpoint is down.
pub async fn execute_rpc(chains: &[String]) -> Result<()> {
    let probes = operator::operator().probe_rpc(chains).await?;
    let healthy = probes.iter().all(RpcProbe::is_healthy);

    if output::is_json() {
        let rows: Vec<_> = probes
            .iter()
            .map(|probe| {
                json!({
                    "chain": probe.chain,
                    "healthy": probe.is_healthy(),
                    "gas_price_gwei": probe.gas_price_gwei.map(|gwei| gwei.to_string()),
                    "error": match &probe.status {
                        HealthCheckStatus::Healthy => None,
                        HealthCheckStatus::Unhealthy(reason) => Some(reason.as_str()),
                    },
                })
            })
            .collect();
        output::json_output(json!({ "healthy": healthy, "chains": rows }));
    } else {
        output::section("RPC Check");
        for probe in &probes {
            print_probe(probe);
        }
    }

    if healthy {
        Ok(())
    } else {
        let down = probes.iter().filter(|probe| !probe.is_healthy()).count();
        Err(crate::error::Error::Rpc(format!(
            "{down} of {} endpoints unreachable",
            probes.len()
        )))
    }
}

fn print_probe(probe: &RpcProbe) {
    match &probe.status {
        HealthCheckStatus::Healthy => {
            let gas = probe
                .gas_price_gwei
                .map_or_else(|| "?".to_string(), |gwei| format!("{gwei} gwei"));
            output::success(&format!("{:<10} {}", probe.chain, output::muted(gas)));
        }
        HealthCheckStatus::Unhealthy(reason) => {
            output::error(&format!("{:<10} {}", probe.chain, reason));
        }
    }
}
