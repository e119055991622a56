//! Scenario-level behaviour: driver, orchestrator and scenarios wired to
//! in-memory collaborators.

mod support;

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use dustsweep::application::orchestrator::ExecutionSettings;
use dustsweep::application::scenario::balances::BalanceChecker;
use dustsweep::application::scenario::bridge::Bridger;
use dustsweep::application::scenario::collect::Collector;
use dustsweep::application::scenario::sell::Seller;
use dustsweep::application::scenario::send::NativeSender;
use dustsweep::application::scenario::sequence::Sequence;
use dustsweep::domain::chain::Chain;
use dustsweep::domain::outcome::{ActionOutcome, SkipReason};
use dustsweep::domain::policy::{ChainPolicy, IgnoreList, PriceGuard};
use dustsweep::domain::quote::Unavailable;
use dustsweep::domain::selection::ChainSelection;
use dustsweep::domain::token::{Asset, Token};
use dustsweep::domain::value::ValueExpression;
use dustsweep::error::ExecutionError;
use dustsweep::port::outbound::notifier::Event;
use dustsweep::port::outbound::route::{RouteProvider, Settlement};
use dustsweep::testkit::chain::{MemoryBalances, RecordingExecutor};
use dustsweep::testkit::discovery::StaticDiscovery;
use dustsweep::testkit::domain::{eth, holding, token, wallet, wallet_to};
use dustsweep::testkit::route::ScriptedRouteProvider;
use rust_decimal_macros::dec;
use support::harness::{Harness, TRANSFER_FEE_WEI};

fn base_only(routes: &[&str]) -> ChainPolicy {
    ChainPolicy {
        selection: ChainSelection::Only(Chain::Base),
        ..ChainPolicy::whole_balance(routes.iter().map(|r| r.to_string()).collect())
    }
}

fn routes(providers: &[&Arc<ScriptedRouteProvider>]) -> Vec<Arc<dyn RouteProvider>> {
    providers
        .iter()
        .map(|p| Arc::clone(*p) as Arc<dyn RouteProvider>)
        .collect()
}

fn weth_on_base() -> Token {
    let address = Chain::Base
        .descriptor()
        .wrapped_native
        .expect("Base has wrapped ETH");
    Token {
        asset: Asset::Erc20(address),
        symbol: "WETH".into(),
        name: "Wrapped Ether".into(),
        decimals: 18,
    }
}

#[tokio::test]
async fn send_forwards_native_balance_to_each_destination() {
    let a = wallet_to(0x01, 0xa1);
    let b = wallet_to(0x02, 0xa2);
    let balances = MemoryBalances::new()
        .with(Chain::Base, a.address, Asset::Native, eth(dec!(1)))
        .with(Chain::Base, b.address, Asset::Native, eth(dec!(0.5)));
    let harness = Harness::new(balances, RecordingExecutor::new());

    let direct = Arc::new(ScriptedRouteProvider::passthrough("direct"));
    let policy = ChainPolicy {
        deduct_fee: true,
        ..base_only(&["direct"])
    };
    let sender = NativeSender::new(policy, routes(&[&direct]));

    let summary = harness.driver().run(&sender, vec![a, b]).await.unwrap();

    assert_eq!(summary.wallets, 2);
    assert_eq!(summary.succeeded, 2);
    let sent = harness.sent.all();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].intent.to, Address::repeat_byte(0xa1));
    assert_eq!(sent[0].intent.value, eth(dec!(1)) - U256::from(TRANSFER_FEE_WEI));
    assert_eq!(sent[1].intent.to, Address::repeat_byte(0xa2));
}

#[tokio::test]
async fn failing_wallet_does_not_stop_the_next_one() {
    let lost = wallet(0x01);
    let ok = wallet_to(0x02, 0xa2);
    let balances = MemoryBalances::new()
        .with(Chain::Base, lost.address, Asset::Native, eth(dec!(1)))
        .with(Chain::Base, ok.address, Asset::Native, eth(dec!(1)));
    let harness = Harness::new(balances, RecordingExecutor::new());
    let direct = Arc::new(ScriptedRouteProvider::passthrough("direct"));
    let sender = NativeSender::new(base_only(&["direct"]), routes(&[&direct]));

    let summary = harness.driver().run(&sender, vec![lost, ok]).await.unwrap();

    assert_eq!((summary.succeeded, summary.failed), (1, 1));
    assert_eq!(harness.sent.len(), 1);
    let actions = harness.notifier.actions();
    assert!(matches!(actions[0].outcome, ActionOutcome::Failed(_)));
    assert!(actions[1].outcome.is_success());
}

#[tokio::test]
async fn absolute_amount_above_balance_moves_nothing() {
    let w = wallet_to(0x01, 0xa1);
    let balances = MemoryBalances::new().with(Chain::Base, w.address, Asset::Native, eth(dec!(1)));
    let harness = Harness::new(balances, RecordingExecutor::new());
    let direct = Arc::new(ScriptedRouteProvider::passthrough("direct"));
    let policy = ChainPolicy {
        value: ValueExpression::Absolute {
            from: dec!(5),
            to: dec!(6),
        },
        ..base_only(&["direct"])
    };
    let sender = NativeSender::new(policy, routes(&[&direct]));

    let summary = harness.driver().run(&sender, vec![w]).await.unwrap();

    assert_eq!(summary.skipped, 1);
    assert!(harness.sent.is_empty());
    assert_eq!(direct.quote_calls(), 0);
    assert!(matches!(
        harness.notifier.actions()[0].outcome,
        ActionOutcome::Skipped(SkipReason::NothingToMove)
    ));
}

#[tokio::test]
async fn transient_balance_failure_is_retried() {
    let w = wallet_to(0x01, 0xa1);
    let balances = MemoryBalances::new()
        .with(Chain::Base, w.address, Asset::Native, eth(dec!(1)))
        .failing_first(1);
    let harness = Harness::new(balances, RecordingExecutor::new());
    let direct = Arc::new(ScriptedRouteProvider::passthrough("direct"));
    let sender = NativeSender::new(base_only(&["direct"]), routes(&[&direct]));

    let summary = harness.driver().run(&sender, vec![w]).await.unwrap();

    assert_eq!(summary.succeeded, 1);
}

#[tokio::test]
async fn collect_swaps_unwraps_and_respects_ignore_list() {
    let w = wallet(0x01);
    let dust = token(0x10, "DUST", 18);
    let kept = token(0x20, "KEEP", 6);
    let discovery = StaticDiscovery::new().with(
        Chain::Base,
        w.address,
        vec![
            holding(dust, eth(dec!(3))),
            holding(kept, U256::from(5_000_000u64)),
            holding(weth_on_base(), eth(dec!(0.1))),
        ],
    );
    let harness = Harness::new(MemoryBalances::new(), RecordingExecutor::new());

    let odos = Arc::new(ScriptedRouteProvider::unavailable("odos", Unavailable::NoLiquidity));
    let sushi = Arc::new(ScriptedRouteProvider::passthrough("sushiswap"));
    let unwrap = Arc::new(ScriptedRouteProvider::passthrough("unwrap"));
    let policy = ChainPolicy {
        ignore: IgnoreList::new([Address::repeat_byte(0x20)]),
        ..base_only(&["odos", "sushiswap"])
    };
    let collector = Collector::new(
        Arc::new(discovery),
        policy,
        routes(&[&odos, &sushi]),
        unwrap.clone(),
        U256::from(10_000_000_000_000u64),
    );

    let summary = harness.driver().run(&collector, vec![w]).await.unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(odos.quote_calls(), 1);
    assert_eq!(sushi.assemble_calls(), 1);
    assert_eq!(unwrap.assemble_calls(), 1);

    let labels: Vec<String> = harness
        .notifier
        .actions()
        .into_iter()
        .map(|a| a.action)
        .collect();
    assert!(labels.contains(&"swap DUST".to_string()));
    assert!(labels.contains(&"unwrap WETH".to_string()));
    let ignored = harness
        .notifier
        .actions()
        .into_iter()
        .find(|a| a.action == "swap KEEP")
        .unwrap();
    assert!(matches!(ignored.outcome, ActionOutcome::Skipped(SkipReason::Ignored)));
}

#[tokio::test]
async fn small_wrapped_native_balance_is_left_alone() {
    let w = wallet(0x01);
    let discovery = StaticDiscovery::new().with(
        Chain::Base,
        w.address,
        vec![holding(weth_on_base(), U256::from(1_000u64))],
    );
    let harness = Harness::new(MemoryBalances::new(), RecordingExecutor::new());
    let sushi = Arc::new(ScriptedRouteProvider::passthrough("sushiswap"));
    let unwrap = Arc::new(ScriptedRouteProvider::passthrough("unwrap"));
    let collector = Collector::new(
        Arc::new(discovery),
        base_only(&["sushiswap"]),
        routes(&[&sushi]),
        unwrap.clone(),
        U256::from(10_000_000_000_000u64),
    );

    let summary = harness.driver().run(&collector, vec![w]).await.unwrap();

    assert_eq!(summary.actions(), 0);
    assert_eq!(unwrap.quote_calls(), 0);
    assert_eq!(sushi.quote_calls(), 0);
}

#[tokio::test]
async fn collect_then_send_runs_both_parts_per_chain() {
    let w = wallet_to(0x01, 0xa1);
    let discovery = StaticDiscovery::new().with(
        Chain::Base,
        w.address,
        vec![holding(token(0x10, "DUST", 18), eth(dec!(2)))],
    );
    let balances = MemoryBalances::new().with(Chain::Base, w.address, Asset::Native, eth(dec!(1)));
    let harness = Harness::new(balances, RecordingExecutor::new());

    let sushi = Arc::new(ScriptedRouteProvider::passthrough("sushiswap"));
    let unwrap = Arc::new(ScriptedRouteProvider::passthrough("unwrap"));
    let direct = Arc::new(ScriptedRouteProvider::passthrough("direct"));
    let collector = Collector::new(
        Arc::new(discovery),
        base_only(&["sushiswap"]),
        routes(&[&sushi]),
        unwrap,
        U256::from(10_000_000_000_000u64),
    );
    let sender = NativeSender::new(
        ChainPolicy {
            deduct_fee: true,
            ..base_only(&["direct"])
        },
        routes(&[&direct]),
    );
    let sequence = Sequence::new("collect-then-send", vec![Box::new(collector), Box::new(sender)]);

    let summary = harness.driver().run(&sequence, vec![w]).await.unwrap();

    assert_eq!(summary.succeeded, 2);
    let sent = harness.sent.all();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].intent.to, Address::repeat_byte(0x10));
    assert_eq!(sent[1].intent.to, Address::repeat_byte(0xa1));
}

#[tokio::test]
async fn bridge_route_fee_above_cap_is_vetoed() {
    let w = wallet(0x01);
    let balances = MemoryBalances::new().with(Chain::Arbitrum, w.address, Asset::Native, eth(dec!(1)));
    let harness = Harness::new(balances, RecordingExecutor::new());
    let stargate = Arc::new(
        ScriptedRouteProvider::passthrough("stargate").with_route_fee(eth(dec!(0.01))),
    );
    let policy = ChainPolicy {
        deduct_fee: true,
        max_route_fee: Some(eth(dec!(0.001))),
        ..ChainPolicy::whole_balance(vec!["stargate".into()])
    };
    let bridger = Bridger::new(vec![Chain::Arbitrum], Chain::Base, policy, routes(&[&stargate])).unwrap();

    let summary = harness.driver().run(&bridger, vec![w]).await.unwrap();

    assert_eq!(summary.failed, 1);
    assert!(harness.sent.is_empty());
    match &harness.notifier.actions()[0].outcome {
        ActionOutcome::Failed(reason) => assert!(reason.contains("vetoed")),
        other => panic!("unexpected outcome: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn unsettled_bridge_still_counts_as_success() {
    let w = wallet(0x01);
    let balances = MemoryBalances::new().with(Chain::Arbitrum, w.address, Asset::Native, eth(dec!(1)));
    let harness = Harness::with_settings(
        balances,
        RecordingExecutor::new(),
        ExecutionSettings {
            settlement_wait: Duration::from_secs(60),
            settlement_interval: Duration::from_secs(15),
            ..ExecutionSettings::default()
        },
    );
    let stargate = Arc::new(
        ScriptedRouteProvider::passthrough("stargate").with_settlement(vec![Settlement::Pending]),
    );
    let policy = ChainPolicy {
        deduct_fee: true,
        ..ChainPolicy::whole_balance(vec!["stargate".into()])
    };
    let bridger = Bridger::new(vec![Chain::Arbitrum], Chain::Base, policy, routes(&[&stargate])).unwrap();

    let summary = harness.driver().run(&bridger, vec![w]).await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert!(harness
        .notifier
        .events()
        .iter()
        .any(|e| matches!(e, Event::SettlementUnknown { chain: Chain::Arbitrum, .. })));
}

#[tokio::test]
async fn sell_below_price_floor_is_vetoed() {
    let w = wallet(0x01);
    let arb = token(0x30, "ARB", 18);
    let discovery = StaticDiscovery::new().with(Chain::Arbitrum, w.address, vec![holding(arb, eth(dec!(10)))]);
    let harness = Harness::new(MemoryBalances::new(), RecordingExecutor::new());
    // 10 tokens quoted at 1 USD total: 0.1 USD each.
    let odos = Arc::new(ScriptedRouteProvider::passthrough("odos").with_value_usd(dec!(1)));
    let policy = ChainPolicy {
        guard: PriceGuard {
            min_unit_price_usd: Some(dec!(0.5)),
            max_slippage: Some(dec!(0.05)),
        },
        ..ChainPolicy::whole_balance(vec!["odos".into()])
    };
    let seller = Seller::new(
        Chain::Arbitrum,
        Address::repeat_byte(0x30),
        policy,
        routes(&[&odos]),
        Arc::new(discovery),
    );

    let summary = harness.driver().run(&seller, vec![w]).await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(odos.assemble_calls(), 0);
    assert!(harness.sent.is_empty());
}

#[tokio::test]
async fn sell_falls_back_to_a_route_without_usd_value() {
    let w = wallet(0x01);
    let arb = token(0x30, "ARB", 18);
    let discovery = StaticDiscovery::new().with(Chain::Arbitrum, w.address, vec![holding(arb, eth(dec!(10)))]);
    let harness = Harness::new(MemoryBalances::new(), RecordingExecutor::new());
    let odos = Arc::new(ScriptedRouteProvider::unavailable("odos", Unavailable::NoLiquidity));
    // No USD figures: the output is valued as native ETH through the oracle.
    let sushi = Arc::new(ScriptedRouteProvider::passthrough("sushiswap"));
    let policy = ChainPolicy {
        guard: PriceGuard {
            min_unit_price_usd: Some(dec!(0.05)),
            max_slippage: None,
        },
        ..ChainPolicy::whole_balance(vec!["odos".into(), "sushiswap".into()])
    };
    let seller = Seller::new(
        Chain::Arbitrum,
        Address::repeat_byte(0x30),
        policy,
        routes(&[&odos, &sushi]),
        Arc::new(discovery),
    );

    let summary = harness.driver().run(&seller, vec![w]).await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(sushi.assemble_calls(), 1);
    assert_eq!(harness.sent.len(), 1);
}

#[tokio::test]
async fn transient_send_failure_is_retried() {
    let w = wallet_to(0x01, 0xa1);
    let balances = MemoryBalances::new().with(Chain::Base, w.address, Asset::Native, eth(dec!(1)));
    let executor = RecordingExecutor::new()
        .with_send_errors(vec![ExecutionError::NonceConflict("nonce too low".into()).into()]);
    let harness = Harness::new(balances, executor);
    let direct = Arc::new(ScriptedRouteProvider::passthrough("direct"));
    let sender = NativeSender::new(base_only(&["direct"]), routes(&[&direct]));

    let summary = harness.driver().run(&sender, vec![w]).await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(harness.sent.len(), 1);
}

#[tokio::test]
async fn rejected_send_is_not_retried() {
    let w = wallet_to(0x01, 0xa1);
    let balances = MemoryBalances::new().with(Chain::Base, w.address, Asset::Native, eth(dec!(1)));
    let executor = RecordingExecutor::new().with_send_errors(vec![ExecutionError::InsufficientBalance(
        "insufficient funds for gas * price + value".into(),
    )
    .into()]);
    let harness = Harness::new(balances, executor);
    let direct = Arc::new(ScriptedRouteProvider::passthrough("direct"));
    let sender = NativeSender::new(base_only(&["direct"]), routes(&[&direct]));

    let summary = harness.driver().run(&sender, vec![w]).await.unwrap();

    assert_eq!(summary.failed, 1);
    assert!(harness.sent.is_empty());
    match &harness.notifier.actions()[0].outcome {
        ActionOutcome::Failed(reason) => assert!(reason.contains("insufficient balance"), "{reason}"),
        other => panic!("unexpected outcome: {other}"),
    }
}

#[tokio::test]
async fn balances_report_sends_nothing() {
    let w = wallet(0x01);
    let usdc = token(0x40, "USDC", 6);
    let discovery = StaticDiscovery::new().with(
        Chain::Base,
        w.address,
        vec![holding(usdc, U256::from(2_500_000u64))],
    );
    let balances = MemoryBalances::new().with(Chain::Base, w.address, Asset::Native, eth(dec!(0.5)));
    let harness = Harness::new(balances, RecordingExecutor::new());
    let checker = BalanceChecker::new(Arc::new(discovery), ChainSelection::Only(Chain::Base));

    harness.driver().run(&checker, vec![w.clone()]).await.unwrap();

    let rows = checker.take_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].symbol, "ETH");
    assert_eq!(rows[0].value_usd, Some(dec!(1000)));
    assert_eq!(rows[1].symbol, "USDC");
    assert_eq!(rows[1].amount, dec!(2.5));
    assert!(harness.sent.is_empty());
    assert!(checker.take_rows().is_empty());
}
