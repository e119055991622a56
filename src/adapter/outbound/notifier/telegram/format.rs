//! Message formatting for Telegram notifications.

use alloy_primitives::Address;

use crate::domain::outcome::ActionOutcome;
use crate::port::outbound::notifier::Event;

use super::notifier::TelegramConfig;

/// Format an event into a Telegram message, or None if the event should be skipped.
pub fn format_event_message(event: &Event, config: &TelegramConfig) -> Option<String> {
    match event {
        Event::RunStarted { scenario, wallets } => Some(format!(
            "🧹 *Run started*\n\
            \n\
            📋 Scenario: `{}`\n\
            👛 Wallets: `{}`",
            escape_markdown(scenario),
            wallets
        )),
        Event::ActionCompleted(e) => {
            let (emoji, detail) = match &e.outcome {
                ActionOutcome::Success(receipt) if receipt.confirmed => ("✅", format!("via {}", receipt.route)),
                ActionOutcome::Success(receipt) => ("⏳", format!("via {}, unconfirmed", receipt.route)),
                ActionOutcome::Failed(reason) => ("❌", truncate(reason, 120)),
                ActionOutcome::Skipped(_) if !config.notify_skips => return None,
                ActionOutcome::Skipped(reason) => ("⏭️", truncate(&reason.to_string(), 120)),
            };
            let mut msg = format!(
                "{} *{}* on {}\n\
                \n\
                👛 `{}`\n\
                📝 {}",
                emoji,
                escape_markdown(&e.action),
                escape_markdown(e.chain.name()),
                short_address(e.wallet),
                escape_markdown(&detail)
            );
            if let Some(link) = &e.explorer_link {
                msg.push_str(&format!("\n🔗 {}", escape_markdown(link)));
            }
            Some(msg)
        }
        Event::SettlementUnknown { chain, tx_hash } => Some(format!(
            "⏳ *Bridge not yet delivered*\n\
            \n\
            ⛓️ {}\n\
            🔗 {}",
            escape_markdown(chain.name()),
            escape_markdown(&chain.descriptor().tx_link(tx_hash))
        )),
        Event::RunCompleted(summary) => Some(format!(
            "📊 *Run finished*\n\
            \n\
            👛 Wallets: `{}`\n\
            ✅ Succeeded: `{}`\n\
            ⏭️ Skipped: `{}`\n\
            ❌ Failed: `{}`",
            summary.wallets, summary.succeeded, summary.skipped, summary.failed
        )),
        Event::WalletStarted { .. } => None,
    }
}

/// `0x1234…abcd` form of an address.
fn short_address(address: Address) -> String {
    let address = format!("{address:#x}");
    format!("{}…{}", &address[..6], &address[address.len() - 4..])
}

/// Truncate a string with ellipsis (Unicode-safe).
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Escape special characters for Telegram `MarkdownV2`.
pub fn escape_markdown(text: &str) -> String {
    const SPECIAL: [char; 18] = [
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    ];
    let mut result = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }
    result
}
