//! Allowance check shared by routes that pull ERC-20 tokens through a spender.

use alloy_primitives::Address;
use tracing::debug;

use crate::domain::intent::TxIntent;
use crate::domain::quote::RouteRequest;
use crate::domain::token::Asset;
use crate::error::Result;
use crate::port::outbound::chain::BalanceReader;

/// `approve` intent for `spender` when the current allowance cannot cover the
/// request. Native inputs never need one.
pub async fn approval_if_needed(
    balances: &dyn BalanceReader,
    request: &RouteRequest,
    spender: Address,
) -> Result<Option<TxIntent>> {
    let Asset::Erc20(token) = request.token_in else {
        return Ok(None);
    };
    let allowance = balances
        .allowance(request.chain, token, request.wallet, spender)
        .await?;
    if allowance >= request.amount_in {
        return Ok(None);
    }
    debug!(
        chain = %request.chain,
        token = %token,
        spender = %spender,
        allowance = %allowance,
        "Approval required"
    );
    Ok(Some(TxIntent::erc20_approve(token, spender, request.amount_in)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::Chain;
    use crate::domain::intent::IntentKind;
    use crate::testkit::chain::MemoryBalances;
    use alloy_primitives::U256;

    fn request(token_in: Asset) -> RouteRequest {
        RouteRequest {
            chain: Chain::Arbitrum,
            dest_chain: None,
            wallet: Address::repeat_byte(1),
            recipient: Address::repeat_byte(1),
            token_in,
            token_out: Asset::Native,
            decimals_in: 6,
            amount_in: U256::from(500u64),
        }
    }

    #[tokio::test]
    async fn low_allowance_yields_approve() {
        let balances = MemoryBalances::new().with_allowance(U256::from(10u64));
        let token = Address::repeat_byte(7);
        let intent = approval_if_needed(&balances, &request(Asset::Erc20(token)), Address::repeat_byte(9))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(intent.kind, IntentKind::Approve);
        assert_eq!(intent.to, token);
    }

    #[tokio::test]
    async fn sufficient_allowance_or_native_needs_nothing() {
        let balances = MemoryBalances::new().with_allowance(U256::MAX);
        let spender = Address::repeat_byte(9);
        let erc20 = request(Asset::Erc20(Address::repeat_byte(7)));
        assert!(approval_if_needed(&balances, &erc20, spender).await.unwrap().is_none());
        assert!(approval_if_needed(&balances, &request(Asset::Native), spender)
            .await
            .unwrap()
            .is_none());
    }
}
