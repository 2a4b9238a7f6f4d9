// 8.7 handlers/liquidation.rs: taking over an underwater account.
// the liquidator repays every debt from its own wallet and receives every unit of collateral.
// supply balances are not collateral and stay with the account.

use super::context::OpContext;
use super::results::LiquidationResult;
use crate::errors::LedgerError;
use crate::events::{EventPayload, LiquidationEvent};
use crate::health::{account_health, AccountHealth};
use crate::oracle::Oracle;
use crate::store::LedgerStore;
use crate::types::{AccountId, AssetAmount, PositionKey, Timestamp};
use std::collections::HashSet;

pub fn liquidate(
    ctx: &mut OpContext<'_>,
    liquidator: AccountId,
    account: AccountId,
) -> Result<LiquidationResult, LedgerError> {
    let assets = ctx.store().account_assets(account);
    for asset in &assets {
        ctx.touch_pool(*asset)?;
    }

    let health = account_health(ctx.store(), ctx.oracle, account, ctx.now())?;
    let threshold = ctx.store().risk_params().health_factor_liquidation_threshold;
    if !health.is_liquidatable(threshold) {
        return Err(LedgerError::HealthFactorHigherThanLiquidationThreshold {
            health_factor: health.health_factor,
            threshold,
        });
    }

    let mut debts_repaid = Vec::new();
    let mut collateral_seized = Vec::new();
    for asset in &assets {
        let asset = *asset;
        let debt = ctx.pool(asset)?.debt_of(account)?;
        if !debt.is_zero() {
            ctx.pull_into_pool(liquidator, asset, debt)?;
        }

        let (collateral, _) = ctx.pool_mut(asset)?.seize(account)?;
        if !collateral.is_zero() {
            ctx.pay_from_pool(liquidator, asset, collateral)?;
            collateral_seized.push(AssetAmount::new(asset, collateral));
        }
        if !debt.is_zero() {
            debts_repaid.push(AssetAmount::new(asset, debt));
        }

        ctx.state.store.positions.remove(&PositionKey::new(account, asset));
        ctx.refresh_rates(asset)?;
    }

    tracing::info!(
        account = account.0,
        liquidator = liquidator.0,
        health_factor = %health.health_factor,
        pools = assets.len(),
        "account liquidated"
    );
    ctx.emit(EventPayload::Liquidation(LiquidationEvent {
        account_id: account,
        liquidator,
        health_factor: health.health_factor,
        debts_repaid: debts_repaid.clone(),
        collateral_seized: collateral_seized.clone(),
    }));
    Ok(LiquidationResult {
        account,
        liquidator,
        health_factor: health.health_factor,
        debts_repaid,
        collateral_seized,
    })
}

/// Accounts below the threshold among position keys `[start, end)`. read-only.
pub fn liquidatable_accounts(
    store: &LedgerStore,
    oracle: &dyn Oracle,
    now: Timestamp,
    start: u64,
    end: u64,
) -> Result<Vec<AccountHealth>, LedgerError> {
    let threshold = store.risk_params().health_factor_liquidation_threshold;
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for key in store.positions.keys_at(start, end) {
        if !seen.insert(key.account) {
            continue;
        }
        let health = account_health(store, oracle, key.account, now)?;
        if health.is_liquidatable(threshold) {
            found.push(health);
        }
    }
    Ok(found)
}
