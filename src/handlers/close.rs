// 8.6 handlers/close.rs: unwinding a position into a usd pool.
// pct of collateral and debt are closed together: the overlap nets directly,
// surplus collateral is sold for usd, a debt shortfall is bought with usd collateral.
// no health check: closing only ever removes risk.

use super::context::{ensure_pool_usable, OpContext};
use super::results::ClosePositionResult;
use super::swap::{quote_exact_out, swap_collateral};
use crate::errors::LedgerError;
use crate::events::{CloseEvent, ClosePositionEvent, EventPayload};
use crate::math::{ray_mul, RAY};
use crate::types::{AccountId, AssetId};
use primitive_types::U256;

fn ensure_usd_pool(ctx: &OpContext<'_>, usd_asset: AssetId) -> Result<(), LedgerError> {
    if !ctx.pool(usd_asset)?.configuration.is_usd() {
        return Err(LedgerError::PoolIsNotUsd(usd_asset));
    }
    Ok(())
}

/// `percentage` is a ray in (0, 1].
pub fn close_position(
    ctx: &mut OpContext<'_>,
    account: AccountId,
    asset: AssetId,
    usd_asset: AssetId,
    percentage: U256,
    sqrt_price_limit: U256,
) -> Result<ClosePositionResult, LedgerError> {
    if percentage.is_zero() || percentage > RAY {
        return Err(LedgerError::InvalidPercentage(percentage));
    }
    ctx.touch_pool(asset)?;
    ctx.touch_pool(usd_asset)?;
    ensure_usd_pool(ctx, usd_asset)?;
    if !ctx.store().has_position(account, asset) {
        return Err(LedgerError::EmptyPosition { account, asset });
    }
    ensure_pool_usable(asset, &ctx.pool(asset)?.configuration, true)?;

    let pool = ctx.pool(asset)?;
    let collateral = ray_mul(pool.collateral_of(account)?, percentage)?;
    let debt = ray_mul(pool.debt_of(account)?, percentage)?;

    let netted = collateral.min(debt);
    if !netted.is_zero() {
        let pool = ctx.pool_mut(asset)?;
        pool.burn_debt(account, netted)?;
        pool.burn_collateral(account, netted)?;
        ctx.sync_position(account, asset)?;
    }

    let mut usd_received = U256::zero();
    let mut usd_spent = U256::zero();
    let mut debt_closed = netted;

    if collateral > debt && asset != usd_asset {
        let surplus = collateral - debt;
        let (bought, _) = swap_collateral(ctx, account, asset, usd_asset, surplus, sqrt_price_limit)?;
        usd_received = bought;
    } else if debt > collateral {
        let shortfall = debt - collateral;
        if asset == usd_asset {
            return Err(LedgerError::CollateralCanNotCoverDebt(asset));
        }
        let need = quote_exact_out(ctx, usd_asset, asset, shortfall)?;
        if ctx.pool(usd_asset)?.collateral_of(account)? < need {
            return Err(LedgerError::CollateralCanNotCoverDebt(asset));
        }
        let (bought, _) = swap_collateral(ctx, account, usd_asset, asset, need, sqrt_price_limit)?;
        let covered = bought.min(shortfall);
        let pool = ctx.pool_mut(asset)?;
        pool.burn_debt(account, covered)?;
        pool.burn_collateral(account, covered)?;
        ctx.sync_position(account, asset)?;
        usd_spent = need;
        debt_closed = debt_closed.saturating_add(covered);
    }
    ctx.refresh_rates(asset)?;

    let balance = ctx.snapshot(account, asset)?;
    let usd_balance = ctx.snapshot(account, usd_asset)?;
    tracing::debug!(
        account = account.0,
        %asset,
        %percentage,
        %collateral,
        %debt_closed,
        "position closed"
    );
    ctx.emit(EventPayload::ClosePosition(ClosePositionEvent {
        account_id: account,
        asset,
        usd_asset,
        percentage,
        collateral_closed: collateral,
        debt_closed,
        balance,
        usd_balance,
    }));
    Ok(ClosePositionResult {
        asset,
        collateral_closed: collateral,
        debt_closed,
        usd_received,
        usd_spent,
    })
}

/// Closes every non-usd position the account holds, in pool order.
pub fn close_all(
    ctx: &mut OpContext<'_>,
    account: AccountId,
    usd_asset: AssetId,
    sqrt_price_limit: U256,
) -> Result<Vec<ClosePositionResult>, LedgerError> {
    ctx.touch_pool(usd_asset)?;
    ensure_usd_pool(ctx, usd_asset)?;

    let assets: Vec<AssetId> = ctx
        .store()
        .account_assets(account)
        .into_iter()
        .filter(|asset| *asset != usd_asset)
        .collect();

    let mut results = Vec::with_capacity(assets.len());
    for asset in &assets {
        results.push(close_position(ctx, account, *asset, usd_asset, RAY, sqrt_price_limit)?);
    }

    let usd_balance = ctx.snapshot(account, usd_asset)?;
    ctx.emit(EventPayload::Close(CloseEvent {
        account_id: account,
        usd_asset,
        assets,
        usd_balance,
    }));
    Ok(results)
}
