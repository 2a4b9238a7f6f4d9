// 8.3 handlers/borrow.rs: new debt. borrowed tokens land as the account's own collateral
// in the same pool, so the position's net exposure does not move.

use super::context::{ensure_pool_usable, OpContext};
use super::results::BalanceResult;
use crate::errors::LedgerError;
use crate::events::{BorrowEvent, EventPayload};
use crate::types::{AccountId, AssetId};
use primitive_types::U256;

pub fn borrow(ctx: &mut OpContext<'_>, account: AccountId, asset: AssetId, amount: U256) -> Result<BalanceResult, LedgerError> {
    let result = borrow_unchecked(ctx, account, asset, amount)?;
    ctx.ensure_healthy(account)?;
    Ok(result)
}

/// Every borrow gate except the health check, which callers run once they are done.
pub(crate) fn borrow_unchecked(
    ctx: &mut OpContext<'_>,
    account: AccountId,
    asset: AssetId,
    amount: U256,
) -> Result<BalanceResult, LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::EmptyBorrowAmounts);
    }
    ctx.touch_pool(asset)?;

    let pool = ctx.pool(asset)?;
    ensure_pool_usable(asset, &pool.configuration, false)?;
    if !pool.configuration.is_borrowing_enabled() {
        return Err(LedgerError::BorrowingNotEnabled(asset));
    }
    if let Some(capacity) = pool.configuration.borrow_capacity_units() {
        if pool.total_debt()?.saturating_add(amount) > capacity {
            return Err(LedgerError::BorrowCapacityExceeded {
                asset,
                amount,
                capacity,
            });
        }
    }
    let available = pool.available_liquidity()?;
    if available < amount {
        return Err(LedgerError::InsufficientLiquidityForBorrow {
            asset,
            available,
            required: amount,
        });
    }

    let pool = ctx.pool_mut(asset)?;
    pool.mint_debt(account, amount)?;
    pool.mint_collateral(account, amount)?;
    ctx.sync_position(account, asset)?;
    ctx.refresh_rates(asset)?;

    let balance = ctx.snapshot(account, asset)?;
    tracing::debug!(account = account.0, %asset, %amount, "borrow");
    ctx.emit(EventPayload::Borrow(BorrowEvent {
        account_id: account,
        asset,
        amount,
        balance,
    }));
    Ok(BalanceResult { asset, amount, balance })
}
