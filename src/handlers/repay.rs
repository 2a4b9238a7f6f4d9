// 8.4 handlers/repay.rs: paying debt down.
//   repay from wallet: whole amount pulled, overpayment stays as collateral
//   repay from collateral: debt and collateral burn together
//   repay_substitute: sell another collateral for the debt asset, then repay from collateral

use super::context::{ensure_pool_usable, OpContext};
use super::results::{RepayResult, RepaySubstituteResult, SwapResult};
use super::swap::swap_collateral;
use crate::errors::LedgerError;
use crate::events::{EventPayload, RepayEvent, SwapEvent};
use crate::position::apply_long;
use crate::types::{AccountId, AssetId, RepaySource};
use primitive_types::U256;

/// `U256::MAX` repays the whole debt.
pub fn repay(
    ctx: &mut OpContext<'_>,
    account: AccountId,
    asset: AssetId,
    amount: U256,
    source: RepaySource,
) -> Result<RepayResult, LedgerError> {
    ctx.touch_pool(asset)?;
    if !ctx.store().has_position(account, asset) {
        return Err(LedgerError::EmptyPosition { account, asset });
    }
    let pool = ctx.pool(asset)?;
    let debt = pool.debt_of(account)?;
    if debt.is_zero() {
        return Err(LedgerError::UserDoNotHaveDebtInPool { account, asset });
    }
    let amount = if amount == U256::MAX { debt } else { amount };
    if amount.is_zero() {
        return Err(LedgerError::EmptyRepayAmount);
    }
    ensure_pool_usable(asset, &pool.configuration, true)?;

    let repaid = amount.min(debt);
    let excess = match source {
        RepaySource::Wallet => {
            let price = ctx.price(asset)?;
            ctx.pull_into_pool(account, asset, amount)?;
            let pool = ctx.pool_mut(asset)?;
            pool.burn_debt(account, repaid)?;
            let excess = amount - repaid;
            if !excess.is_zero() {
                pool.mint_collateral(account, excess)?;
            }
            ctx.update_position(account, asset, |p| apply_long(p, price, amount, false))?;
            excess
        }
        RepaySource::Collateral => {
            let collateral = pool.collateral_of(account)?;
            if collateral < repaid {
                return Err(LedgerError::InsufficientCollateralAmountForRepay {
                    asset,
                    collateral,
                    required: repaid,
                });
            }
            let pool = ctx.pool_mut(asset)?;
            pool.burn_debt(account, repaid)?;
            pool.burn_collateral(account, repaid)?;
            ctx.sync_position(account, asset)?;
            U256::zero()
        }
    };
    ctx.refresh_rates(asset)?;

    let balance = ctx.snapshot(account, asset)?;
    tracing::debug!(account = account.0, %asset, ?source, %repaid, %excess, "repay");
    ctx.emit(EventPayload::Repay(RepayEvent {
        account_id: account,
        asset,
        source,
        repaid,
        excess,
        balance,
    }));
    Ok(RepayResult {
        asset,
        repaid,
        excess,
        balance,
    })
}

/// Repays debt in `asset` by selling `amount` of `substitute` collateral. zero sells all of it.
pub fn repay_substitute(
    ctx: &mut OpContext<'_>,
    account: AccountId,
    asset: AssetId,
    substitute: AssetId,
    amount: U256,
    sqrt_price_limit: U256,
) -> Result<RepaySubstituteResult, LedgerError> {
    ctx.touch_pool(asset)?;
    ctx.touch_pool(substitute)?;
    if !ctx.store().has_position(account, asset) {
        return Err(LedgerError::EmptyPosition { account, asset });
    }
    if ctx.pool(asset)?.debt_of(account)?.is_zero() {
        return Err(LedgerError::UserDoNotHaveDebtInPool { account, asset });
    }
    if !ctx.store().has_position(account, substitute) {
        return Err(LedgerError::EmptyPosition {
            account,
            asset: substitute,
        });
    }
    ensure_pool_usable(substitute, &ctx.pool(substitute)?.configuration, true)?;

    let held = ctx.pool(substitute)?.collateral_of(account)?;
    let sold = if amount.is_zero() { held } else { amount.min(held) };
    if sold.is_zero() {
        return Err(LedgerError::EmptyRepayAmount);
    }

    let (bought, dex) = swap_collateral(ctx, account, substitute, asset, sold, sqrt_price_limit)?;
    let balance_in = ctx.snapshot(account, substitute)?;
    let balance_out = ctx.snapshot(account, asset)?;
    ctx.emit(EventPayload::Swap(SwapEvent {
        account_id: account,
        asset_in: substitute,
        asset_out: asset,
        amount_in: sold,
        amount_out: bought,
        dex,
        balance_in,
        balance_out,
    }));

    // leftover proceeds above the debt stay as collateral
    let repay = repay(ctx, account, asset, bought, RepaySource::Collateral)?;
    ctx.ensure_healthy(account)?;
    Ok(RepaySubstituteResult {
        swap: SwapResult {
            asset_in: substitute,
            asset_out: asset,
            amount_in: sold,
            amount_out: bought,
            borrowed: U256::zero(),
            dex,
        },
        repay,
    })
}
