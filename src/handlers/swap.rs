// 8.5 handlers/swap.rs: collateral in one asset becomes collateral in another via a linked dex.
// the sold asset is booked short at the oracle price, the bought asset long at the execution price.

use super::borrow::borrow_unchecked;
use super::context::{ensure_pool_usable, OpContext};
use super::results::SwapResult;
use crate::errors::LedgerError;
use crate::events::{EventPayload, SwapEvent};
use crate::math::{asset_value, mul_div, pow10};
use crate::position::{apply_long, apply_short};
use crate::types::{AccountId, AssetId, DexId};
use primitive_types::U256;

/// Dex linked to the pair, registered and ready.
pub(crate) fn linked_dex(ctx: &OpContext<'_>, asset_in: AssetId, asset_out: AssetId) -> Result<DexId, LedgerError> {
    let dex = ctx
        .store()
        .dex_link(asset_in, asset_out)
        .ok_or(LedgerError::SwapPoolsNotMatch(asset_in, asset_out))?;
    if !ctx.state.dexes.is_registered(dex) {
        return Err(LedgerError::DexEmpty(dex));
    }
    Ok(dex)
}

/// Input needed to buy exactly `amount_out` through the linked dex.
pub(crate) fn quote_exact_out(
    ctx: &OpContext<'_>,
    asset_in: AssetId,
    asset_out: AssetId,
    amount_out: U256,
) -> Result<U256, LedgerError> {
    let id = linked_dex(ctx, asset_in, asset_out)?;
    let dex = ctx.state.dexes.get(id).ok_or(LedgerError::DexEmpty(id))?;
    dex.quote_exact_out(asset_in, asset_out, amount_out)
        .map_err(|_| LedgerError::InsufficientDexLiquidity {
            asset_in,
            asset_out,
            amount: amount_out,
        })
}

/// Sells `amount_in` of the account's collateral. the caller guarantees the collateral exists.
/// Returns what was bought, already minted as collateral.
pub(crate) fn swap_collateral(
    ctx: &mut OpContext<'_>,
    account: AccountId,
    asset_in: AssetId,
    asset_out: AssetId,
    amount_in: U256,
    sqrt_price_limit: U256,
) -> Result<(U256, DexId), LedgerError> {
    let id = linked_dex(ctx, asset_in, asset_out)?;

    ctx.pool_mut(asset_in)?.burn_collateral(account, amount_in)?;
    ctx.pay_out(asset_in, amount_in)?;

    let dex = ctx.state.dexes.get_mut(id).ok_or(LedgerError::DexEmpty(id))?;
    let amount_out = dex
        .swap_exact_in(asset_in, asset_out, amount_in, sqrt_price_limit)
        .map_err(|_| LedgerError::InsufficientDexLiquidity {
            asset_in,
            asset_out,
            amount: amount_in,
        })?;

    let pool_out = ctx.pool_mut(asset_out)?;
    pool_out.receive(amount_out)?;
    pool_out.mint_collateral(account, amount_out)?;

    // execution price: usd value sold per whole unit bought
    let price_in = ctx.price(asset_in)?;
    let value_in = asset_value(amount_in, price_in, ctx.decimals(asset_in)?)?;
    let execution_price = mul_div(value_in, pow10(ctx.decimals(asset_out)?), amount_out)?;

    ctx.update_position(account, asset_in, |p| apply_short(p, price_in, amount_in, true))?;
    ctx.update_position(account, asset_out, |p| apply_long(p, execution_price, amount_out, true))?;
    ctx.refresh_rates(asset_in)?;
    ctx.refresh_rates(asset_out)?;

    tracing::debug!(
        account = account.0,
        %asset_in,
        %asset_out,
        %amount_in,
        %amount_out,
        "collateral swapped"
    );
    Ok((amount_out, id))
}

pub fn swap(
    ctx: &mut OpContext<'_>,
    account: AccountId,
    asset_in: AssetId,
    asset_out: AssetId,
    amount: U256,
    sqrt_price_limit: U256,
) -> Result<SwapResult, LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::EmptySwapAmount);
    }
    ctx.touch_pool(asset_in)?;
    ctx.touch_pool(asset_out)?;
    ensure_pool_usable(asset_in, &ctx.pool(asset_in)?.configuration, false)?;
    ensure_pool_usable(asset_out, &ctx.pool(asset_out)?.configuration, false)?;
    linked_dex(ctx, asset_in, asset_out)?;

    // fund any shortfall with fresh debt
    let collateral = ctx.pool(asset_in)?.collateral_of(account)?;
    let borrowed = amount.saturating_sub(collateral);
    if !borrowed.is_zero() {
        borrow_unchecked(ctx, account, asset_in, borrowed)?;
    }

    let (amount_out, dex) = swap_collateral(ctx, account, asset_in, asset_out, amount, sqrt_price_limit)?;
    ctx.ensure_healthy(account)?;

    let balance_in = ctx.snapshot(account, asset_in)?;
    let balance_out = ctx.snapshot(account, asset_out)?;
    ctx.emit(EventPayload::Swap(SwapEvent {
        account_id: account,
        asset_in,
        asset_out,
        amount_in: amount,
        amount_out,
        dex,
        balance_in,
        balance_out,
    }));

    Ok(SwapResult {
        asset_in,
        asset_out,
        amount_in: amount,
        amount_out,
        borrowed,
        dex,
    })
}
