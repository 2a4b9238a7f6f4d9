// 8.2 handlers/collateral.rs: moving the account's own tokens in and out.
//   deposit: wallet -> collateral (long entry)
//   withdraw: supply -> wallet (clamped, never rejected for liquidity)
//   supply: wallet -> supply
//   redeem: supply <-> collateral

use super::context::{ensure_pool_usable, OpContext};
use super::results::BalanceResult;
use crate::errors::LedgerError;
use crate::events::{DepositEvent, EventPayload, RedeemEvent, SupplyEvent, WithdrawEvent};
use crate::position::{apply_long, apply_short};
use crate::types::{AccountId, AssetId, RedeemDirection};
use primitive_types::U256;

fn ensure_supply_capacity(ctx: &OpContext<'_>, asset: AssetId, amount: U256) -> Result<(), LedgerError> {
    let pool = ctx.pool(asset)?;
    if let Some(capacity) = pool.configuration.supply_capacity_units() {
        let total = pool.total_pool_token()?.saturating_add(amount);
        if total > capacity {
            return Err(LedgerError::SupplyCapacityExceeded {
                asset,
                amount,
                capacity,
            });
        }
    }
    Ok(())
}

pub fn deposit(ctx: &mut OpContext<'_>, account: AccountId, asset: AssetId, amount: U256) -> Result<BalanceResult, LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::EmptyDepositAmount);
    }
    ctx.touch_pool(asset)?;
    ensure_pool_usable(asset, &ctx.pool(asset)?.configuration, false)?;
    ensure_supply_capacity(ctx, asset, amount)?;

    let price = ctx.price(asset)?;
    ctx.pull_into_pool(account, asset, amount)?;
    ctx.pool_mut(asset)?.mint_collateral(account, amount)?;
    ctx.update_position(account, asset, |p| apply_long(p, price, amount, true))?;
    ctx.refresh_rates(asset)?;

    let balance = ctx.snapshot(account, asset)?;
    tracing::debug!(account = account.0, %asset, %amount, "deposit");
    ctx.emit(EventPayload::Deposit(DepositEvent {
        account_id: account,
        asset,
        amount,
        balance,
    }));
    Ok(BalanceResult { asset, amount, balance })
}

pub fn withdraw(ctx: &mut OpContext<'_>, account: AccountId, asset: AssetId, amount: U256) -> Result<BalanceResult, LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::EmptyWithdrawAmount);
    }
    ctx.touch_pool(asset)?;
    let pool = ctx.pool(asset)?;
    ensure_pool_usable(asset, &pool.configuration, true)?;

    // clamp: own supply, then what the pool can spare
    let cash = pool.underlying_balance.saturating_sub(pool.unclaimed_fee);
    let withdrawn = amount
        .min(pool.supply_of(account)?)
        .min(pool.available_liquidity()?)
        .min(cash);

    if !withdrawn.is_zero() {
        ctx.pool_mut(asset)?.burn_supply(account, withdrawn)?;
        ctx.pay_from_pool(account, asset, withdrawn)?;
        ctx.refresh_rates(asset)?;
    }

    let balance = ctx.snapshot(account, asset)?;
    tracing::debug!(account = account.0, %asset, requested = %amount, %withdrawn, "withdraw");
    if !withdrawn.is_zero() {
        ctx.emit(EventPayload::Withdraw(WithdrawEvent {
            account_id: account,
            asset,
            requested: amount,
            amount: withdrawn,
            balance,
        }));
    }
    Ok(BalanceResult {
        asset,
        amount: withdrawn,
        balance,
    })
}

pub fn supply(ctx: &mut OpContext<'_>, account: AccountId, asset: AssetId, amount: U256) -> Result<BalanceResult, LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::EmptySupplyAmount);
    }
    ctx.touch_pool(asset)?;
    ensure_pool_usable(asset, &ctx.pool(asset)?.configuration, false)?;
    ensure_supply_capacity(ctx, asset, amount)?;

    ctx.pull_into_pool(account, asset, amount)?;
    ctx.pool_mut(asset)?.mint_supply(account, amount)?;
    ctx.refresh_rates(asset)?;

    let balance = ctx.snapshot(account, asset)?;
    tracing::debug!(account = account.0, %asset, %amount, "supply");
    ctx.emit(EventPayload::Supply(SupplyEvent {
        account_id: account,
        asset,
        amount,
        balance,
    }));
    Ok(BalanceResult { asset, amount, balance })
}

pub fn redeem(
    ctx: &mut OpContext<'_>,
    account: AccountId,
    asset: AssetId,
    amount: U256,
    direction: RedeemDirection,
) -> Result<BalanceResult, LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::EmptyRedeemAmount);
    }
    ctx.touch_pool(asset)?;
    ensure_pool_usable(asset, &ctx.pool(asset)?.configuration, true)?;
    let price = ctx.price(asset)?;

    let moved = match direction {
        RedeemDirection::ToCollateral => {
            let moved = amount.min(ctx.pool(asset)?.supply_of(account)?);
            if !moved.is_zero() {
                let pool = ctx.pool_mut(asset)?;
                pool.burn_supply(account, moved)?;
                pool.mint_collateral(account, moved)?;
                ctx.update_position(account, asset, |p| apply_long(p, price, moved, true))?;
            }
            moved
        }
        RedeemDirection::ToSupply => {
            let moved = amount.min(ctx.pool(asset)?.collateral_of(account)?);
            if !moved.is_zero() {
                let pool = ctx.pool_mut(asset)?;
                pool.burn_collateral(account, moved)?;
                pool.mint_supply(account, moved)?;
                ctx.update_position(account, asset, |p| apply_short(p, price, moved, true))?;
                ctx.ensure_healthy(account)?;
            }
            moved
        }
    };

    let balance = ctx.snapshot(account, asset)?;
    tracing::debug!(account = account.0, %asset, ?direction, %moved, "redeem");
    if !moved.is_zero() {
        ctx.emit(EventPayload::Redeem(RedeemEvent {
            account_id: account,
            asset,
            direction,
            amount: moved,
            balance,
        }));
    }
    Ok(BalanceResult {
        asset,
        amount: moved,
        balance,
    })
}
