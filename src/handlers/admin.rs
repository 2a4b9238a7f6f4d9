// 8.8 handlers/admin.rs: pool listing and parameter changes, fee claims.
// roles are checked by the batch before any of these run.

use super::context::OpContext;
use crate::config::{PoolParams, RiskConfig, StrategyParams};
use crate::errors::LedgerError;
use crate::events::{
    DexLinkUpdatedEvent, EventPayload, FeeClaimedEvent, PoolConfiguredEvent, PoolCreatedEvent, RiskParamsUpdatedEvent,
    StrategyUpdatedEvent,
};
use crate::pool::Pool;
use crate::types::{AccountId, AssetId, DexId, DexKey, StrategyId};
use primitive_types::U256;

pub fn create_pool(
    ctx: &mut OpContext<'_>,
    asset: AssetId,
    params: &PoolParams,
    strategy: StrategyId,
) -> Result<(), LedgerError> {
    if ctx.store().pools.has(&asset) {
        return Err(LedgerError::PoolAlreadyExists(asset));
    }
    if !ctx.store().strategies.has(&strategy) {
        return Err(LedgerError::StrategyNotFound(strategy));
    }
    let configuration = params.to_configuration()?;
    let pool = Pool::new(asset, strategy, configuration, ctx.now());
    ctx.state.store.pools.set(asset, pool);
    ctx.refresh_rates(asset)?;

    tracing::info!(%asset, strategy = strategy.0, usd = configuration.is_usd(), "pool created");
    ctx.emit(EventPayload::PoolCreated(PoolCreatedEvent {
        asset,
        strategy,
        configuration,
    }));
    Ok(())
}

/// Replaces the pool's bitfield. interest up to now accrues under the old settings.
pub fn set_pool_configuration(ctx: &mut OpContext<'_>, asset: AssetId, params: &PoolParams) -> Result<(), LedgerError> {
    let configuration = params.to_configuration()?;
    ctx.touch_pool(asset)?;
    ctx.pool_mut(asset)?.configuration = configuration;
    ctx.refresh_rates(asset)?;
    emit_pool_configured(ctx, asset)
}

pub fn set_pool_strategy(ctx: &mut OpContext<'_>, asset: AssetId, strategy: StrategyId) -> Result<(), LedgerError> {
    if !ctx.store().strategies.has(&strategy) {
        return Err(LedgerError::StrategyNotFound(strategy));
    }
    ctx.touch_pool(asset)?;
    ctx.pool_mut(asset)?.interest_rate_strategy = strategy;
    ctx.refresh_rates(asset)?;
    emit_pool_configured(ctx, asset)
}

fn emit_pool_configured(ctx: &mut OpContext<'_>, asset: AssetId) -> Result<(), LedgerError> {
    let pool = ctx.pool(asset)?;
    let event = PoolConfiguredEvent {
        asset,
        configuration: pool.configuration,
        strategy: pool.interest_rate_strategy,
    };
    ctx.emit(EventPayload::PoolConfigured(event));
    Ok(())
}

/// Inserts or replaces a strategy. pools already on it accrue to now first.
pub fn set_strategy(ctx: &mut OpContext<'_>, id: StrategyId, params: &StrategyParams) -> Result<(), LedgerError> {
    let strategy = params.to_strategy()?;
    let users: Vec<AssetId> = ctx
        .store()
        .pools
        .iter()
        .filter(|(_, pool)| pool.interest_rate_strategy == id)
        .map(|(asset, _)| *asset)
        .collect();

    for asset in &users {
        ctx.touch_pool(*asset)?;
    }
    ctx.state.store.strategies.set(id, strategy);
    for asset in &users {
        ctx.refresh_rates(*asset)?;
    }

    tracing::info!(strategy = id.0, pools = users.len(), "strategy updated");
    ctx.emit(EventPayload::StrategyUpdated(StrategyUpdatedEvent {
        strategy_id: id,
        strategy,
    }));
    Ok(())
}

pub fn set_dex_link(ctx: &mut OpContext<'_>, asset_a: AssetId, asset_b: AssetId, dex: DexId) -> Result<(), LedgerError> {
    ctx.pool(asset_a)?;
    ctx.pool(asset_b)?;
    if !ctx.state.dexes.is_registered(dex) {
        return Err(LedgerError::DexEmpty(dex));
    }
    ctx.state.store.dex_links.set(DexKey::new(asset_a, asset_b), dex);
    ctx.emit(EventPayload::DexLinkUpdated(DexLinkUpdatedEvent {
        asset_a,
        asset_b,
        dex: Some(dex),
    }));
    Ok(())
}

pub fn remove_dex_link(ctx: &mut OpContext<'_>, asset_a: AssetId, asset_b: AssetId) -> Result<(), LedgerError> {
    let key = DexKey::new(asset_a, asset_b);
    if ctx.state.store.dex_links.remove(&key).is_none() {
        return Err(LedgerError::SwapPoolsNotMatch(asset_a, asset_b));
    }
    ctx.emit(EventPayload::DexLinkUpdated(DexLinkUpdatedEvent {
        asset_a,
        asset_b,
        dex: None,
    }));
    Ok(())
}

pub fn set_risk_params(ctx: &mut OpContext<'_>, risk: &RiskConfig) -> Result<(), LedgerError> {
    let params = risk.to_risk_params()?;
    ctx.state.store.set_risk_params(params);
    tracing::info!(threshold = %params.health_factor_liquidation_threshold, "risk params updated");
    ctx.emit(EventPayload::RiskParamsUpdated(RiskParamsUpdatedEvent { params }));
    Ok(())
}

/// Pays out accrued protocol fee. zero claims everything unclaimed.
pub fn claim_fee(
    ctx: &mut OpContext<'_>,
    asset: AssetId,
    recipient: AccountId,
    amount: U256,
) -> Result<U256, LedgerError> {
    ctx.touch_pool(asset)?;
    let unclaimed = ctx.pool(asset)?.unclaimed_fee;
    let claimed = if amount.is_zero() { unclaimed } else { amount.min(unclaimed) };
    if claimed.is_zero() {
        return Err(LedgerError::EmptyPool(asset));
    }

    ctx.pay_from_pool(recipient, asset, claimed)?;
    let pool = ctx.pool_mut(asset)?;
    pool.unclaimed_fee -= claimed;
    let unclaimed_fee = pool.unclaimed_fee;
    ctx.refresh_rates(asset)?;

    tracing::info!(%asset, recipient = recipient.0, %claimed, "fee claimed");
    ctx.emit(EventPayload::FeeClaimed(FeeClaimedEvent {
        asset,
        recipient,
        amount: claimed,
        unclaimed_fee,
    }));
    Ok(claimed)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::super::{borrow, deposit};
    use super::*;
    use crate::math::RAY;
    use crate::types::Timestamp;
    use rust_decimal_macros::dec;

    #[test]
    fn create_pool_rejects_duplicates_and_unknown_strategy() {
        let mut fx = Fixture::new();
        let params = PoolParams::default();
        assert_eq!(
            fx.run(|ctx| create_pool(ctx, Fixture::UNI, &params, StrategyId(0))),
            Err(LedgerError::PoolAlreadyExists(Fixture::UNI))
        );
        assert_eq!(
            fx.run(|ctx| create_pool(ctx, AssetId(3), &params, StrategyId(9))),
            Err(LedgerError::StrategyNotFound(StrategyId(9)))
        );

        fx.run(|ctx| create_pool(ctx, AssetId(3), &params, StrategyId(0))).unwrap();
        let pool = fx.state.store.pools.get_ref(&AssetId(3)).unwrap();
        assert_eq!(pool.liquidity_index, RAY);
        assert_eq!(pool.configuration.fee_factor(), 1_000);
        assert!(matches!(fx.events.last(), Some(EventPayload::PoolCreated(_))));
    }

    #[test]
    fn bad_pool_params_surface_as_config_errors() {
        let mut fx = Fixture::new();
        let params = PoolParams {
            fee_factor: dec!(2),
            ..PoolParams::default()
        };
        let err = fx.run(|ctx| set_pool_configuration(ctx, Fixture::UNI, &params)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidConfig(_)));
    }

    #[test]
    fn strategy_change_accrues_under_old_curve_first() {
        let mut fx = Fixture::new();
        let alice = fx.funded_account(1, Fixture::USDC, Fixture::usdc(100_000));
        fx.run(|ctx| deposit(ctx, alice, Fixture::USDC, Fixture::usdc(100_000))).unwrap();
        fx.run(|ctx| borrow(ctx, alice, Fixture::UNI, Fixture::uni(1_000))).unwrap();

        fx.now = Timestamp::from_secs(fx.now.as_secs() + 86_400);
        fx.run(|ctx| set_strategy(ctx, StrategyId(0), &StrategyParams::default())).unwrap();

        let pool = fx.state.store.pools.get_ref(&Fixture::UNI).unwrap();
        assert_eq!(pool.last_update_timestamp, fx.now);
        assert!(pool.borrow_index > RAY);
        let strategy = fx.state.store.strategies.get(&StrategyId(0));
        assert_eq!(strategy.rate_slope1, RAY * 4 / 100);
    }

    #[test]
    fn dex_links_need_registered_dex() {
        let mut fx = Fixture::new();
        assert_eq!(
            fx.run(|ctx| set_dex_link(ctx, Fixture::UNI, Fixture::USDC, DexId(5))),
            Err(LedgerError::DexEmpty(DexId(5)))
        );
        fx.run(|ctx| remove_dex_link(ctx, Fixture::USDC, Fixture::UNI)).unwrap();
        assert_eq!(fx.state.store.dex_link(Fixture::UNI, Fixture::USDC), None);
        assert_eq!(
            fx.run(|ctx| remove_dex_link(ctx, Fixture::USDC, Fixture::UNI)),
            Err(LedgerError::SwapPoolsNotMatch(Fixture::USDC, Fixture::UNI))
        );
        fx.run(|ctx| set_dex_link(ctx, Fixture::USDC, Fixture::UNI, Fixture::DEX)).unwrap();
        assert_eq!(fx.state.store.dex_link(Fixture::UNI, Fixture::USDC), Some(Fixture::DEX));
    }

    #[test]
    fn risk_params_update_threshold() {
        let mut fx = Fixture::new();
        let risk = RiskConfig {
            health_factor_liquidation_threshold: dec!(1.5),
        };
        fx.run(|ctx| set_risk_params(ctx, &risk)).unwrap();
        assert_eq!(fx.state.store.risk_params().health_factor_liquidation_threshold, RAY * 3 / 2);
    }

    #[test]
    fn claim_fee_pays_accrued_fee() {
        let mut fx = Fixture::new();
        let alice = fx.funded_account(1, Fixture::USDC, Fixture::usdc(100_000));
        fx.run(|ctx| deposit(ctx, alice, Fixture::USDC, Fixture::usdc(100_000))).unwrap();
        fx.run(|ctx| borrow(ctx, alice, Fixture::UNI, Fixture::uni(1_000))).unwrap();

        let treasury = AccountId(50);
        assert_eq!(
            fx.run(|ctx| claim_fee(ctx, Fixture::UNI, treasury, U256::zero())),
            Err(LedgerError::EmptyPool(Fixture::UNI))
        );

        fx.now = Timestamp::from_secs(fx.now.as_secs() + 365 * 86_400);
        let claimed = fx.run(|ctx| claim_fee(ctx, Fixture::UNI, treasury, U256::zero())).unwrap();
        assert!(!claimed.is_zero());
        assert_eq!(fx.state.tokens.balance_of(treasury, Fixture::UNI), claimed);

        let pool = fx.state.store.pools.get_ref(&Fixture::UNI).unwrap();
        assert!(pool.unclaimed_fee.is_zero());
        assert_eq!(pool.total_fee, claimed);
    }
}
