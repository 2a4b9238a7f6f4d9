// 7.5 health.rs: account solvency across every pool.
// health factor = collateral value / debt value, both in ray USD.
// supply balances only earn and never back debt.

use crate::errors::LedgerError;
use crate::math::{asset_value, mul_div, RAY};
use crate::oracle::{price_ray, Oracle};
use crate::store::LedgerStore;
use crate::types::{AccountId, AssetId, Timestamp};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskParams {
    pub health_factor_liquidation_threshold: U256,
}

impl Default for RiskParams {
    fn default() -> Self {
        // 1.1
        Self {
            health_factor_liquidation_threshold: RAY * 11 / 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountHealth {
    pub account: AccountId,
    pub collateral_value: U256,
    pub debt_value: U256,
    // U256::MAX with no debt
    pub health_factor: U256,
}

impl AccountHealth {
    pub fn has_debt(&self) -> bool {
        !self.debt_value.is_zero()
    }

    pub fn is_liquidatable(&self, threshold: U256) -> bool {
        self.has_debt() && self.health_factor < threshold
    }
}

pub fn health_factor(collateral_value: U256, debt_value: U256) -> Result<U256, LedgerError> {
    if debt_value.is_zero() {
        return Ok(U256::MAX);
    }
    // a huge ratio saturates rather than failing the read
    Ok(mul_div(collateral_value, RAY, debt_value).unwrap_or(U256::MAX))
}

/// Values every position the account holds, projecting pool indices to `now`.
pub fn account_health(
    store: &LedgerStore,
    oracle: &dyn Oracle,
    account: AccountId,
    now: Timestamp,
) -> Result<AccountHealth, LedgerError> {
    let mut collateral_value = U256::zero();
    let mut debt_value = U256::zero();

    for asset in store.account_assets(account) {
        let (collateral, debt) = balances_at(store, account, asset, now)?;
        if collateral.is_zero() && debt.is_zero() {
            continue;
        }
        let pool = store.pools.get_ref(&asset).ok_or(LedgerError::PoolNotFound(asset))?;
        let price = price_ray(oracle, asset)?;
        let decimals = pool.decimals();

        collateral_value = collateral_value.saturating_add(asset_value(collateral, price, decimals)?);
        debt_value = debt_value.saturating_add(asset_value(debt, price, decimals)?);
    }

    Ok(AccountHealth {
        account,
        collateral_value,
        debt_value,
        health_factor: health_factor(collateral_value, debt_value)?,
    })
}

/// Collateral and debt of `account` in `asset` as they would read at `now`.
pub fn balances_at(
    store: &LedgerStore,
    account: AccountId,
    asset: AssetId,
    now: Timestamp,
) -> Result<(U256, U256), LedgerError> {
    let pool = store.pools.get_ref(&asset).ok_or(LedgerError::PoolNotFound(asset))?;
    let collateral = pool
        .pool_token
        .collateral
        .balance_of(account, pool.normalized_income(now)?)?;
    let debt = pool.debt_token.balance_of(account, pool.normalized_debt(now)?)?;
    Ok((collateral, debt))
}

/// Fails when the account would sit below the liquidation threshold.
pub fn ensure_healthy(
    store: &LedgerStore,
    oracle: &dyn Oracle,
    account: AccountId,
    now: Timestamp,
) -> Result<AccountHealth, LedgerError> {
    let health = account_health(store, oracle, account, now)?;
    let threshold = store.risk_params().health_factor_liquidation_threshold;
    if health.has_debt() && health.health_factor < threshold {
        tracing::debug!(account = account.0, health_factor = %health.health_factor, "health check failed");
        return Err(LedgerError::HealthFactorLowerThanLiquidationThreshold {
            health_factor: health.health_factor,
            threshold,
        });
    }
    Ok(health)
}
