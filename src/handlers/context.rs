// 8.1 handlers/context.rs: what every handler borrows for one operation.
// state is the batch's working copy; it is committed only if the whole batch succeeds.

use crate::configuration::PoolConfiguration;
use crate::dex::DexRegistry;
use crate::errors::LedgerError;
use crate::events::{BalanceSnapshot, EventPayload};
use crate::health::{ensure_healthy, AccountHealth};
use crate::math::MathError;
use crate::oracle::{price_ray, Oracle};
use crate::pool::Pool;
use crate::position::Position;
use crate::store::LedgerStore;
use crate::token::{TokenBank, TransferError};
use crate::types::{AccountId, AssetId, PositionKey, Timestamp};
use primitive_types::U256;

/// Everything a batch can change. cloned at batch start.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    pub store: LedgerStore,
    pub tokens: TokenBank,
    pub dexes: DexRegistry,
}

pub struct OpContext<'a> {
    pub(crate) state: &'a mut LedgerState,
    pub(crate) oracle: &'a dyn Oracle,
    pub(crate) now: Timestamp,
    events: &'a mut Vec<EventPayload>,
}

impl<'a> OpContext<'a> {
    pub(crate) fn new(
        state: &'a mut LedgerState,
        oracle: &'a dyn Oracle,
        now: Timestamp,
        events: &'a mut Vec<EventPayload>,
    ) -> Self {
        Self {
            state,
            oracle,
            now,
            events,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn store(&self) -> &LedgerStore {
        &self.state.store
    }

    pub(crate) fn emit(&mut self, payload: EventPayload) {
        self.events.push(payload);
    }

    // 8.1.1: pool access

    pub(crate) fn pool(&self, asset: AssetId) -> Result<&Pool, LedgerError> {
        self.state.store.pools.get_ref(&asset).ok_or(LedgerError::PoolNotFound(asset))
    }

    pub(crate) fn pool_mut(&mut self, asset: AssetId) -> Result<&mut Pool, LedgerError> {
        self.state
            .store
            .pools
            .get_mut(&asset)
            .ok_or(LedgerError::PoolNotFound(asset))
    }

    /// Accrues the pool to `now`. every handler calls this first for each pool it touches.
    pub(crate) fn touch_pool(&mut self, asset: AssetId) -> Result<(), LedgerError> {
        let now = self.now;
        let store = &mut self.state.store;
        let pool = store.pools.get_mut(&asset).ok_or(LedgerError::PoolNotFound(asset))?;
        let strategy = store
            .strategies
            .get_ref(&pool.interest_rate_strategy)
            .copied()
            .ok_or(LedgerError::StrategyNotFound(pool.interest_rate_strategy))?;
        pool.accrue(now, &strategy)?;
        Ok(())
    }

    /// Recomputes rates after a pool's balances changed.
    pub(crate) fn refresh_rates(&mut self, asset: AssetId) -> Result<(), LedgerError> {
        let store = &mut self.state.store;
        let pool = store.pools.get_mut(&asset).ok_or(LedgerError::PoolNotFound(asset))?;
        let strategy = store
            .strategies
            .get_ref(&pool.interest_rate_strategy)
            .copied()
            .ok_or(LedgerError::StrategyNotFound(pool.interest_rate_strategy))?;
        pool.refresh_rates(&strategy)?;
        Ok(())
    }

    pub(crate) fn price(&self, asset: AssetId) -> Result<U256, LedgerError> {
        price_ray(self.oracle, asset)
    }

    pub(crate) fn decimals(&self, asset: AssetId) -> Result<u8, LedgerError> {
        Ok(self.pool(asset)?.decimals())
    }

    // 8.1.2: position bookkeeping

    /// Applies `change` to the account's position, then mirrors the pool's balances into
    /// the flags. a position with neither collateral nor debt is dropped.
    pub(crate) fn update_position<F>(&mut self, account: AccountId, asset: AssetId, change: F) -> Result<(), LedgerError>
    where
        F: FnOnce(Position) -> Result<Position, MathError>,
    {
        let pool = self.pool(asset)?;
        let has_collateral = pool.has_collateral(account);
        let has_debt = pool.has_debt(account);

        let key = PositionKey::new(account, asset);
        let positions = &mut self.state.store.positions;
        let mut position = change(positions.get(&key))?;
        position.has_collateral = has_collateral;
        position.has_debt = has_debt;

        if position.is_empty() {
            positions.remove(&key);
        } else {
            positions.set(key, position);
        }
        Ok(())
    }

    pub(crate) fn sync_position(&mut self, account: AccountId, asset: AssetId) -> Result<(), LedgerError> {
        self.update_position(account, asset, Ok)
    }

    pub(crate) fn snapshot(&self, account: AccountId, asset: AssetId) -> Result<BalanceSnapshot, LedgerError> {
        let pool = self.pool(asset)?;
        Ok(BalanceSnapshot {
            collateral: pool.collateral_of(account)?,
            supply: pool.supply_of(account)?,
            debt: pool.debt_of(account)?,
        })
    }

    pub(crate) fn ensure_healthy(&self, account: AccountId) -> Result<AccountHealth, LedgerError> {
        ensure_healthy(&self.state.store, self.oracle, account, self.now)
    }

    // 8.1.3: moving underlying between wallets and pools

    pub(crate) fn pull_into_pool(&mut self, from: AccountId, asset: AssetId, amount: U256) -> Result<(), LedgerError> {
        self.state.tokens.pull(from, asset, amount)?;
        self.pool_mut(asset)?.receive(amount)?;
        Ok(())
    }

    pub(crate) fn pay_from_pool(&mut self, to: AccountId, asset: AssetId, amount: U256) -> Result<(), LedgerError> {
        self.pay_out(asset, amount)?;
        self.state.tokens.push(to, asset, amount);
        Ok(())
    }

    /// Pool cash leaving for the dex or a wallet.
    pub(crate) fn pay_out(&mut self, asset: AssetId, amount: U256) -> Result<(), LedgerError> {
        let pool = self.pool_mut(asset)?;
        if !pool.try_pay_out(amount) {
            return Err(TransferError::InsufficientPoolBalance {
                asset,
                balance: pool.underlying_balance,
                required: amount,
            }
            .into());
        }
        Ok(())
    }
}

/// Inactive, frozen and paused pools refuse new risk. exits pass `allow_frozen`.
pub(crate) fn ensure_pool_usable(
    asset: AssetId,
    configuration: &PoolConfiguration,
    allow_frozen: bool,
) -> Result<(), LedgerError> {
    if !configuration.is_active() {
        return Err(LedgerError::PoolIsInactive(asset));
    }
    if configuration.is_frozen() && !allow_frozen {
        return Err(LedgerError::PoolIsFrozen(asset));
    }
    if configuration.is_paused() {
        return Err(LedgerError::PoolIsPaused(asset));
    }
    Ok(())
}
