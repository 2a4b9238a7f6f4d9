// 6.0 pool.rs: one lending pool per underlying asset and its accrual engine.
// collateral and supply scale by the liquidity index, debt by the borrow index.
// both indices only grow. accrual is lazy: every touch first brings the pool to `now`.

use crate::configuration::PoolConfiguration;
use crate::math::{mul_div, percent_mul, ray_mul, MathError, RAY, SECONDS_PER_YEAR};
use crate::rates::{calculate_interest_rates, InterestRateStrategy, RateModelError};
use crate::token::ScaledBalances;
use crate::types::{AccountId, AssetId, StrategyId, Timestamp};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/** 6.1: pool token. collateral backs debt, supply only earns */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolToken {
    pub collateral: ScaledBalances,
    pub supply: ScaledBalances,
}

impl PoolToken {
    pub fn scaled_total(&self) -> Result<U256, MathError> {
        self.collateral
            .scaled_total()
            .checked_add(self.supply.scaled_total())
            .ok_or(MathError::Overflow)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub asset: AssetId,
    pub liquidity_index: U256,
    pub borrow_index: U256,
    pub liquidity_rate: U256,
    pub borrow_rate: U256,
    pub interest_rate_strategy: StrategyId,
    pub pool_token: PoolToken,
    pub debt_token: ScaledBalances,
    pub configuration: PoolConfiguration,
    pub total_fee: U256,
    pub unclaimed_fee: U256,
    // underlying tokens held by the pool
    pub underlying_balance: U256,
    pub last_update_timestamp: Timestamp,
}

/// What one accrual step changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accrual {
    pub elapsed: u64,
    pub debt_increase: U256,
    pub fee: U256,
}

impl Pool {
    pub fn new(
        asset: AssetId,
        interest_rate_strategy: StrategyId,
        configuration: PoolConfiguration,
        now: Timestamp,
    ) -> Self {
        Self {
            asset,
            liquidity_index: RAY,
            borrow_index: RAY,
            interest_rate_strategy,
            configuration,
            last_update_timestamp: now,
            ..Self::default()
        }
    }

    pub fn decimals(&self) -> u8 {
        self.configuration.decimals()
    }

    // 6.2: balances at the current indices

    pub fn collateral_of(&self, account: AccountId) -> Result<U256, MathError> {
        self.pool_token.collateral.balance_of(account, self.liquidity_index)
    }

    pub fn supply_of(&self, account: AccountId) -> Result<U256, MathError> {
        self.pool_token.supply.balance_of(account, self.liquidity_index)
    }

    pub fn debt_of(&self, account: AccountId) -> Result<U256, MathError> {
        self.debt_token.balance_of(account, self.borrow_index)
    }

    pub fn has_collateral(&self, account: AccountId) -> bool {
        !self.pool_token.collateral.scaled_balance_of(account).is_zero()
    }

    pub fn has_debt(&self, account: AccountId) -> bool {
        !self.debt_token.scaled_balance_of(account).is_zero()
    }

    pub fn total_debt(&self) -> Result<U256, MathError> {
        self.debt_token.total(self.borrow_index)
    }

    /// Collateral plus supply, in underlying units.
    pub fn total_pool_token(&self) -> Result<U256, MathError> {
        ray_mul(self.pool_token.scaled_total()?, self.liquidity_index)
    }

    /// Supply side only, in underlying units. borrowed tokens credited as
    /// collateral are not lendable.
    pub fn total_supply(&self) -> Result<U256, MathError> {
        self.pool_token.supply.total(self.liquidity_index)
    }

    /// `supply - unclaimed fee - total debt`, floored at zero.
    pub fn available_liquidity(&self) -> Result<U256, MathError> {
        Ok(self
            .total_supply()?
            .saturating_sub(self.unclaimed_fee)
            .saturating_sub(self.total_debt()?))
    }

    // 6.3: mint/burn at the pool's own indices. all return real amounts.

    pub fn mint_collateral(&mut self, account: AccountId, amount: U256) -> Result<(), MathError> {
        self.pool_token.collateral.mint(account, amount, self.liquidity_index)?;
        Ok(())
    }

    pub fn burn_collateral(&mut self, account: AccountId, amount: U256) -> Result<U256, MathError> {
        self.pool_token.collateral.burn(account, amount, self.liquidity_index)
    }

    pub fn mint_supply(&mut self, account: AccountId, amount: U256) -> Result<(), MathError> {
        self.pool_token.supply.mint(account, amount, self.liquidity_index)?;
        Ok(())
    }

    pub fn burn_supply(&mut self, account: AccountId, amount: U256) -> Result<U256, MathError> {
        self.pool_token.supply.burn(account, amount, self.liquidity_index)
    }

    pub fn mint_debt(&mut self, account: AccountId, amount: U256) -> Result<(), MathError> {
        self.debt_token.mint(account, amount, self.borrow_index)?;
        Ok(())
    }

    pub fn burn_debt(&mut self, account: AccountId, amount: U256) -> Result<U256, MathError> {
        self.debt_token.burn(account, amount, self.borrow_index)
    }

    /// Clears the account's collateral and debt. supply is left alone.
    /// Returns the real (collateral, debt) amounts removed.
    pub fn seize(&mut self, account: AccountId) -> Result<(U256, U256), MathError> {
        let collateral = self.collateral_of(account)?;
        let debt = self.debt_of(account)?;
        self.pool_token.collateral.burn_all(account);
        self.debt_token.burn_all(account);
        Ok((collateral, debt))
    }

    // 6.4: accrual

    /// Brings indices and fees to `now`, then recomputes rates from the new state.
    /// A timestamp at or before the last update changes nothing.
    pub fn accrue(&mut self, now: Timestamp, strategy: &InterestRateStrategy) -> Result<Accrual, RateModelError> {
        if now <= self.last_update_timestamp {
            return Ok(Accrual::default());
        }
        let elapsed = now.seconds_since(self.last_update_timestamp);

        let next_liquidity_index = ray_mul(linear_interest(self.liquidity_rate, elapsed)?, self.liquidity_index)?;
        let next_borrow_index = ray_mul(compounded_interest(self.borrow_rate, elapsed)?, self.borrow_index)?;

        let scaled_debt = self.debt_token.scaled_total();
        let debt_before = ray_mul(scaled_debt, self.borrow_index)?;
        let debt_after = ray_mul(scaled_debt, next_borrow_index)?;
        let debt_increase = debt_after.saturating_sub(debt_before);
        let fee = percent_mul(debt_increase, self.configuration.fee_factor() as u64)?;

        self.total_fee = self.total_fee.checked_add(fee).ok_or(MathError::Overflow)?;
        self.unclaimed_fee = self.unclaimed_fee.checked_add(fee).ok_or(MathError::Overflow)?;
        // indices never decrease
        self.liquidity_index = next_liquidity_index.max(self.liquidity_index);
        self.borrow_index = next_borrow_index.max(self.borrow_index);
        self.last_update_timestamp = now;

        self.refresh_rates(strategy)?;

        tracing::debug!(
            asset = %self.asset,
            elapsed,
            fee = %fee,
            liquidity_index = %self.liquidity_index,
            borrow_index = %self.borrow_index,
            "pool accrued"
        );

        Ok(Accrual {
            elapsed,
            debt_increase,
            fee,
        })
    }

    /// Recomputes rates from the current utilization.
    pub fn refresh_rates(&mut self, strategy: &InterestRateStrategy) -> Result<(), RateModelError> {
        let rates = calculate_interest_rates(
            self.available_liquidity()?,
            self.total_debt()?,
            self.configuration.fee_factor(),
            strategy,
        )?;
        self.liquidity_rate = rates.liquidity_rate;
        self.borrow_rate = rates.borrow_rate;
        Ok(())
    }

    // 6.5: read-only projections to `now` without touching state

    pub fn normalized_income(&self, now: Timestamp) -> Result<U256, MathError> {
        if now <= self.last_update_timestamp {
            return Ok(self.liquidity_index);
        }
        let elapsed = now.seconds_since(self.last_update_timestamp);
        ray_mul(linear_interest(self.liquidity_rate, elapsed)?, self.liquidity_index)
    }

    pub fn normalized_debt(&self, now: Timestamp) -> Result<U256, MathError> {
        if now <= self.last_update_timestamp {
            return Ok(self.borrow_index);
        }
        let elapsed = now.seconds_since(self.last_update_timestamp);
        ray_mul(compounded_interest(self.borrow_rate, elapsed)?, self.borrow_index)
    }

    /// Pays underlying out of the pool. false when the pool holds less than `amount`.
    pub fn try_pay_out(&mut self, amount: U256) -> bool {
        match self.underlying_balance.checked_sub(amount) {
            Some(rest) => {
                self.underlying_balance = rest;
                true
            }
            None => false,
        }
    }

    pub fn receive(&mut self, amount: U256) -> Result<(), MathError> {
        self.underlying_balance = self
            .underlying_balance
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        Ok(())
    }
}

/// `RAY + rate * elapsed / SECONDS_PER_YEAR`
pub fn linear_interest(rate: U256, elapsed: u64) -> Result<U256, MathError> {
    let growth = mul_div(rate, U256::from(elapsed), U256::from(SECONDS_PER_YEAR))?;
    RAY.checked_add(growth).ok_or(MathError::Overflow)
}

/// Three-term binomial expansion of `(1 + rate / SECONDS_PER_YEAR) ^ elapsed`.
pub fn compounded_interest(rate: U256, elapsed: u64) -> Result<U256, MathError> {
    if elapsed == 0 {
        return Ok(RAY);
    }
    let exp = U256::from(elapsed);
    let exp_minus_one = U256::from(elapsed - 1);
    let exp_minus_two = U256::from(elapsed.saturating_sub(2));
    let year = U256::from(SECONDS_PER_YEAR);

    let base_power_two = ray_mul(rate, rate)? / (year * year);
    let base_power_three = ray_mul(base_power_two, rate)? / year;

    let second_term = mul_div(exp * exp_minus_one, base_power_two, U256::from(2))?;
    let third_term = mul_div(exp * exp_minus_one * exp_minus_two, base_power_three, U256::from(6))?;
    let first_term = mul_div(rate, exp, year)?;

    RAY.checked_add(first_term)
        .and_then(|v| v.checked_add(second_term))
        .and_then(|v| v.checked_add(third_term))
        .ok_or(MathError::Overflow)
}
