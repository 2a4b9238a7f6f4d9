// 5.0 rates.rs: interest rate model. pure, no state.
// two-slope curve over utilization; suppliers earn the borrow rate scaled by
// utilization minus the protocol fee share.

use crate::math::{mul_div, percent_mul, MathError, PERCENTAGE_FACTOR, RAY};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RateModelError {
    #[error("Optimal usage ratio {0} must be strictly between 0 and 1 ray")]
    InvalidOptimalUsageRatio(U256),

    #[error("Fee factor {0} bps exceeds 100%")]
    InvalidFeeFactor(u16),

    #[error(transparent)]
    Math(#[from] MathError),
}

/** 5.1: curve parameters, all ray. rates are annualized */
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRateStrategy {
    pub rate_base: U256,
    pub optimal_usage_ratio: U256,
    pub rate_slope1: U256,
    pub rate_slope2: U256,
}

impl InterestRateStrategy {
    pub fn new(rate_base: U256, optimal_usage_ratio: U256, rate_slope1: U256, rate_slope2: U256) -> Self {
        Self {
            rate_base,
            optimal_usage_ratio,
            rate_slope1,
            rate_slope2,
        }
    }

    pub fn validate(&self) -> Result<(), RateModelError> {
        if self.optimal_usage_ratio.is_zero() || self.optimal_usage_ratio >= RAY {
            return Err(RateModelError::InvalidOptimalUsageRatio(self.optimal_usage_ratio));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRates {
    pub liquidity_rate: U256,
    pub borrow_rate: U256,
    pub utilization: U256,
}

/// `total_debt / (available + total_debt)` in ray, zero for an empty pool.
pub fn utilization(available_liquidity: U256, total_debt: U256) -> Result<U256, MathError> {
    let total = available_liquidity
        .checked_add(total_debt)
        .ok_or(MathError::Overflow)?;
    if total.is_zero() {
        return Ok(U256::zero());
    }
    mul_div(total_debt, RAY, total)
}

// 5.2: the curve
pub fn calculate_interest_rates(
    available_liquidity: U256,
    total_debt: U256,
    fee_factor: u16,
    strategy: &InterestRateStrategy,
) -> Result<InterestRates, RateModelError> {
    strategy.validate()?;
    if fee_factor as u64 > PERCENTAGE_FACTOR {
        return Err(RateModelError::InvalidFeeFactor(fee_factor));
    }

    let usage = utilization(available_liquidity, total_debt)?;
    let optimal = strategy.optimal_usage_ratio;

    let borrow_rate = if usage <= optimal {
        let slope = mul_div(strategy.rate_slope1, usage, optimal)?;
        strategy.rate_base.checked_add(slope).ok_or(MathError::Overflow)?
    } else {
        let excess = mul_div(usage - optimal, RAY, RAY - optimal)?;
        let slope2 = mul_div(strategy.rate_slope2, excess, RAY)?;
        strategy
            .rate_base
            .checked_add(strategy.rate_slope1)
            .and_then(|r| r.checked_add(slope2))
            .ok_or(MathError::Overflow)?
    };

    let gross = mul_div(borrow_rate, usage, RAY)?;
    let liquidity_rate = percent_mul(gross, PERCENTAGE_FACTOR - fee_factor as u64)?;

    Ok(InterestRates {
        liquidity_rate,
        borrow_rate,
        utilization: usage,
    })
}
