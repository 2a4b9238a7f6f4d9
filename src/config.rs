// 12.0 config.rs: human-facing settings. decimals in, ray and bitfields out.
// 12.1 PoolParams builds the pool bitfield. 12.2 StrategyParams builds a rate curve.

use crate::configuration::{ConfigurationError, PoolConfiguration};
use crate::health::RiskParams;
use crate::math::{decimal_to_ray, MathError, PERCENTAGE_FACTOR};
use crate::rates::InterestRateStrategy;
use crate::types::AccountId;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid risk settings: {reason}")]
    InvalidRisk { reason: String },

    #[error("Invalid rate strategy: {reason}")]
    InvalidStrategy { reason: String },

    #[error("Invalid pool settings: {reason}")]
    InvalidPool { reason: String },

    #[error("Invalid config json: {0}")]
    Parse(String),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Math(#[from] MathError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    // accounts below this health factor can be liquidated
    pub health_factor_liquidation_threshold: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            health_factor_liquidation_threshold: dec!(1.1),
        }
    }
}

impl RiskConfig {
    pub fn to_risk_params(&self) -> Result<RiskParams, ConfigError> {
        if self.health_factor_liquidation_threshold < Decimal::ONE {
            return Err(ConfigError::InvalidRisk {
                reason: "Liquidation threshold must be at least 1".to_string(),
            });
        }
        Ok(RiskParams {
            health_factor_liquidation_threshold: decimal_to_ray(self.health_factor_liquidation_threshold)?,
        })
    }
}

/** 12.2: annualized rate curve as fractions (0.04 = 4%) */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub rate_base: Decimal,
    pub optimal_usage_ratio: Decimal,
    pub rate_slope1: Decimal,
    pub rate_slope2: Decimal,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            rate_base: Decimal::ZERO,
            optimal_usage_ratio: dec!(0.8),
            rate_slope1: dec!(0.04),
            rate_slope2: dec!(0.75),
        }
    }
}

impl StrategyParams {
    pub fn to_strategy(&self) -> Result<InterestRateStrategy, ConfigError> {
        if self.optimal_usage_ratio <= Decimal::ZERO || self.optimal_usage_ratio >= Decimal::ONE {
            return Err(ConfigError::InvalidStrategy {
                reason: "Optimal usage ratio must be between 0 and 1".to_string(),
            });
        }
        if self.rate_base.is_sign_negative() || self.rate_slope1.is_sign_negative() || self.rate_slope2.is_sign_negative() {
            return Err(ConfigError::InvalidStrategy {
                reason: "Rates cannot be negative".to_string(),
            });
        }
        Ok(InterestRateStrategy::new(
            decimal_to_ray(self.rate_base)?,
            decimal_to_ray(self.optimal_usage_ratio)?,
            decimal_to_ray(self.rate_slope1)?,
            decimal_to_ray(self.rate_slope2)?,
        ))
    }
}

/** 12.1: one pool's static settings */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolParams {
    pub decimals: u8,
    // protocol share of borrow interest, 0.1 = 10%
    pub fee_factor: Decimal,
    // whole tokens, 0 = unlimited
    pub borrow_capacity: u64,
    pub supply_capacity: u64,
    pub is_usd: bool,
    pub borrowing_enabled: bool,
    pub active: bool,
    #[serde(default)]
    pub frozen: bool,
    #[serde(default)]
    pub paused: bool,
}

impl Default for PoolParams {
    fn default() -> Self {
        Self {
            decimals: 18,
            fee_factor: dec!(0.1),
            borrow_capacity: 0,
            supply_capacity: 0,
            is_usd: false,
            borrowing_enabled: true,
            active: true,
            frozen: false,
            paused: false,
        }
    }
}

impl PoolParams {
    pub fn usd(decimals: u8) -> Self {
        Self {
            decimals,
            is_usd: true,
            ..Self::default()
        }
    }

    pub fn fee_factor_bps(&self) -> Result<u16, ConfigError> {
        if self.fee_factor.is_sign_negative() || self.fee_factor > Decimal::ONE {
            return Err(ConfigError::InvalidPool {
                reason: "Fee factor must be between 0 and 1".to_string(),
            });
        }
        (self.fee_factor * Decimal::from(PERCENTAGE_FACTOR))
            .round()
            .to_u16()
            .ok_or_else(|| ConfigError::InvalidPool {
                reason: "Fee factor out of range".to_string(),
            })
    }

    pub fn to_configuration(&self) -> Result<PoolConfiguration, ConfigError> {
        let mut config = PoolConfiguration::default();
        config.set_active(self.active);
        config.set_frozen(self.frozen);
        config.set_paused(self.paused);
        config.set_usd(self.is_usd);
        config.set_borrowing_enabled(self.borrowing_enabled);
        config.set_decimals(self.decimals)?;
        config.set_fee_factor(self.fee_factor_bps()?)?;
        config.set_borrow_capacity(self.borrow_capacity)?;
        config.set_supply_capacity(self.supply_capacity)?;
        Ok(config)
    }
}

// Complete ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub admin: AccountId,
    // the account allowed to drive batches
    pub router: AccountId,
    pub fee_collector: Option<AccountId>,
    pub risk: RiskConfig,
    pub default_strategy: StrategyParams,
    // Maximum number of events to retain in memory
    pub max_events: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            admin: AccountId(1),
            router: AccountId(2),
            fee_collector: None,
            risk: RiskConfig::default(),
            default_strategy: StrategyParams::default(),
            max_events: 100_000,
        }
    }
}

impl LedgerConfig {
    // Higher liquidation threshold and an earlier, steeper kink
    pub fn conservative() -> Self {
        let mut config = Self::default();
        config.risk.health_factor_liquidation_threshold = dec!(1.25);
        config.default_strategy.optimal_usage_ratio = dec!(0.65);
        config.default_strategy.rate_slope2 = dec!(1.0);
        config
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.risk.to_risk_params()?;
        self.default_strategy.to_strategy()?;
        if self.admin == self.router {
            return Err(ConfigError::InvalidRisk {
                reason: "Admin and router must be distinct accounts".to_string(),
            });
        }
        if self.max_events == 0 {
            return Err(ConfigError::InvalidRisk {
                reason: "Event log needs room for at least one event".to_string(),
            });
        }
        Ok(())
    }
}
