// 10.0 errors.rs: every failure a ledger operation can surface.
// any error aborts the whole batch it occurs in.

use crate::access::Role;
use crate::config::ConfigError;
use crate::configuration::ConfigurationError;
use crate::math::MathError;
use crate::rates::RateModelError;
use crate::token::TransferError;
use crate::types::{AccountId, AssetId, DexId, StrategyId};
use primitive_types::U256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    // entity lookups
    #[error("Pool for {0} not found")]
    PoolNotFound(AssetId),

    #[error("Pool for {0} already exists")]
    PoolAlreadyExists(AssetId),

    #[error("Pool for {0} holds nothing to pay out")]
    EmptyPool(AssetId),

    #[error("Account {account:?} has no position in {asset}")]
    EmptyPosition { account: AccountId, asset: AssetId },

    #[error("Strategy {0:?} not found")]
    StrategyNotFound(StrategyId),

    #[error("Account {account:?} lacks role {role:?}")]
    Unauthorized { account: AccountId, role: Role },

    // pool state
    #[error("Pool for {0} is inactive")]
    PoolIsInactive(AssetId),

    #[error("Pool for {0} is frozen")]
    PoolIsFrozen(AssetId),

    #[error("Pool for {0} is paused")]
    PoolIsPaused(AssetId),

    #[error("Pool for {0} is not a USD pool")]
    PoolIsNotUsd(AssetId),

    #[error("Borrowing is not enabled for {0}")]
    BorrowingNotEnabled(AssetId),

    #[error("Borrow of {amount} in {asset} exceeds capacity {capacity}")]
    BorrowCapacityExceeded { asset: AssetId, amount: U256, capacity: U256 },

    #[error("Supply of {amount} in {asset} exceeds capacity {capacity}")]
    SupplyCapacityExceeded { asset: AssetId, amount: U256, capacity: U256 },

    // amounts
    #[error("Deposit amount is zero")]
    EmptyDepositAmount,

    #[error("Withdraw amount is zero")]
    EmptyWithdrawAmount,

    #[error("Supply amount is zero")]
    EmptySupplyAmount,

    #[error("Redeem amount is zero")]
    EmptyRedeemAmount,

    #[error("Borrow amount is zero")]
    EmptyBorrowAmounts,

    #[error("Repay amount is zero")]
    EmptyRepayAmount,

    #[error("Swap amount is zero")]
    EmptySwapAmount,

    #[error("Percentage {0} outside (0, 1] ray")]
    InvalidPercentage(U256),

    // liquidity and risk
    #[error("Pool for {asset} has {available} available, borrow needs {required}")]
    InsufficientLiquidityForBorrow { asset: AssetId, available: U256, required: U256 },

    #[error("Health factor {health_factor} below liquidation threshold {threshold}")]
    HealthFactorLowerThanLiquidationThreshold { health_factor: U256, threshold: U256 },

    #[error("Health factor {health_factor} not below liquidation threshold {threshold}")]
    HealthFactorHigherThanLiquidationThreshold { health_factor: U256, threshold: U256 },

    #[error("Collateral {collateral} in {asset} cannot cover repay of {required}")]
    InsufficientCollateralAmountForRepay { asset: AssetId, collateral: U256, required: U256 },

    #[error("Collateral cannot cover debt in {0}")]
    CollateralCanNotCoverDebt(AssetId),

    #[error("Account {account:?} has no debt in {asset}")]
    UserDoNotHaveDebtInPool { account: AccountId, asset: AssetId },

    // exchange
    #[error("No dex links {0} and {1}")]
    SwapPoolsNotMatch(AssetId, AssetId),

    #[error("Dex {0:?} is not registered")]
    DexEmpty(DexId),

    #[error("Dex cannot fill {amount} of {asset_in} into {asset_out}")]
    InsufficientDexLiquidity { asset_in: AssetId, asset_out: AssetId, amount: U256 },

    #[error("No price for {0}")]
    PriceUnavailable(AssetId),

    #[error("Malformed batch: {0}")]
    MalformedBatch(String),

    // lower layers
    #[error("Invalid parameters: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Rate model error: {0}")]
    RateModel(#[from] RateModelError),

    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),
}
