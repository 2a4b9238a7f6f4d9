// 8.0.2: what each handler hands back to the batch.

use crate::events::BalanceSnapshot;
use crate::types::{AccountId, AssetAmount, AssetId, DexId};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Deposit, withdraw, supply, redeem and borrow. `amount` is what actually moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResult {
    pub asset: AssetId,
    pub amount: U256,
    pub balance: BalanceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepayResult {
    pub asset: AssetId,
    pub repaid: U256,
    pub excess: U256,
    pub balance: BalanceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResult {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub amount_in: U256,
    pub amount_out: U256,
    // shortfall borrowed in asset_in to fund the swap
    pub borrowed: U256,
    pub dex: DexId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaySubstituteResult {
    pub swap: SwapResult,
    pub repay: RepayResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosePositionResult {
    pub asset: AssetId,
    pub collateral_closed: U256,
    pub debt_closed: U256,
    // usd collateral gained from selling surplus
    pub usd_received: U256,
    // usd collateral spent buying a debt shortfall
    pub usd_spent: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationResult {
    pub account: AccountId,
    pub liquidator: AccountId,
    pub health_factor: U256,
    pub debts_repaid: Vec<AssetAmount>,
    pub collateral_seized: Vec<AssetAmount>,
}
