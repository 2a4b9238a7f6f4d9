// 13.1 ledger/calls.rs: the serializable batch vocabulary.
// every call acts for the batch caller; `Liquidate` makes the caller the liquidator.

use crate::access::Role;
use crate::config::{PoolParams, RiskConfig, StrategyParams};
use crate::errors::LedgerError;
use crate::handlers::{
    self, BalanceResult, ClosePositionResult, LiquidationResult, OpContext, RepayResult, RepaySubstituteResult,
    SwapResult,
};
use crate::types::{AccountId, AssetId, DexId, RedeemDirection, RepaySource, StrategyId};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    Deposit {
        asset: AssetId,
        amount: U256,
    },
    Withdraw {
        asset: AssetId,
        amount: U256,
    },
    Supply {
        asset: AssetId,
        amount: U256,
    },
    Redeem {
        asset: AssetId,
        amount: U256,
        direction: RedeemDirection,
    },
    Borrow {
        asset: AssetId,
        amount: U256,
    },
    Repay {
        asset: AssetId,
        amount: U256,
        #[serde(default)]
        source: RepaySource,
    },
    RepaySubstitute {
        asset: AssetId,
        substitute: AssetId,
        amount: U256,
        #[serde(default)]
        sqrt_price_limit: U256,
    },
    Swap {
        asset_in: AssetId,
        asset_out: AssetId,
        amount: U256,
        #[serde(default)]
        sqrt_price_limit: U256,
    },
    ClosePosition {
        asset: AssetId,
        usd_asset: AssetId,
        percentage: U256,
        #[serde(default)]
        sqrt_price_limit: U256,
    },
    CloseAll {
        usd_asset: AssetId,
        #[serde(default)]
        sqrt_price_limit: U256,
    },
    Liquidate {
        account: AccountId,
    },

    // admin
    CreatePool {
        asset: AssetId,
        params: PoolParams,
        strategy: StrategyId,
    },
    SetPoolConfiguration {
        asset: AssetId,
        params: PoolParams,
    },
    SetStrategy {
        strategy_id: StrategyId,
        params: StrategyParams,
    },
    SetPoolStrategy {
        asset: AssetId,
        strategy: StrategyId,
    },
    SetDexLink {
        asset_a: AssetId,
        asset_b: AssetId,
        dex: DexId,
    },
    RemoveDexLink {
        asset_a: AssetId,
        asset_b: AssetId,
    },
    SetRiskParams {
        risk: RiskConfig,
    },
    ClaimFee {
        asset: AssetId,
        recipient: AccountId,
        #[serde(default)]
        amount: U256,
    },
}

impl Call {
    /// Role the caller needs beyond the router's `Controller`.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Call::CreatePool { .. }
            | Call::SetPoolConfiguration { .. }
            | Call::SetStrategy { .. }
            | Call::SetPoolStrategy { .. }
            | Call::SetDexLink { .. }
            | Call::RemoveDexLink { .. }
            | Call::SetRiskParams { .. } => Some(Role::Admin),
            Call::ClaimFee { .. } => Some(Role::FeeCollector),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Call::Deposit { .. } => "deposit",
            Call::Withdraw { .. } => "withdraw",
            Call::Supply { .. } => "supply",
            Call::Redeem { .. } => "redeem",
            Call::Borrow { .. } => "borrow",
            Call::Repay { .. } => "repay",
            Call::RepaySubstitute { .. } => "repay_substitute",
            Call::Swap { .. } => "swap",
            Call::ClosePosition { .. } => "close_position",
            Call::CloseAll { .. } => "close_all",
            Call::Liquidate { .. } => "liquidate",
            Call::CreatePool { .. } => "create_pool",
            Call::SetPoolConfiguration { .. } => "set_pool_configuration",
            Call::SetStrategy { .. } => "set_strategy",
            Call::SetPoolStrategy { .. } => "set_pool_strategy",
            Call::SetDexLink { .. } => "set_dex_link",
            Call::RemoveDexLink { .. } => "remove_dex_link",
            Call::SetRiskParams { .. } => "set_risk_params",
            Call::ClaimFee { .. } => "claim_fee",
        }
    }
}

/// What one call produced, in batch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum CallOutput {
    Balance(BalanceResult),
    Repay(RepayResult),
    RepaySubstitute(RepaySubstituteResult),
    Swap(SwapResult),
    ClosePosition(ClosePositionResult),
    CloseAll(Vec<ClosePositionResult>),
    Liquidation(LiquidationResult),
    FeeClaimed(U256),
    Done,
}

pub(crate) fn dispatch(ctx: &mut OpContext<'_>, caller: AccountId, call: Call) -> Result<CallOutput, LedgerError> {
    let output = match call {
        Call::Deposit { asset, amount } => CallOutput::Balance(handlers::deposit(ctx, caller, asset, amount)?),
        Call::Withdraw { asset, amount } => CallOutput::Balance(handlers::withdraw(ctx, caller, asset, amount)?),
        Call::Supply { asset, amount } => CallOutput::Balance(handlers::supply(ctx, caller, asset, amount)?),
        Call::Redeem {
            asset,
            amount,
            direction,
        } => CallOutput::Balance(handlers::redeem(ctx, caller, asset, amount, direction)?),
        Call::Borrow { asset, amount } => CallOutput::Balance(handlers::borrow(ctx, caller, asset, amount)?),
        Call::Repay { asset, amount, source } => CallOutput::Repay(handlers::repay(ctx, caller, asset, amount, source)?),
        Call::RepaySubstitute {
            asset,
            substitute,
            amount,
            sqrt_price_limit,
        } => CallOutput::RepaySubstitute(handlers::repay_substitute(
            ctx,
            caller,
            asset,
            substitute,
            amount,
            sqrt_price_limit,
        )?),
        Call::Swap {
            asset_in,
            asset_out,
            amount,
            sqrt_price_limit,
        } => CallOutput::Swap(handlers::swap(ctx, caller, asset_in, asset_out, amount, sqrt_price_limit)?),
        Call::ClosePosition {
            asset,
            usd_asset,
            percentage,
            sqrt_price_limit,
        } => CallOutput::ClosePosition(handlers::close_position(
            ctx,
            caller,
            asset,
            usd_asset,
            percentage,
            sqrt_price_limit,
        )?),
        Call::CloseAll {
            usd_asset,
            sqrt_price_limit,
        } => CallOutput::CloseAll(handlers::close_all(ctx, caller, usd_asset, sqrt_price_limit)?),
        Call::Liquidate { account } => CallOutput::Liquidation(handlers::liquidate(ctx, caller, account)?),
        Call::CreatePool {
            asset,
            params,
            strategy,
        } => {
            handlers::create_pool(ctx, asset, &params, strategy)?;
            CallOutput::Done
        }
        Call::SetPoolConfiguration { asset, params } => {
            handlers::set_pool_configuration(ctx, asset, &params)?;
            CallOutput::Done
        }
        Call::SetStrategy { strategy_id, params } => {
            handlers::set_strategy(ctx, strategy_id, &params)?;
            CallOutput::Done
        }
        Call::SetPoolStrategy { asset, strategy } => {
            handlers::set_pool_strategy(ctx, asset, strategy)?;
            CallOutput::Done
        }
        Call::SetDexLink { asset_a, asset_b, dex } => {
            handlers::set_dex_link(ctx, asset_a, asset_b, dex)?;
            CallOutput::Done
        }
        Call::RemoveDexLink { asset_a, asset_b } => {
            handlers::remove_dex_link(ctx, asset_a, asset_b)?;
            CallOutput::Done
        }
        Call::SetRiskParams { risk } => {
            handlers::set_risk_params(ctx, &risk)?;
            CallOutput::Done
        }
        Call::ClaimFee {
            asset,
            recipient,
            amount,
        } => CallOutput::FeeClaimed(handlers::claim_fee(ctx, asset, recipient, amount)?),
    };
    Ok(output)
}
