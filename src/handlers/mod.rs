// 8.0 handlers/: one free function per ledger operation, each taking an OpContext.

mod admin;
mod borrow;
mod close;
mod collateral;
mod context;
mod liquidation;
mod repay;
mod results;
mod swap;

#[cfg(test)]
mod test_support;

pub use admin::{
    claim_fee, create_pool, remove_dex_link, set_dex_link, set_pool_configuration, set_pool_strategy, set_risk_params,
    set_strategy,
};
pub use borrow::borrow;
pub use close::{close_all, close_position};
pub use collateral::{deposit, redeem, supply, withdraw};
pub use context::{LedgerState, OpContext};
pub use liquidation::{liquidatable_accounts, liquidate};
pub use repay::{repay, repay_substitute};
pub use results::*;
pub use swap::swap;
