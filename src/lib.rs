// margin-ledger: collateralized lending and margin trading ledger.
// risk-first: every batch that adds debt or moves collateral ends with a health check.
// all computation is deterministic; prices and swaps come in through traits.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: AccountId, AssetId, keys, PositionType, Timestamp
//   2.x  math.rs: ray math, 512-bit widening. 2.1 configuration.rs: pool bitfield
//   3.x  store.rs: entity tables. 3.3 token.rs: scaled balances, wallets
//   5.x  rates.rs: two-slope interest rate model
//   6.x  pool.rs: pool state and lazy accrual
//   7.x  position.rs: entry prices and netting. 7.5 health.rs: health factor
//   8.x  handlers/: deposit, withdraw, supply, redeem, borrow, repay, swap, close, liquidation, admin
//   9.x  oracle.rs, dex.rs, access.rs: external seams and roles
//   10.x errors.rs: ledger error enum
//   11.x events.rs: state transition events for audit
//   12.x config.rs: human-facing settings, presets, json loading
//   13.x ledger/: ledger facade, multicall batches, shared handle

// accounting core
pub mod configuration;
pub mod math;
pub mod pool;
pub mod position;
pub mod rates;
pub mod store;
pub mod token;
pub mod types;

// operations
pub mod handlers;
pub mod health;
pub mod ledger;

// integration modules
pub mod access;
pub mod config;
pub mod dex;
pub mod errors;
pub mod events;
pub mod oracle;

// re exports for convenience
pub use access::{AccessControl, Controller, Role};
pub use config::{ConfigError, LedgerConfig, PoolParams, RiskConfig, StrategyParams};
pub use configuration::{ConfigurationError, PoolConfiguration};
pub use dex::{ConstantProductDex, Dex, DexError, DexRegistry};
pub use errors::LedgerError;
pub use events::*;
pub use handlers::{
    BalanceResult, ClosePositionResult, LedgerState, LiquidationResult, OpContext, RepayResult, RepaySubstituteResult,
    SwapResult,
};
pub use health::{AccountHealth, RiskParams};
pub use ledger::{Call, CallOutput, Ledger, MulticallError, SharedLedger, DEFAULT_STRATEGY};
pub use math::{MathError, RAY};
pub use oracle::{FixedOracle, Oracle, PriceFeed};
pub use pool::Pool;
pub use position::Position;
pub use rates::{InterestRateStrategy, InterestRates, RateModelError};
pub use store::{EntityTable, LedgerStore};
pub use token::{ScaledBalances, TokenBank, TransferError};
pub use types::*;
