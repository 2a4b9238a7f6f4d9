// 13.0: the ledger facade. owns committed state and runs atomic batches of calls
// through the handlers. single writer per batch.

mod calls;
mod core;
mod multicall;
mod results;
mod shared;

pub use calls::{Call, CallOutput};
pub use core::{Ledger, DEFAULT_STRATEGY};
pub use results::MulticallError;
pub use shared::SharedLedger;
