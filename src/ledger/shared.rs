// 13.4 ledger/shared.rs: a ledger behind a lock. batches write, health reads share.

use super::calls::{Call, CallOutput};
use super::core::Ledger;
use super::results::MulticallError;
use crate::errors::LedgerError;
use crate::health::AccountHealth;
use crate::types::{AccountId, Timestamp};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    // a panicked writer never committed: the state behind a poisoned lock is still consistent
    pub fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn multicall(
        &self,
        router: AccountId,
        caller: AccountId,
        calls: Vec<Call>,
    ) -> Result<Vec<CallOutput>, MulticallError> {
        self.write().multicall(router, caller, calls)
    }

    pub fn account_health(&self, account: AccountId) -> Result<AccountHealth, LedgerError> {
        self.read().account_health(account)
    }

    pub fn set_time(&self, timestamp: Timestamp) {
        self.write().set_time(timestamp);
    }
}
