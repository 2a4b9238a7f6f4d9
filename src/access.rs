// 9.3 access.rs: typed roles. checked once at the batch boundary;
// handlers only run while holding a `Controller` capability.

use crate::errors::LedgerError;
use crate::types::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    // the router allowed to drive handlers
    Controller,
    FeeCollector,
}

#[derive(Debug, Clone, Default)]
pub struct AccessControl {
    grants: HashMap<AccountId, BTreeSet<Role>>,
}

impl AccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, account: AccountId, role: Role) {
        self.grants.entry(account).or_default().insert(role);
    }

    pub fn revoke(&mut self, account: AccountId, role: Role) {
        if let Some(roles) = self.grants.get_mut(&account) {
            roles.remove(&role);
            if roles.is_empty() {
                self.grants.remove(&account);
            }
        }
    }

    pub fn has_role(&self, account: AccountId, role: Role) -> bool {
        self.grants.get(&account).is_some_and(|roles| roles.contains(&role))
    }

    pub fn require(&self, account: AccountId, role: Role) -> Result<(), LedgerError> {
        if self.has_role(account, role) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized { account, role })
        }
    }
}

/// Proof the router holds `Role::Controller`. only `acquire` builds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controller {
    router: AccountId,
}

impl Controller {
    pub fn acquire(access: &AccessControl, router: AccountId) -> Result<Self, LedgerError> {
        access.require(router, Role::Controller)?;
        Ok(Self { router })
    }

    pub fn router(&self) -> AccountId {
        self.router
    }
}
