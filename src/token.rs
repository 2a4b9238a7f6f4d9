// 3.3 token.rs: balance ledgers.
//   ScaledBalances: per-pool scaled ledgers (collateral, supply, debt). real = ray_mul(scaled, index)
//   TokenBank: wallets outside the ledger. pulls need an allowance granted to the ledger.

use crate::math::{ray_div, ray_mul, MathError};
use crate::types::{AccountId, AssetId};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Account {account:?} holds {balance} of {asset}, needs {required}")]
    InsufficientBalance {
        account: AccountId,
        asset: AssetId,
        balance: U256,
        required: U256,
    },

    #[error("Account {account:?} allowance for {asset} is {allowance}, needs {required}")]
    InsufficientAllowance {
        account: AccountId,
        asset: AssetId,
        allowance: U256,
        required: U256,
    },

    #[error("Pool {asset} holds {balance}, cannot pay out {required}")]
    InsufficientPoolBalance {
        asset: AssetId,
        balance: U256,
        required: U256,
    },
}

/** 3.3.1: scaled balance ledger. index growth inflates every holder without per-account writes */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaledBalances {
    balances: HashMap<AccountId, U256>,
    scaled_total: U256,
}

impl ScaledBalances {
    pub fn scaled_balance_of(&self, account: AccountId) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub fn scaled_total(&self) -> U256 {
        self.scaled_total
    }

    pub fn balance_of(&self, account: AccountId, index: U256) -> Result<U256, MathError> {
        ray_mul(self.scaled_balance_of(account), index)
    }

    pub fn total(&self, index: U256) -> Result<U256, MathError> {
        ray_mul(self.scaled_total, index)
    }

    pub fn holders(&self) -> usize {
        self.balances.len()
    }

    /// Returns the scaled amount minted.
    pub fn mint(&mut self, account: AccountId, amount: U256, index: U256) -> Result<U256, MathError> {
        let scaled = ray_div(amount, index)?;
        if scaled.is_zero() {
            return Ok(scaled);
        }
        let entry = self.balances.entry(account).or_default();
        *entry = entry.checked_add(scaled).ok_or(MathError::Overflow)?;
        self.scaled_total = self.scaled_total.checked_add(scaled).ok_or(MathError::Overflow)?;
        Ok(scaled)
    }

    /// Burns `amount` real units, capped at the holder's balance. burning at least the full
    /// real balance clears the scaled balance so no rounding dust is left.
    /// Returns the real amount burned.
    pub fn burn(&mut self, account: AccountId, amount: U256, index: U256) -> Result<U256, MathError> {
        let scaled_balance = self.scaled_balance_of(account);
        let real_balance = ray_mul(scaled_balance, index)?;
        if amount >= real_balance {
            self.burn_all(account);
            return Ok(real_balance);
        }
        let scaled = ray_div(amount, index)?.min(scaled_balance);
        self.remove_scaled(account, scaled);
        Ok(amount)
    }

    /// Returns the scaled amount cleared.
    pub fn burn_all(&mut self, account: AccountId) -> U256 {
        let scaled = self.balances.remove(&account).unwrap_or_default();
        self.scaled_total = self.scaled_total.saturating_sub(scaled);
        scaled
    }

    fn remove_scaled(&mut self, account: AccountId, scaled: U256) {
        let remaining = self.scaled_balance_of(account).saturating_sub(scaled);
        if remaining.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, remaining);
        }
        self.scaled_total = self.scaled_total.saturating_sub(scaled);
    }

    /// Sum of holder balances equals the tracked total.
    pub fn is_reconciled(&self) -> bool {
        let sum = self
            .balances
            .values()
            .fold(U256::zero(), |acc, v| acc.saturating_add(*v));
        sum == self.scaled_total
    }
}

/** 3.3.2: external token custody. the ledger is the only spender */
#[derive(Debug, Clone, Default)]
pub struct TokenBank {
    balances: HashMap<(AccountId, AssetId), U256>,
    allowances: HashMap<(AccountId, AssetId), U256>,
}

impl TokenBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: AccountId, asset: AssetId) -> U256 {
        self.balances.get(&(account, asset)).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: AccountId, asset: AssetId) -> U256 {
        self.allowances.get(&(owner, asset)).copied().unwrap_or_default()
    }

    /// Allowance of `U256::MAX` never decreases.
    pub fn approve(&mut self, owner: AccountId, asset: AssetId, amount: U256) {
        self.allowances.insert((owner, asset), amount);
    }

    pub fn mint(&mut self, account: AccountId, asset: AssetId, amount: U256) {
        let entry = self.balances.entry((account, asset)).or_default();
        *entry = entry.saturating_add(amount);
    }

    /// Pulls `amount` from the owner into the ledger.
    pub fn pull(&mut self, owner: AccountId, asset: AssetId, amount: U256) -> Result<(), TransferError> {
        let allowance = self.allowance(owner, asset);
        if allowance < amount {
            return Err(TransferError::InsufficientAllowance {
                account: owner,
                asset,
                allowance,
                required: amount,
            });
        }
        let balance = self.balance_of(owner, asset);
        if balance < amount {
            return Err(TransferError::InsufficientBalance {
                account: owner,
                asset,
                balance,
                required: amount,
            });
        }
        self.balances.insert((owner, asset), balance - amount);
        if allowance != U256::MAX {
            self.allowances.insert((owner, asset), allowance - amount);
        }
        Ok(())
    }

    /// Pays `amount` from the ledger to a wallet.
    pub fn push(&mut self, to: AccountId, asset: AssetId, amount: U256) {
        self.mint(to, asset, amount);
    }
}
