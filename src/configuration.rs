// 2.1: pool configuration bitfield. one u128 per pool.
//   bit 0 active, 1 frozen, 2 paused, 3 borrowing enabled, 4 usd pool
//   bits 8..16 decimals, 16..32 fee factor (bps), 32..80 borrow cap, 80..128 supply cap
// capacities are in whole tokens; zero means unlimited.

use crate::math::{pow10, PERCENTAGE_FACTOR};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

const ACTIVE_BIT: u128 = 1 << 0;
const FROZEN_BIT: u128 = 1 << 1;
const PAUSED_BIT: u128 = 1 << 2;
const BORROWING_BIT: u128 = 1 << 3;
const USD_BIT: u128 = 1 << 4;

const DECIMALS_SHIFT: u32 = 8;
const DECIMALS_MASK: u128 = 0xFF;
const FEE_FACTOR_SHIFT: u32 = 16;
const FEE_FACTOR_MASK: u128 = 0xFFFF;
const BORROW_CAP_SHIFT: u32 = 32;
const SUPPLY_CAP_SHIFT: u32 = 80;
const CAP_MASK: u128 = (1 << 48) - 1;

pub const MAX_CAPACITY: u64 = (1 << 48) - 1;
pub const MAX_DECIMALS: u8 = 27;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Fee factor {0} bps exceeds 100%")]
    InvalidFeeFactor(u16),

    #[error("Capacity {0} does not fit in 48 bits")]
    CapacityTooLarge(u64),

    #[error("Decimals {0} above 27")]
    InvalidDecimals(u8),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolConfiguration(u128);

impl PoolConfiguration {
    pub fn from_bits(bits: u128) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u128 {
        self.0
    }

    fn flag(&self, bit: u128) -> bool {
        self.0 & bit != 0
    }

    fn set_flag(&mut self, bit: u128, on: bool) {
        if on {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    fn field(&self, shift: u32, mask: u128) -> u128 {
        (self.0 >> shift) & mask
    }

    fn set_field(&mut self, shift: u32, mask: u128, value: u128) {
        self.0 = (self.0 & !(mask << shift)) | ((value & mask) << shift);
    }

    pub fn is_active(&self) -> bool {
        self.flag(ACTIVE_BIT)
    }

    pub fn set_active(&mut self, on: bool) {
        self.set_flag(ACTIVE_BIT, on);
    }

    pub fn is_frozen(&self) -> bool {
        self.flag(FROZEN_BIT)
    }

    pub fn set_frozen(&mut self, on: bool) {
        self.set_flag(FROZEN_BIT, on);
    }

    pub fn is_paused(&self) -> bool {
        self.flag(PAUSED_BIT)
    }

    pub fn set_paused(&mut self, on: bool) {
        self.set_flag(PAUSED_BIT, on);
    }

    pub fn is_borrowing_enabled(&self) -> bool {
        self.flag(BORROWING_BIT)
    }

    pub fn set_borrowing_enabled(&mut self, on: bool) {
        self.set_flag(BORROWING_BIT, on);
    }

    pub fn is_usd(&self) -> bool {
        self.flag(USD_BIT)
    }

    pub fn set_usd(&mut self, on: bool) {
        self.set_flag(USD_BIT, on);
    }

    pub fn decimals(&self) -> u8 {
        self.field(DECIMALS_SHIFT, DECIMALS_MASK) as u8
    }

    pub fn set_decimals(&mut self, decimals: u8) -> Result<(), ConfigurationError> {
        if decimals > MAX_DECIMALS {
            return Err(ConfigurationError::InvalidDecimals(decimals));
        }
        self.set_field(DECIMALS_SHIFT, DECIMALS_MASK, decimals as u128);
        Ok(())
    }

    /// Share of borrow interest kept by the protocol, in bps.
    pub fn fee_factor(&self) -> u16 {
        self.field(FEE_FACTOR_SHIFT, FEE_FACTOR_MASK) as u16
    }

    pub fn set_fee_factor(&mut self, bps: u16) -> Result<(), ConfigurationError> {
        if bps as u64 > PERCENTAGE_FACTOR {
            return Err(ConfigurationError::InvalidFeeFactor(bps));
        }
        self.set_field(FEE_FACTOR_SHIFT, FEE_FACTOR_MASK, bps as u128);
        Ok(())
    }

    pub fn borrow_capacity(&self) -> u64 {
        self.field(BORROW_CAP_SHIFT, CAP_MASK) as u64
    }

    pub fn set_borrow_capacity(&mut self, whole_tokens: u64) -> Result<(), ConfigurationError> {
        if whole_tokens > MAX_CAPACITY {
            return Err(ConfigurationError::CapacityTooLarge(whole_tokens));
        }
        self.set_field(BORROW_CAP_SHIFT, CAP_MASK, whole_tokens as u128);
        Ok(())
    }

    pub fn supply_capacity(&self) -> u64 {
        self.field(SUPPLY_CAP_SHIFT, CAP_MASK) as u64
    }

    pub fn set_supply_capacity(&mut self, whole_tokens: u64) -> Result<(), ConfigurationError> {
        if whole_tokens > MAX_CAPACITY {
            return Err(ConfigurationError::CapacityTooLarge(whole_tokens));
        }
        self.set_field(SUPPLY_CAP_SHIFT, CAP_MASK, whole_tokens as u128);
        Ok(())
    }

    /// Borrow cap in token units, None when unlimited.
    pub fn borrow_capacity_units(&self) -> Option<U256> {
        match self.borrow_capacity() {
            0 => None,
            cap => Some(U256::from(cap) * pow10(self.decimals())),
        }
    }

    pub fn supply_capacity_units(&self) -> Option<U256> {
        match self.supply_capacity() {
            0 => None,
            cap => Some(U256::from(cap) * pow10(self.decimals())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_independent() {
        let mut config = PoolConfiguration::default();
        config.set_active(true);
        config.set_usd(true);
        assert!(config.is_active());
        assert!(config.is_usd());
        assert!(!config.is_frozen());
        assert!(!config.is_paused());
        assert!(!config.is_borrowing_enabled());

        config.set_active(false);
        assert!(!config.is_active());
        assert!(config.is_usd());
    }

    #[test]
    fn fields_do_not_bleed() {
        let mut config = PoolConfiguration::default();
        config.set_decimals(18).unwrap();
        config.set_fee_factor(1_000).unwrap();
        config.set_borrow_capacity(MAX_CAPACITY).unwrap();
        config.set_supply_capacity(5_000_000).unwrap();
        config.set_paused(true);

        assert_eq!(config.decimals(), 18);
        assert_eq!(config.fee_factor(), 1_000);
        assert_eq!(config.borrow_capacity(), MAX_CAPACITY);
        assert_eq!(config.supply_capacity(), 5_000_000);
        assert!(config.is_paused());

        config.set_borrow_capacity(7).unwrap();
        assert_eq!(config.borrow_capacity(), 7);
        assert_eq!(config.supply_capacity(), 5_000_000);
        assert_eq!(config.fee_factor(), 1_000);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = PoolConfiguration::default();
        assert_eq!(config.set_fee_factor(10_001), Err(ConfigurationError::InvalidFeeFactor(10_001)));
        assert_eq!(
            config.set_borrow_capacity(MAX_CAPACITY + 1),
            Err(ConfigurationError::CapacityTooLarge(MAX_CAPACITY + 1))
        );
        assert_eq!(config.set_decimals(28), Err(ConfigurationError::InvalidDecimals(28)));
        assert_eq!(config, PoolConfiguration::default());
    }

    #[test]
    fn capacity_in_token_units() {
        let mut config = PoolConfiguration::default();
        config.set_decimals(6).unwrap();
        assert_eq!(config.borrow_capacity_units(), None);

        config.set_borrow_capacity(1_000).unwrap();
        assert_eq!(config.borrow_capacity_units(), Some(U256::from(1_000_000_000u64)));
    }
}
