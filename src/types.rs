// 1.0: all the primitives live here. ids, keys, timestamps, position classification.
// each id is a newtype so the compiler catches account/asset mixups.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub u32);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DexId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StrategyId(pub u32);

// 1.1: one position per (account, asset)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    pub account: AccountId,
    pub asset: AssetId,
}

impl PositionKey {
    pub fn new(account: AccountId, asset: AssetId) -> Self {
        Self { account, asset }
    }
}

// 1.2: symmetric pair key. (a, b) and (b, a) map to the same link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DexKey {
    low: AssetId,
    high: AssetId,
}

impl DexKey {
    pub fn new(a: AssetId, b: AssetId) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn low(&self) -> AssetId {
        self.low
    }

    pub fn high(&self) -> AssetId {
        self.high
    }
}

// 1.3: net exposure of an account in one asset.
// Long = more collateral than debt, Short = more debt than collateral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionType {
    Short,
    Long,
    #[default]
    Flat,
}

impl PositionType {
    pub fn opposite(&self) -> Self {
        match self {
            PositionType::Long => PositionType::Short,
            PositionType::Short => PositionType::Long,
            PositionType::Flat => PositionType::Flat,
        }
    }
}

// 1.3.1: which way a redeem moves a balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedeemDirection {
    // supply -> collateral
    ToCollateral,
    // collateral -> supply
    ToSupply,
}

// 1.3.2: where repaid tokens come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaySource {
    #[default]
    Wallet,
    Collateral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    pub asset: AssetId,
    pub amount: U256,
}

impl AssetAmount {
    pub fn new(asset: AssetId, amount: U256) -> Self {
        Self { asset, amount }
    }
}

// 1.4: second resolution timestamp. interest math is per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp().max(0) as u64)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn plus(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    // zero when `earlier` is not actually earlier
    pub fn seconds_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dex_key_is_symmetric() {
        let a = AssetId(7);
        let b = AssetId(3);
        assert_eq!(DexKey::new(a, b), DexKey::new(b, a));
        assert_eq!(DexKey::new(a, b).low(), b);
        assert_eq!(DexKey::new(a, b).high(), a);
    }

    #[test]
    fn position_type_defaults_to_flat() {
        assert_eq!(PositionType::default(), PositionType::Flat);
        assert_eq!(PositionType::Long.opposite(), PositionType::Short);
        assert_eq!(PositionType::Flat.opposite(), PositionType::Flat);
    }

    #[test]
    fn timestamp_elapsed_saturates() {
        let t0 = Timestamp::from_secs(100);
        let t1 = t0.plus(50);
        assert_eq!(t1.seconds_since(t0), 50);
        assert_eq!(t0.seconds_since(t1), 0);
    }
}
