// 9.0 oracle.rs: USD prices per asset.
// feeds report (value, decimals); the ledger works in ray.

use crate::errors::LedgerError;
use crate::math::to_ray;
use crate::types::AssetId;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFeed {
    pub value: U256,
    pub decimals: u8,
}

impl PriceFeed {
    pub fn new(value: U256, decimals: u8) -> Self {
        Self { value, decimals }
    }
}

pub trait Oracle: Send + Sync {
    fn price(&self, asset: AssetId) -> Option<PriceFeed>;
}

/// Price of `asset` in ray USD.
pub fn price_ray(oracle: &dyn Oracle, asset: AssetId) -> Result<U256, LedgerError> {
    let feed = oracle.price(asset).ok_or(LedgerError::PriceUnavailable(asset))?;
    Ok(to_ray(feed.value, feed.decimals)?)
}

/** 9.1: settable in-memory feed */
#[derive(Debug, Default)]
pub struct FixedOracle {
    prices: RwLock<HashMap<AssetId, PriceFeed>>,
}

impl FixedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(self, asset: AssetId, value: U256, decimals: u8) -> Self {
        self.set_price(asset, value, decimals);
        self
    }

    pub fn set_price(&self, asset: AssetId, value: U256, decimals: u8) {
        // a poisoned lock still holds a valid map
        let mut prices = self.prices.write().unwrap_or_else(|e| e.into_inner());
        prices.insert(asset, PriceFeed::new(value, decimals));
    }

    pub fn remove_price(&self, asset: AssetId) {
        let mut prices = self.prices.write().unwrap_or_else(|e| e.into_inner());
        prices.remove(&asset);
    }
}

impl Oracle for FixedOracle {
    fn price(&self, asset: AssetId) -> Option<PriceFeed> {
        let prices = self.prices.read().unwrap_or_else(|e| e.into_inner());
        prices.get(&asset).copied()
    }
}
