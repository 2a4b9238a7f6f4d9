// 9.2 dex.rs: external exchange the ledger routes swaps through.
// ConstantProductDex is the in-memory reference: x * y = k per pair, fee taken on input.
// sqrt prices are ray; the price of a pair is reserve_out / reserve_in.

use crate::math::{mul_div, mul_div_up, PERCENTAGE_FACTOR, RAY};
use crate::types::{AssetId, DexId, DexKey};
use primitive_types::{U256, U512};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DexError {
    #[error("No pair {0} / {1}")]
    UnknownPair(AssetId, AssetId),

    #[error("Pair {asset_in} / {asset_out} cannot fill {amount}")]
    InsufficientLiquidity {
        asset_in: AssetId,
        asset_out: AssetId,
        amount: U256,
    },

    #[error("Arithmetic overflow in dex math")]
    Overflow,
}

pub trait Dex: Send + Sync + fmt::Debug {
    /// Sells exactly `amount_in`. a non-zero `sqrt_price_limit` bounds how far the price may move.
    fn swap_exact_in(
        &mut self,
        asset_in: AssetId,
        asset_out: AssetId,
        amount_in: U256,
        sqrt_price_limit: U256,
    ) -> Result<U256, DexError>;

    fn quote_exact_in(&self, asset_in: AssetId, asset_out: AssetId, amount_in: U256) -> Result<U256, DexError>;

    /// Input needed to receive exactly `amount_out`.
    fn quote_exact_out(&self, asset_in: AssetId, asset_out: AssetId, amount_out: U256) -> Result<U256, DexError>;

    fn clone_box(&self) -> Box<dyn Dex>;
}

impl Clone for Box<dyn Dex> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConstantProductDex {
    // (reserve of key.low, reserve of key.high)
    reserves: HashMap<DexKey, (U256, U256)>,
    fee_bps: u64,
}

impl ConstantProductDex {
    pub fn new(fee_bps: u64) -> Self {
        Self {
            reserves: HashMap::new(),
            fee_bps: fee_bps.min(PERCENTAGE_FACTOR - 1),
        }
    }

    pub fn add_liquidity(&mut self, a: AssetId, amount_a: U256, b: AssetId, amount_b: U256) {
        let key = DexKey::new(a, b);
        let entry = self.reserves.entry(key).or_default();
        if key.low() == a {
            entry.0 = entry.0.saturating_add(amount_a);
            entry.1 = entry.1.saturating_add(amount_b);
        } else {
            entry.0 = entry.0.saturating_add(amount_b);
            entry.1 = entry.1.saturating_add(amount_a);
        }
    }

    /// (reserve_in, reserve_out)
    pub fn reserves(&self, asset_in: AssetId, asset_out: AssetId) -> Result<(U256, U256), DexError> {
        let key = DexKey::new(asset_in, asset_out);
        let (low, high) = self
            .reserves
            .get(&key)
            .copied()
            .ok_or(DexError::UnknownPair(asset_in, asset_out))?;
        if key.low() == asset_in {
            Ok((low, high))
        } else {
            Ok((high, low))
        }
    }

    fn set_reserves(&mut self, asset_in: AssetId, asset_out: AssetId, reserve_in: U256, reserve_out: U256) {
        let key = DexKey::new(asset_in, asset_out);
        let value = if key.low() == asset_in {
            (reserve_in, reserve_out)
        } else {
            (reserve_out, reserve_in)
        };
        self.reserves.insert(key, value);
    }

    /// `sqrt(reserve_out / reserve_in)` in ray.
    pub fn sqrt_price(&self, asset_in: AssetId, asset_out: AssetId) -> Result<U256, DexError> {
        let (reserve_in, reserve_out) = self.reserves(asset_in, asset_out)?;
        sqrt_price_of(reserve_in, reserve_out)
    }

    fn insufficient(asset_in: AssetId, asset_out: AssetId, amount: U256) -> DexError {
        DexError::InsufficientLiquidity {
            asset_in,
            asset_out,
            amount,
        }
    }
}

fn sqrt_price_of(reserve_in: U256, reserve_out: U256) -> Result<U256, DexError> {
    if reserve_in.is_zero() {
        return Err(DexError::Overflow);
    }
    let ratio = reserve_out.full_mul(RAY) * U512::from(RAY) / U512::from(reserve_in);
    U256::try_from(ratio.integer_sqrt()).map_err(|_| DexError::Overflow)
}

impl Dex for ConstantProductDex {
    fn swap_exact_in(
        &mut self,
        asset_in: AssetId,
        asset_out: AssetId,
        amount_in: U256,
        sqrt_price_limit: U256,
    ) -> Result<U256, DexError> {
        let amount_out = self.quote_exact_in(asset_in, asset_out, amount_in)?;
        let (reserve_in, reserve_out) = self.reserves(asset_in, asset_out)?;
        let next_in = reserve_in.checked_add(amount_in).ok_or(DexError::Overflow)?;
        let next_out = reserve_out - amount_out;

        if !sqrt_price_limit.is_zero() && sqrt_price_of(next_in, next_out)? < sqrt_price_limit {
            return Err(Self::insufficient(asset_in, asset_out, amount_in));
        }

        self.set_reserves(asset_in, asset_out, next_in, next_out);
        Ok(amount_out)
    }

    fn quote_exact_in(&self, asset_in: AssetId, asset_out: AssetId, amount_in: U256) -> Result<U256, DexError> {
        let (reserve_in, reserve_out) = self.reserves(asset_in, asset_out)?;
        let fee_keep = U256::from(PERCENTAGE_FACTOR - self.fee_bps);
        let in_after_fee = mul_div(amount_in, fee_keep, U256::from(PERCENTAGE_FACTOR)).map_err(|_| DexError::Overflow)?;
        let denominator = reserve_in.checked_add(in_after_fee).ok_or(DexError::Overflow)?;
        let amount_out = mul_div(reserve_out, in_after_fee, denominator)
            .map_err(|_| Self::insufficient(asset_in, asset_out, amount_in))?;
        if amount_out.is_zero() || amount_out >= reserve_out {
            return Err(Self::insufficient(asset_in, asset_out, amount_in));
        }
        Ok(amount_out)
    }

    fn quote_exact_out(&self, asset_in: AssetId, asset_out: AssetId, amount_out: U256) -> Result<U256, DexError> {
        let (reserve_in, reserve_out) = self.reserves(asset_in, asset_out)?;
        if amount_out.is_zero() || amount_out >= reserve_out {
            return Err(Self::insufficient(asset_in, asset_out, amount_out));
        }
        let in_after_fee =
            mul_div_up(reserve_in, amount_out, reserve_out - amount_out).map_err(|_| DexError::Overflow)?;
        let fee_keep = U256::from(PERCENTAGE_FACTOR - self.fee_bps);
        mul_div_up(in_after_fee, U256::from(PERCENTAGE_FACTOR), fee_keep).map_err(|_| DexError::Overflow)
    }

    fn clone_box(&self) -> Box<dyn Dex> {
        Box::new(self.clone())
    }
}

/** 9.2.1: registered exchanges by id. cloned with the rest of the state per batch */
#[derive(Debug, Clone, Default)]
pub struct DexRegistry {
    dexes: BTreeMap<DexId, Box<dyn Dex>>,
}

impl DexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: DexId, dex: Box<dyn Dex>) {
        self.dexes.insert(id, dex);
    }

    pub fn is_registered(&self, id: DexId) -> bool {
        self.dexes.contains_key(&id)
    }

    pub fn get(&self, id: DexId) -> Option<&dyn Dex> {
        self.dexes.get(&id).map(|dex| dex.as_ref())
    }

    pub fn get_mut(&mut self, id: DexId) -> Option<&mut (dyn Dex + 'static)> {
        self.dexes.get_mut(&id).map(|dex| dex.as_mut())
    }
}
