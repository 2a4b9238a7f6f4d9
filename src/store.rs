// 3.0 store.rs: ledger store. one typed table per entity kind.
// each table is a key->value map plus an ordered key-set for enumeration.
// reads of absent keys return the zero value: test existence with `has`, never with the value.

use crate::health::RiskParams;
use crate::pool::Pool;
use crate::position::Position;
use crate::rates::InterestRateStrategy;
use crate::types::{AccountId, AssetId, DexId, DexKey, PositionKey, StrategyId};
use std::collections::HashMap;
use std::hash::Hash;

/** 3.1: map + key-set kept in sync on insert/remove */
#[derive(Debug, Clone)]
pub struct EntityTable<K, V> {
    values: HashMap<K, V>,
    keys: Vec<K>,
    slots: HashMap<K, usize>,
}

impl<K, V> Default for EntityTable<K, V> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
            keys: Vec::new(),
            slots: HashMap::new(),
        }
    }
}

impl<K, V> EntityTable<K, V>
where
    K: Copy + Eq + Hash,
    V: Clone + Default,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    /// Zero value when absent.
    pub fn get(&self, key: &K) -> V {
        self.values.get(key).cloned().unwrap_or_default()
    }

    pub fn get_ref(&self, key: &K) -> Option<&V> {
        self.values.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.values.get_mut(key)
    }

    /// Insert or update. the key joins the key-set only when new.
    pub fn set(&mut self, key: K, value: V) {
        if self.values.insert(key, value).is_none() {
            self.slots.insert(key, self.keys.len());
            self.keys.push(key);
        }
    }

    /// Swap-remove: the last key takes the removed key's slot.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.values.remove(key)?;
        if let Some(slot) = self.slots.remove(key) {
            self.keys.swap_remove(slot);
            if let Some(moved) = self.keys.get(slot) {
                self.slots.insert(*moved, slot);
            }
        }
        Some(value)
    }

    pub fn count(&self) -> u64 {
        self.keys.len() as u64
    }

    /// Keys in `[start, end)`, clamped to the key-set size.
    pub fn keys_at(&self, start: u64, end: u64) -> Vec<K> {
        let len = self.keys.len();
        let start = (start as usize).min(len);
        let end = (end as usize).min(len).max(start);
        self.keys[start..end].to_vec()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.keys.iter().filter_map(move |k| self.values.get(k).map(|v| (k, v)))
    }
}

/** 3.2: every entity the ledger owns */
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    pub pools: EntityTable<AssetId, Pool>,
    pub positions: EntityTable<PositionKey, Position>,
    pub dex_links: EntityTable<DexKey, DexId>,
    pub strategies: EntityTable<StrategyId, InterestRateStrategy>,
    risk_params: RiskParams,
}

impl LedgerStore {
    pub fn new(risk_params: RiskParams) -> Self {
        Self {
            risk_params,
            ..Self::default()
        }
    }

    pub fn risk_params(&self) -> &RiskParams {
        &self.risk_params
    }

    pub fn set_risk_params(&mut self, params: RiskParams) {
        self.risk_params = params;
    }

    pub fn position(&self, account: AccountId, asset: AssetId) -> Position {
        self.positions.get(&PositionKey::new(account, asset))
    }

    pub fn has_position(&self, account: AccountId, asset: AssetId) -> bool {
        self.positions.has(&PositionKey::new(account, asset))
    }

    pub fn dex_link(&self, a: AssetId, b: AssetId) -> Option<DexId> {
        self.dex_links.get_ref(&DexKey::new(a, b)).copied()
    }

    /// Assets in which the account holds a position, in pool creation order.
    pub fn account_assets(&self, account: AccountId) -> Vec<AssetId> {
        self.pools
            .keys()
            .iter()
            .copied()
            .filter(|asset| self.has_position(account, *asset))
            .collect()
    }
}
