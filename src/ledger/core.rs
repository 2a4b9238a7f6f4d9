// 13.0 ledger/core.rs: the ledger. owns committed state, roles, the oracle handle and the event log.

use crate::access::{AccessControl, Role};
use crate::config::{ConfigError, LedgerConfig};
use crate::dex::Dex;
use crate::errors::LedgerError;
use crate::events::{Event, EventLog};
use crate::handlers::{liquidatable_accounts, LedgerState};
use crate::health::{account_health, AccountHealth};
use crate::oracle::Oracle;
use crate::pool::Pool;
use crate::position::Position;
use crate::store::LedgerStore;
use crate::token::TokenBank;
use crate::types::{AccountId, AssetId, DexId, StrategyId, Timestamp};
use std::fmt;
use std::sync::Arc;

/// Strategy id installed from `LedgerConfig::default_strategy`.
pub const DEFAULT_STRATEGY: StrategyId = StrategyId(0);

/** 13.0.1: all ledger state lives here */
pub struct Ledger {
    pub(super) config: LedgerConfig,
    pub(super) state: LedgerState,
    pub(super) access: AccessControl,
    pub(super) oracle: Arc<dyn Oracle>,
    pub(super) events: EventLog,
    pub(super) current_time: Timestamp,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("config", &self.config)
            .field("pools", &self.state.store.pools.count())
            .field("positions", &self.state.store.positions.count())
            .field("events", &self.events.len())
            .field("current_time", &self.current_time)
            .finish()
    }
}

impl Ledger {
    pub fn new(config: LedgerConfig, oracle: Arc<dyn Oracle>) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut state = LedgerState {
            store: LedgerStore::new(config.risk.to_risk_params()?),
            ..LedgerState::default()
        };
        state.store.strategies.set(DEFAULT_STRATEGY, config.default_strategy.to_strategy()?);

        let mut access = AccessControl::new();
        access.grant(config.admin, Role::Admin);
        access.grant(config.router, Role::Controller);
        if let Some(collector) = config.fee_collector {
            access.grant(collector, Role::FeeCollector);
        }

        tracing::info!(admin = config.admin.0, router = config.router.0, "ledger created");
        Ok(Self {
            events: EventLog::new(config.max_events),
            config,
            state,
            access,
            oracle,
            current_time: Timestamp::from_secs(0),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // 13.0.2: clock. every batch runs at the current time

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, secs: u64) {
        self.current_time = self.current_time.plus(secs);
    }

    /// Moves the clock to wall time, never backwards.
    pub fn sync_clock(&mut self) {
        self.current_time = self.current_time.max(Timestamp::now());
    }

    // 13.0.3: roles and external wiring

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    pub fn grant_role(&mut self, admin: AccountId, account: AccountId, role: Role) -> Result<(), LedgerError> {
        self.access.require(admin, Role::Admin)?;
        self.access.grant(account, role);
        Ok(())
    }

    pub fn revoke_role(&mut self, admin: AccountId, account: AccountId, role: Role) -> Result<(), LedgerError> {
        self.access.require(admin, Role::Admin)?;
        self.access.revoke(account, role);
        Ok(())
    }

    pub fn register_dex(&mut self, admin: AccountId, id: DexId, dex: Box<dyn Dex>) -> Result<(), LedgerError> {
        self.access.require(admin, Role::Admin)?;
        self.state.dexes.register(id, dex);
        Ok(())
    }

    pub fn oracle(&self) -> &dyn Oracle {
        self.oracle.as_ref()
    }

    pub fn tokens(&self) -> &TokenBank {
        &self.state.tokens
    }

    /// Wallet balances live outside the ledger's accounting; tests and hosts fund them here.
    pub fn tokens_mut(&mut self) -> &mut TokenBank {
        &mut self.state.tokens
    }

    pub fn dex(&self, id: DexId) -> Option<&dyn Dex> {
        self.state.dexes.get(id)
    }

    // 13.0.4: queries

    pub fn store(&self) -> &LedgerStore {
        &self.state.store
    }

    pub fn pool(&self, asset: AssetId) -> Option<&Pool> {
        self.state.store.pools.get_ref(&asset)
    }

    pub fn position(&self, account: AccountId, asset: AssetId) -> Option<Position> {
        if self.state.store.has_position(account, asset) {
            Some(self.state.store.position(account, asset))
        } else {
            None
        }
    }

    pub fn account_health(&self, account: AccountId) -> Result<AccountHealth, LedgerError> {
        account_health(&self.state.store, self.oracle.as_ref(), account, self.current_time)
    }

    pub fn liquidatable_accounts(&self, start: u64, end: u64) -> Result<Vec<AccountHealth>, LedgerError> {
        liquidatable_accounts(&self.state.store, self.oracle.as_ref(), self.current_time, start, end)
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        self.events.recent(count)
    }
}
