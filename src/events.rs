// 11.0: every committed state change produces an event. handlers buffer payloads
// per batch; the log assigns ids and timestamps only when the batch commits.

use crate::configuration::PoolConfiguration;
use crate::health::RiskParams;
use crate::rates::InterestRateStrategy;
use crate::types::{AccountId, AssetAmount, AssetId, DexId, RedeemDirection, RepaySource, StrategyId, Timestamp};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    // Balance events
    Deposit(DepositEvent),
    Withdraw(WithdrawEvent),
    Supply(SupplyEvent),
    Redeem(RedeemEvent),

    // Debt events
    Borrow(BorrowEvent),
    Repay(RepayEvent),

    // Trading events
    Swap(SwapEvent),
    ClosePosition(ClosePositionEvent),
    Close(CloseEvent),

    // Risk events
    Liquidation(LiquidationEvent),

    // Admin events
    PoolCreated(PoolCreatedEvent),
    PoolConfigured(PoolConfiguredEvent),
    StrategyUpdated(StrategyUpdatedEvent),
    DexLinkUpdated(DexLinkUpdatedEvent),
    FeeClaimed(FeeClaimedEvent),
    RiskParamsUpdated(RiskParamsUpdatedEvent),
}

/// Account balances in one pool right after the operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub collateral: U256,
    pub supply: U256,
    pub debt: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    pub account_id: AccountId,
    pub asset: AssetId,
    pub amount: U256,
    pub balance: BalanceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawEvent {
    pub account_id: AccountId,
    pub asset: AssetId,
    pub requested: U256,
    pub amount: U256,
    pub balance: BalanceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyEvent {
    pub account_id: AccountId,
    pub asset: AssetId,
    pub amount: U256,
    pub balance: BalanceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemEvent {
    pub account_id: AccountId,
    pub asset: AssetId,
    pub direction: RedeemDirection,
    pub amount: U256,
    pub balance: BalanceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowEvent {
    pub account_id: AccountId,
    pub asset: AssetId,
    pub amount: U256,
    pub balance: BalanceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepayEvent {
    pub account_id: AccountId,
    pub asset: AssetId,
    pub source: RepaySource,
    pub repaid: U256,
    // overpayment kept as collateral
    pub excess: U256,
    pub balance: BalanceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEvent {
    pub account_id: AccountId,
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub amount_in: U256,
    pub amount_out: U256,
    pub dex: DexId,
    pub balance_in: BalanceSnapshot,
    pub balance_out: BalanceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosePositionEvent {
    pub account_id: AccountId,
    pub asset: AssetId,
    pub usd_asset: AssetId,
    pub percentage: U256,
    pub collateral_closed: U256,
    pub debt_closed: U256,
    pub balance: BalanceSnapshot,
    pub usd_balance: BalanceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseEvent {
    pub account_id: AccountId,
    pub usd_asset: AssetId,
    pub assets: Vec<AssetId>,
    pub usd_balance: BalanceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationEvent {
    pub account_id: AccountId,
    pub liquidator: AccountId,
    pub health_factor: U256,
    pub debts_repaid: Vec<AssetAmount>,
    pub collateral_seized: Vec<AssetAmount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolCreatedEvent {
    pub asset: AssetId,
    pub strategy: StrategyId,
    pub configuration: PoolConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfiguredEvent {
    pub asset: AssetId,
    pub configuration: PoolConfiguration,
    pub strategy: StrategyId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyUpdatedEvent {
    pub strategy_id: StrategyId,
    pub strategy: InterestRateStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexLinkUpdatedEvent {
    pub asset_a: AssetId,
    pub asset_b: AssetId,
    // None when the link was removed
    pub dex: Option<DexId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeClaimedEvent {
    pub asset: AssetId,
    pub recipient: AccountId,
    pub amount: U256,
    pub unclaimed_fee: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskParamsUpdatedEvent {
    pub params: RiskParams,
}

impl EventPayload {
    /// Account the event is about, if any.
    pub fn account(&self) -> Option<AccountId> {
        match self {
            EventPayload::Deposit(e) => Some(e.account_id),
            EventPayload::Withdraw(e) => Some(e.account_id),
            EventPayload::Supply(e) => Some(e.account_id),
            EventPayload::Redeem(e) => Some(e.account_id),
            EventPayload::Borrow(e) => Some(e.account_id),
            EventPayload::Repay(e) => Some(e.account_id),
            EventPayload::Swap(e) => Some(e.account_id),
            EventPayload::ClosePosition(e) => Some(e.account_id),
            EventPayload::Close(e) => Some(e.account_id),
            EventPayload::Liquidation(e) => Some(e.account_id),
            _ => None,
        }
    }
}

/** 11.1: append-only log capped at `max_events`, oldest dropped first */
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Vec<Event>,
    next_id: u64,
    max_events: usize,
}

impl EventLog {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
            max_events,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn append(&mut self, timestamp: Timestamp, payloads: Vec<EventPayload>) {
        for payload in payloads {
            self.events.push(Event::new(EventId(self.next_id), timestamp, payload));
            self.next_id += 1;
        }

        if self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(0..drain_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit(amount: u64) -> EventPayload {
        EventPayload::Deposit(DepositEvent {
            account_id: AccountId(1),
            asset: AssetId(1),
            amount: U256::from(amount),
            balance: BalanceSnapshot::default(),
        })
    }

    #[test]
    fn ids_are_sequential() {
        let mut log = EventLog::new(10);
        log.append(Timestamp::from_secs(5), vec![deposit(1), deposit(2)]);
        log.append(Timestamp::from_secs(6), vec![deposit(3)]);

        let ids: Vec<u64> = log.events().iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(log.recent(1)[0].timestamp, Timestamp::from_secs(6));
    }

    #[test]
    fn log_is_capped() {
        let mut log = EventLog::new(2);
        log.append(Timestamp::from_secs(1), vec![deposit(1), deposit(2), deposit(3)]);
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].id, EventId(2));
    }

    #[test]
    fn payload_round_trips_through_json() {
        let payload = deposit(42);
        let json = serde_json::to_string(&payload).unwrap();
        let back: EventPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
        assert_eq!(back.account(), Some(AccountId(1)));
    }
}
