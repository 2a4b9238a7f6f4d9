// shared fixture for handler unit tests: a USDC pool, a UNI pool, one linked dex.

use super::context::{LedgerState, OpContext};
use crate::configuration::PoolConfiguration;
use crate::dex::ConstantProductDex;
use crate::errors::LedgerError;
use crate::events::EventPayload;
use crate::math::RAY;
use crate::oracle::FixedOracle;
use crate::pool::Pool;
use crate::rates::InterestRateStrategy;
use crate::types::{AccountId, AssetId, DexId, DexKey, StrategyId, Timestamp};
use primitive_types::U256;

pub struct Fixture {
    pub state: LedgerState,
    pub oracle: FixedOracle,
    pub events: Vec<EventPayload>,
    pub now: Timestamp,
}

impl Fixture {
    pub const USDC: AssetId = AssetId(1);
    pub const UNI: AssetId = AssetId(2);
    pub const DEX: DexId = DexId(1);
    pub const SEED: AccountId = AccountId(100);

    pub fn usdc(n: u64) -> U256 {
        U256::from(n) * U256::exp10(6)
    }

    pub fn uni(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    fn configuration(decimals: u8, usd: bool) -> PoolConfiguration {
        let mut config = PoolConfiguration::default();
        config.set_active(true);
        config.set_borrowing_enabled(true);
        config.set_usd(usd);
        config.set_decimals(decimals).unwrap();
        config.set_fee_factor(1_000).unwrap();
        config
    }

    pub fn new() -> Self {
        let now = Timestamp::from_secs(1_000);
        let mut state = LedgerState::default();
        state.store.strategies.set(
            StrategyId(0),
            InterestRateStrategy::new(U256::zero(), RAY * 8 / 10, RAY / 2, RAY / 2),
        );
        state
            .store
            .pools
            .set(Self::USDC, Pool::new(Self::USDC, StrategyId(0), Self::configuration(6, true), now));
        state
            .store
            .pools
            .set(Self::UNI, Pool::new(Self::UNI, StrategyId(0), Self::configuration(18, false), now));

        let mut dex = ConstantProductDex::new(0);
        dex.add_liquidity(Self::UNI, Self::uni(1_000_000), Self::USDC, Self::usdc(8_000_000));
        state.dexes.register(Self::DEX, Box::new(dex));
        state.store.dex_links.set(DexKey::new(Self::UNI, Self::USDC), Self::DEX);

        let oracle = FixedOracle::new()
            .with_price(Self::USDC, U256::from(100_000_000u64), 8)
            .with_price(Self::UNI, RAY * 8, 27);

        let mut fixture = Self {
            state,
            oracle,
            events: Vec::new(),
            now,
        };

        // deep pools so borrows have liquidity
        let seed = fixture.funded_account(Self::SEED.0, Self::UNI, Self::uni(1_000_000));
        fixture.fund(seed, Self::USDC, Self::usdc(1_000_000));
        fixture.run(|ctx| super::supply(ctx, seed, Self::UNI, Self::uni(1_000_000))).unwrap();
        fixture.run(|ctx| super::supply(ctx, seed, Self::USDC, Self::usdc(1_000_000))).unwrap();
        fixture.events.clear();
        fixture
    }

    pub fn fund(&mut self, account: AccountId, asset: AssetId, amount: U256) {
        self.state.tokens.mint(account, asset, amount);
        self.state.tokens.approve(account, asset, U256::MAX);
    }

    pub fn funded_account(&mut self, id: u64, asset: AssetId, amount: U256) -> AccountId {
        let account = AccountId(id);
        self.fund(account, asset, amount);
        account
    }

    pub fn run<T, F>(&mut self, op: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut OpContext<'_>) -> Result<T, LedgerError>,
    {
        let mut ctx = OpContext::new(&mut self.state, &self.oracle, self.now, &mut self.events);
        op(&mut ctx)
    }

    pub fn set_uni_price(&self, dollars: u64) {
        self.oracle.set_price(Self::UNI, RAY * dollars, 27);
    }
}
