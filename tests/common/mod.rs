//! Shared setup for the integration tests: a ledger with a USDC and a UNI pool,
//! one constant-product dex between them and a deep seeded supplier.

#![allow(dead_code)]

use margin_ledger::*;
use primitive_types::U256;
use rust_decimal_macros::dec;
use std::sync::Arc;

pub const ADMIN: AccountId = AccountId(1);
pub const ROUTER: AccountId = AccountId(2);
pub const TREASURY: AccountId = AccountId(3);
pub const SEED: AccountId = AccountId(100);

pub const USDC: AssetId = AssetId(1);
pub const UNI: AssetId = AssetId(2);
pub const DEX: DexId = DexId(1);

pub fn usdc(n: u64) -> U256 {
    U256::from(n) * U256::exp10(6)
}

pub fn uni(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

pub struct Harness {
    pub ledger: Ledger,
    pub oracle: Arc<FixedOracle>,
}

impl Harness {
    pub fn new() -> Self {
        let oracle = Arc::new(
            FixedOracle::new()
                .with_price(USDC, U256::from(100_000_000u64), 8)
                .with_price(UNI, RAY * 8, 27),
        );
        let config = LedgerConfig {
            admin: ADMIN,
            router: ROUTER,
            fee_collector: Some(TREASURY),
            ..LedgerConfig::default()
        };
        let mut ledger = Ledger::new(config, oracle.clone()).unwrap();
        ledger.set_time(Timestamp::from_secs(1_000));

        let mut dex = ConstantProductDex::new(0);
        dex.add_liquidity(UNI, uni(1_000_000), USDC, usdc(8_000_000));
        ledger.register_dex(ADMIN, DEX, Box::new(dex)).unwrap();

        let pool_params = PoolParams {
            fee_factor: dec!(0.1),
            ..PoolParams::default()
        };
        ledger
            .multicall(
                ROUTER,
                ADMIN,
                vec![
                    Call::CreatePool {
                        asset: USDC,
                        params: PoolParams::usd(6),
                        strategy: DEFAULT_STRATEGY,
                    },
                    Call::CreatePool {
                        asset: UNI,
                        params: pool_params,
                        strategy: DEFAULT_STRATEGY,
                    },
                    Call::SetDexLink {
                        asset_a: UNI,
                        asset_b: USDC,
                        dex: DEX,
                    },
                ],
            )
            .unwrap();

        let mut harness = Self { ledger, oracle };
        harness.fund(SEED, UNI, uni(1_000_000));
        harness.fund(SEED, USDC, usdc(1_000_000));
        harness
            .run(
                SEED,
                vec![
                    Call::Supply {
                        asset: UNI,
                        amount: uni(1_000_000),
                    },
                    Call::Supply {
                        asset: USDC,
                        amount: usdc(1_000_000),
                    },
                ],
            )
            .unwrap();
        harness
    }

    pub fn fund(&mut self, account: AccountId, asset: AssetId, amount: U256) {
        let tokens = self.ledger.tokens_mut();
        tokens.mint(account, asset, amount);
        tokens.approve(account, asset, U256::MAX);
    }

    pub fn run(&mut self, caller: AccountId, calls: Vec<Call>) -> Result<Vec<CallOutput>, MulticallError> {
        self.ledger.multicall(ROUTER, caller, calls)
    }

    pub fn set_price(&self, asset: AssetId, dollars: u64) {
        self.oracle.set_price(asset, RAY * dollars, 27);
    }

    pub fn pool(&self, asset: AssetId) -> &Pool {
        self.ledger.pool(asset).unwrap()
    }

    pub fn collateral(&self, account: AccountId, asset: AssetId) -> U256 {
        self.pool(asset).collateral_of(account).unwrap()
    }

    pub fn debt(&self, account: AccountId, asset: AssetId) -> U256 {
        self.pool(asset).debt_of(account).unwrap()
    }

    pub fn wallet(&self, account: AccountId, asset: AssetId) -> U256 {
        self.ledger.tokens().balance_of(account, asset)
    }
}
