//! Farm scan: fetch everything, then compute
//!
//! All reads fan out concurrently and join all-or-nothing; the first
//! failed read aborts the scan. Computation starts only once every read
//! has landed.
//!
//! Reads are not pinned to a single block. Pool totals, user positions and
//! prices can come from slightly different heights.

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

use crate::analytics::{
    build_pool_metrics, select_active_pools, BlockTimeEstimator, ChainSnapshot, PoolMetrics,
    PriceBook, ReportTotals, ValuationEngine,
};
use crate::chain::ChainFacts;
use crate::chains::Chain;
use crate::error::YieldResult;
use crate::model::{BlockRef, BlockSample, TokenInfo};
use crate::price::PriceFeed;

/// Everything the reporter needs, fully derived
#[derive(Debug, Clone, Serialize)]
pub struct FarmReport {
    pub chain: Chain,
    pub user: Address,
    pub generated_at: DateTime<Utc>,
    pub latest_block: BlockSample,
    pub pool_count: u64,
    pub snapshot: ChainSnapshot,
    pub reward_token: TokenInfo,
    pub metrics: Vec<PoolMetrics>,
    pub prices: PriceBook,
    pub totals: ReportTotals,
}

pub struct FarmScanner<'a> {
    facts: &'a dyn ChainFacts,
    feed: &'a dyn PriceFeed,
    chain: Chain,
    reward_price_id: String,
}

impl<'a> FarmScanner<'a> {
    pub fn new(
        facts: &'a dyn ChainFacts,
        feed: &'a dyn PriceFeed,
        chain: Chain,
        reward_price_id: impl Into<String>,
    ) -> Self {
        Self {
            facts,
            feed,
            chain,
            reward_price_id: reward_price_id.into(),
        }
    }

    pub async fn scan(&self, user: Address) -> YieldResult<FarmReport> {
        let start = Instant::now();

        // Chain-wide reads
        let (latest, raw_reward_per_block, total_allocation_points, pool_count, reward_token) =
            tokio::try_join!(
                self.facts.block_sample(BlockRef::Latest),
                self.facts.total_reward_per_block(),
                self.facts.total_allocation_points(),
                self.facts.pool_count(),
                self.facts.reward_token(),
            )?;
        let older_number = BlockTimeEstimator::older_sample_number(latest.number)?;
        let older = self.facts.block_sample(BlockRef::Number(older_number)).await?;
        let windows = BlockTimeEstimator::estimate(older, latest)?;
        debug!("Pool and price reads are not pinned to block #{}", latest.number);

        info!(
            "Block #{}: {}s avg block time, {} pools, {} {}/block raw",
            latest.number,
            windows.avg_block_time_secs,
            pool_count,
            raw_reward_per_block,
            reward_token.symbol
        );

        // Per-pool reads
        let pools = try_join_all((0..pool_count).map(|pool_id| async move {
            tokio::try_join!(
                self.facts.pool(pool_id),
                self.facts.user_position(pool_id, user),
            )
        }))
        .await?;
        debug!("Loaded {} pools in {:?}", pools.len(), start.elapsed());

        let active = select_active_pools(pools);
        info!("{} active pools for {:?}", active.len(), user);

        // Prices
        let valuation = ValuationEngine::new(self.chain.info(), self.reward_price_id.clone());
        let records: Vec<_> = active.iter().map(|(p, _)| p.clone()).collect();
        let query = valuation.plan(&records);
        let (by_address, by_identifier) = tokio::try_join!(
            self.feed.prices_by_address(query.platform, &query.addresses),
            self.feed.prices_by_identifier(&query.identifiers),
        )?;
        let prices = valuation.assemble(&records, &reward_token, &by_address, &by_identifier);

        // Pure computation
        let snapshot = ChainSnapshot::new(
            windows,
            raw_reward_per_block,
            reward_token.decimals,
            total_allocation_points,
        );
        let metrics = build_pool_metrics(&snapshot, &active, &reward_token, &prices, &valuation)?;
        let totals = ReportTotals::from_metrics(&metrics);

        info!("Scan complete in {:?}", start.elapsed());

        Ok(FarmReport {
            chain: self.chain,
            user,
            generated_at: Utc::now(),
            latest_block: latest,
            pool_count,
            snapshot,
            reward_token,
            metrics,
            prices,
            totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::YieldError;
    use crate::model::{PoolRecord, UserPosition};
    use alloy_primitives::{address, U256};
    use async_trait::async_trait;
    use std::collections::HashMap;

    const USER: Address = address!("1111111111111111111111111111111111111111");
    const STG: Address = address!("Af5191B0De278C7286d6C7CC6ab6BB8A73bA2Cd6");
    const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
    const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

    fn e18(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    fn e6(n: u64) -> U256 {
        U256::from(n) * U256::from(1_000_000u64)
    }

    struct FakeChain {
        latest: BlockSample,
        block_time: u64,
        total_allocation_points: u64,
        pools: Vec<PoolRecord>,
        positions: Vec<UserPosition>,
        fail_pool: Option<u64>,
    }

    impl FakeChain {
        fn record(
            pool_id: u64,
            alloc: u64,
            underlying: Address,
            name: &str,
            staked: U256,
        ) -> PoolRecord {
            PoolRecord {
                pool_id,
                allocation_points: alloc,
                total_staked: staked,
                lp_decimals: 6,
                lp_asset_name: format!("S*{}", name),
                lp_token_address: Address::repeat_byte(pool_id as u8 + 1),
                underlying_asset_name: name.to_string(),
                underlying_token_address: underlying,
                underlying_decimals: 6,
            }
        }

        fn stake(pool_id: u64, staked: U256) -> UserPosition {
            UserPosition {
                pool_id,
                staked_amount: staked,
                pending_reward: e18(3),
            }
        }

        /// 12s blocks; pools 0 (USDC, user 10%), 1 (no alloc), 2 (no stake), 3 (WETH, user 10%)
        fn scenario() -> Self {
            Self {
                latest: BlockSample { number: 20_000, timestamp: 1_700_000_000 },
                block_time: 12,
                total_allocation_points: 1000,
                pools: vec![
                    Self::record(0, 100, USDC, "USDC", e6(100_000)),
                    Self::record(1, 0, USDC, "USDC", e6(50_000)),
                    Self::record(2, 500, USDC, "USDC", e6(70_000)),
                    Self::record(3, 100, WETH, "WETH", e6(100_000)),
                ],
                positions: vec![
                    Self::stake(0, e6(10_000)),
                    Self::stake(1, e6(5_000)),
                    Self::stake(2, U256::ZERO),
                    Self::stake(3, e6(10_000)),
                ],
                fail_pool: None,
            }
        }
    }

    #[async_trait]
    impl ChainFacts for FakeChain {
        async fn block_sample(&self, block: BlockRef) -> YieldResult<BlockSample> {
            Ok(match block {
                BlockRef::Latest => self.latest,
                BlockRef::Number(n) => BlockSample {
                    number: n,
                    timestamp: self.latest.timestamp - (self.latest.number - n) * self.block_time,
                },
            })
        }

        async fn pool_count(&self) -> YieldResult<u64> {
            Ok(self.pools.len() as u64)
        }

        async fn pool(&self, pool_id: u64) -> YieldResult<PoolRecord> {
            if self.fail_pool == Some(pool_id) {
                let operation = format!("poolInfo({})", pool_id);
                return Err(YieldError::read_failure(operation, "execution reverted"));
            }
            Ok(self.pools[pool_id as usize].clone())
        }

        async fn user_position(&self, pool_id: u64, _user: Address) -> YieldResult<UserPosition> {
            Ok(self.positions[pool_id as usize].clone())
        }

        async fn total_reward_per_block(&self) -> YieldResult<U256> {
            Ok(e18(10))
        }

        async fn total_allocation_points(&self) -> YieldResult<u64> {
            Ok(self.total_allocation_points)
        }

        async fn total_staked(&self, pool_id: u64) -> YieldResult<U256> {
            Ok(self.pools[pool_id as usize].total_staked)
        }

        async fn reward_token(&self) -> YieldResult<TokenInfo> {
            Ok(TokenInfo {
                address: STG,
                symbol: "STG".to_string(),
                decimals: 18,
            })
        }
    }

    /// Knows STG and ETH; has no quote for WETH
    struct FakeFeed {
        down: bool,
    }

    #[async_trait]
    impl PriceFeed for FakeFeed {
        async fn prices_by_address(
            &self,
            _platform: &str,
            tokens: &[Address],
        ) -> YieldResult<HashMap<Address, f64>> {
            if self.down {
                return Err(YieldError::read_failure("token price lookup", "503"));
            }
            assert!(!tokens.contains(&USDC), "stablecoins must not be queried");
            Ok(HashMap::new())
        }

        async fn prices_by_identifier(&self, ids: &[String]) -> YieldResult<HashMap<String, f64>> {
            if self.down {
                return Err(YieldError::read_failure("asset price lookup", "503"));
            }
            let known = HashMap::from([("stargate-finance", 0.5), ("ethereum", 3000.0)]);
            Ok(ids
                .iter()
                .filter_map(|id| known.get(id.as_str()).map(|p| (id.clone(), *p)))
                .collect())
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let chain = FakeChain::scenario();
        let feed = FakeFeed { down: false };
        let scanner = FarmScanner::new(&chain, &feed, Chain::Ethereum, "stargate-finance");

        let report = scanner.scan(USER).await.unwrap();

        let w = report.snapshot.windows;
        assert_eq!(w.avg_block_time_secs, 12);
        assert_eq!(w.blocks_per_hour, 300);
        assert_eq!(w.blocks_per_day, 7200);
        assert_eq!(w.blocks_per_week, 50400);
        assert_eq!(w.blocks_per_month, 201600);
        assert_eq!(w.blocks_per_year, 2419200);

        let ids: Vec<u64> = report.metrics.iter().map(|m| m.pool_id).collect();
        assert_eq!(ids, vec![0, 3]);

        let m = &report.metrics[0];
        assert!(close(m.rewards.per_block, 1.0));
        assert!(close(m.rewards.per_day, 7200.0));
        assert!(close(m.rewards.per_week, 50400.0));

        let apy = m.apy.unwrap();
        assert!(close(apy.weekly, 50.4));
        assert!(close(apy.daily, 7.2));
        assert!(close(apy.yearly, 2620.8));

        let share = m.user_share.unwrap();
        assert!(close(share.staked_pct, 10.0));
        assert!(close(share.rewards.per_week, 5040.0));
        assert!(close(share.rewards.per_day, 720.0));

        let usd = m.usd.as_ref().unwrap();
        assert!(close(usd.user_staked_usd, 10_000.0));
        assert!(close(usd.user_rewards_usd.unwrap().per_week, 2520.0));
    }

    #[tokio::test]
    async fn test_missing_price_degrades_only_that_pool() {
        let chain = FakeChain::scenario();
        let feed = FakeFeed { down: false };
        let scanner = FarmScanner::new(&chain, &feed, Chain::Ethereum, "stargate-finance");

        let report = scanner.scan(USER).await.unwrap();
        let weth = &report.metrics[1];

        assert_eq!(weth.pool_id, 3);
        assert!(weth.usd.is_none());
        assert!(close(weth.apy.unwrap().weekly, 50.4));
        assert!(close(weth.user_share.unwrap().rewards.per_week, 5040.0));

        assert_eq!(report.totals.pools_priced, 1);
        assert_eq!(report.totals.pools_unpriced, 1);
        assert_eq!(report.prices.native().unwrap().usd_price, 3000.0);
        assert_eq!(report.prices.price(&STG).unwrap(), 0.5);
    }

    #[tokio::test]
    async fn test_failed_pool_read_aborts() {
        let mut chain = FakeChain::scenario();
        chain.fail_pool = Some(2);
        let feed = FakeFeed { down: false };
        let scanner = FarmScanner::new(&chain, &feed, Chain::Ethereum, "stargate-finance");

        let err = scanner.scan(USER).await.unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("poolInfo(2)"));
    }

    #[tokio::test]
    async fn test_price_feed_outage_aborts() {
        let chain = FakeChain::scenario();
        let feed = FakeFeed { down: true };
        let scanner = FarmScanner::new(&chain, &feed, Chain::Ethereum, "stargate-finance");

        let err = scanner.scan(USER).await.unwrap_err();
        assert!(matches!(err, YieldError::ExternalReadFailure { .. }));
    }

    #[test]
    fn test_young_chain_rejected() {
        let mut chain = FakeChain::scenario();
        chain.latest = BlockSample { number: 50, timestamp: 600 };
        let feed = FakeFeed { down: false };
        let scanner = FarmScanner::new(&chain, &feed, Chain::Ethereum, "stargate-finance");

        let err = tokio_test::block_on(scanner.scan(USER)).unwrap_err();
        assert_eq!(err, YieldError::InsufficientChainHistory { latest: 50, required: 100 });
    }

    #[test]
    fn test_zero_total_allocation_aborts() {
        let mut chain = FakeChain::scenario();
        chain.total_allocation_points = 0;
        let feed = FakeFeed { down: false };
        let scanner = FarmScanner::new(&chain, &feed, Chain::Ethereum, "stargate-finance");

        let err = tokio_test::block_on(scanner.scan(USER)).unwrap_err();
        assert_eq!(err, YieldError::AllocationAccountingError { active_pools: 2 });
    }
}
