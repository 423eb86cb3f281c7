//! Per-pool metric assembly
//!
//! Runs the pure stages in order over already-fetched data:
//! distribute rewards -> token APY -> user share -> USD valuation.
//! Allocation accounting errors abort; undefined yields and missing
//! prices only blank the affected fields of that pool.

use alloy_primitives::{Address, U256};
use serde::Serialize;
use tracing::{debug, warn};

use super::apy::{ApyCalculator, ApyFigures};
use super::block_time::BlockWindows;
use super::rewards::{RewardDistributor, RewardProjection};
use super::share::{UserShare, UserShareCalculator};
use super::valuation::{PriceBook, UsdMetrics, ValuationEngine};
use crate::error::YieldResult;
use crate::model::{to_decimal, PoolRecord, TokenInfo, UserPosition};

/// Chain-wide facts derived once per run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChainSnapshot {
    pub windows: BlockWindows,
    /// Global emission in decimal reward-token units
    pub total_reward_per_block: f64,
    pub total_allocation_points: u64,
}

impl ChainSnapshot {
    pub fn new(
        windows: BlockWindows,
        raw_reward_per_block: U256,
        reward_decimals: u8,
        total_allocation_points: u64,
    ) -> Self {
        Self {
            windows,
            total_reward_per_block: to_decimal(raw_reward_per_block, reward_decimals),
            total_allocation_points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolMetrics {
    pub pool_id: u64,
    pub lp_asset_name: String,
    pub underlying_asset_name: String,
    pub underlying_token_address: Address,
    pub allocation_points: u64,
    pub total_staked_tokens: f64,
    pub user_staked_tokens: f64,
    /// Pool-level emission, reward-token units
    pub rewards: RewardProjection,
    /// `None` when the pool's staked supply is zero
    pub apy: Option<ApyFigures>,
    /// `None` when the pool's staked supply is zero
    pub user_share: Option<UserShare>,
    pub pending_reward: f64,
    pub usd: Option<UsdMetrics>,
    /// Why `usd` is missing
    pub usd_unavailable: Option<String>,
}

/// Local errors become `None` plus their reason; fatal ones propagate
fn degrade<T>(result: YieldResult<T>) -> YieldResult<(Option<T>, Option<String>)> {
    match result {
        Ok(value) => Ok((Some(value), None)),
        Err(e) if !e.is_fatal() => Ok((None, Some(e.to_string()))),
        Err(e) => Err(e),
    }
}

pub fn build_pool_metrics(
    snapshot: &ChainSnapshot,
    active: &[(PoolRecord, UserPosition)],
    reward: &TokenInfo,
    book: &PriceBook,
    valuation: &ValuationEngine<'_>,
) -> YieldResult<Vec<PoolMetrics>> {
    let distributor = RewardDistributor::new(
        snapshot.total_reward_per_block,
        snapshot.total_allocation_points,
        snapshot.windows,
    );
    let pools: Vec<PoolRecord> = active.iter().map(|(p, _)| p.clone()).collect();
    let rewards = distributor.distribute(&pools)?;

    active
        .iter()
        .zip(rewards)
        .map(|((pool, position), pool_reward)| -> YieldResult<PoolMetrics> {
            let staked = pool.total_staked_tokens();
            let user_staked = to_decimal(position.staked_amount, pool.lp_decimals);

            let (apy, apy_err) =
                degrade(ApyCalculator::compute(pool.pool_id, pool_reward.per_week, staked))?;
            let (user_share, _) = degrade(UserShareCalculator::compute(
                pool.pool_id,
                user_staked,
                staked,
                &pool_reward,
            ))?;
            if let Some(reason) = apy_err {
                warn!("{}", reason);
            }

            let (usd, usd_unavailable) = degrade(valuation.value_pool(
                book,
                pool,
                position,
                &pool_reward,
                user_share.as_ref(),
                reward,
            ))?;
            if let Some(reason) = &usd_unavailable {
                warn!(
                    "Pool {} ({}): USD figures unavailable: {}",
                    pool.pool_id, pool.lp_asset_name, reason
                );
            }

            debug!(
                "pool {} {}: {:.4} {}/day, apy {:?}",
                pool.pool_id,
                pool.lp_asset_name,
                pool_reward.per_day,
                reward.symbol,
                apy.map(|a| a.yearly)
            );

            Ok(PoolMetrics {
                pool_id: pool.pool_id,
                lp_asset_name: pool.lp_asset_name.clone(),
                underlying_asset_name: pool.underlying_asset_name.clone(),
                underlying_token_address: pool.underlying_token_address,
                allocation_points: pool.allocation_points,
                total_staked_tokens: staked,
                user_staked_tokens: user_staked,
                rewards: pool_reward,
                apy,
                user_share,
                pending_reward: to_decimal(position.pending_reward, reward.decimals),
                usd,
                usd_unavailable,
            })
        })
        .collect()
}

/// Sums across pools whose USD figures resolved
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ReportTotals {
    pub pools_priced: usize,
    pub pools_unpriced: usize,
    pub user_staked_usd: f64,
    pub user_rewards_usd: RewardProjection,
    pub pending_reward_usd: f64,
    pub pending_reward: f64,
}

impl ReportTotals {
    pub fn from_metrics(metrics: &[PoolMetrics]) -> Self {
        metrics.iter().fold(Self::default(), |mut acc, m| {
            acc.pending_reward += m.pending_reward;
            match &m.usd {
                Some(usd) => {
                    acc.pools_priced += 1;
                    acc.user_staked_usd += usd.user_staked_usd;
                    acc.pending_reward_usd += usd.pending_reward_usd;
                    if let Some(r) = usd.user_rewards_usd {
                        acc.user_rewards_usd = acc.user_rewards_usd + r;
                    }
                }
                None => acc.pools_unpriced += 1,
            }
            acc
        })
    }
}
