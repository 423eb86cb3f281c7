//! Emission split across pools and projection over time windows
//!
//! Projections are simple multiples of the per-block rate; compounding is
//! not modeled.

use serde::{Deserialize, Serialize};

use super::block_time::BlockWindows;
use crate::error::{YieldError, YieldResult};
use crate::model::PoolRecord;

/// A per-block rate projected over every window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RewardProjection {
    pub per_block: f64,
    pub per_day: f64,
    pub per_week: f64,
    pub per_month: f64,
    pub per_year: f64,
}

impl RewardProjection {
    pub fn from_per_block(per_block: f64, windows: &BlockWindows) -> Self {
        Self {
            per_block,
            per_day: per_block * windows.blocks_per_day as f64,
            per_week: per_block * windows.blocks_per_week as f64,
            per_month: per_block * windows.blocks_per_month as f64,
            per_year: per_block * windows.blocks_per_year as f64,
        }
    }

    /// Every window multiplied by the same factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            per_block: self.per_block * factor,
            per_day: self.per_day * factor,
            per_week: self.per_week * factor,
            per_month: self.per_month * factor,
            per_year: self.per_year * factor,
        }
    }
}

impl std::ops::Add for RewardProjection {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            per_block: self.per_block + other.per_block,
            per_day: self.per_day + other.per_day,
            per_week: self.per_week + other.per_week,
            per_month: self.per_month + other.per_month,
            per_year: self.per_year + other.per_year,
        }
    }
}

/// Splits the global per-block emission by allocation points
pub struct RewardDistributor {
    /// Global emission in decimal reward-token units
    total_reward_per_block: f64,
    total_allocation_points: u64,
    windows: BlockWindows,
}

impl RewardDistributor {
    pub fn new(
        total_reward_per_block: f64,
        total_allocation_points: u64,
        windows: BlockWindows,
    ) -> Self {
        Self {
            total_reward_per_block,
            total_allocation_points,
            windows,
        }
    }

    pub fn pool_reward(&self, allocation_points: u64) -> YieldResult<RewardProjection> {
        if self.total_allocation_points == 0 {
            return Err(YieldError::AllocationAccountingError { active_pools: 1 });
        }
        let share = allocation_points as f64 / self.total_allocation_points as f64;
        Ok(RewardProjection::from_per_block(
            self.total_reward_per_block * share,
            &self.windows,
        ))
    }

    /// Projection for every pool, in input order
    pub fn distribute(&self, pools: &[PoolRecord]) -> YieldResult<Vec<RewardProjection>> {
        if pools.is_empty() {
            return Ok(Vec::new());
        }
        if self.total_allocation_points == 0 {
            return Err(YieldError::AllocationAccountingError {
                active_pools: pools.len(),
            });
        }
        pools
            .iter()
            .map(|p| self.pool_reward(p.allocation_points))
            .collect()
    }
}
