//! The user's slice of a pool's rewards
//!
//! User rewards are the pool projection scaled by the user's stake fraction
//! at query time. The fraction is assumed to stay constant over every
//! projection window; deposits and withdrawals by anyone during the window
//! are not modeled.

use serde::{Deserialize, Serialize};

use super::rewards::RewardProjection;
use crate::error::{YieldError, YieldResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserShare {
    /// Percentage of the pool's total stake held by the user
    pub staked_pct: f64,
    pub rewards: RewardProjection,
}

pub struct UserShareCalculator;

impl UserShareCalculator {
    /// Both amounts in decimal token units
    pub fn staked_pct(pool_id: u64, user_staked: f64, pool_total_staked: f64) -> YieldResult<f64> {
        if pool_total_staked <= 0.0 {
            return Err(YieldError::UndefinedYield { pool_id });
        }
        Ok(user_staked * 100.0 / pool_total_staked)
    }

    pub fn user_rewards(pool_reward: &RewardProjection, staked_pct: f64) -> RewardProjection {
        pool_reward.scaled(staked_pct / 100.0)
    }

    pub fn compute(
        pool_id: u64,
        user_staked: f64,
        pool_total_staked: f64,
        pool_reward: &RewardProjection,
    ) -> YieldResult<UserShare> {
        let staked_pct = Self::staked_pct(pool_id, user_staked, pool_total_staked)?;
        Ok(UserShare {
            staked_pct,
            rewards: Self::user_rewards(pool_reward, staked_pct),
        })
    }
}
