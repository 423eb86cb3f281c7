//! Run-scoped records read from the chain
//!
//! Every value here is built once from a raw read and never mutated.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Which block to sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRef {
    Latest,
    Number(u64),
}

/// A (block number, timestamp) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSample {
    pub number: u64,
    pub timestamp: u64,
}

/// ERC-20 metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

/// One LPStaking pool as loaded from `poolInfo` plus its LP / underlying tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolRecord {
    pub pool_id: u64,
    pub allocation_points: u64,
    /// LP tokens held by the staking contract (raw units)
    pub total_staked: U256,
    pub lp_decimals: u8,
    pub lp_asset_name: String,
    pub lp_token_address: Address,
    pub underlying_asset_name: String,
    pub underlying_token_address: Address,
    pub underlying_decimals: u8,
}

impl PoolRecord {
    pub fn total_staked_tokens(&self) -> f64 {
        to_decimal(self.total_staked, self.lp_decimals)
    }
}

/// A user's stake in one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPosition {
    pub pool_id: u64,
    pub staked_amount: U256,
    pub pending_reward: U256,
}

impl UserPosition {
    pub fn has_stake(&self) -> bool {
        !self.staked_amount.is_zero()
    }
}

/// Convert a raw integer amount into decimal token units
pub fn to_decimal(raw: U256, decimals: u8) -> f64 {
    // Decimal string parsing keeps amounts beyond u128 representable
    let whole: f64 = raw.to_string().parse().unwrap_or(0.0);
    whole / 10f64.powi(decimals as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal() {
        let raw = U256::from(1_500_000u64);
        assert!((to_decimal(raw, 6) - 1.5).abs() < 1e-12);

        let ten_stg = U256::from(10u64) * U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(to_decimal(ten_stg, 18), 10.0);
    }

    #[test]
    fn test_to_decimal_beyond_u128() {
        let huge = U256::from(u128::MAX) * U256::from(1000u64);
        let value = to_decimal(huge, 18);
        assert!(value > 3.4e20);
    }

    #[test]
    fn test_has_stake() {
        let mut pos = UserPosition {
            pool_id: 0,
            staked_amount: U256::ZERO,
            pending_reward: U256::from(5u64),
        };
        assert!(!pos.has_stake());
        pos.staked_amount = U256::from(1u64);
        assert!(pos.has_stake());
    }
}
