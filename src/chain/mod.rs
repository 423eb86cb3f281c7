//! Chain access
//!
//! `ChainFacts` is the read-only view of the LPStaking deployment the yield
//! pipeline consumes. `RpcChainFacts` serves it over JSON-RPC.

mod contracts;
mod rpc;

pub use rpc::RpcChainFacts;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::error::YieldResult;
use crate::model::{BlockRef, BlockSample, PoolRecord, TokenInfo, UserPosition};

#[async_trait]
pub trait ChainFacts: Send + Sync {
    /// Number and timestamp of a block
    async fn block_sample(&self, block: BlockRef) -> YieldResult<BlockSample>;

    /// Number of pools registered in the staking contract
    async fn pool_count(&self) -> YieldResult<u64>;

    /// Pool state, LP / underlying token metadata and total stake
    async fn pool(&self, pool_id: u64) -> YieldResult<PoolRecord>;

    /// Stake and pending reward of `user` in one pool
    async fn user_position(&self, pool_id: u64, user: Address) -> YieldResult<UserPosition>;

    /// Global emission rate, raw reward-token units per block
    async fn total_reward_per_block(&self) -> YieldResult<U256>;

    async fn total_allocation_points(&self) -> YieldResult<u64>;

    /// LP tokens held by the staking contract for one pool (raw units)
    async fn total_staked(&self, pool_id: u64) -> YieldResult<U256>;

    /// The emitted reward token
    async fn reward_token(&self) -> YieldResult<TokenInfo>;
}
