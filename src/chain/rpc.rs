//! JSON-RPC implementation of `ChainFacts`
//!
//! Every read is a plain `eth_call` against the chain's LPStaking contract
//! or one of the tokens it references. Reads belonging to one pool run
//! concurrently; nothing is cached across runs.

use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolCall;
use alloy_transport::TransportResult;
use async_trait::async_trait;
use tracing::{debug, trace, warn};

use super::contracts::{IERC20, ILPStaking, IStargatePool};
use super::ChainFacts;
use crate::chains::ChainInfo;
use crate::error::{YieldError, YieldResult};
use crate::model::{BlockRef, BlockSample, PoolRecord, TokenInfo, UserPosition};

pub struct RpcChainFacts {
    provider: DynProvider,
    lp_staking: Address,
    /// STG address from the chain table, checked against `stargate()`
    expected_reward_token: Address,
}

impl RpcChainFacts {
    pub fn new(rpc_url: String, chain: &ChainInfo) -> YieldResult<Self> {
        let url = rpc_url
            .parse()
            .map_err(|e| YieldError::Config(format!("invalid RPC URL {}: {}", rpc_url, e)))?;

        Ok(Self {
            provider: ProviderBuilder::new().connect_http(url).erased(),
            lp_staking: chain.lp_staking,
            expected_reward_token: chain.reward_token,
        })
    }

    /// Helper to call a contract
    async fn call_contract(
        &self,
        to: Address,
        calldata: Vec<u8>,
        operation: &str,
    ) -> YieldResult<Bytes> {
        let tx = TransactionRequest::default()
            .to(to)
            .input(calldata.into());

        trace!("eth_call {} on {:?}", operation, to);
        let result: TransportResult<Bytes> = self.provider.call(tx).await;
        result.map_err(|e| YieldError::read_failure(operation, e))
    }

    /// Encode, call and decode one view function
    async fn read<C>(&self, to: Address, call: C, operation: &str) -> YieldResult<C::Return>
    where
        C: SolCall + Send,
        C::Return: Send,
    {
        let output = self.call_contract(to, call.abi_encode(), operation).await?;
        C::abi_decode_returns(&output).map_err(|e| YieldError::read_failure(operation, e))
    }

    async fn pool_info(&self, pool_id: u64) -> YieldResult<ILPStaking::poolInfoReturn> {
        let operation = format!("poolInfo({})", pool_id);
        self.read(
            self.lp_staking,
            ILPStaking::poolInfoCall { pid: U256::from(pool_id) },
            &operation,
        )
        .await
    }

    /// LP tokens held by the staking contract
    async fn staked_balance(&self, lp_token: Address, pool_id: u64) -> YieldResult<U256> {
        let operation = format!("balanceOf(lp {})", pool_id);
        self.read(
            lp_token,
            IStargatePool::balanceOfCall { account: self.lp_staking },
            &operation,
        )
        .await
    }

    async fn lp_metadata(
        &self,
        lp_token: Address,
        pool_id: u64,
    ) -> YieldResult<(String, u8, Address)> {
        let name_op = format!("name(lp {})", pool_id);
        let decimals_op = format!("decimals(lp {})", pool_id);
        let token_op = format!("token(lp {})", pool_id);
        tokio::try_join!(
            self.read(lp_token, IStargatePool::nameCall {}, &name_op),
            self.read(lp_token, IStargatePool::decimalsCall {}, &decimals_op),
            self.read(lp_token, IStargatePool::tokenCall {}, &token_op),
        )
    }

    async fn token_info(&self, token: Address) -> YieldResult<TokenInfo> {
        let symbol_op = format!("symbol({:?})", token);
        let decimals_op = format!("decimals({:?})", token);
        let (symbol, decimals) = tokio::try_join!(
            self.read(token, IERC20::symbolCall {}, &symbol_op),
            self.read(token, IERC20::decimalsCall {}, &decimals_op),
        )?;
        Ok(TokenInfo {
            address: token,
            symbol,
            decimals,
        })
    }
}

#[async_trait]
impl ChainFacts for RpcChainFacts {
    async fn block_sample(&self, block: BlockRef) -> YieldResult<BlockSample> {
        let tag = match block {
            BlockRef::Latest => BlockNumberOrTag::Latest,
            BlockRef::Number(n) => BlockNumberOrTag::Number(n),
        };
        let operation = format!("eth_getBlockByNumber({})", tag);

        let header = self
            .provider
            .get_block_by_number(tag)
            .await
            .map_err(|e| YieldError::read_failure(operation.clone(), e))?
            .ok_or_else(|| YieldError::read_failure(operation, "block not found"))?
            .header;

        Ok(BlockSample {
            number: header.number,
            timestamp: header.timestamp,
        })
    }

    async fn pool_count(&self) -> YieldResult<u64> {
        let count = self
            .read(self.lp_staking, ILPStaking::poolLengthCall {}, "poolLength")
            .await?;
        Ok(count.saturating_to::<u64>())
    }

    async fn pool(&self, pool_id: u64) -> YieldResult<PoolRecord> {
        let info = self.pool_info(pool_id).await?;

        let ((lp_name, lp_decimals, underlying), total_staked) = tokio::try_join!(
            self.lp_metadata(info.lpToken, pool_id),
            self.staked_balance(info.lpToken, pool_id),
        )?;
        let underlying_info = self.token_info(underlying).await?;

        debug!(
            "pool {}: {} alloc={} staked={}",
            pool_id, lp_name, info.allocPoint, total_staked
        );

        Ok(PoolRecord {
            pool_id,
            allocation_points: info.allocPoint.saturating_to::<u64>(),
            total_staked,
            lp_decimals,
            lp_asset_name: lp_name,
            lp_token_address: info.lpToken,
            underlying_asset_name: underlying_info.symbol,
            underlying_token_address: underlying,
            underlying_decimals: underlying_info.decimals,
        })
    }

    async fn user_position(&self, pool_id: u64, user: Address) -> YieldResult<UserPosition> {
        let pid = U256::from(pool_id);
        let user_op = format!("userInfo({})", pool_id);
        let pending_op = format!("pendingStargate({})", pool_id);
        let (info, pending) = tokio::try_join!(
            self.read(self.lp_staking, ILPStaking::userInfoCall { pid, user }, &user_op),
            self.read(self.lp_staking, ILPStaking::pendingStargateCall { pid, user }, &pending_op),
        )?;

        Ok(UserPosition {
            pool_id,
            staked_amount: info.amount,
            pending_reward: pending,
        })
    }

    async fn total_reward_per_block(&self) -> YieldResult<U256> {
        self.read(self.lp_staking, ILPStaking::stargatePerBlockCall {}, "stargatePerBlock")
            .await
    }

    async fn total_allocation_points(&self) -> YieldResult<u64> {
        let total = self
            .read(self.lp_staking, ILPStaking::totalAllocPointCall {}, "totalAllocPoint")
            .await?;
        Ok(total.saturating_to::<u64>())
    }

    async fn total_staked(&self, pool_id: u64) -> YieldResult<U256> {
        let info = self.pool_info(pool_id).await?;
        self.staked_balance(info.lpToken, pool_id).await
    }

    async fn reward_token(&self) -> YieldResult<TokenInfo> {
        let token = self
            .read(self.lp_staking, ILPStaking::stargateCall {}, "stargate")
            .await?;
        if token != self.expected_reward_token {
            warn!(
                "LPStaking reports reward token {:?}, chain table lists {:?}",
                token, self.expected_reward_token
            );
        }
        self.token_info(token).await
    }
}
