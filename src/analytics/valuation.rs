//! USD pricing of stakes and rewards
//!
//! PRICE RULES:
//! - the chain's two stablecoins are never queried and always cost $1
//! - other underlying tokens are priced by contract address
//! - the reward token is priced by its feed identifier, then keyed under
//!   its on-chain address
//! - the native asset is priced by its feed identifier, then keyed under
//!   `NATIVE_SENTINEL`
//!
//! A Stargate LP token is valued 1:1 against its underlying asset.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::apy::{ApyCalculator, ApyFigures};
use super::rewards::RewardProjection;
use super::share::UserShare;
use crate::chains::{ChainInfo, NATIVE_SENTINEL};
use crate::error::{YieldError, YieldResult};
use crate::model::{to_decimal, PoolRecord, TokenInfo, UserPosition};

// ============================================
// PRICE BOOK
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedToken {
    pub token: Address,
    pub usd_price: f64,
    pub ticker: String,
}

/// Resolved prices keyed by token address
#[derive(Debug, Clone, Default, Serialize)]
pub struct PriceBook {
    tokens: HashMap<Address, PricedToken>,
}

impl PriceBook {
    pub fn insert(&mut self, token: Address, usd_price: f64, ticker: impl Into<String>) {
        self.tokens.insert(
            token,
            PricedToken {
                token,
                usd_price,
                ticker: ticker.into(),
            },
        );
    }

    pub fn get(&self, token: &Address) -> Option<&PricedToken> {
        self.tokens.get(token)
    }

    pub fn price(&self, token: &Address) -> YieldResult<f64> {
        self.tokens
            .get(token)
            .map(|t| t.usd_price)
            .ok_or(YieldError::PriceUnavailable { token: *token })
    }

    pub fn native(&self) -> Option<&PricedToken> {
        self.tokens.get(&NATIVE_SENTINEL)
    }

    /// Entries ordered by ticker, for display
    pub fn sorted(&self) -> Vec<&PricedToken> {
        let mut entries: Vec<_> = self.tokens.values().collect();
        entries.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        entries
    }
}

/// What to ask the price feed for
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuery {
    pub platform: &'static str,
    /// Non-stable underlying tokens, deduplicated, in first-seen order
    pub addresses: Vec<Address>,
    /// Reward token id, then native asset id
    pub identifiers: Vec<String>,
}

// ============================================
// USD METRICS
// ============================================

/// USD view of one pool. Present only when every needed price resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsdMetrics {
    pub underlying_price: f64,
    pub reward_price: f64,
    pub pool_tvl_usd: f64,
    pub user_staked_usd: f64,
    pub pool_rewards_usd: RewardProjection,
    /// `None` when the user's share is undefined
    pub user_rewards_usd: Option<RewardProjection>,
    pub pending_reward_usd: f64,
    /// Reward value over stake value, same linear scaling as the token APY
    pub apy: Option<ApyFigures>,
}

// ============================================
// VALUATION ENGINE
// ============================================

pub struct ValuationEngine<'a> {
    chain: &'a ChainInfo,
    reward_price_id: String,
}

impl<'a> ValuationEngine<'a> {
    pub fn new(chain: &'a ChainInfo, reward_price_id: impl Into<String>) -> Self {
        Self {
            chain,
            reward_price_id: reward_price_id.into(),
        }
    }

    pub fn plan(&self, pools: &[PoolRecord]) -> PriceQuery {
        let mut addresses: Vec<Address> = Vec::new();
        for pool in pools {
            let token = pool.underlying_token_address;
            if self.chain.is_stablecoin(&token) || addresses.contains(&token) {
                continue;
            }
            addresses.push(token);
        }

        let mut identifiers = vec![self.reward_price_id.clone()];
        if self.chain.native_price_id != self.reward_price_id {
            identifiers.push(self.chain.native_price_id.to_string());
        }

        PriceQuery {
            platform: self.chain.price_platform,
            addresses,
            identifiers,
        }
    }

    /// Merge feed responses into a price book, applying the price rules
    pub fn assemble(
        &self,
        pools: &[PoolRecord],
        reward: &TokenInfo,
        by_address: &HashMap<Address, f64>,
        by_identifier: &HashMap<String, f64>,
    ) -> PriceBook {
        let mut book = PriceBook::default();

        for pool in pools {
            let token = pool.underlying_token_address;
            if self.chain.is_stablecoin(&token) {
                continue;
            }
            match by_address.get(&token) {
                Some(&price) => book.insert(token, price, pool.underlying_asset_name.clone()),
                None => debug!("No feed price for {} ({:?})", pool.underlying_asset_name, token),
            }
        }

        for stable in &self.chain.stablecoins {
            book.insert(stable.address, 1.0, stable.symbol);
        }

        if let Some(&price) = by_identifier.get(&self.reward_price_id) {
            book.insert(reward.address, price, reward.symbol.clone());
        }
        if let Some(&price) = by_identifier.get(self.chain.native_price_id) {
            book.insert(NATIVE_SENTINEL, price, self.chain.native_symbol);
        }

        book
    }

    /// USD figures for one pool; `PriceUnavailable` when the underlying or
    /// reward token has no price
    pub fn value_pool(
        &self,
        book: &PriceBook,
        pool: &PoolRecord,
        position: &UserPosition,
        pool_reward: &RewardProjection,
        share: Option<&UserShare>,
        reward: &TokenInfo,
    ) -> YieldResult<UsdMetrics> {
        let underlying_price = book.price(&pool.underlying_token_address)?;
        let reward_price = book.price(&reward.address)?;

        let pool_tvl_usd = pool.total_staked_tokens() * underlying_price;
        let user_staked = to_decimal(position.staked_amount, pool.lp_decimals);
        let user_staked_usd = user_staked * underlying_price;
        let pool_rewards_usd = pool_reward.scaled(reward_price);
        let pending_reward = to_decimal(position.pending_reward, reward.decimals);
        let pending_reward_usd = pending_reward * reward_price;

        Ok(UsdMetrics {
            underlying_price,
            reward_price,
            pool_tvl_usd,
            user_staked_usd,
            pool_rewards_usd,
            user_rewards_usd: share.map(|s| s.rewards.scaled(reward_price)),
            pending_reward_usd,
            apy: ApyCalculator::compute(pool.pool_id, pool_rewards_usd.per_week, pool_tvl_usd).ok(),
        })
    }
}
