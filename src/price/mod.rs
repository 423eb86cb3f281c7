//! USD spot price sources

mod coingecko;

pub use coingecko::{CoinGeckoFeed, DEFAULT_PRICE_API_URL};

use alloy_primitives::Address;
use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::YieldResult;

/// A spot-price source.
///
/// Tokens the source has no quote for are simply absent from the returned
/// map; only transport or decode failures are errors.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Prices keyed by token contract address on `platform`
    async fn prices_by_address(
        &self,
        platform: &str,
        tokens: &[Address],
    ) -> YieldResult<HashMap<Address, f64>>;

    /// Prices keyed by the feed's own asset identifiers
    async fn prices_by_identifier(&self, ids: &[String]) -> YieldResult<HashMap<String, f64>>;
}
