//! Yield analytics
//!
//! Pure, synchronous stages over already-fetched chain and price data:
//! - block time estimation and window block counts
//! - active pool selection
//! - emission split by allocation points
//! - token and USD APY
//! - user share of pool rewards
//! - USD valuation with stablecoin / reward / native price rules

pub mod apy;
pub mod block_time;
pub mod metrics;
pub mod rewards;
pub mod selector;
pub mod share;
pub mod valuation;

pub use block_time::BlockTimeEstimator;
pub use metrics::{build_pool_metrics, ChainSnapshot, PoolMetrics, ReportTotals};
pub use rewards::RewardProjection;
pub use selector::select_active_pools;
pub use valuation::{PriceBook, UsdMetrics, ValuationEngine};
