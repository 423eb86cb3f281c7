//! Empirical block time and block counts per window

use serde::{Deserialize, Serialize};

use crate::error::{YieldError, YieldResult};
use crate::model::BlockSample;

/// Distance in blocks between the two timestamp samples
pub const BLOCK_SAMPLE_SPAN: u64 = 100;

/// Block counts per projection window.
///
/// A "month" is four weeks and a "year" twelve such months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockWindows {
    pub avg_block_time_secs: u64,
    pub blocks_per_hour: u64,
    pub blocks_per_day: u64,
    pub blocks_per_week: u64,
    pub blocks_per_month: u64,
    pub blocks_per_year: u64,
}

impl BlockWindows {
    /// Cascade block counts from a whole-second block time
    pub fn from_block_time(avg_block_time_secs: u64) -> YieldResult<Self> {
        if avg_block_time_secs == 0 {
            return Err(YieldError::DivisionByZero {
                operation: "blocks per hour (sub-second block time)",
            });
        }

        let blocks_per_hour = 3600 / avg_block_time_secs;
        if blocks_per_hour == 0 {
            return Err(YieldError::DivisionByZero {
                operation: "blocks per hour (block time over an hour)",
            });
        }
        let blocks_per_day = blocks_per_hour * 24;
        let blocks_per_week = blocks_per_day * 7;
        let blocks_per_month = blocks_per_week * 4;
        let blocks_per_year = blocks_per_month * 12;

        Ok(Self {
            avg_block_time_secs,
            blocks_per_hour,
            blocks_per_day,
            blocks_per_week,
            blocks_per_month,
            blocks_per_year,
        })
    }
}

pub struct BlockTimeEstimator;

impl BlockTimeEstimator {
    /// Block number of the older sample, given the latest block
    pub fn older_sample_number(latest: u64) -> YieldResult<u64> {
        if latest < BLOCK_SAMPLE_SPAN {
            return Err(YieldError::InsufficientChainHistory {
                latest,
                required: BLOCK_SAMPLE_SPAN,
            });
        }
        Ok(latest - BLOCK_SAMPLE_SPAN)
    }

    /// Average block time over the sample window, truncated to whole seconds
    pub fn estimate(older: BlockSample, newer: BlockSample) -> YieldResult<BlockWindows> {
        let invalid = YieldError::InvalidBlockSamples {
            older: older.number,
            newer: newer.number,
            span: BLOCK_SAMPLE_SPAN,
        };
        if newer.number.checked_sub(older.number) != Some(BLOCK_SAMPLE_SPAN) {
            return Err(invalid);
        }
        let elapsed = newer.timestamp.checked_sub(older.timestamp).ok_or(invalid)?;

        BlockWindows::from_block_time(elapsed / BLOCK_SAMPLE_SPAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(number: u64, timestamp: u64) -> BlockSample {
        BlockSample { number, timestamp }
    }

    #[test]
    fn test_twelve_second_chain() {
        let windows =
            BlockTimeEstimator::estimate(sample(1000, 50_000), sample(1100, 51_200)).unwrap();

        assert_eq!(windows.avg_block_time_secs, 12);
        assert_eq!(windows.blocks_per_hour, 300);
        assert_eq!(windows.blocks_per_day, 7200);
        assert_eq!(windows.blocks_per_week, 50400);
        assert_eq!(windows.blocks_per_month, 201600);
        assert_eq!(windows.blocks_per_year, 2419200);
    }

    #[test]
    fn test_block_time_truncates() {
        // 1299s / 100 = 12.99 -> 12
        let windows = BlockTimeEstimator::estimate(sample(0, 0), sample(100, 1299)).unwrap();
        assert_eq!(windows.avg_block_time_secs, 12);
    }

    #[test]
    fn test_non_dividing_block_time_floors() {
        // 3600 / 7 = 514.28 -> 514
        let windows = BlockWindows::from_block_time(7).unwrap();
        assert_eq!(windows.blocks_per_hour, 514);
        assert_eq!(windows.blocks_per_day, 514 * 24);
    }

    #[test]
    fn test_sub_second_chain_is_division_by_zero() {
        let err = BlockTimeEstimator::estimate(sample(500, 1000), sample(600, 1050)).unwrap_err();
        assert!(matches!(err, YieldError::DivisionByZero { .. }));
    }

    #[test]
    fn test_block_time_over_an_hour_is_rejected() {
        let err = BlockTimeEstimator::estimate(sample(0, 0), sample(100, 400_000)).unwrap_err();
        assert!(matches!(err, YieldError::DivisionByZero { .. }));

        // 3600s still yields one block per hour
        let windows = BlockWindows::from_block_time(3600).unwrap();
        assert_eq!(windows.blocks_per_hour, 1);
        assert_eq!(windows.blocks_per_year, 24 * 7 * 4 * 12);
    }

    #[test]
    fn test_short_chain_history() {
        let err = BlockTimeEstimator::older_sample_number(42).unwrap_err();
        assert_eq!(err, YieldError::InsufficientChainHistory { latest: 42, required: 100 });
        assert_eq!(BlockTimeEstimator::older_sample_number(100).unwrap(), 0);
    }

    #[test]
    fn test_rejects_wrong_span_and_backwards_time() {
        assert!(matches!(
            BlockTimeEstimator::estimate(sample(0, 0), sample(99, 1200)),
            Err(YieldError::InvalidBlockSamples { .. })
        ));
        assert!(matches!(
            BlockTimeEstimator::estimate(sample(0, 5000), sample(100, 1200)),
            Err(YieldError::InvalidBlockSamples { .. })
        ));
    }
}
