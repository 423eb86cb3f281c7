//! Linear (non-compounding) yield percentages from a weekly base rate
//!
//! All four horizons are scalar multiples of the weekly figure:
//! daily = weekly / 7, monthly = weekly * 4, yearly = weekly * 52.

use serde::{Deserialize, Serialize};

use crate::error::{YieldError, YieldResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApyFigures {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub yearly: f64,
}

impl ApyFigures {
    pub fn from_weekly(weekly: f64) -> Self {
        Self {
            daily: weekly / 7.0,
            weekly,
            monthly: weekly * 4.0,
            yearly: weekly * 52.0,
        }
    }
}

pub struct ApyCalculator;

impl ApyCalculator {
    /// `reward_per_week * 100 / staked`, both in the same unit
    /// (token units for the token APY, USD for the USD APY)
    pub fn compute(pool_id: u64, reward_per_week: f64, staked: f64) -> YieldResult<ApyFigures> {
        if staked <= 0.0 {
            return Err(YieldError::UndefinedYield { pool_id });
        }
        Ok(ApyFigures::from_weekly(reward_per_week * 100.0 / staked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekly_base_rate() {
        let apy = ApyCalculator::compute(0, 50_400.0, 100_000.0).unwrap();
        assert!((apy.weekly - 50.4).abs() < 1e-9);
        assert!((apy.daily - 7.2).abs() < 1e-9);
        assert!((apy.monthly - 201.6).abs() < 1e-9);
        assert!((apy.yearly - 2620.8).abs() < 1e-9);
    }

    #[test]
    fn test_scalar_multiple_law() {
        let inputs = [
            (1.0, 3.0),
            (123.456, 0.001),
            (9_999_999.0, 42.0),
            (0.0, 5.0),
            (7.77e-6, 1.5e9),
        ];
        for (reward, staked) in inputs {
            let apy = ApyCalculator::compute(1, reward, staked).unwrap();
            let tol = 1e-9 * apy.weekly.abs().max(1.0);
            assert!((apy.yearly - apy.weekly * 52.0).abs() <= tol * 52.0);
            assert!((apy.monthly - apy.weekly * 4.0).abs() <= tol * 4.0);
            assert!((apy.daily - apy.weekly / 7.0).abs() <= tol);
        }
    }

    #[test]
    fn test_zero_stake_is_undefined() {
        let err = ApyCalculator::compute(9, 100.0, 0.0).unwrap_err();
        assert_eq!(err, YieldError::UndefinedYield { pool_id: 9 });
        assert!(!err.is_fatal());
    }
}
