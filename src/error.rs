//! Error kinds for the yield pipeline
//!
//! Fatal kinds abort the run. `UndefinedYield` and `PriceUnavailable` are
//! caught per pool and only degrade that pool's output.

use alloy_primitives::Address;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum YieldError {
    #[error("chain has only {latest} blocks, need at least {required} to estimate block time")]
    InsufficientChainHistory { latest: u64, required: u64 },

    #[error("block samples #{older} and #{newer} are not a valid {span}-block window")]
    InvalidBlockSamples { older: u64, newer: u64, span: u64 },

    #[error("division by zero in {operation}")]
    DivisionByZero { operation: &'static str },

    #[error("total allocation points is zero while {active_pools} pools are active")]
    AllocationAccountingError { active_pools: usize },

    #[error("yield undefined for pool {pool_id}: zero staked supply")]
    UndefinedYield { pool_id: u64 },

    #[error("no USD price for token {token}")]
    PriceUnavailable { token: Address },

    #[error("{operation} failed: {reason}")]
    ExternalReadFailure { operation: String, reason: String },

    #[error("unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl YieldError {
    /// Build an `ExternalReadFailure` from any displayable source error
    pub fn read_failure(operation: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        YieldError::ExternalReadFailure {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error aborts the whole run
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            YieldError::UndefinedYield { .. } | YieldError::PriceUnavailable { .. }
        )
    }
}

pub type YieldResult<T> = std::result::Result<T, YieldError>;
