//! Active-pool selection

use crate::model::{PoolRecord, UserPosition};

/// Keep pools with allocation weight in which the user holds a stake.
///
/// Stable filter: output order is pool-ordinal order.
pub fn select_active_pools(
    pools: Vec<(PoolRecord, UserPosition)>,
) -> Vec<(PoolRecord, UserPosition)> {
    pools
        .into_iter()
        .filter(|(pool, position)| pool.allocation_points > 0 && position.has_stake())
        .collect()
}
