//! Solidity interfaces for the Stargate farm contracts

use alloy_sol_types::sol;

sol! {
    /// Stargate LPStaking (MasterChef-style emission of STG per block)
    interface ILPStaking {
        function poolLength() external view returns (uint256);
        function poolInfo(uint256 pid) external view returns (
            address lpToken,
            uint256 allocPoint,
            uint256 lastRewardBlock,
            uint256 accStargatePerShare
        );
        function userInfo(uint256 pid, address user)
            external view returns (uint256 amount, uint256 rewardDebt);
        function stargatePerBlock() external view returns (uint256);
        function totalAllocPoint() external view returns (uint256);
        function pendingStargate(uint256 pid, address user) external view returns (uint256);
        function stargate() external view returns (address);
    }

    /// Stargate liquidity pool (the LP token staked in LPStaking)
    interface IStargatePool {
        function token() external view returns (address);
        function name() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
    }

    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
}
