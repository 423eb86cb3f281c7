//! Supported chains and their Stargate deployments
//!
//! Static lookup keyed by `Chain`. Everything here is process-wide
//! configuration; nothing is mutated after first access.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::YieldError;

// ============================================
// PROTOCOL CONSTANTS
// ============================================

/// Price-feed identifier for the STG reward token
pub const DEFAULT_REWARD_PRICE_ID: &str = "stargate-finance";

/// Sentinel address the native asset price is keyed under
pub const NATIVE_SENTINEL: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

// ============================================
// CHAIN ENUM
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Bsc,
    Avalanche,
    Polygon,
    Arbitrum,
    Optimism,
    Fantom,
}

impl Chain {
    pub const ALL: [Chain; 7] = [
        Chain::Ethereum,
        Chain::Bsc,
        Chain::Avalanche,
        Chain::Polygon,
        Chain::Arbitrum,
        Chain::Optimism,
        Chain::Fantom,
    ];

    /// Static deployment data for this chain
    pub fn info(&self) -> &'static ChainInfo {
        // Every variant is inserted below, so the lookup cannot miss
        &CHAIN_TABLE[self]
    }

    /// Env-var suffix for per-chain overrides (`RPC_URL_ETHEREUM`, ...)
    pub fn env_suffix(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ETHEREUM",
            Chain::Bsc => "BSC",
            Chain::Avalanche => "AVALANCHE",
            Chain::Polygon => "POLYGON",
            Chain::Arbitrum => "ARBITRUM",
            Chain::Optimism => "OPTIMISM",
            Chain::Fantom => "FANTOM",
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.info().name)
    }
}

impl FromStr for Chain {
    type Err = YieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ethereum" | "eth" | "mainnet" => Ok(Chain::Ethereum),
            "bsc" | "bnb" | "binance" => Ok(Chain::Bsc),
            "avalanche" | "avax" => Ok(Chain::Avalanche),
            "polygon" | "matic" => Ok(Chain::Polygon),
            "arbitrum" | "arb" => Ok(Chain::Arbitrum),
            "optimism" | "op" => Ok(Chain::Optimism),
            "fantom" | "ftm" => Ok(Chain::Fantom),
            other => Err(YieldError::UnsupportedChain(other.to_string())),
        }
    }
}

// ============================================
// CHAIN INFO
// ============================================

#[derive(Debug, Clone)]
pub struct StableCoin {
    pub symbol: &'static str,
    pub address: Address,
}

/// Deployment data for one chain
#[derive(Debug, Clone)]
pub struct ChainInfo {
    pub name: &'static str,
    pub chain_id: u64,
    pub default_rpc: &'static str,
    /// Stargate LPStaking (MasterChef) contract
    pub lp_staking: Address,
    /// STG token on this chain
    pub reward_token: Address,
    /// The two stablecoins priced at exactly $1
    pub stablecoins: [StableCoin; 2],
    /// Price-feed platform id for address lookups
    pub price_platform: &'static str,
    /// Price-feed identifier of the native asset
    pub native_price_id: &'static str,
    pub native_symbol: &'static str,
}

impl ChainInfo {
    pub fn is_stablecoin(&self, token: &Address) -> bool {
        self.stablecoins.iter().any(|s| s.address == *token)
    }
}

lazy_static::lazy_static! {
    static ref CHAIN_TABLE: HashMap<Chain, ChainInfo> = {
        let mut m = HashMap::new();
        m.insert(Chain::Ethereum, ChainInfo {
            name: "Ethereum",
            chain_id: 1,
            default_rpc: "https://eth.llamarpc.com",
            lp_staking: address!("B0D502E938ed5f4df2E681fE6E419ff29631d62b"),
            reward_token: address!("Af5191B0De278C7286d6C7CC6ab6BB8A73bA2Cd6"),
            stablecoins: [
                StableCoin {
                    symbol: "USDC",
                    address: address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
                },
                StableCoin {
                    symbol: "USDT",
                    address: address!("dAC17F958D2ee523a2206206994597C13D831ec7"),
                },
            ],
            price_platform: "ethereum",
            native_price_id: "ethereum",
            native_symbol: "ETH",
        });
        m.insert(Chain::Bsc, ChainInfo {
            name: "BSC",
            chain_id: 56,
            default_rpc: "https://bsc-dataseed.binance.org",
            lp_staking: address!("3052A0F6ab15b4AE1df39962d5DdEFacA86DaB47"),
            reward_token: address!("B0D502E938ed5f4df2E681fE6E419ff29631d62b"),
            stablecoins: [
                StableCoin {
                    symbol: "USDT",
                    address: address!("55d398326f99059fF775485246999027B3197955"),
                },
                StableCoin {
                    symbol: "BUSD",
                    address: address!("e9e7CEA3DedcA5984780Bafc599bD69ADd087D56"),
                },
            ],
            price_platform: "binance-smart-chain",
            native_price_id: "binancecoin",
            native_symbol: "BNB",
        });
        m.insert(Chain::Avalanche, ChainInfo {
            name: "Avalanche",
            chain_id: 43114,
            default_rpc: "https://api.avax.network/ext/bc/C/rpc",
            lp_staking: address!("8731d54E9D02c286767d56ac03e8037C07e01e98"),
            reward_token: address!("2F6F07CDcf3588944Bf4C42aC74ff24bF56e7590"),
            stablecoins: [
                StableCoin {
                    symbol: "USDC",
                    address: address!("B97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E"),
                },
                StableCoin {
                    symbol: "USDT",
                    address: address!("9702230A8Ea53601f5cD2dc00fDBc13d4dF4A8c7"),
                },
            ],
            price_platform: "avalanche",
            native_price_id: "avalanche-2",
            native_symbol: "AVAX",
        });
        m.insert(Chain::Polygon, ChainInfo {
            name: "Polygon",
            chain_id: 137,
            default_rpc: "https://polygon-rpc.com",
            lp_staking: address!("8731d54E9D02c286767d56ac03e8037C07e01e98"),
            reward_token: address!("2F6F07CDcf3588944Bf4C42aC74ff24bF56e7590"),
            stablecoins: [
                StableCoin {
                    symbol: "USDC",
                    address: address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
                },
                StableCoin {
                    symbol: "USDT",
                    address: address!("c2132D05D31c914a87C6611C10748AEb04B58e8F"),
                },
            ],
            price_platform: "polygon-pos",
            native_price_id: "matic-network",
            native_symbol: "MATIC",
        });
        m.insert(Chain::Arbitrum, ChainInfo {
            name: "Arbitrum",
            chain_id: 42161,
            default_rpc: "https://arb1.arbitrum.io/rpc",
            lp_staking: address!("eA8DfEE1898a7e0a59f7527F076106d7e44c2176"),
            reward_token: address!("6694340fc020c5E6B96567843da2df01b2CE1eb6"),
            stablecoins: [
                StableCoin {
                    symbol: "USDC",
                    address: address!("FF970A61A04b1cA14834A43f5dE4533eBDDB5CC8"),
                },
                StableCoin {
                    symbol: "USDT",
                    address: address!("Fd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9"),
                },
            ],
            price_platform: "arbitrum-one",
            native_price_id: "ethereum",
            native_symbol: "ETH",
        });
        m.insert(Chain::Optimism, ChainInfo {
            name: "Optimism",
            chain_id: 10,
            default_rpc: "https://mainnet.optimism.io",
            lp_staking: address!("4DeA9e918c6289a52cd469cAC652727B7b412Cd2"),
            reward_token: address!("296F55F8Fb28E498B858d0BcDA06D955B2Cb3f97"),
            stablecoins: [
                StableCoin {
                    symbol: "USDC",
                    address: address!("7F5c764cBc14f9669B88837ca1490cCa17c31607"),
                },
                StableCoin {
                    symbol: "USDT",
                    address: address!("94b008aA00579c1307B0EF2c499aD98a8ce58e58"),
                },
            ],
            price_platform: "optimistic-ethereum",
            native_price_id: "ethereum",
            native_symbol: "ETH",
        });
        m.insert(Chain::Fantom, ChainInfo {
            name: "Fantom",
            chain_id: 250,
            default_rpc: "https://rpc.ftm.tools",
            lp_staking: address!("224D8Fd7aB6AD4c6eb4611Ce56EF35Dec2277F03"),
            reward_token: address!("2F6F07CDcf3588944Bf4C42aC74ff24bF56e7590"),
            stablecoins: [
                StableCoin {
                    symbol: "USDC",
                    address: address!("04068DA6C83AFCFA0e13ba15A6696662335D5B75"),
                },
                StableCoin {
                    symbol: "fUSDT",
                    address: address!("049d68029688eAbF473097a2fC38ef61633A3C7A"),
                },
            ],
            price_platform: "fantom",
            native_price_id: "fantom",
            native_symbol: "FTM",
        });
        m
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_chain_has_info() {
        for chain in Chain::ALL {
            let info = chain.info();
            assert!(!info.name.is_empty());
            assert_ne!(info.lp_staking, Address::ZERO);
            assert_ne!(info.stablecoins[0].address, info.stablecoins[1].address);
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("ETH".parse::<Chain>().unwrap(), Chain::Ethereum);
        assert_eq!("avax".parse::<Chain>().unwrap(), Chain::Avalanche);
        assert_eq!("Arbitrum".parse::<Chain>().unwrap(), Chain::Arbitrum);
    }

    #[test]
    fn test_unsupported_chain_fails_fast() {
        let err = "solana".parse::<Chain>().unwrap_err();
        assert_eq!(err, YieldError::UnsupportedChain("solana".to_string()));
    }

    #[test]
    fn test_stablecoin_lookup() {
        let info = Chain::Ethereum.info();
        let usdc = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
        let weth = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
        assert!(info.is_stablecoin(&usdc));
        assert!(!info.is_stablecoin(&weth));
    }
}
