//! Runtime configuration for farmscope
//!
//! Loaded from the environment (and `.env`) or a TOML file. Chain
//! deployment data lives in `chains`; this only holds endpoints and
//! knobs an operator might change.

use eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::chains::{Chain, DEFAULT_REWARD_PRICE_ID};
use crate::price::DEFAULT_PRICE_API_URL;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ========== Network Settings ==========
    /// Used for any chain without its own entry in `chain_rpc_urls`
    pub rpc_url: Option<String>,

    /// Per-chain RPC endpoints keyed by lowercase chain key (`ethereum`, `bsc`, ...)
    pub chain_rpc_urls: BTreeMap<String, String>,

    // ========== Price Feed ==========
    pub price_api_url: String,

    /// Optional API key for the price feed
    pub price_api_key: Option<String>,

    /// Timeout for each price-feed request
    pub http_timeout_secs: u64,

    /// Price-feed identifier of the reward token
    pub reward_price_id: String,
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let chain_rpc_urls = Chain::ALL
            .iter()
            .filter_map(|chain| {
                env::var(format!("RPC_URL_{}", chain.env_suffix()))
                    .ok()
                    .map(|url| (chain_key(*chain), url))
            })
            .collect();

        let http_timeout_secs = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .wrap_err_with(|| {
                    format!("HTTP_TIMEOUT_SECS must be a whole number of seconds, got {:?}", raw)
                })?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            rpc_url: env::var("RPC_URL").ok(),
            chain_rpc_urls,
            price_api_url: env::var("PRICE_API_URL")
                .unwrap_or_else(|_| DEFAULT_PRICE_API_URL.to_string()),
            price_api_key: env::var("PRICE_API_KEY").ok().filter(|k| !k.is_empty()),
            http_timeout_secs,
            reward_price_id: env::var("REWARD_PRICE_ID")
                .unwrap_or_else(|_| DEFAULT_REWARD_PRICE_ID.to_string()),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// RPC endpoint for `chain`: its own entry, then `rpc_url`, then the public default
    pub fn rpc_url_for(&self, chain: Chain) -> String {
        self.chain_rpc_urls
            .get(&chain_key(chain))
            .or(self.rpc_url.as_ref())
            .cloned()
            .unwrap_or_else(|| chain.info().default_rpc.to_string())
    }

    pub fn validate(&self) -> Result<()> {
        let urls = self
            .rpc_url
            .iter()
            .map(|u| ("RPC_URL".to_string(), u))
            .chain(
                self.chain_rpc_urls
                    .iter()
                    .map(|(k, u)| (format!("RPC_URL_{}", k.to_uppercase()), u)),
            );
        for (name, url) in urls {
            if url.trim().is_empty() || url.contains("YOUR_API_KEY") {
                return Err(eyre!("Invalid {} - please set a reachable JSON-RPC endpoint", name));
            }
        }

        if let Some(key) = self.chain_rpc_urls.keys().find(|k| k.parse::<Chain>().is_err()) {
            return Err(eyre!("Unknown chain {:?} in chain_rpc_urls", key));
        }
        let url = self.price_api_url.as_str();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(eyre!("PRICE_API_URL must be an http(s) URL (got {:?})", url));
        }
        if self.http_timeout_secs == 0 {
            return Err(eyre!("HTTP_TIMEOUT_SECS must be at least 1"));
        }
        if self.reward_price_id.trim().is_empty() {
            return Err(eyre!("REWARD_PRICE_ID must not be empty"));
        }

        Ok(())
    }

    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              FARMSCOPE - CONFIGURATION                     ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ RPC ENDPOINTS                                              ║");
        for chain in Chain::ALL {
            let source = if self.chain_rpc_urls.contains_key(&chain_key(chain)) {
                "RPC_URL_*"
            } else if self.rpc_url.is_some() {
                "RPC_URL"
            } else {
                "public default"
            };
            println!("║ • {:<16} {:^40} ║", chain.info().name, source);
        }
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ PRICE FEED                                                 ║");
        println!("║ • URL:             {:^40} ║", truncate(&self.price_api_url, 40));
        println!(
            "║ • API Key:         {:^40} ║",
            if self.price_api_key.is_some() { "✓ Configured" } else { "✗ Not Set" }
        );
        println!("║ • Timeout:         {:>38}s ║", self.http_timeout_secs);
        println!("║ • Reward Id:       {:^40} ║", self.reward_price_id);
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            chain_rpc_urls: BTreeMap::new(),
            price_api_url: DEFAULT_PRICE_API_URL.to_string(),
            price_api_key: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            reward_price_id: DEFAULT_REWARD_PRICE_ID.to_string(),
        }
    }
}

fn chain_key(chain: Chain) -> String {
    chain.env_suffix().to_lowercase()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    }
}

// ============================================
// TESTS
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.price_api_url, "https://api.coingecko.com/api/v3");
        assert_eq!(config.http_timeout_secs, 10);
        assert_eq!(config.reward_price_id, "stargate-finance");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rpc_url_precedence() {
        let mut config = Config::default();
        assert_eq!(config.rpc_url_for(Chain::Bsc), Chain::Bsc.info().default_rpc);

        config.rpc_url = Some("http://localhost:8545".to_string());
        assert_eq!(config.rpc_url_for(Chain::Bsc), "http://localhost:8545");

        config
            .chain_rpc_urls
            .insert("bsc".to_string(), "http://bsc.local:8545".to_string());
        assert_eq!(config.rpc_url_for(Chain::Bsc), "http://bsc.local:8545");
        assert_eq!(config.rpc_url_for(Chain::Polygon), "http://localhost:8545");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.http_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rpc_url = Some("https://eth-mainnet.g.alchemy.com/v2/YOUR_API_KEY".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.price_api_url = "api.coingecko.com".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config
            .chain_rpc_urls
            .insert("solana".to_string(), "http://localhost:8899".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_fills_defaults() {
        let path = env::temp_dir().join(format!("farmscope-config-{}.toml", std::process::id()));
        fs::write(
            &path,
            r#"
            http_timeout_secs = 3

            [chain_rpc_urls]
            arbitrum = "http://arb.local:8545"
            "#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.http_timeout_secs, 3);
        assert_eq!(config.price_api_url, DEFAULT_PRICE_API_URL);
        assert_eq!(config.rpc_url_for(Chain::Arbitrum), "http://arb.local:8545");
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(Config::from_file("/nonexistent/farmscope.toml").is_err());
    }
}
