//! CoinGecko-compatible price API
//!
//! Endpoints:
//! - `/simple/token_price/{platform}?contract_addresses=..&vs_currencies=usd`
//! - `/simple/price?ids=..&vs_currencies=usd`

use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::PriceFeed;
use crate::config::Config;
use crate::error::{YieldError, YieldResult};

// ============================================
// CONSTANTS
// ============================================

/// Public CoinGecko API base URL
pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Header carrying the (optional) API key
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

// ============================================
// API RESPONSE TYPES
// ============================================

/// `{"usd": 1.23}`; assets the API knows but cannot quote come back as `{}`
#[derive(Debug, Deserialize)]
struct UsdQuote {
    usd: Option<f64>,
}

type QuoteResponse = HashMap<String, UsdQuote>;

// ============================================
// FEED
// ============================================

pub struct CoinGeckoFeed {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoFeed {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> YieldResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| YieldError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> YieldResult<Self> {
        Self::new(
            config.price_api_url.clone(),
            config.price_api_key.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    async fn get_quotes(&self, url: String, operation: &str) -> YieldResult<QuoteResponse> {
        let start = Instant::now();
        let mut request = self.http_client.get(&url);
        if let Some(ref key) = self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| YieldError::read_failure(operation, e))?
            .error_for_status()
            .map_err(|e| YieldError::read_failure(operation, e))?;

        let quotes: QuoteResponse = response
            .json()
            .await
            .map_err(|e| YieldError::read_failure(operation, e))?;

        debug!("{}: {} quotes in {:?}", operation, quotes.len(), start.elapsed());
        Ok(quotes)
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoFeed {
    async fn prices_by_address(
        &self,
        platform: &str,
        tokens: &[Address],
    ) -> YieldResult<HashMap<Address, f64>> {
        if tokens.is_empty() {
            return Ok(HashMap::new());
        }

        let list = tokens
            .iter()
            .map(|t| format!("{:?}", t))
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/simple/token_price/{}?contract_addresses={}&vs_currencies=usd",
            self.base_url, platform, list
        );

        let quotes = self.get_quotes(url, "token price lookup").await?;
        Ok(address_prices(quotes))
    }

    async fn prices_by_identifier(&self, ids: &[String]) -> YieldResult<HashMap<String, f64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url,
            ids.join(",")
        );

        let quotes = self.get_quotes(url, "asset price lookup").await?;
        Ok(quotes
            .into_iter()
            .filter_map(|(id, q)| q.usd.map(|usd| (id, usd)))
            .collect())
    }
}

/// Re-key an address-keyed response (keys come back lowercased)
fn address_prices(quotes: QuoteResponse) -> HashMap<Address, f64> {
    quotes
        .into_iter()
        .filter_map(|(key, quote)| match (Address::from_str(&key), quote.usd) {
            (Ok(addr), Some(usd)) => Some((addr, usd)),
            (Err(_), _) => {
                warn!("Ignoring price entry with malformed address key {}", key);
                None
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_address_prices_parses_lowercase_keys() {
        let body = r#"{
            "0xaf5191b0de278c7286d6c7cc6ab6bb8a73ba2cd6": {"usd": 0.42},
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2": {},
            "not-an-address": {"usd": 1.0}
        }"#;
        let quotes: QuoteResponse = serde_json::from_str(body).unwrap();
        let prices = address_prices(quotes);

        assert_eq!(prices.len(), 1);
        let stg = address!("Af5191B0De278C7286d6C7CC6ab6BB8A73bA2Cd6");
        assert_eq!(prices.get(&stg), Some(&0.42));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let feed = CoinGeckoFeed::new(
            "https://api.coingecko.com/api/v3/".to_string(),
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(feed.base_url, DEFAULT_PRICE_API_URL);
    }

    #[tokio::test]
    async fn test_empty_queries_skip_network() {
        let feed =
            CoinGeckoFeed::new("http://127.0.0.1:9".to_string(), None, Duration::from_secs(1))
                .unwrap();
        assert!(feed.prices_by_address("ethereum", &[]).await.unwrap().is_empty());
        assert!(feed.prices_by_identifier(&[]).await.unwrap().is_empty());
    }
}
