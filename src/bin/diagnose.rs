//! Diagnostic tool - Check environment configuration
//!
//! Run with: cargo run --bin diagnose

use std::env;

const CHAINS: [(&str, &str); 7] = [
    ("ETHEREUM", "Ethereum"),
    ("BSC", "BNB Chain"),
    ("AVALANCHE", "Avalanche"),
    ("POLYGON", "Polygon"),
    ("ARBITRUM", "Arbitrum"),
    ("OPTIMISM", "Optimism"),
    ("FANTOM", "Fantom"),
];

fn mask(url: &str) -> String {
    let chars: Vec<char> = url.chars().collect();
    if chars.len() > 50 {
        let head: String = chars[..30].iter().collect();
        let tail: String = chars[chars.len() - 15..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        url.to_string()
    }
}

fn section(title: &str) {
    println!("\n═══════════════════════════════════════════════════");
    println!("  {}", title);
    println!("═══════════════════════════════════════════════════\n");
}

fn main() {
    println!("🔍 FARMSCOPE DIAGNOSTIC CHECK");

    let dotenv = dotenvy::dotenv();

    section("ENVIRONMENT");
    match dotenv {
        Ok(path) => println!("  .env: loaded from {}", path.display()),
        Err(_) => println!("  .env: not found (using process environment only)"),
    }

    section("RPC ENDPOINTS");
    let global = env::var("RPC_URL").ok().filter(|u| !u.is_empty());
    match &global {
        Some(url) => println!("  RPC_URL: {}", mask(url)),
        None => println!("  RPC_URL: not set"),
    }
    println!();

    let mut placeholders = 0;
    for (suffix, name) in CHAINS {
        let key = format!("RPC_URL_{}", suffix);
        let (source, url) = match env::var(&key).ok().filter(|u| !u.is_empty()) {
            Some(url) => (key.clone(), Some(url)),
            None => match &global {
                Some(url) => ("RPC_URL".to_string(), Some(url.clone())),
                None => ("public default".to_string(), None),
            },
        };
        let marker = match &url {
            Some(u) if u.contains("YOUR_API_KEY") => {
                placeholders += 1;
                "❌ placeholder"
            }
            Some(_) => "✅",
            None => "○",
        };
        println!("  {:<10} {} {}", name, marker, source);
        if let Some(u) = url {
            println!("    └─ {}", mask(&u));
        }
    }

    section("PRICE FEED");
    let checks = [
        ("PRICE_API_URL", "https://api.coingecko.com/api/v3", "Price API base URL"),
        ("HTTP_TIMEOUT_SECS", "10", "Per-request timeout"),
        ("REWARD_PRICE_ID", "stargate-finance", "Reward token price id"),
    ];
    for (key, default, desc) in checks {
        let value = env::var(key).unwrap_or_else(|_| default.to_string());
        let is_default = env::var(key).is_err();
        let marker = if is_default { "(default)" } else { "(from env)" };
        println!("  {}: {} {}", key, value, marker);
        println!("    └─ {}\n", desc);
    }

    let api_key = env::var("PRICE_API_KEY").map(|k| !k.is_empty()).unwrap_or(false);
    println!(
        "  PRICE_API_KEY: {}",
        if api_key { "✅ Set" } else { "○ Not set (public rate limits)" }
    );

    let timeout_ok = env::var("HTTP_TIMEOUT_SECS")
        .map(|v| v.parse::<u64>().map(|n| n > 0).unwrap_or(false))
        .unwrap_or(true);

    section("STATUS");
    if placeholders > 0 || !timeout_ok {
        if placeholders > 0 {
            println!("  ⚠️  {} chain(s) resolve to a placeholder RPC URL", placeholders);
        }
        if !timeout_ok {
            println!("  ⚠️  HTTP_TIMEOUT_SECS must be a positive whole number");
        }
        println!("\n❌ Diagnostic found problems\n");
        std::process::exit(1);
    }

    println!("✅ Diagnostic complete!\n");
}
