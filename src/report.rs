//! Console and JSON rendering of a `FarmReport`
//!
//! Display-only rounding: APY, percentages and USD get two decimals,
//! token amounts four. JSON keeps full precision.

use console::style;
use eyre::{Result, WrapErr};

use crate::analytics::{PoolMetrics, PriceBook, RewardProjection, UsdMetrics};
use crate::scanner::FarmReport;

const UNAVAILABLE: &str = "unavailable";

// ============================================
// FORMATTING
// ============================================

pub fn usd(value: f64) -> String {
    format!("${:.2}", value)
}

pub fn pct(value: f64) -> String {
    format!("{:.2}%", value)
}

pub fn amount(value: f64, symbol: &str) -> String {
    format!("{:.4} {}", value, symbol)
}

fn or_unavailable<T>(value: Option<T>, fmt: impl Fn(T) -> String) -> String {
    value.map(fmt).unwrap_or_else(|| UNAVAILABLE.to_string())
}

fn windows_line(label: &str, p: &RewardProjection, fmt: impl Fn(f64) -> String) -> String {
    format!(
        "{:<14} day {} | week {} | month {} | year {}",
        label,
        fmt(p.per_day),
        fmt(p.per_week),
        fmt(p.per_month),
        fmt(p.per_year)
    )
}

fn windows_line_opt(
    label: &str,
    p: Option<&RewardProjection>,
    fmt: impl Fn(f64) -> String,
) -> String {
    match p {
        Some(p) => windows_line(label, p, fmt),
        None => format!("{:<14} {}", label, UNAVAILABLE),
    }
}

/// Body lines for one pool, unstyled
pub fn pool_lines(m: &PoolMetrics, reward_symbol: &str) -> Vec<String> {
    let reward = |v: f64| amount(v, reward_symbol);
    let mut lines = vec![
        format!(
            "Allocation:    {} points | staked {} | you {}",
            m.allocation_points,
            amount(m.total_staked_tokens, &m.lp_asset_name),
            amount(m.user_staked_tokens, &m.lp_asset_name),
        ),
        windows_line("Pool rewards:", &m.rewards, reward),
        format!(
            "APY:           {}",
            or_unavailable(m.apy, |a| format!(
                "day {} | week {} | month {} | year {}",
                pct(a.daily),
                pct(a.weekly),
                pct(a.monthly),
                pct(a.yearly)
            ))
        ),
        format!(
            "Your share:    {}",
            or_unavailable(m.user_share.as_ref(), |s| pct(s.staked_pct))
        ),
        windows_line_opt("Your rewards:", m.user_share.as_ref().map(|s| &s.rewards), reward),
        format!("Pending:       {}", amount(m.pending_reward, reward_symbol)),
    ];

    match &m.usd {
        Some(u) => lines.extend(usd_lines(u)),
        None => lines.push(format!(
            "USD:           {} ({})",
            UNAVAILABLE,
            m.usd_unavailable.as_deref().unwrap_or("price missing")
        )),
    }

    lines
}

fn usd_lines(u: &UsdMetrics) -> Vec<String> {
    vec![
        format!(
            "USD:           TVL {} | your stake {} | pending {}",
            usd(u.pool_tvl_usd),
            usd(u.user_staked_usd),
            usd(u.pending_reward_usd)
        ),
        windows_line_opt("Your USD:", u.user_rewards_usd.as_ref(), usd),
        format!("USD APY:       {}", or_unavailable(u.apy, |a| pct(a.yearly))),
    ]
}

/// One line per resolved price, ordered by ticker
pub fn price_lines(book: &PriceBook) -> Vec<String> {
    book.sorted()
        .into_iter()
        .map(|p| format!("{:<10} {:>14}  {:?}", p.ticker, usd(p.usd_price), p.token))
        .collect()
}

// ============================================
// CONSOLE
// ============================================

pub fn print_report(report: &FarmReport) {
    let symbol = report.reward_token.symbol.as_str();
    let w = &report.snapshot.windows;

    println!();
    println!("{}", style("═══════════════════════════════════════════════════════════════").cyan());
    println!(
        "{}",
        style(format!(" FARMSCOPE - {} LPStaking", report.chain)).cyan().bold()
    );
    println!("{}", style("═══════════════════════════════════════════════════════════════").cyan());
    println!("  User:        {:?}", report.user);
    println!(
        "  Block:       #{} ({}s avg block time, {} blocks/day)",
        report.latest_block.number, w.avg_block_time_secs, w.blocks_per_day
    );
    println!(
        "  Emission:    {} per block across {} allocation points",
        amount(report.snapshot.total_reward_per_block, symbol),
        report.snapshot.total_allocation_points
    );
    println!(
        "  {} price:   {}",
        symbol,
        or_unavailable(report.prices.get(&report.reward_token.address), |p| usd(p.usd_price))
    );
    println!(
        "  {} price:   {}",
        report.chain.info().native_symbol,
        or_unavailable(report.prices.native(), |p| usd(p.usd_price))
    );
    println!("  Generated:   {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();

    println!("{}", style("─── PRICES ───").cyan().bold());
    for line in price_lines(&report.prices) {
        println!("  {}", line);
    }
    println!();

    if report.metrics.is_empty() {
        println!(
            "{}",
            style(format!("No active stakes across {} pools.", report.pool_count)).yellow()
        );
        return;
    }

    for m in &report.metrics {
        let header = format!(
            "Pool {} | {} ({})",
            m.pool_id, m.lp_asset_name, m.underlying_asset_name
        );
        if m.usd.is_some() {
            println!("{} {}", style("●").green(), style(header).bold());
        } else {
            println!("{} {}", style("●").yellow(), style(header).bold());
        }
        for line in pool_lines(m, symbol) {
            println!("    {}", line);
        }
        println!();
    }

    let t = &report.totals;
    println!("{}", style("─── TOTALS ───").green().bold());
    println!(
        "  Pools:         {} active ({} priced, {} without USD)",
        report.metrics.len(),
        t.pools_priced,
        t.pools_unpriced
    );
    println!("  Pending:       {}", amount(t.pending_reward, symbol));
    if t.pools_priced > 0 {
        println!("  Your stake:    {}", usd(t.user_staked_usd));
        println!("  {}", windows_line("Your USD:", &t.user_rewards_usd, usd));
        println!("  Pending USD:   {}", usd(t.pending_reward_usd));
    }
    if t.pools_unpriced > 0 {
        println!(
            "{}",
            style("  USD totals exclude pools whose prices were unavailable.").yellow()
        );
    }
    println!();
}

// ============================================
// JSON
// ============================================

pub fn render_json(report: &FarmReport) -> Result<String> {
    serde_json::to_string_pretty(report).wrap_err("failed to serialize report")
}
