//! farmscope - Stargate LPStaking yield reporter
//!
//! Run with: cargo run -- scan ethereum 0xYourAddress

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod analytics;
mod chain;
mod chains;
mod config;
mod error;
mod model;
mod price;
mod report;
mod scanner;

use chain::RpcChainFacts;
use chains::Chain;
use config::Config;
use price::CoinGeckoFeed;
use scanner::FarmScanner;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Yield report for Stargate LPStaking positions", long_about = None)]
struct Cli {
    /// TOML config file; environment variables are used when absent
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report rewards, APY and USD values for one address
    Scan {
        /// Chain name (ethereum, bsc, avalanche, polygon, arbitrum, optimism, fantom)
        chain: Chain,
        /// Staker address
        address: Address,
        /// Print the full report as JSON instead of the console view
        #[clap(long)]
        json: bool,
    },
    /// List supported chains and their LPStaking deployments
    Chains,
    /// Print the resolved configuration
    Config,
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "farmscope=info",
        1 => "farmscope=debug",
        _ => "farmscope=trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        error!("Please check your .env file or --config");
        return Err(e);
    }
    Ok(config)
}

fn print_chains() {
    println!();
    println!("{}", style("Supported chains").cyan().bold());
    for chain in Chain::ALL {
        let info = chain.info();
        println!(
            "  {:<10} {:<10} chain id {:<6} LPStaking {:?}",
            style(chain.env_suffix().to_lowercase()).green(),
            info.name,
            info.chain_id,
            info.lp_staking
        );
    }
    println!();
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(s) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(s);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn scan(config: &Config, chain: Chain, user: Address, json: bool) -> Result<()> {
    let rpc_url = config.rpc_url_for(chain);
    debug!("Using RPC {} for {}", rpc_url, chain);

    let facts = RpcChainFacts::new(rpc_url, chain.info())?;
    let feed = CoinGeckoFeed::from_config(config)?;
    let scanner = FarmScanner::new(&facts, &feed, chain, config.reward_price_id.clone());

    let pb = spinner(format!("Reading {} LPStaking state for {:?}...", chain, user));
    let result = scanner.scan(user).await;
    pb.finish_and_clear();

    let report = result.wrap_err_with(|| format!("yield scan on {} failed", chain))?;

    if json {
        println!("{}", report::render_json(&report)?);
    } else {
        report::print_report(&report);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Chains => print_chains(),
        Command::Config => load_config(cli.config.as_ref())?.print_summary(),
        Command::Scan { chain, address, json } => {
            let config = load_config(cli.config.as_ref())?;
            scan(&config, chain, address, json).await?;
        }
    }

    Ok(())
}
