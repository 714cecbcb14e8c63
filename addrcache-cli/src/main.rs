//! addrcache CLI
//!
//! Demo driver for the addrcache recency cache: offers addresses, sleeps
//! across sweep boundaries, and prints the cache so the background
//! eviction is visible.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use addrcache_engine::AddressCache;

/// addrcache - time-bounded cache of recently used addresses
#[derive(Parser)]
#[command(name = "addrcache")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through the sweep lifecycle with timed prints
    Demo {
        /// Expiry window in milliseconds
        #[arg(long, default_value_t = addrcache_core::DEFAULT_EXPIRY_MS)]
        expiry_ms: u64,
        /// Number of addresses to offer initially
        #[arg(long, default_value = "5")]
        addresses: u8,
    },

    /// Exercise the cache contract and print statistics
    Stats {
        /// Number of offer operations
        #[arg(short, long, default_value = "100")]
        ops: u8,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "addrcache=debug,info"
    } else {
        "addrcache=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Demo {
            expiry_ms,
            addresses,
        } => cmd_demo(expiry_ms, addresses),
        Commands::Stats { ops } => cmd_stats(ops),
    }
}

fn demo_addr(n: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(27, 0, 0, n))
}

fn print_cache(cache: &AddressCache<IpAddr>, label: &str) -> Result<()> {
    let entries = cache.snapshot().context("cache unexpectedly closed")?;
    println!("📋 {}", label.cyan().bold());
    if entries.is_empty() {
        println!("   {}", "(empty)".dimmed());
    } else {
        for address in entries {
            println!("   {address}");
        }
    }
    Ok(())
}

/// Reproduces the classic lifecycle walk: fill, watch a sweep empty the
/// cache, then watch a younger entry survive sweeps until its age crosses
/// the window.
fn cmd_demo(expiry_ms: u64, addresses: u8) -> Result<()> {
    println!(
        "{} expiry={}ms",
        "🗄  Starting address cache".cyan().bold(),
        expiry_ms
    );

    let cache: AddressCache<IpAddr> = AddressCache::new(Duration::from_millis(expiry_ms))
        .context("failed to start cache")?;

    for i in 1..=addresses {
        cache.offer(demo_addr(i)).context("offer failed")?;
    }
    print_cache(&cache, "after initial offers")?;

    // One sweep tick past the expiry window: everything ages out.
    std::thread::sleep(Duration::from_millis(6_000));
    print_cache(&cache, "after expiry window + one sweep")?;

    cache.offer(demo_addr(42)).context("offer failed")?;
    std::thread::sleep(Duration::from_millis(3_000));
    print_cache(&cache, "fresh entry, ~1s before next sweep")?;

    std::thread::sleep(Duration::from_millis(4_000));
    print_cache(&cache, "entry younger than the window at last sweep")?;

    std::thread::sleep(Duration::from_millis(1_000));
    print_cache(&cache, "one second later")?;

    std::thread::sleep(Duration::from_millis(1_000));
    print_cache(&cache, "after the sweep that saw it expired")?;

    cache.close();
    println!("{}", "✅ Cache closed".green());
    Ok(())
}

/// Runs a mixed workload and prints the resulting counters as JSON.
fn cmd_stats(ops: u8) -> Result<()> {
    let cache: AddressCache<IpAddr> =
        AddressCache::new(Duration::from_secs(60)).context("failed to start cache")?;

    for i in 0..ops {
        cache.offer(demo_addr(i % 16)).context("offer failed")?;
    }
    cache.remove(&demo_addr(0)).context("remove failed")?;
    cache.pop().context("pop failed")?;

    let stats = cache.stats().context("stats failed")?;
    println!("{}", "📊 Cache statistics:".yellow().bold());
    println!("{}", serde_json::to_string_pretty(&stats)?);

    cache.close();
    Ok(())
}
