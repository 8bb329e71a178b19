use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::Path;
use std::time::Duration;

mod acquire;
mod discount;
mod error;
mod extract;
mod fetch;
mod html_cache;
mod price;
mod ratings;
mod recommend;
mod snapshot;
mod store;
mod types;

use acquire::Acquisition;
use fetch::Fetcher;
use html_cache::HtmlCache;
use ratings::RatingResolver;
use store::RecordStore;

pub const WISHLIST_URL: &str = "https://www.dekudeals.com/wishlist/8byr34kdnr";
pub const RATINGS_SITE_URL: &str = "https://steamdb.info";

const DATABASE_FILE: &str = "dealscout.db";
const SNAPSHOT_FILE: &str = "wishlist_cache.csv";
const CACHE_DIR: &str = "html_cache";
const PAGES_NAMESPACE: &str = "pages";
const RATINGS_NAMESPACE: &str = "ratings";

/// Politeness pause between successive detail-page fetches.
const DETAIL_FETCH_DELAY: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "dealscout")]
#[command(about = "Wishlist price, rating and discount scout")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire the wishlist record set (database, snapshot, or live scrape)
    Acquire {
        /// Skip the cached tiers and scrape from scratch
        #[arg(short, long)]
        refresh: bool,
        /// Wishlist URL to crawl
        #[arg(long, default_value = WISHLIST_URL)]
        url: String,
    },
    /// Acquire, rank and print recommendations
    Recommend {
        /// Skip the cached tiers and scrape from scratch
        #[arg(short, long)]
        refresh: bool,
        /// Wishlist URL to crawl
        #[arg(long, default_value = WISHLIST_URL)]
        url: String,
    },
    /// Remove the database, snapshot and HTML cache
    Clean,
}

fn build_acquisition() -> Result<Acquisition> {
    let store = RecordStore::open(DATABASE_FILE)?;
    let fetcher = Fetcher::new()?;
    let page_cache = HtmlCache::new(CACHE_DIR, PAGES_NAMESPACE);
    let ratings_cache = HtmlCache::new(CACHE_DIR, RATINGS_NAMESPACE);
    let resolver = RatingResolver::new(RATINGS_SITE_URL, ratings_cache);
    Ok(Acquisition::new(
        store,
        SNAPSHOT_FILE,
        fetcher,
        page_cache,
        resolver,
        DETAIL_FETCH_DELAY,
    ))
}

fn run_acquire(refresh: bool, url: &str) -> Result<()> {
    let acquisition = build_acquisition()?;
    let records = acquisition.acquire(url, refresh)?;
    println!("Acquired {} records.", records.len());
    for record in &records {
        println!("  {}  {:.2}", record.title, record.current_price);
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).chain(std::iter::once('…')).collect()
    }
}

fn run_recommend(refresh: bool, url: &str) -> Result<()> {
    let acquisition = build_acquisition()?;
    let records = acquisition.acquire(url, refresh)?;
    if records.is_empty() {
        println!("No records available. Try `dealscout acquire --refresh`.");
        return Ok(());
    }

    let ranked = recommend::recommend(&records);

    println!(
        "{:<40} {:>10} {:>7} {:>6} {:>7}",
        "Title", "Price", "Avg", "Days", "Score"
    );
    for rec in &ranked {
        let avg = rec
            .avg_score
            .map(|s| format!("{s:.1}"))
            .unwrap_or_else(|| "-".to_string());
        let days = rec
            .record
            .days_since_last_discount
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<40} {:>10.2} {:>7} {:>6} {:>7.3}",
            truncate(&rec.record.title, 40),
            rec.record.current_price,
            avg,
            days,
            rec.recommendation_score
        );
    }

    let mean_price =
        records.iter().map(|r| r.current_price).sum::<f64>() / records.len() as f64;
    println!("\n{} items, average price {:.2}", records.len(), mean_price);
    let scored: Vec<f64> = ranked.iter().filter_map(|r| r.avg_score).collect();
    if !scored.is_empty() {
        println!(
            "average quality score {:.1}",
            scored.iter().sum::<f64>() / scored.len() as f64
        );
    }
    Ok(())
}

fn run_clean() -> Result<()> {
    println!("Cleaning generated files...");

    let db_path = Path::new(DATABASE_FILE);
    if db_path.exists() {
        fs::remove_file(db_path)?;
        println!("  Removed {DATABASE_FILE}");
    }

    let snapshot_path = Path::new(SNAPSHOT_FILE);
    if snapshot_path.exists() {
        fs::remove_file(snapshot_path)?;
        println!("  Removed {SNAPSHOT_FILE}");
    }

    let cache_path = Path::new(CACHE_DIR);
    if cache_path.exists() {
        fs::remove_dir_all(cache_path)?;
        println!("  Removed {CACHE_DIR}/");
    }

    println!("Clean complete!");
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Acquire { refresh, url } => run_acquire(refresh, &url),
        Commands::Recommend { refresh, url } => run_recommend(refresh, &url),
        Commands::Clean => run_clean(),
    }
}
