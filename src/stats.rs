//! Collection statistics.
//!
//! A quick summary of what's stored: document count, the oldest and newest
//! brands by founding year, and the smallest and largest by location count.
//! Used by `brands stats` and at the end of `brands run`.

use anyhow::Result;
use sqlx::SqlitePool;

use brand_pipeline_core::store::DocumentStore;
use brand_pipeline_core::RawRecord;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

/// A brand name paired with the value it was ranked by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked {
    pub brand_name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandStats {
    pub total: usize,
    pub oldest: Option<Ranked>,
    pub newest: Option<Ranked>,
    pub smallest: Option<Ranked>,
    pub largest: Option<Ranked>,
}

impl BrandStats {
    /// Documents whose ranking field is not an integer are skipped for that
    /// ranking. Ties keep the earliest document.
    pub fn from_records(records: &[RawRecord]) -> Self {
        let years = ranked_by(records, "yearFounded");
        let locations = ranked_by(records, "numberOfLocations");

        Self {
            total: records.len(),
            oldest: first_by(&years, |a, b| a < b),
            newest: first_by(&years, |a, b| a > b),
            smallest: first_by(&locations, |a, b| a < b),
            largest: first_by(&locations, |a, b| a > b),
        }
    }
}

fn ranked_by(records: &[RawRecord], field: &str) -> Vec<Ranked> {
    records
        .iter()
        .filter_map(|r| {
            let value = r.get(field)?.as_i64()?;
            let brand_name = r
                .get("brandName")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Some(Ranked { brand_name, value })
        })
        .collect()
}

fn first_by(items: &[Ranked], better: impl Fn(i64, i64) -> bool) -> Option<Ranked> {
    let mut best: Option<&Ranked> = None;
    for item in items {
        match best {
            Some(b) if !better(item.value, b.value) => {}
            _ => best = Some(item),
        }
    }
    best.cloned()
}

/// Run the stats command: read the collection and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let result = collect(config, &pool).await;
    pool.close().await;
    let (stats, last_update) = result?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Brand Pipeline: Collection Stats");
    println!("================================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!("  Collection:  {}", config.pipeline.collection);
    println!(
        "  Updated:     {}",
        last_update.map(format_ts_relative).unwrap_or_else(|| "never".to_string())
    );
    println!();
    println!("  Total brands: {}", stats.total);
    print_ranked("Oldest", &stats.oldest, "");
    print_ranked("Newest", &stats.newest, "");
    print_ranked("Smallest", &stats.smallest, " locations");
    print_ranked("Largest", &stats.largest, " locations");
    println!();

    Ok(())
}

async fn collect(config: &Config, pool: &SqlitePool) -> Result<(BrandStats, Option<i64>)> {
    migrate::apply(pool).await?;
    let collection = &config.pipeline.collection;
    let store = SqliteStore::new(pool.clone());
    let records = store.find_all(collection).await?;

    let last_update: Option<i64> =
        sqlx::query_scalar("SELECT MAX(updated_at) FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(pool)
            .await?;

    Ok((BrandStats::from_records(&records), last_update))
}

fn print_ranked(label: &str, ranked: &Option<Ranked>, unit: &str) {
    let label = format!("{}:", label);
    match ranked {
        Some(r) => println!("  {:<13} {} ({}{})", label, r.brand_name, r.value, unit),
        None => println!("  {:<13} -", label),
    }
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Format a Unix timestamp as a relative time string (e.g. "3 hours ago").
fn format_ts_relative(ts: i64) -> String {
    let delta = chrono::Utc::now().timestamp() - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
