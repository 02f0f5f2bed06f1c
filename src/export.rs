//! Export a collection as a pretty-printed JSON array.

use anyhow::{Context, Result};
use std::path::Path;

use brand_pipeline_core::store::DocumentStore;
use brand_pipeline_core::RawRecord;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

/// Every document in `collection`, in insertion order.
pub async fn export_records(store: &dyn DocumentStore, collection: &str) -> Result<Vec<RawRecord>> {
    store
        .find_all(collection)
        .await
        .with_context(|| format!("Failed to read collection '{}'", collection))
}

pub fn to_json(records: &[RawRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Export the configured collection.
///
/// Writes to `output` if given, else to `[export].path`, else to stdout
/// for piping.
pub async fn run_export(config: &Config, output: Option<&Path>) -> Result<()> {
    let pool = db::connect(config).await?;
    let records = export_with_pool(config, &pool).await;
    pool.close().await;
    let records = records?;

    let json = to_json(&records)?;

    match output.or(config.export.path.as_deref()) {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            eprintln!("Exported {} documents to {}", records.len(), path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

async fn export_with_pool(config: &Config, pool: &sqlx::SqlitePool) -> Result<Vec<RawRecord>> {
    migrate::apply(pool).await?;
    let store = SqliteStore::new(pool.clone());
    export_records(&store, &config.pipeline.collection).await
}
