//! Post-transform verification of a stored collection.

use anyhow::{Context, Result};
use chrono::Datelike;

use brand_pipeline_core::store::DocumentStore;
use brand_pipeline_core::validate_document;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;
use crate::{db, migrate};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifySummary {
    pub valid: usize,
    pub invalid: usize,
}

/// Validate every document in `collection` against the canonical schema.
pub async fn verify_all(
    store: &dyn DocumentStore,
    collection: &str,
    current_year: i32,
) -> Result<VerifySummary> {
    let documents = store
        .find_all(collection)
        .await
        .with_context(|| format!("Failed to list collection '{}'", collection))?;

    let mut summary = VerifySummary::default();
    for doc in &documents {
        let violations = validate_document(doc, current_year);
        if violations.is_empty() {
            summary.valid += 1;
            let name = doc.get("brandName").and_then(|v| v.as_str()).unwrap_or_default();
            tracing::info!(id = %doc.display_id(), brand = name, "VALID");
        } else {
            summary.invalid += 1;
            let reasons: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
            tracing::error!(id = %doc.display_id(), violations = %reasons.join("; "), "INVALID");
        }
    }

    Ok(summary)
}

pub fn print_summary(summary: &VerifySummary) {
    println!("verify");
    println!("  valid: {}", summary.valid);
    println!("  invalid: {}", summary.invalid);
}

pub async fn run_verify(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let result = verify_with_pool(config, &pool).await;
    pool.close().await;

    print_summary(&result?);
    Ok(())
}

async fn verify_with_pool(config: &Config, pool: &sqlx::SqlitePool) -> Result<VerifySummary> {
    migrate::apply(pool).await?;
    let store = SqliteStore::new(pool.clone());
    verify_all(&store, &config.pipeline.collection, chrono::Utc::now().year()).await
}
