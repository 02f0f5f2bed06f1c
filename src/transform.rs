//! Transform pipeline orchestration.
//!
//! Coordinates the normalization flow: stored documents → [`Normalizer`] →
//! in-place update → re-validation. Per-record failures are logged and
//! counted; only failing to list the collection aborts a run.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use brand_pipeline_core::models::ID_FIELD;
use brand_pipeline_core::store::{DocumentStore, RecordUpdate};
use brand_pipeline_core::{
    validate_document, Normalizer, RawRecord, TracingReporter, ValidationError,
};

use crate::config::Config;
use crate::sqlite_store::SqliteStore;
use crate::verify;
use crate::{db, migrate};

/// Counters for one transform run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Fields that took their fallback value, across all records.
    pub fallbacks: usize,
}

/// Normalize every document of `collection` in place.
pub async fn transform_all(
    store: &dyn DocumentStore,
    collection: &str,
    normalizer: &Normalizer,
) -> Result<TransformSummary> {
    let documents = store
        .find_all(collection)
        .await
        .with_context(|| format!("Failed to list collection '{}'", collection))?;

    tracing::info!(collection, count = documents.len(), "transforming documents");

    let mut summary = TransformSummary {
        total: documents.len(),
        ..Default::default()
    };

    for raw in &documents {
        let id = raw.display_id();
        match transform_one(store, collection, normalizer, raw).await {
            Ok(fallbacks) => {
                summary.succeeded += 1;
                summary.fallbacks += fallbacks;
                tracing::info!(id = %id, "document validated");
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!(id = %id, error = %format!("{:#}", e), "failed to transform document");
            }
        }
    }

    Ok(summary)
}

/// Returns the number of fallbacks applied to this record.
async fn transform_one(
    store: &dyn DocumentStore,
    collection: &str,
    normalizer: &Normalizer,
    raw: &RawRecord,
) -> Result<usize> {
    let id = raw
        .identity()
        .ok_or_else(|| anyhow::anyhow!("document has no usable _id"))?;

    tracing::debug!(id = %id, original = %serde_json::Value::Object(raw.as_map().clone()), "processing document");

    let normalized = normalizer.normalize(raw);
    let set = normalized.record.to_fields();
    tracing::debug!(id = %id, transformed = %serde_json::Value::Object(set.clone()), "transformed");
    if !normalized.discard.is_empty() {
        tracing::debug!(id = %id, fields = ?normalized.discard, "removing fields");
    }

    let matched = store
        .update_one(collection, &id, &RecordUpdate::new(set, normalized.discard))
        .await?;
    if !matched {
        anyhow::bail!("document not found after update");
    }

    let updated = store
        .find_by_id(collection, &id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("document not found after update"))?;
    ValidationError::check(validate_document(&updated, normalizer.current_year()))?;

    Ok(normalized.defaulted.len())
}

/// Read a JSON array of raw brand documents.
///
/// Extended-JSON identities (`{"$oid": ".."}`) are flattened to their
/// string form.
pub fn load_raw_records(path: &Path) -> Result<Vec<RawRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse input file: {}", path.display()))?;

    let items = match value {
        Value::Array(items) => items,
        _ => anyhow::bail!("{}: expected a JSON array of documents", path.display()),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| -> Result<RawRecord> {
            let mut record = RawRecord::from_value(item).ok_or_else(|| {
                anyhow::anyhow!("{}: element {} is not a JSON object", path.display(), i)
            })?;
            if matches!(record.get(ID_FIELD), Some(Value::Object(_))) {
                if let Some(id) = record.identity() {
                    record.insert(ID_FIELD, Value::String(id));
                }
            }
            Ok(record)
        })
        .collect()
}

pub fn print_summary(summary: &TransformSummary) {
    println!("transform");
    println!("  documents: {}", summary.total);
    println!("  transformed: {}", summary.succeeded);
    println!("  errors: {}", summary.failed);
    println!("  fallbacks applied: {}", summary.fallbacks);
}

/// Import `input` (else `[pipeline].input`, when set), normalize the
/// collection, then verify it.
pub async fn run_transform(config: &Config, input: Option<&Path>) -> Result<()> {
    let input = input.or(config.pipeline.input.as_deref());
    let records = input.map(load_raw_records).transpose()?;

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let result = transform_with_store(config, &store, records.as_deref()).await;
    store.pool().close().await;

    result?;
    println!("ok");
    Ok(())
}

async fn transform_with_store(
    config: &Config,
    store: &SqliteStore,
    records: Option<&[RawRecord]>,
) -> Result<()> {
    migrate::apply(store.pool()).await?;
    let collection = &config.pipeline.collection;

    if let Some(records) = records.filter(|r| !r.is_empty()) {
        store
            .insert_many(collection, records)
            .await
            .context("Failed to import input documents")?;
        tracing::info!(count = records.len(), "imported input documents");
    }

    let normalizer = Normalizer::new(Arc::new(TracingReporter));
    let summary = transform_all(store, collection, &normalizer).await?;
    print_summary(&summary);

    let verified = verify::verify_all(store, collection, normalizer.current_year()).await?;
    verify::print_summary(&verified);
    Ok(())
}
