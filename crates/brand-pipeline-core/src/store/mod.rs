//! Storage abstraction for Brand Pipeline.
//!
//! The [`DocumentStore`] trait is the whole persistence contract the
//! pipeline needs: collection-level reads, inserts, and in-place updates of
//! schemaless JSON documents. Backends: SQLite (CLI) and in-memory (tests).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::models::{RawRecord, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};

/// In-place modification of one document.
///
/// `set` keys are written first; `unset` keys are then removed unless `set`
/// also names them. `_id` is never touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    pub set: Map<String, Value>,
    pub unset: BTreeSet<String>,
}

impl RecordUpdate {
    pub fn new(set: Map<String, Value>, unset: BTreeSet<String>) -> Self {
        Self { set, unset }
    }
}

/// Abstract document store.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`find_all`](DocumentStore::find_all) | All documents of a collection, insertion order |
/// | [`find_by_id`](DocumentStore::find_by_id) | One document by identity |
/// | [`insert_one`](DocumentStore::insert_one) | Insert, assigning identity and timestamps |
/// | [`insert_many`](DocumentStore::insert_many) | All-or-nothing bulk insert |
/// | [`update_one`](DocumentStore::update_one) | Apply a [`RecordUpdate`] in place |
/// | [`count`](DocumentStore::count) | Number of documents in a collection |
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_all(&self, collection: &str) -> Result<Vec<RawRecord>>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<RawRecord>>;

    /// Insert one document, returning its identity.
    async fn insert_one(&self, collection: &str, record: &RawRecord) -> Result<String> {
        let mut ids = self.insert_many(collection, std::slice::from_ref(record)).await?;
        ids.pop()
            .ok_or_else(|| anyhow::anyhow!("insert into '{}' returned no id", collection))
    }

    /// Insert documents in order. Fails without writing anything if any
    /// identity is already taken.
    async fn insert_many(&self, collection: &str, records: &[RawRecord]) -> Result<Vec<String>>;

    /// Returns `false` when no document has this identity.
    async fn update_one(&self, collection: &str, id: &str, update: &RecordUpdate) -> Result<bool>;

    async fn count(&self, collection: &str) -> Result<u64>;
}

/// Give `record` a string `_id` and creation timestamps, as stored.
///
/// Existing identities are flattened to strings (`{"$oid": ..}` included);
/// records without one get a fresh UUID. Returns the identity.
pub fn prepare_insert(record: &RawRecord, now: &str) -> (String, RawRecord) {
    let mut doc = record.clone();
    let id = doc
        .identity()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    doc.insert(ID_FIELD, Value::String(id.clone()));
    if !doc.contains_key(CREATED_AT_FIELD) {
        doc.insert(CREATED_AT_FIELD, Value::String(now.to_string()));
    }
    if !doc.contains_key(UPDATED_AT_FIELD) {
        doc.insert(UPDATED_AT_FIELD, Value::String(now.to_string()));
    }
    (id, doc)
}

/// Apply `update` to `doc` and refresh `updatedAt`.
pub fn apply_update(doc: &mut RawRecord, update: &RecordUpdate, now: &str) {
    for (key, value) in &update.set {
        if key == ID_FIELD {
            continue;
        }
        doc.insert(key.clone(), value.clone());
    }
    for key in &update.unset {
        if key == ID_FIELD || update.set.contains_key(key) {
            continue;
        }
        doc.remove(key);
    }
    doc.insert(UPDATED_AT_FIELD, Value::String(now.to_string()));
}

/// Current UTC time as stored in timestamp fields.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
