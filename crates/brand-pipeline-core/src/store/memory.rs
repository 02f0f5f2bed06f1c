//! In-memory [`DocumentStore`] implementation for testing.
//!
//! Collections are `Vec`s in a `HashMap` behind `std::sync::RwLock`, so
//! insertion order is preserved the same way the SQLite store preserves it.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::models::RawRecord;

use super::{apply_update, prepare_insert, timestamp_now, DocumentStore, RecordUpdate};

struct StoredDoc {
    id: String,
    doc: RawRecord,
}

/// In-memory store for tests.
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<StoredDoc>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<RawRecord>> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().map(|s| s.doc.clone()).collect())
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<RawRecord>> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|s| s.id == id))
            .map(|s| s.doc.clone()))
    }

    async fn insert_many(&self, collection: &str, records: &[RawRecord]) -> Result<Vec<String>> {
        let now = timestamp_now();
        let mut collections = self.collections.write().map_err(poisoned)?;
        let docs = collections.entry(collection.to_string()).or_default();

        let mut prepared: Vec<StoredDoc> = Vec::with_capacity(records.len());
        for record in records {
            let (id, doc) = prepare_insert(record, &now);
            if docs.iter().chain(prepared.iter()).any(|s| s.id == id) {
                bail!("duplicate id '{}' in collection '{}'", id, collection);
            }
            prepared.push(StoredDoc { id, doc });
        }

        let ids = prepared.iter().map(|s| s.id.clone()).collect();
        docs.extend(prepared);
        Ok(ids)
    }

    async fn update_one(&self, collection: &str, id: &str, update: &RecordUpdate) -> Result<bool> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        let stored = match collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|s| s.id == id))
        {
            Some(s) => s,
            None => return Ok(false),
        };
        apply_update(&mut stored.doc, update, &timestamp_now());
        Ok(true)
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections.get(collection).map_or(0, |d| d.len() as u64))
    }
}
