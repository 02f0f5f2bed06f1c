//! SQLite-backed [`DocumentStore`] implementation.
//!
//! Every document is one row of the `documents` table: collection name,
//! identity, and the JSON body. Insertion order is the autoincrement `seq`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use brand_pipeline_core::models::RawRecord;
use brand_pipeline_core::store::{
    apply_update, prepare_insert, timestamp_now, DocumentStore, RecordUpdate,
};

/// SQLite implementation of the [`DocumentStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn parse_body(body: &str) -> Result<RawRecord> {
    serde_json::from_str(body).context("stored document body is not a JSON object")
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<RawRecord>> {
        let rows = sqlx::query("SELECT body FROM documents WHERE collection = ? ORDER BY seq")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| parse_body(row.get::<&str, _>("body")))
            .collect()
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<RawRecord>> {
        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        body.as_deref().map(parse_body).transpose()
    }

    async fn insert_many(&self, collection: &str, records: &[RawRecord]) -> Result<Vec<String>> {
        let now = timestamp_now();
        let now_ts = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(records.len());

        for record in records {
            let (id, doc) = prepare_insert(record, &now);
            let body = serde_json::to_string(&doc)?;
            sqlx::query(
                "INSERT INTO documents (collection, id, body, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(collection)
            .bind(&id)
            .bind(&body)
            .bind(now_ts)
            .bind(now_ts)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert document '{}' into '{}'", id, collection))?;
            ids.push(id);
        }

        tx.commit().await?;
        Ok(ids)
    }

    async fn update_one(&self, collection: &str, id: &str, update: &RecordUpdate) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let mut doc = match body {
            Some(b) => parse_body(&b)?,
            None => return Ok(false),
        };
        apply_update(&mut doc, update, &timestamp_now());

        sqlx::query(
            "UPDATE documents SET body = ?, updated_at = ? WHERE collection = ? AND id = ?",
        )
        .bind(serde_json::to_string(&doc)?)
        .bind(chrono::Utc::now().timestamp())
        .bind(collection)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(n.max(0) as u64)
    }
}
