//! SQLite-backed document store
//!
//! All collections share the `documents` table; each record is one JSON body.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use super::{decode, encode, RecordStore};
use crate::entity::Entity;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Insert one record inside an open transaction
async fn insert_record<E: Entity>(tx: &mut Transaction<'_, Sqlite>, record: &E) -> Result<()> {
    let collection = E::KIND.collection();
    let key = record.id().to_string();
    let body = encode(record)?;

    let result = sqlx::query(
        r#"
        INSERT INTO documents (collection, id, sort_key, body, created_seq)
        VALUES (?, ?, ?, ?,
            (SELECT COALESCE(MAX(created_seq), 0) + 1 FROM documents WHERE collection = ?))
        "#,
    )
    .bind(collection)
    .bind(&key)
    .bind(record.sort_key())
    .bind(&body)
    .bind(collection)
    .execute(&mut **tx)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            Error::AlreadyExists(format!("{} '{}'", E::KIND, key)),
        ),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl<E: Entity> RecordStore<E> for SqliteStore {
    async fn list(&self) -> Result<Vec<E>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT body FROM documents
            WHERE collection = ?
            ORDER BY sort_key ASC, created_seq ASC
            "#,
        )
        .bind(E::KIND.collection())
        .fetch_all(&self.pool)
        .await?;

        bodies.iter().map(|body| decode(body)).collect()
    }

    async fn get(&self, id: &E::Id) -> Result<E> {
        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(E::KIND.collection())
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        match body {
            Some(body) => decode(&body),
            None => Err(Error::NotFound(format!("{} '{}'", E::KIND, id))),
        }
    }

    async fn create(&self, draft: E::Draft) -> Result<E> {
        let id = E::assign_id(&draft);
        let record = E::from_draft(id, draft);

        let mut tx = self.pool.begin().await?;
        insert_record(&mut tx, &record).await?;
        tx.commit().await?;

        debug!("Created {} '{}'", E::KIND, record.id());
        Ok(record)
    }

    async fn update(&self, id: &E::Id, patch: E::Patch) -> Result<E> {
        let collection = E::KIND.collection();
        let key = id.to_string();

        let mut tx = self.pool.begin().await?;

        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(&key)
                .fetch_optional(&mut *tx)
                .await?;

        let mut record: E = match body {
            Some(body) => decode(&body)?,
            None => return Err(Error::NotFound(format!("{} '{}'", E::KIND, key))),
        };
        record.apply_patch(patch);

        sqlx::query(
            r#"
            UPDATE documents
            SET body = ?, sort_key = ?, updated_at = CURRENT_TIMESTAMP
            WHERE collection = ? AND id = ?
            "#,
        )
        .bind(encode(&record)?)
        .bind(record.sort_key())
        .bind(collection)
        .bind(&key)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!("Updated {} '{}'", E::KIND, key);
        Ok(record)
    }

    async fn delete(&self, id: &E::Id) -> Result<()> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(E::KIND.collection())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("{} '{}'", E::KIND, id)));
        }

        debug!("Deleted {} '{}'", E::KIND, id);
        Ok(())
    }

    async fn create_batch(&self, drafts: Vec<E::Draft>) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let count = drafts.len();

        for draft in drafts {
            let id = E::assign_id(&draft);
            let record = E::from_draft(id, draft);
            // Early return drops the transaction, rolling back the whole batch
            insert_record(&mut tx, &record).await?;
        }

        tx.commit().await?;

        debug!("Batch-created {} {} records", count, E::KIND);
        Ok(count)
    }
}
