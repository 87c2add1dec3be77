use chrono::Utc;
use progress_core::model::{UserKey, UserProgress};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{ProgressRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn document_json(progress: &UserProgress) -> Result<String, StorageError> {
    serde_json::to_string(progress).map_err(ser)
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn create(&self, key: &UserKey, progress: &UserProgress) -> Result<(), StorageError> {
        let document = document_json(progress)?;

        let res = sqlx::query(
            r"
                INSERT INTO user_progress (user_key, document, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_key) DO NOTHING
            ",
        )
        .bind(key.as_str())
        .bind(document)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }
        Ok(())
    }

    async fn get(&self, key: &UserKey) -> Result<Option<UserProgress>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT document
                FROM user_progress
                WHERE user_key = ?1
            ",
        )
        .bind(key.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => {
                let document: String = row.try_get("document").map_err(ser)?;
                let progress = serde_json::from_str(&document).map_err(ser)?;
                Ok(Some(progress))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &UserKey, progress: &UserProgress) -> Result<(), StorageError> {
        let document = document_json(progress)?;

        sqlx::query(
            r"
                INSERT INTO user_progress (user_key, document, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_key) DO UPDATE SET
                    document = excluded.document,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(key.as_str())
        .bind(document)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
