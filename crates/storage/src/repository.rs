use async_trait::async_trait;
use progress_core::model::{UserKey, UserProgress};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("record already exists")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Key-value contract for per-user progress documents.
///
/// The store offers per-item atomicity only: each call reads or replaces one
/// document. Two writers racing on the same key are last-write-wins; the
/// service layer documents this as the baseline consistency contract.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Create the initial document for a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a document already exists for the
    /// key, or other storage errors.
    async fn create(&self, key: &UserKey, progress: &UserProgress) -> Result<(), StorageError>;

    /// Fetch the document for a user; `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get(&self, key: &UserKey) -> Result<Option<UserProgress>, StorageError>;

    /// Replace the stored document (upsert, last write wins).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be stored.
    async fn put(&self, key: &UserKey, progress: &UserProgress) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<Mutex<HashMap<UserKey, UserProgress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn create(&self, key: &UserKey, progress: &UserProgress) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(key) {
            return Err(StorageError::Conflict);
        }
        guard.insert(key.clone(), progress.clone());
        Ok(())
    }

    async fn get(&self, key: &UserKey) -> Result<Option<UserProgress>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &UserKey, progress: &UserProgress) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.clone(), progress.clone());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::model::TutorialId;
    use progress_core::time::fixed_now;

    fn key() -> UserKey {
        UserKey::new("ada@example.com").unwrap()
    }

    #[tokio::test]
    async fn create_then_get_roundtrips() {
        let repo = InMemoryRepository::new();
        repo.create(&key(), &UserProgress::new()).await.unwrap();

        let fetched = repo.get(&key()).await.unwrap().expect("record exists");
        assert_eq!(fetched, UserProgress::new());
    }

    #[tokio::test]
    async fn second_create_conflicts() {
        let repo = InMemoryRepository::new();
        repo.create(&key(), &UserProgress::new()).await.unwrap();

        let err = repo.create(&key(), &UserProgress::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.get(&key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_replaces_the_document() {
        let repo = InMemoryRepository::new();
        repo.create(&key(), &UserProgress::new()).await.unwrap();

        let mut updated = UserProgress::new();
        updated.record_tutorial(
            TutorialId::new("s3-intro").unwrap(),
            "Intro to S3",
            "s3",
            30,
            fixed_now(),
            50,
        );
        repo.put(&key(), &updated).await.unwrap();

        let fetched = repo.get(&key()).await.unwrap().expect("record exists");
        assert_eq!(fetched.completed_tutorials().len(), 1);
        assert_eq!(fetched.total_time_minutes(), 30);
    }
}
