//! Cache storage for offsync.
//!
//! Two layers:
//! - [`CacheBackend`] is the raw capability: named buckets of
//!   key → response entries (SQLite, in-memory, or anything else).
//! - [`CacheStore`] wraps a backend and enforces what may be cached:
//!   only 2xx responses, and only for idempotent GET keys.
//!
//! Concurrent writes to the same key are last-writer-wins. That is only
//! sound because every cached entry is a snapshot of a GET; the store
//! refuses anything else rather than relying on callers.

mod memory;
mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use async_trait::async_trait;
use std::sync::Arc;
use sync_types::{unix_millis, BucketId, CacheEntry, CacheKey, Response};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded.
    #[error("corrupt cache entry in {bucket}: {reason}")]
    Corrupt {
        /// Bucket holding the entry.
        bucket: String,
        /// What failed to decode.
        reason: String,
    },
}

/// Backend trait for named response buckets.
///
/// Every operation is individually atomic; there are no cross-bucket
/// transactions.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Create the bucket if it does not exist.
    async fn open(&self, bucket: &str) -> Result<(), StorageError>;

    /// Look up an entry. A missing bucket is a miss.
    async fn get(&self, bucket: &str, key: &CacheKey) -> Result<Option<CacheEntry>, StorageError>;

    /// Insert or overwrite an entry, creating the bucket if needed.
    async fn put(&self, bucket: &str, entry: CacheEntry) -> Result<(), StorageError>;

    /// Keys stored in a bucket.
    async fn keys(&self, bucket: &str) -> Result<Vec<CacheKey>, StorageError>;

    /// Names of every existing bucket.
    async fn buckets(&self) -> Result<Vec<String>, StorageError>;

    /// Delete a bucket and its entries. Returns whether it existed.
    async fn delete(&self, bucket: &str) -> Result<bool, StorageError>;
}

/// Cache store used by the engine.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
}

impl CacheStore {
    /// Wrap a backend.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Create a bucket if it does not exist.
    pub async fn open(&self, bucket: &BucketId) -> Result<(), StorageError> {
        self.backend.open(&bucket.storage_name()).await
    }

    /// Look up `key` in `bucket`.
    pub async fn get(
        &self,
        bucket: &BucketId,
        key: &CacheKey,
    ) -> Result<Option<CacheEntry>, StorageError> {
        self.backend.get(&bucket.storage_name(), key).await
    }

    /// Store a response snapshot.
    ///
    /// Returns `false` without writing when the response is not 2xx or the
    /// key is not a GET.
    pub async fn put(
        &self,
        bucket: &BucketId,
        key: CacheKey,
        response: &Response,
    ) -> Result<bool, StorageError> {
        if !response.is_ok() {
            tracing::debug!("Not caching {} ({}): status {}", key, bucket, response.status());
            return Ok(false);
        }
        if !key.is_idempotent_read() {
            tracing::warn!("Refusing to cache non-GET entry {} in {}", key, bucket);
            return Ok(false);
        }

        let entry = CacheEntry {
            key,
            response: response.clone(),
            stored_at: unix_millis(),
        };
        self.backend.put(&bucket.storage_name(), entry).await?;
        Ok(true)
    }

    /// Keys stored in `bucket`.
    pub async fn keys(&self, bucket: &BucketId) -> Result<Vec<CacheKey>, StorageError> {
        self.backend.keys(&bucket.storage_name()).await
    }

    /// Keys stored in a bucket, by storage name.
    pub async fn keys_named(&self, name: &str) -> Result<Vec<CacheKey>, StorageError> {
        self.backend.keys(name).await
    }

    /// Names of every existing bucket, current or stale.
    pub async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        self.backend.buckets().await
    }

    /// Delete a bucket by storage name.
    pub async fn delete(&self, name: &str) -> Result<bool, StorageError> {
        self.backend.delete(name).await
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore").finish_non_exhaustive()
    }
}
