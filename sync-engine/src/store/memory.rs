//! In-memory cache backend.
//!
//! Not durable: contents are lost with the process. Used for tests and for
//! embedding the engine where the host persists nothing.

use super::{CacheBackend, StorageError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use sync_types::{CacheEntry, CacheKey};

/// In-memory bucket storage.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    buckets: DashMap<String, HashMap<CacheKey, CacheEntry>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn open(&self, bucket: &str) -> Result<(), StorageError> {
        self.buckets.entry(bucket.to_string()).or_default();
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &CacheKey) -> Result<Option<CacheEntry>, StorageError> {
        Ok(self
            .buckets
            .get(bucket)
            .and_then(|entries| entries.get(key).cloned()))
    }

    async fn put(&self, bucket: &str, entry: CacheEntry) -> Result<(), StorageError> {
        self.buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn keys(&self, bucket: &str) -> Result<Vec<CacheKey>, StorageError> {
        Ok(self
            .buckets
            .get(bucket)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn buckets(&self) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = self.buckets.iter().map(|b| b.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, bucket: &str) -> Result<bool, StorageError> {
        Ok(self.buckets.remove(bucket).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_types::{Request, Response, StatusCode};

    fn entry(path: &str) -> CacheEntry {
        CacheEntry {
            key: Request::get(&format!("https://app.test{path}"))
                .unwrap()
                .cache_key(),
            response: Response::new(StatusCode::OK).with_body(path.to_string()),
            stored_at: 1,
        }
    }

    #[tokio::test]
    async fn get_from_missing_bucket_is_miss() {
        let backend = MemoryBackend::new();
        let e = entry("/a.js");
        assert!(backend.get("nope", &e.key).await.unwrap().is_none());
        assert!(backend.buckets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn put_creates_bucket() {
        let backend = MemoryBackend::new();
        backend.put("static-v1", entry("/a.js")).await.unwrap();
        assert_eq!(backend.buckets().await.unwrap(), vec!["static-v1"]);
    }

    #[tokio::test]
    async fn buckets_are_isolated() {
        let backend = MemoryBackend::new();
        let e = entry("/a.js");
        backend.put("static-v1", e.clone()).await.unwrap();
        assert!(backend.get("static-v2", &e.key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn open_keeps_existing_entries() {
        let backend = MemoryBackend::new();
        let e = entry("/a.js");
        backend.put("static-v1", e.clone()).await.unwrap();
        backend.open("static-v1").await.unwrap();
        assert!(backend.get("static-v1", &e.key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn keys_lists_entries() {
        let backend = MemoryBackend::new();
        backend.put("static-v1", entry("/a.js")).await.unwrap();
        backend.put("static-v1", entry("/b.css")).await.unwrap();
        assert_eq!(backend.keys("static-v1").await.unwrap().len(), 2);
        assert!(backend.keys("other").await.unwrap().is_empty());
    }
}
