//! Identity and addressing types for offsync.

use http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::Response;

/// Identifier assigned to a captured offline write.
///
/// UUID v4 format. The host's sync adapter uses it to correlate the
/// `OFFLINE_QUEUE` message with the 202 acknowledgement the caller received.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncId(uuid::Uuid);

impl SyncId {
    /// Create a new random SyncId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for SyncId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SyncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SyncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyncId({})", self.0)
    }
}

/// A named, versioned cache bucket (e.g. `static-v3`).
///
/// The rendered name is what the cache backend stores; changing the version
/// yields a different bucket, which is how a deploy supersedes old caches.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketId {
    name: String,
    version: String,
}

impl BucketId {
    /// Create a bucket id from a logical name and a version tag.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// The logical bucket name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version tag.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The storage name, `name-version`.
    pub fn storage_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

impl fmt::Debug for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BucketId({})", self)
    }
}

/// Key of a cache entry: method plus normalized URL.
///
/// Normalization drops the fragment; the query string is part of the key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    method: Method,
    url: Url,
}

impl CacheKey {
    /// Create a key, normalizing the URL.
    pub fn new(method: Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self { method, url }
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The normalized URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether the key addresses an idempotent read (GET).
    pub fn is_idempotent_read(&self) -> bool {
        self.method == Method::GET
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", self)
    }
}

/// A stored response snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The key this entry is stored under.
    pub key: CacheKey,
    /// The stored response.
    pub response: Response,
    /// Unix milliseconds when the entry was written.
    pub stored_at: u64,
}
