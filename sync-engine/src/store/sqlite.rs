//! SQLite cache backend.
//!
//! Durable across restarts. Headers are stored as a blob of
//! `name: value\n` lines so that non-UTF-8 header bytes survive intact.

use super::{CacheBackend, StorageError};
use async_trait::async_trait;
use bytes::Bytes;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use sync_types::header::HeaderName;
use sync_types::{
    unix_millis, CacheEntry, CacheKey, HeaderMap, HeaderValue, Method, Response, StatusCode, Url,
};

/// SQLite-based bucket storage.
///
/// Uses WAL mode for concurrent reads/writes.
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Open (or create) the database at `path`.
    pub async fn new(path: &Path) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let backend = Self { pool };
        backend.run_migrations().await?;
        Ok(backend)
    }

    /// Create an in-memory database (for testing).
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(":memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let backend = Self { pool };
        backend.run_migrations().await?;
        Ok(backend)
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS buckets (
                name TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                bucket TEXT NOT NULL,
                method TEXT NOT NULL,
                url TEXT NOT NULL,
                status INTEGER NOT NULL,
                headers BLOB NOT NULL,
                body BLOB NOT NULL,
                stored_at INTEGER NOT NULL,
                PRIMARY KEY (bucket, method, url)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CacheBackend for SqliteBackend {
    async fn open(&self, bucket: &str) -> Result<(), StorageError> {
        sqlx::query("INSERT OR IGNORE INTO buckets (name, created_at) VALUES (?1, ?2)")
            .bind(bucket)
            .bind(unix_millis() as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &CacheKey) -> Result<Option<CacheEntry>, StorageError> {
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT bucket, method, url, status, headers, body, stored_at
            FROM entries
            WHERE bucket = ?1 AND method = ?2 AND url = ?3
            "#,
        )
        .bind(bucket)
        .bind(key.method().as_str())
        .bind(key.url().as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(r.try_into()?)),
            None => Ok(None),
        }
    }

    async fn put(&self, bucket: &str, entry: CacheEntry) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT OR IGNORE INTO buckets (name, created_at) VALUES (?1, ?2)")
            .bind(bucket)
            .bind(unix_millis() as i64)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO entries (bucket, method, url, status, headers, body, stored_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(bucket, method, url) DO UPDATE SET
                status = excluded.status,
                headers = excluded.headers,
                body = excluded.body,
                stored_at = excluded.stored_at
            "#,
        )
        .bind(bucket)
        .bind(entry.key.method().as_str())
        .bind(entry.key.url().as_str())
        .bind(i64::from(entry.response.status().as_u16()))
        .bind(encode_headers(entry.response.headers()))
        .bind(entry.response.body().to_vec())
        .bind(entry.stored_at as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn keys(&self, bucket: &str) -> Result<Vec<CacheKey>, StorageError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT method, url FROM entries WHERE bucket = ?1 ORDER BY stored_at ASC, url ASC",
        )
        .bind(bucket)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(method, url)| decode_key(bucket, &method, &url))
            .collect()
    }

    async fn buckets(&self) -> Result<Vec<String>, StorageError> {
        let names = sqlx::query_scalar("SELECT name FROM buckets ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    async fn delete(&self, bucket: &str) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM entries WHERE bucket = ?1")
            .bind(bucket)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM buckets WHERE name = ?1")
            .bind(bucket)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Internal row type for SQLite queries.
#[derive(sqlx::FromRow)]
struct EntryRow {
    bucket: String,
    method: String,
    url: String,
    status: i64,
    headers: Vec<u8>,
    body: Vec<u8>,
    stored_at: i64,
}

impl TryFrom<EntryRow> for CacheEntry {
    type Error = StorageError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let key = decode_key(&row.bucket, &row.method, &row.url)?;
        let status = u16::try_from(row.status)
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .ok_or_else(|| corrupt(&row.bucket, format!("invalid status {}", row.status)))?;
        let headers = decode_headers(&row.bucket, &row.headers)?;

        Ok(CacheEntry {
            key,
            response: Response::from_parts(status, headers, Bytes::from(row.body)),
            stored_at: row.stored_at as u64,
        })
    }
}

fn corrupt(bucket: &str, reason: impl Into<String>) -> StorageError {
    StorageError::Corrupt {
        bucket: bucket.to_string(),
        reason: reason.into(),
    }
}

fn decode_key(bucket: &str, method: &str, url: &str) -> Result<CacheKey, StorageError> {
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|_| corrupt(bucket, format!("invalid method {method:?}")))?;
    let url = Url::parse(url).map_err(|e| corrupt(bucket, format!("invalid url {url:?}: {e}")))?;
    Ok(CacheKey::new(method, &url))
}

fn encode_headers(headers: &HeaderMap) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, value) in headers {
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.push(b'\n');
    }
    out
}

fn decode_headers(bucket: &str, raw: &[u8]) -> Result<HeaderMap, StorageError> {
    let mut headers = HeaderMap::new();
    for line in raw.split(|b| *b == b'\n').filter(|l| !l.is_empty()) {
        let split = line
            .windows(2)
            .position(|w| w == b": ")
            .ok_or_else(|| corrupt(bucket, "header line without separator"))?;
        let name = HeaderName::from_bytes(&line[..split])
            .map_err(|e| corrupt(bucket, format!("invalid header name: {e}")))?;
        let value = HeaderValue::from_bytes(&line[split + 2..])
            .map_err(|e| corrupt(bucket, format!("invalid header value: {e}")))?;
        headers.append(name, value);
    }
    Ok(headers)
}
