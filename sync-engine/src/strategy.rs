//! Cache-first and network-first executors.
//!
//! Neither executor returns an error: every failure ends in either a cached
//! response or a synthetic offline response. Store failures are logged and
//! treated as misses (on read) or ignored (on write).

use crate::network::Network;
use crate::store::CacheStore;
use sync_core::{fallback, Fallback};
use sync_types::{BucketId, CacheEntry, CacheKey, Request, Response};

/// Parameters of one network-first execution.
#[derive(Debug, Clone)]
pub struct NetworkFirst {
    /// Bucket consulted first on failure, and written on allow-listed success.
    pub api_bucket: BucketId,
    /// Bucket consulted for documents after the API bucket.
    pub static_bucket: BucketId,
    /// Which synthetic response to produce when nothing is cached.
    pub fallback: Fallback,
    /// Write successful responses to the API bucket.
    pub cache_writes: bool,
    /// App shell key served to documents when the exact key misses.
    pub app_shell: Option<CacheKey>,
}

/// Serve from `bucket`, fetching and storing on a miss.
pub async fn cache_first(
    store: &CacheStore,
    network: &dyn Network,
    bucket: &BucketId,
    request: &Request,
) -> Response {
    let key = request.cache_key();
    if let Some(entry) = lookup(store, bucket, &key).await {
        tracing::debug!(url = %request.url(), bucket = %bucket, "Cache hit");
        return entry.response;
    }

    match network.fetch(request).await {
        Ok(response) => {
            if response.is_ok() {
                store_copy(store, bucket, key, &response).await;
            }
            response
        }
        Err(e) => {
            tracing::debug!(url = %request.url(), "Cache miss and fetch failed: {}", e);
            fallback::offline_document()
        }
    }
}

/// Fetch from the network, falling back to cached data.
pub async fn network_first(
    store: &CacheStore,
    network: &dyn Network,
    policy: &NetworkFirst,
    request: &Request,
) -> Response {
    let key = request.cache_key();

    let error = match network.fetch(request).await {
        Ok(response) => {
            if policy.cache_writes && response.is_ok() {
                store_copy(store, &policy.api_bucket, key, &response).await;
            }
            return response;
        }
        Err(e) => e,
    };
    tracing::debug!(url = %request.url(), "Fetch failed, trying cache: {}", error);

    if let Some(entry) = lookup(store, &policy.api_bucket, &key).await {
        return entry.response;
    }

    match policy.fallback {
        Fallback::Api => fallback::offline_api(),
        Fallback::Document => {
            if let Some(entry) = lookup(store, &policy.static_bucket, &key).await {
                return entry.response;
            }
            if let Some(shell) = &policy.app_shell {
                if let Some(entry) = lookup(store, &policy.static_bucket, shell).await {
                    tracing::debug!(url = %request.url(), "Serving app shell");
                    return entry.response;
                }
            }
            fallback::offline_document()
        }
    }
}

async fn lookup(store: &CacheStore, bucket: &BucketId, key: &CacheKey) -> Option<CacheEntry> {
    match store.get(bucket, key).await {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!(bucket = %bucket, key = %key, "Cache read failed: {}", e);
            None
        }
    }
}

async fn store_copy(store: &CacheStore, bucket: &BucketId, key: CacheKey, response: &Response) {
    if let Err(e) = store.put(bucket, key, response).await {
        tracing::warn!(bucket = %bucket, "Cache write failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::MockNetwork;
    use crate::store::{CacheBackend, MemoryBackend, StorageError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use sync_types::{Method, OfflineEnvelope, StatusCode, Url};

    const ORIGIN: &str = "https://app.test";

    /// Memory backend whose reads or writes can be made to fail.
    #[derive(Default)]
    struct FailingBackend {
        inner: MemoryBackend,
        fail_gets: AtomicBool,
        fail_puts: AtomicBool,
    }

    impl FailingBackend {
        fn check(flag: &AtomicBool) -> Result<(), StorageError> {
            if flag.load(Ordering::SeqCst) {
                Err(StorageError::Database(sqlx::Error::PoolClosed))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl CacheBackend for FailingBackend {
        async fn open(&self, bucket: &str) -> Result<(), StorageError> {
            self.inner.open(bucket).await
        }

        async fn get(
            &self,
            bucket: &str,
            key: &CacheKey,
        ) -> Result<Option<CacheEntry>, StorageError> {
            Self::check(&self.fail_gets)?;
            self.inner.get(bucket, key).await
        }

        async fn put(&self, bucket: &str, entry: CacheEntry) -> Result<(), StorageError> {
            Self::check(&self.fail_puts)?;
            self.inner.put(bucket, entry).await
        }

        async fn keys(&self, bucket: &str) -> Result<Vec<CacheKey>, StorageError> {
            self.inner.keys(bucket).await
        }

        async fn buckets(&self) -> Result<Vec<String>, StorageError> {
            self.inner.buckets().await
        }

        async fn delete(&self, bucket: &str) -> Result<bool, StorageError> {
            self.inner.delete(bucket).await
        }
    }

    fn setup() -> (CacheStore, MockNetwork) {
        (
            CacheStore::new(Arc::new(MemoryBackend::new())),
            MockNetwork::new(),
        )
    }

    fn failing_setup() -> (CacheStore, Arc<FailingBackend>, MockNetwork) {
        let backend = Arc::new(FailingBackend::default());
        (
            CacheStore::new(backend.clone()),
            backend,
            MockNetwork::new(),
        )
    }

    fn url(path: &str) -> String {
        format!("{ORIGIN}{path}")
    }

    fn statics() -> BucketId {
        BucketId::new("static", "v1")
    }

    fn api_policy(cache_writes: bool) -> NetworkFirst {
        NetworkFirst {
            api_bucket: BucketId::new("api", "v1"),
            static_bucket: statics(),
            fallback: Fallback::Api,
            cache_writes,
            app_shell: None,
        }
    }

    fn document_policy() -> NetworkFirst {
        NetworkFirst {
            fallback: Fallback::Document,
            cache_writes: false,
            app_shell: Some(CacheKey::new(
                Method::GET,
                &Url::parse(&url("/index.html")).unwrap(),
            )),
            ..api_policy(false)
        }
    }

    // ===========================================
    // Cache-first
    // ===========================================

    #[tokio::test]
    async fn cache_first_hit_skips_network() {
        let (store, network) = setup();
        let req = Request::get(&url("/main.js")).unwrap();
        let cached = Response::new(StatusCode::OK).with_body("cached");
        store.put(&statics(), req.cache_key(), &cached).await.unwrap();

        let resp = cache_first(&store, &network, &statics(), &req).await;

        assert_eq!(resp, cached);
        assert_eq!(network.fetch_count(&url("/main.js")), 0);
    }

    #[tokio::test]
    async fn cache_first_miss_fetches_and_stores() {
        let (store, network) = setup();
        let fresh = Response::new(StatusCode::OK).with_body("fresh");
        network.respond(&url("/main.js"), fresh.clone());
        let req = Request::get(&url("/main.js")).unwrap();

        let resp = cache_first(&store, &network, &statics(), &req).await;

        assert_eq!(resp, fresh);
        let entry = store.get(&statics(), &req.cache_key()).await.unwrap();
        assert_eq!(entry.unwrap().response, fresh);
    }

    #[tokio::test]
    async fn cache_first_error_status_returned_not_stored() {
        let (store, network) = setup();
        let req = Request::get(&url("/missing.js")).unwrap();

        let resp = cache_first(&store, &network, &statics(), &req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(store.get(&statics(), &req.cache_key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cache_first_offline_miss_is_offline_document() {
        let (store, network) = setup();
        network.go_offline();
        let req = Request::get(&url("/style.css")).unwrap();

        let resp = cache_first(&store, &network, &statics(), &req).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(resp.content_type().unwrap().starts_with("text/html"));
    }

    // ===========================================
    // Network-first
    // ===========================================

    #[tokio::test]
    async fn network_first_allow_listed_survives_failure() {
        let (store, network) = setup();
        let original = Response::new(StatusCode::OK).with_body(r#"{"status":"ok"}"#);
        network.respond(&url("/api/health"), original.clone());
        let req = Request::get(&url("/api/health")).unwrap();
        let policy = api_policy(true);

        let online = network_first(&store, &network, &policy, &req).await;
        assert_eq!(online, original);

        network.fail_fetches(true);
        let offline = network_first(&store, &network, &policy, &req).await;

        assert_eq!(offline.status(), original.status());
        assert_eq!(offline.body(), original.body());
    }

    #[tokio::test]
    async fn network_first_not_allow_listed_is_not_stored() {
        let (store, network) = setup();
        network.respond(
            &url("/api/orders"),
            Response::new(StatusCode::OK).with_body("[]"),
        );
        let req = Request::get(&url("/api/orders")).unwrap();
        let policy = api_policy(false);

        network_first(&store, &network, &policy, &req).await;

        assert!(store.keys(&policy.api_bucket).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn network_first_returns_error_status_unchanged() {
        let (store, network) = setup();
        network.respond(
            &url("/api/health"),
            Response::new(StatusCode::INTERNAL_SERVER_ERROR),
        );
        let req = Request::get(&url("/api/health")).unwrap();
        let policy = api_policy(true);

        let resp = network_first(&store, &network, &policy, &req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(store.keys(&policy.api_bucket).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn network_first_api_miss_is_json_envelope() {
        let (store, network) = setup();
        network.go_offline();
        let req = Request::get(&url("/api/orders")).unwrap();

        let resp = network_first(&store, &network, &api_policy(true), &req).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: OfflineEnvelope = resp.body_json().unwrap();
        assert!(body.offline);
        assert!(body.cached_at.is_none());
    }

    #[tokio::test]
    async fn network_first_document_uses_static_copy() {
        let (store, network) = setup();
        let page = Response::new(StatusCode::OK).with_body("<h1>About</h1>");
        let req = Request::navigate(&url("/about.html")).unwrap();
        store.put(&statics(), req.cache_key(), &page).await.unwrap();
        network.go_offline();

        let resp = network_first(&store, &network, &document_policy(), &req).await;

        assert_eq!(resp, page);
    }

    #[tokio::test]
    async fn network_first_document_falls_back_to_app_shell() {
        let (store, network) = setup();
        let shell = Response::new(StatusCode::OK).with_body("<div id=app></div>");
        let policy = document_policy();
        store
            .put(&statics(), policy.app_shell.clone().unwrap(), &shell)
            .await
            .unwrap();
        network.go_offline();

        let req = Request::navigate(&url("/orders/42")).unwrap();
        let resp = network_first(&store, &network, &policy, &req).await;

        assert_eq!(resp, shell);
    }

    #[tokio::test]
    async fn network_first_document_without_cache_is_offline_page() {
        let (store, network) = setup();
        network.go_offline();
        let req = Request::navigate(&url("/")).unwrap();

        let resp = network_first(&store, &network, &document_policy(), &req).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(resp.content_type().unwrap().starts_with("text/html"));
    }

    #[tokio::test]
    async fn network_first_single_failure_then_recovers() {
        let (store, network) = setup();
        let first = Response::new(StatusCode::OK).with_body(r#"{"n":1}"#);
        network.respond(&url("/api/health"), first.clone());
        let req = Request::get(&url("/api/health")).unwrap();
        let policy = api_policy(true);
        network_first(&store, &network, &policy, &req).await;

        network.fail_next_fetch("connection reset");
        let during = network_first(&store, &network, &policy, &req).await;
        assert_eq!(during.body(), first.body());

        let second = Response::new(StatusCode::OK).with_body(r#"{"n":2}"#);
        network.respond(&url("/api/health"), second.clone());
        let after = network_first(&store, &network, &policy, &req).await;
        assert_eq!(after, second);
        assert_eq!(network.fetch_count(&url("/api/health")), 3);
    }

    // ===========================================
    // Store failures
    // ===========================================

    #[tokio::test]
    async fn network_first_returns_live_response_when_write_fails() {
        let (store, backend, network) = failing_setup();
        let live = Response::new(StatusCode::OK).with_body(r#"{"status":"ok"}"#);
        network.respond(&url("/api/health"), live.clone());
        backend.fail_puts.store(true, Ordering::SeqCst);
        let req = Request::get(&url("/api/health")).unwrap();

        let resp = network_first(&store, &network, &api_policy(true), &req).await;

        assert_eq!(resp, live);
    }

    #[tokio::test]
    async fn cache_first_returns_fetched_response_when_write_fails() {
        let (store, backend, network) = failing_setup();
        let fresh = Response::new(StatusCode::OK).with_body("fresh");
        network.respond(&url("/main.js"), fresh.clone());
        backend.fail_puts.store(true, Ordering::SeqCst);
        let req = Request::get(&url("/main.js")).unwrap();

        let resp = cache_first(&store, &network, &statics(), &req).await;

        assert_eq!(resp, fresh);
        backend.fail_puts.store(false, Ordering::SeqCst);
        assert!(store.get(&statics(), &req.cache_key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cache_first_read_failure_is_a_miss() {
        let (store, backend, network) = failing_setup();
        let req = Request::get(&url("/main.js")).unwrap();
        let cached = Response::new(StatusCode::OK).with_body("cached");
        store.put(&statics(), req.cache_key(), &cached).await.unwrap();
        let fresh = Response::new(StatusCode::OK).with_body("fresh");
        network.respond(&url("/main.js"), fresh.clone());
        backend.fail_gets.store(true, Ordering::SeqCst);

        let resp = cache_first(&store, &network, &statics(), &req).await;

        assert_eq!(resp, fresh);
    }

    #[tokio::test]
    async fn read_failure_while_offline_is_offline_envelope() {
        let (store, backend, network) = failing_setup();
        let req = Request::get(&url("/api/health")).unwrap();
        let cached = Response::new(StatusCode::OK).with_body(r#"{"status":"ok"}"#);
        store
            .put(&api_policy(true).api_bucket, req.cache_key(), &cached)
            .await
            .unwrap();
        backend.fail_gets.store(true, Ordering::SeqCst);
        network.go_offline();

        let resp = network_first(&store, &network, &api_policy(true), &req).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: OfflineEnvelope = resp.body_json().unwrap();
        assert!(body.offline);
    }

    #[tokio::test]
    async fn document_read_failure_while_offline_is_offline_page() {
        let (store, backend, network) = failing_setup();
        backend.fail_gets.store(true, Ordering::SeqCst);
        network.go_offline();
        let req = Request::navigate(&url("/")).unwrap();

        let resp = network_first(&store, &network, &document_policy(), &req).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(resp.content_type().unwrap().starts_with("text/html"));
    }
}
