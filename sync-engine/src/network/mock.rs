//! Mock network for testing.
//!
//! Serves canned responses by URL, records every request, and can be
//! switched offline or made to fail while still reporting online.

use super::{Network, NetworkError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use sync_types::{Request, Response, StatusCode};

/// Mock network for testing.
///
/// Unknown URLs answer 404. Clones share state.
#[derive(Debug, Clone)]
pub struct MockNetwork {
    inner: Arc<Mutex<MockNetworkInner>>,
}

#[derive(Debug)]
struct MockNetworkInner {
    online: bool,
    responses: HashMap<String, Response>,
    requests: Vec<Request>,
    fail_next_fetch: Option<String>,
    fail_all: bool,
}

impl Default for MockNetwork {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockNetworkInner {
                online: true,
                responses: HashMap::new(),
                requests: Vec::new(),
                fail_next_fetch: None,
                fail_all: false,
            })),
        }
    }
}

impl MockNetwork {
    /// Create a new online mock network with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for requests to `url` (fragment ignored).
    pub fn respond(&self, url: &str, response: Response) {
        let mut inner = self.inner.lock().unwrap();
        inner.responses.insert(strip_fragment(url), response);
    }

    /// Report offline; every fetch fails with [`NetworkError::Offline`].
    pub fn go_offline(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.online = false;
    }

    /// Report online again.
    pub fn go_online(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.online = true;
    }

    /// Cause the next fetch to fail with the given error.
    pub fn fail_next_fetch(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_fetch = Some(error.to_string());
    }

    /// Make every fetch fail while the connectivity signal stays as is.
    pub fn fail_fetches(&self, fail: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_all = fail;
    }

    /// Every request passed to `fetch`, in order.
    pub fn requests(&self) -> Vec<Request> {
        let inner = self.inner.lock().unwrap();
        inner.requests.clone()
    }

    /// Number of fetches attempted for `url`.
    pub fn fetch_count(&self, url: &str) -> usize {
        let url = strip_fragment(url);
        let inner = self.inner.lock().unwrap();
        inner
            .requests
            .iter()
            .filter(|r| strip_fragment(r.url().as_str()) == url)
            .count()
    }
}

fn strip_fragment(url: &str) -> String {
    url.split('#').next().unwrap_or(url).to_string()
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(request.clone());

        if !inner.online {
            return Err(NetworkError::Offline);
        }

        // Check for forced failure
        if let Some(error) = inner.fail_next_fetch.take() {
            return Err(NetworkError::Failed(error));
        }
        if inner.fail_all {
            return Err(NetworkError::Failed("connection reset".to_string()));
        }

        Ok(inner
            .responses
            .get(&strip_fragment(request.url().as_str()))
            .cloned()
            .unwrap_or_else(|| Response::new(StatusCode::NOT_FOUND)))
    }

    fn is_online(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.online
    }
}
