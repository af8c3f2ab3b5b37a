//! reqwest-backed network.

use super::{Network, NetworkError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sync_types::{Request, Response};

/// Network over reqwest.
///
/// Connectivity is a flag the host flips from its own signal (for the CLI,
/// the `--offline` switch). While offline, `fetch` fails without touching
/// the network.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
    online: Arc<AtomicBool>,
}

impl HttpNetwork {
    /// Create a network with no request timeout.
    pub fn new() -> Result<Self, NetworkError> {
        Self::build(None)
    }

    /// Create a network whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, NetworkError> {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Result<Self, NetworkError> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            "offsync/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| NetworkError::Failed(e.to_string()))?;

        Ok(Self {
            client,
            online: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Set the connectivity signal.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NetworkError::Timeout
        } else {
            NetworkError::Failed(e.to_string())
        }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        if !self.is_online() {
            return Err(NetworkError::Offline);
        }

        let response = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone())
            .body(request.body().clone())
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        tracing::debug!("{} {} -> {}", request.method(), request.url(), status);
        Ok(Response::from_parts(status, headers, body))
    }

    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
