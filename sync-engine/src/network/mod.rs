//! Network abstraction for offsync.
//!
//! The engine never talks to sockets directly. It asks a [`Network`] to
//! perform a request and, separately, whether the platform currently
//! reports connectivity. The two can disagree: a link may report "online"
//! while every fetch fails.
//!
//! Implementations:
//! - [`HttpNetwork`] performs real requests over reqwest.
//! - [`MockNetwork`] serves canned responses and can be switched offline.

mod http;
mod mock;

pub use self::http::HttpNetwork;
pub use mock::MockNetwork;

use async_trait::async_trait;
use sync_types::{Request, Response};
use thiserror::Error;

/// Network errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The platform reports no connectivity.
    #[error("network offline")]
    Offline,

    /// The request did not produce a response.
    #[error("fetch failed: {0}")]
    Failed(String),

    /// The request timed out.
    #[error("fetch timeout")]
    Timeout,
}

/// Network trait for performing outbound requests.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform `request` and return whatever response the origin produced.
    ///
    /// Non-2xx responses are `Ok`; only transport failures are errors.
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;

    /// The platform's connectivity signal.
    fn is_online(&self) -> bool;
}
