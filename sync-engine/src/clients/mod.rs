//! Client contexts: the open pages or app windows the engine serves.
//!
//! The engine uses them to deliver host messages, reload after activation,
//! and route notification clicks.

mod channel;
mod mock;

pub use channel::{ChannelClients, ClientEvent};
pub use mock::MockClients;

use async_trait::async_trait;
use sync_types::HostMessage;
use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No client with this id is open.
    #[error("unknown client: {0}")]
    UnknownClient(String),

    /// The client could not receive the message.
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    /// A new window could not be opened.
    #[error("open window failed: {0}")]
    OpenFailed(String),
}

/// An open client context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Stable id for the lifetime of the context.
    pub id: String,
    /// URL the context currently shows.
    pub url: String,
}

impl ClientInfo {
    /// Create a client record.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// Capability for reaching client contexts.
#[async_trait]
pub trait ClientContexts: Send + Sync {
    /// Every currently open client.
    async fn list(&self) -> Result<Vec<ClientInfo>, ClientError>;

    /// Deliver `message` to one client.
    async fn post(&self, client_id: &str, message: &HostMessage) -> Result<(), ClientError>;

    /// Navigate a client to `url`.
    async fn navigate(&self, client_id: &str, url: &str) -> Result<(), ClientError>;

    /// Bring a client to the foreground.
    async fn focus(&self, client_id: &str) -> Result<(), ClientError>;

    /// Open a new window at `url`.
    async fn open_window(&self, url: &str) -> Result<ClientInfo, ClientError>;

    /// Deliver `message` to every open client.
    ///
    /// Per-client failures are logged and skipped. Returns how many clients
    /// received the message.
    async fn broadcast(&self, message: &HostMessage) -> Result<usize, ClientError> {
        let mut delivered = 0;
        for client in self.list().await? {
            match self.post(&client.id, message).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    client = %client.id,
                    kind = message.kind(),
                    "Failed to deliver message: {}",
                    e
                ),
            }
        }
        Ok(delivered)
    }
}
