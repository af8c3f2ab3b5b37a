//! Client contexts backed by a tokio broadcast channel.
//!
//! The host registers its open contexts and subscribes to the event stream;
//! every post, navigation, focus and window request arrives there as a
//! [`ClientEvent`] for the host to act on.

use super::{ClientContexts, ClientError, ClientInfo};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use sync_types::HostMessage;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// Something the engine asked a client context to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Deliver a host message.
    Message {
        /// Target client.
        client_id: String,
        /// The message.
        message: HostMessage,
    },
    /// Navigate to a URL.
    Navigate {
        /// Target client.
        client_id: String,
        /// Destination.
        url: String,
    },
    /// Bring to the foreground.
    Focus {
        /// Target client.
        client_id: String,
    },
    /// A new window was opened.
    Opened {
        /// The new client.
        client: ClientInfo,
    },
}

/// Channel-backed client contexts.
#[derive(Debug, Clone)]
pub struct ChannelClients {
    clients: Arc<DashMap<String, String>>,
    events: broadcast::Sender<ClientEvent>,
    next_window: Arc<AtomicUsize>,
}

impl Default for ChannelClients {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelClients {
    /// Create with no registered clients.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            clients: Arc::new(DashMap::new()),
            events,
            next_window: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register an open client context.
    pub fn register(&self, id: impl Into<String>, url: impl Into<String>) {
        self.clients.insert(id.into(), url.into());
    }

    /// Subscribe to client events.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    fn ensure_known(&self, client_id: &str) -> Result<(), ClientError> {
        if self.clients.contains_key(client_id) {
            Ok(())
        } else {
            Err(ClientError::UnknownClient(client_id.to_string()))
        }
    }

    fn emit(&self, event: ClientEvent) -> Result<(), ClientError> {
        self.events
            .send(event)
            .map(|_| ())
            .map_err(|_| ClientError::DeliveryFailed("no subscribers".to_string()))
    }
}

#[async_trait]
impl ClientContexts for ChannelClients {
    async fn list(&self) -> Result<Vec<ClientInfo>, ClientError> {
        let mut clients: Vec<ClientInfo> = self
            .clients
            .iter()
            .map(|c| ClientInfo::new(c.key().clone(), c.value().clone()))
            .collect();
        clients.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(clients)
    }

    async fn post(&self, client_id: &str, message: &HostMessage) -> Result<(), ClientError> {
        self.ensure_known(client_id)?;
        self.emit(ClientEvent::Message {
            client_id: client_id.to_string(),
            message: message.clone(),
        })
    }

    async fn navigate(&self, client_id: &str, url: &str) -> Result<(), ClientError> {
        self.ensure_known(client_id)?;
        self.clients.insert(client_id.to_string(), url.to_string());
        self.emit(ClientEvent::Navigate {
            client_id: client_id.to_string(),
            url: url.to_string(),
        })
    }

    async fn focus(&self, client_id: &str) -> Result<(), ClientError> {
        self.ensure_known(client_id)?;
        self.emit(ClientEvent::Focus {
            client_id: client_id.to_string(),
        })
    }

    async fn open_window(&self, url: &str) -> Result<ClientInfo, ClientError> {
        let n = self.next_window.fetch_add(1, Ordering::SeqCst) + 1;
        let client = ClientInfo::new(format!("window-{n}"), url);
        self.clients.insert(client.id.clone(), client.url.clone());
        self.emit(ClientEvent::Opened {
            client: client.clone(),
        })
        .map_err(|e| ClientError::OpenFailed(e.to_string()))?;
        Ok(client)
    }
}
