//! Mock client contexts for testing.
//!
//! Records posted messages, navigations, focus and window requests.

use super::{ClientContexts, ClientError, ClientInfo};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use sync_types::HostMessage;

/// Mock client contexts for testing.
#[derive(Debug, Default, Clone)]
pub struct MockClients {
    inner: Arc<Mutex<MockClientsInner>>,
}

#[derive(Debug, Default)]
struct MockClientsInner {
    clients: Vec<ClientInfo>,
    posted: Vec<(String, HostMessage)>,
    navigations: Vec<(String, String)>,
    focused: Vec<String>,
    opened: Vec<String>,
    next_window: usize,
    fail_post_to: Option<String>,
}

impl MockClients {
    /// Create with no open clients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an open client.
    pub fn add(&self, id: &str, url: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.clients.push(ClientInfo::new(id, url));
    }

    /// Messages posted so far, as `(client_id, message)`.
    pub fn posted(&self) -> Vec<(String, HostMessage)> {
        let inner = self.inner.lock().unwrap();
        inner.posted.clone()
    }

    /// Messages posted to one client.
    pub fn posted_to(&self, client_id: &str) -> Vec<HostMessage> {
        let inner = self.inner.lock().unwrap();
        inner
            .posted
            .iter()
            .filter(|(id, _)| id == client_id)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Navigations so far, as `(client_id, url)`.
    pub fn navigations(&self) -> Vec<(String, String)> {
        let inner = self.inner.lock().unwrap();
        inner.navigations.clone()
    }

    /// Clients focused so far.
    pub fn focused(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.focused.clone()
    }

    /// URLs of windows opened so far.
    pub fn opened(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.opened.clone()
    }

    /// Make every post to `client_id` fail.
    pub fn fail_posts_to(&self, client_id: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_post_to = Some(client_id.to_string());
    }
}

#[async_trait]
impl ClientContexts for MockClients {
    async fn list(&self) -> Result<Vec<ClientInfo>, ClientError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.clients.clone())
    }

    async fn post(&self, client_id: &str, message: &HostMessage) -> Result<(), ClientError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.fail_post_to.as_deref() == Some(client_id) {
            return Err(ClientError::DeliveryFailed(client_id.to_string()));
        }
        if !inner.clients.iter().any(|c| c.id == client_id) {
            return Err(ClientError::UnknownClient(client_id.to_string()));
        }

        inner.posted.push((client_id.to_string(), message.clone()));
        Ok(())
    }

    async fn navigate(&self, client_id: &str, url: &str) -> Result<(), ClientError> {
        let mut inner = self.inner.lock().unwrap();
        let client = inner
            .clients
            .iter_mut()
            .find(|c| c.id == client_id)
            .ok_or_else(|| ClientError::UnknownClient(client_id.to_string()))?;
        client.url = url.to_string();
        inner
            .navigations
            .push((client_id.to_string(), url.to_string()));
        Ok(())
    }

    async fn focus(&self, client_id: &str) -> Result<(), ClientError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.clients.iter().any(|c| c.id == client_id) {
            return Err(ClientError::UnknownClient(client_id.to_string()));
        }
        inner.focused.push(client_id.to_string());
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<ClientInfo, ClientError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_window += 1;
        let client = ClientInfo::new(format!("window-{}", inner.next_window), url);
        inner.clients.push(client.clone());
        inner.opened.push(url.to_string());
        Ok(client)
    }
}
