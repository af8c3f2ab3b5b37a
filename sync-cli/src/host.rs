//! Wires the engine to this process's capabilities.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use sync_engine::{
    Capabilities, ChannelClients, ClientEvent, Engine, HttpNetwork, LogNotifier, SqliteBackend,
};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::config::Config;

/// An engine plus the client channel it reports to.
pub struct Host {
    /// The engine.
    pub engine: Engine,
    events: broadcast::Receiver<ClientEvent>,
}

impl Host {
    /// Open the cache database and build the engine.
    ///
    /// `clients` are the client contexts to treat as open, as `(id, url)`.
    pub async fn open(
        config: &Config,
        data_dir: &Path,
        offline: bool,
        clients: &[(String, String)],
    ) -> Result<Self> {
        let db_path = config.storage.database_path(data_dir);
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let cache = SqliteBackend::new(&db_path)
            .await
            .with_context(|| format!("Failed to open cache database {}", db_path.display()))?;
        tracing::debug!("Cache database: {}", db_path.display());

        let network = match config.network.timeout() {
            Some(timeout) => HttpNetwork::with_timeout(timeout),
            None => HttpNetwork::new(),
        }
        .context("Failed to build HTTP client")?;
        network.set_online(!offline);

        let channel = ChannelClients::new();
        for (id, url) in clients {
            channel.register(id.clone(), url.clone());
        }
        let events = channel.subscribe();

        let engine = Engine::new(
            config.engine.clone(),
            Capabilities {
                cache: Arc::new(cache),
                network: Arc::new(network),
                clients: Arc::new(channel),
                notifier: Arc::new(LogNotifier),
            },
        )
        .context("Invalid engine configuration")?;

        Ok(Self { engine, events })
    }

    /// Print every client event emitted so far.
    pub fn print_client_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => println!("{}", describe(&event)),
                Err(TryRecvError::Lagged(n)) => println!("  ({} client events dropped)", n),
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}

fn describe(event: &ClientEvent) -> String {
    match event {
        ClientEvent::Message { client_id, message } => {
            let json = message
                .to_json()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_else(|e| format!("<unserializable: {e}>"));
            format!("-> {client_id}: {json}")
        }
        ClientEvent::Navigate { client_id, url } => format!("-> {client_id}: navigate {url}"),
        ClientEvent::Focus { client_id } => format!("-> {client_id}: focus"),
        ClientEvent::Opened { client } => format!("-> open window {} ({})", client.url, client.id),
    }
}

/// Parse a `--client id=url` argument.
pub fn parse_client(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((id, url)) if !id.is_empty() && !url.is_empty() => {
            Ok((id.to_string(), url.to_string()))
        }
        _ => Err(format!("expected ID=URL, got {raw:?}")),
    }
}
