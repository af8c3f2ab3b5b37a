//! # sync-engine
//!
//! Offline-first cache-and-sync engine for offsync.
//!
//! The engine sits between a host application and the network. It answers
//! reads from versioned cache buckets, captures writes made while offline
//! and hands them to the host as messages, and drives the install/activate
//! lifecycle that replaces old caches on deploy.
//!
//! ## Features
//!
//! - **Request routing**: cache-first for static assets, network-first for
//!   documents and the API, write capture for mutating requests
//! - **Pluggable capabilities**: cache backend (SQLite, memory), network
//!   (reqwest, mock), client contexts (broadcast channel, mock), notifier
//! - **Pure State Machines**: uses sync-core for side-effect-free logic
//!
//! ## Example
//!
//! ```ignore
//! use sync_engine::{Capabilities, Engine, HttpNetwork, LogNotifier, ChannelClients, SqliteBackend};
//!
//! let caps = Capabilities {
//!     cache: Arc::new(SqliteBackend::new(&path).await?),
//!     network: Arc::new(HttpNetwork::new()?),
//!     clients: Arc::new(ChannelClients::new()),
//!     notifier: Arc::new(LogNotifier),
//! };
//! let engine = Engine::new(config, caps)?;
//!
//! engine.on_install().await;
//! let response = engine.on_fetch(Request::get("https://app.test/main.js")?).await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clients;
pub mod engine;
pub mod network;
pub mod notify;
pub mod store;
pub mod strategy;

pub use clients::{ChannelClients, ClientContexts, ClientError, ClientEvent, ClientInfo, MockClients};
pub use engine::{ActivateReport, Capabilities, Engine, EngineError, InstallReport};
pub use network::{HttpNetwork, MockNetwork, Network, NetworkError};
pub use notify::{LogNotifier, MockNotifier, Notifier, NotifyError};
pub use store::{CacheBackend, CacheStore, MemoryBackend, SqliteBackend, StorageError};
