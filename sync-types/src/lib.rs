//! # sync-types
//!
//! Data and message types for the offsync offline-first cache-and-sync engine.
//!
//! This crate provides the foundational types used across all offsync crates:
//! - [`Request`], [`Response`] - The HTTP shapes the engine intercepts and returns
//! - [`CacheKey`], [`BucketId`], [`CacheEntry`] - Cache addressing and storage
//! - [`SyncId`], [`QueuedWrite`], [`HostMessage`], [`HostCommand`] - The host message contract
//! - [`OfflineEnvelope`], [`QueuedAck`], [`ErrorBody`] - Synthetic JSON response bodies
//! - [`PushPayload`], [`NotificationIntent`] - Push notification data
//! - [`SyncError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod clock;
mod envelope;
mod error;
mod exchange;
mod ids;
mod messages;
mod push;

pub use clock::unix_millis;
pub use envelope::{ErrorBody, OfflineEnvelope, QueuedAck};
pub use error::SyncError;
pub use exchange::{Request, RequestMode, Response};
pub use ids::{BucketId, CacheEntry, CacheKey, SyncId};
pub use messages::{BodyEncoding, HostCommand, HostMessage, QueuedWrite};
pub use push::{NotificationIntent, PushPayload};

// Re-exported so downstream crates build requests without naming `http` directly.
pub use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
pub use url::Url;
