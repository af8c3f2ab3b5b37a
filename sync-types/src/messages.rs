//! Messages exchanged with host application contexts.
//!
//! Outbound messages ([`HostMessage`]) are broadcast by the engine to every
//! open client context. Inbound commands ([`HostCommand`]) are posted by a
//! client context to the engine. Both are JSON objects tagged by `type`.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Request, SyncError, SyncId};

/// Messages the engine sends to host application contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostMessage {
    /// A mutating request was captured while offline; the host owns it now.
    OfflineQueue {
        /// The captured write.
        data: QueuedWrite,
    },
    /// Connectivity was restored and a sync trigger fired.
    SyncStart,
    /// The host should replay its durable queue.
    FlushQueue,
    /// Reply to [`HostCommand::GetVersion`].
    Version {
        /// Active cache version tag.
        version: String,
    },
}

impl HostMessage {
    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, SyncError> {
        serde_json::to_vec(self).map_err(SyncError::Serialization)
    }

    /// Deserialize from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, SyncError> {
        serde_json::from_slice(bytes).map_err(SyncError::Deserialization)
    }

    /// The wire `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            HostMessage::OfflineQueue { .. } => "OFFLINE_QUEUE",
            HostMessage::SyncStart => "SYNC_START",
            HostMessage::FlushQueue => "FLUSH_QUEUE",
            HostMessage::Version { .. } => "VERSION",
        }
    }
}

/// Commands a host application context may post to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostCommand {
    /// Activate a waiting engine immediately.
    SkipWaiting,
    /// Ask for the active cache version.
    GetVersion,
    /// Drop every cache bucket (e.g. on logout).
    ClearCaches,
}

impl HostCommand {
    /// Deserialize from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, SyncError> {
        serde_json::from_slice(bytes).map_err(SyncError::Deserialization)
    }
}

/// How [`QueuedWrite::body`] is encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// The body is UTF-8 text, carried as is.
    #[default]
    Text,
    /// The body is binary, carried as standard base64.
    Base64,
}

/// A mutating request captured while offline, in the shape the host's
/// sync-persistence adapter replays later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedWrite {
    /// Correlates this write with the 202 acknowledgement.
    pub sync_id: SyncId,
    /// Absolute request URL.
    pub url: String,
    /// Request method.
    pub method: String,
    /// Request headers (repeated names are joined with `, `).
    pub headers: BTreeMap<String, String>,
    /// Request body, encoded as `body_encoding` says.
    pub body: String,
    /// Encoding of `body`.
    #[serde(default)]
    pub body_encoding: BodyEncoding,
    /// Unix milliseconds when the write was captured.
    pub timestamp: u64,
}

impl QueuedWrite {
    /// Capture a request.
    ///
    /// Header values that are not visible ASCII are decoded lossily. A body
    /// that is not UTF-8 is base64-encoded and flagged in `body_encoding`.
    pub fn from_request(request: &Request, sync_id: SyncId, timestamp: u64) -> Self {
        let (body, body_encoding) = match std::str::from_utf8(request.body()) {
            Ok(text) => (text.to_string(), BodyEncoding::Text),
            Err(_) => (STANDARD.encode(request.body()), BodyEncoding::Base64),
        };

        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in request.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }

        Self {
            sync_id,
            url: request.url().to_string(),
            method: request.method().to_string(),
            headers,
            body,
            body_encoding,
            timestamp,
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, SyncError> {
        serde_json::to_vec(self).map_err(SyncError::Serialization)
    }

    /// The original body bytes.
    pub fn body_bytes(&self) -> Result<Vec<u8>, SyncError> {
        match self.body_encoding {
            BodyEncoding::Text => Ok(self.body.as_bytes().to_vec()),
            BodyEncoding::Base64 => STANDARD
                .decode(&self.body)
                .map_err(|e| SyncError::InvalidData(format!("body is not base64: {e}"))),
        }
    }
}
