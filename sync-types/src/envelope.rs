//! JSON bodies of the synthetic responses the engine returns to callers.

use serde::{Deserialize, Serialize};

use crate::SyncId;

/// Body of the 503 returned for an API request that is offline with no
/// cached copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineEnvelope {
    /// Human-readable reason.
    pub error: String,
    /// Always `true`.
    pub offline: bool,
    /// Always `null`: nothing was served from cache.
    pub cached_at: Option<u64>,
}

impl OfflineEnvelope {
    /// Create the envelope with the given message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            offline: true,
            cached_at: None,
        }
    }
}

/// Body of the 202 returned when a write is captured for later sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedAck {
    /// Always `true`.
    pub queued: bool,
    /// Human-readable status.
    pub message: String,
    /// Id the host will see in the matching `OFFLINE_QUEUE` message.
    pub sync_id: SyncId,
}

impl QueuedAck {
    /// Create an acknowledgement for the given capture.
    pub fn new(sync_id: SyncId) -> Self {
        Self {
            queued: true,
            message: "Request queued for sync when back online".to_string(),
            sync_id,
        }
    }
}

/// Body of the 500 returned when a write could not be captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
}

impl ErrorBody {
    /// Create an error body.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_envelope_wire_shape() {
        let json = serde_json::to_value(OfflineEnvelope::new("Network unavailable")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": "Network unavailable",
                "offline": true,
                "cached_at": null
            })
        );
    }

    #[test]
    fn queued_ack_wire_shape() {
        let sync_id = SyncId::new();
        let json = serde_json::to_value(QueuedAck::new(sync_id)).unwrap();
        assert_eq!(json["queued"], true);
        assert_eq!(json["sync_id"], sync_id.to_string());
        assert!(json["message"].as_str().unwrap().contains("queued"));
    }

    #[test]
    fn error_body_wire_shape() {
        let json = serde_json::to_value(ErrorBody::new("bad body")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "bad body"}));
    }
}
