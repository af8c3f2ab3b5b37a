//! Push payloads and the notifications derived from them.

use serde::{Deserialize, Serialize};

/// Inbound push payload. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    /// Notification title.
    pub title: Option<String>,
    /// Notification body text.
    pub body: Option<String>,
    /// Where a click should take the user (untrusted).
    pub url: Option<String>,
}

impl PushPayload {
    /// Parse a raw payload.
    ///
    /// Returns `None` when there is no payload or it is not a JSON object of
    /// the expected shape.
    pub fn parse(data: Option<&[u8]>) -> Option<Self> {
        serde_json::from_slice(data?).ok()
    }
}

/// A notification to display, and what to do when it is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationIntent {
    /// Title line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Raw click-through target from the payload; validated on click.
    pub target_url: String,
    /// Tag used to replace/close the notification.
    pub tag: Option<String>,
    /// Icon URL.
    pub icon: Option<String>,
    /// Badge URL.
    pub badge: Option<String>,
}
