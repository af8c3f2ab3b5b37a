//! Push payload handling and click-through validation.
//!
//! Push payloads are untrusted. The click target is resolved against the
//! engine's own origin and only honoured when it stays on that origin;
//! anything else (other origins, `javascript:` URLs, unparseable input)
//! navigates to the root instead.

use sync_types::{NotificationIntent, PushPayload, Url};
use url::Position;

use crate::config::NotificationConfig;

/// Target used when a click target is missing or rejected.
pub const ROOT_TARGET: &str = "/";

/// Build the notification to show for a parsed push payload.
pub fn build_intent(payload: PushPayload, config: &NotificationConfig) -> NotificationIntent {
    NotificationIntent {
        title: payload
            .title
            .unwrap_or_else(|| config.default_title.clone()),
        body: payload.body.unwrap_or_default(),
        target_url: payload.url.unwrap_or_else(|| ROOT_TARGET.to_string()),
        tag: config.tag.clone(),
        icon: config.icon.clone(),
        badge: config.badge.clone(),
    }
}

/// Validate a click-through target against `origin`.
///
/// Returns the same-origin path (with query and fragment) when `raw`
/// resolves to `origin`, otherwise [`ROOT_TARGET`].
///
/// The path is the resolved one, so it is always absolute and
/// dot-segment free: `orders/42` becomes `/orders/42` and `/a/../b`
/// becomes `/b`. A target already in that form comes back unchanged.
pub fn validate_target(raw: &str, origin: &Url) -> String {
    match origin.join(raw) {
        Ok(resolved) if resolved.origin() == origin.origin() => {
            resolved[Position::BeforePath..].to_string()
        }
        _ => ROOT_TARGET.to_string(),
    }
}
