//! Synthetic responses returned when the real one is unavailable.
//!
//! User-visible failure takes exactly two shapes: an HTML offline page for
//! documents and assets, and a JSON envelope for API requests. The write
//! capture path adds a 202 acknowledgement and a 500 rejection.

use serde::Serialize;
use sync_types::{ErrorBody, OfflineEnvelope, QueuedAck, Response, StatusCode, SyncId};

/// Offline page body.
pub const OFFLINE_DOCUMENT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Offline</title>
<style>body{font-family:system-ui,sans-serif;text-align:center;padding:4rem 1rem;color:#333}</style>
</head>
<body>
<h1>You are offline</h1>
<p>This page is not available without a network connection. It will load once you are back online.</p>
</body>
</html>
"#;

/// Message carried by the JSON offline envelope.
pub const OFFLINE_API_MESSAGE: &str = "Network unavailable and no cached data for this request";

/// 503 HTML offline page.
pub fn offline_document() -> Response {
    Response::html(StatusCode::SERVICE_UNAVAILABLE, OFFLINE_DOCUMENT)
}

/// 503 JSON `{error, offline: true, cached_at: null}`.
pub fn offline_api() -> Response {
    json(
        StatusCode::SERVICE_UNAVAILABLE,
        &OfflineEnvelope::new(OFFLINE_API_MESSAGE),
    )
}

/// 202 JSON `{queued: true, message, sync_id}`.
pub fn queued(sync_id: SyncId) -> Response {
    json(StatusCode::ACCEPTED, &QueuedAck::new(sync_id))
}

/// 500 JSON `{error}`.
pub fn capture_failed(error: &str) -> Response {
    json(
        StatusCode::INTERNAL_SERVER_ERROR,
        &ErrorBody::new(format!("Failed to queue request: {error}")),
    )
}

// Infallible for these bodies; degrade to status-only rather than panic.
fn json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    Response::json(status, body).unwrap_or_else(|_| Response::new(status))
}
