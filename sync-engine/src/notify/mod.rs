//! Notification display capability.

mod mock;

pub use mock::MockNotifier;

use async_trait::async_trait;
use sync_types::NotificationIntent;
use thiserror::Error;

/// Notification errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The platform refused to show the notification.
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Shows and closes notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Show a notification.
    async fn show(&self, intent: &NotificationIntent) -> Result<(), NotifyError>;

    /// Close the notification identified by `tag` (or the untagged one).
    async fn close(&self, tag: Option<&str>) -> Result<(), NotifyError>;
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn show(&self, intent: &NotificationIntent) -> Result<(), NotifyError> {
        tracing::info!(
            title = %intent.title,
            target = %intent.target_url,
            "Notification: {}",
            intent.body
        );
        Ok(())
    }

    async fn close(&self, tag: Option<&str>) -> Result<(), NotifyError> {
        tracing::debug!(tag = tag.unwrap_or(""), "Notification closed");
        Ok(())
    }
}
