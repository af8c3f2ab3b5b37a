//! Mock notifier for testing.

use super::{Notifier, NotifyError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use sync_types::NotificationIntent;

/// Mock notifier that records what was shown and closed.
#[derive(Debug, Default, Clone)]
pub struct MockNotifier {
    inner: Arc<Mutex<MockNotifierInner>>,
}

#[derive(Debug, Default)]
struct MockNotifierInner {
    shown: Vec<NotificationIntent>,
    closed: Vec<Option<String>>,
    fail_next_show: Option<String>,
}

impl MockNotifier {
    /// Create a new mock notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications shown so far.
    pub fn shown(&self) -> Vec<NotificationIntent> {
        let inner = self.inner.lock().unwrap();
        inner.shown.clone()
    }

    /// Tags of notifications closed so far.
    pub fn closed(&self) -> Vec<Option<String>> {
        let inner = self.inner.lock().unwrap();
        inner.closed.clone()
    }

    /// Cause the next show() to fail with the given error.
    pub fn fail_next_show(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_show = Some(error.to_string());
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn show(&self, intent: &NotificationIntent) -> Result<(), NotifyError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_next_show.take() {
            return Err(NotifyError::Rejected(error));
        }
        inner.shown.push(intent.clone());
        Ok(())
    }

    async fn close(&self, tag: Option<&str>) -> Result<(), NotifyError> {
        let mut inner = self.inner.lock().unwrap();
        inner.closed.push(tag.map(str::to_string));
        Ok(())
    }
}
