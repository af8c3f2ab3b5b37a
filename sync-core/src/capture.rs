//! Offline write capture state machine.
//!
//! One machine is driven per intercepted mutating request. It takes events as
//! input and produces a new state plus the actions the engine must execute.
//!
//! ```text
//! Idle ──offline──► Capturing ──serialized──► Dispatched
//!   │                   │
//!   └─online─► Idle     └─serialization failed─► Idle
//!   (pass through)        (reject with 500)
//! ```
//!
//! The engine does not keep the captured write: once the `OFFLINE_QUEUE`
//! message is broadcast the host application owns it.

use sync_types::{HostMessage, QueuedWrite, SyncId};

/// Capture state for a single mutating request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaptureState {
    /// Nothing captured.
    #[default]
    Idle,
    /// Offline; the request is being serialized.
    Capturing,
    /// The write was handed to the host.
    Dispatched {
        /// Id of the dispatched write.
        sync_id: SyncId,
    },
}

/// Inputs to the capture machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A mutating request was intercepted.
    Intercepted {
        /// Connectivity signal at interception time.
        online: bool,
    },
    /// The request was serialized into a queued write.
    Serialized {
        /// The serialized write.
        write: QueuedWrite,
    },
    /// The request could not be serialized.
    SerializationFailed {
        /// Why serialization failed.
        error: String,
    },
}

/// Instructions for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureAction {
    /// Forward the request to the network untouched.
    PassThrough,
    /// Serialize the request and report back with an event.
    Serialize,
    /// Broadcast a message to every host context.
    Broadcast(HostMessage),
    /// Answer the caller with 202 and this id.
    Acknowledge {
        /// Id the caller receives.
        sync_id: SyncId,
    },
    /// Answer the caller with 500.
    Reject {
        /// Why the write was not queued.
        error: String,
    },
}

impl CaptureState {
    /// Create a new machine in the Idle state.
    pub fn new() -> Self {
        Self::Idle
    }

    /// Process an event and return the new state plus actions to execute.
    pub fn on_event(self, event: CaptureEvent) -> (Self, Vec<CaptureAction>) {
        match (self, event) {
            (Self::Idle, CaptureEvent::Intercepted { online: true }) => {
                (Self::Idle, vec![CaptureAction::PassThrough])
            }
            (Self::Idle, CaptureEvent::Intercepted { online: false }) => {
                (Self::Capturing, vec![CaptureAction::Serialize])
            }

            (Self::Capturing, CaptureEvent::Serialized { write }) => {
                let sync_id = write.sync_id;
                (
                    Self::Dispatched { sync_id },
                    vec![
                        CaptureAction::Broadcast(HostMessage::OfflineQueue { data: write }),
                        CaptureAction::Acknowledge { sync_id },
                    ],
                )
            }
            (Self::Capturing, CaptureEvent::SerializationFailed { error }) => {
                (Self::Idle, vec![CaptureAction::Reject { error }])
            }

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// Whether the write has been handed to the host.
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use sync_types::BodyEncoding;

    fn write() -> QueuedWrite {
        QueuedWrite {
            sync_id: SyncId::new(),
            url: "https://app.test/api/orders".into(),
            method: "POST".into(),
            headers: BTreeMap::new(),
            body: "{}".into(),
            body_encoding: BodyEncoding::Text,
            timestamp: 1_705_000_000_000,
        }
    }

    #[test]
    fn starts_idle() {
        assert_eq!(CaptureState::new(), CaptureState::Idle);
    }

    #[test]
    fn online_passes_through_without_capture() {
        let (state, actions) =
            CaptureState::Idle.on_event(CaptureEvent::Intercepted { online: true });
        assert_eq!(state, CaptureState::Idle);
        assert_eq!(actions, vec![CaptureAction::PassThrough]);
    }

    #[test]
    fn offline_starts_capturing() {
        let (state, actions) =
            CaptureState::Idle.on_event(CaptureEvent::Intercepted { online: false });
        assert_eq!(state, CaptureState::Capturing);
        assert_eq!(actions, vec![CaptureAction::Serialize]);
    }

    #[test]
    fn serialized_broadcasts_then_acknowledges() {
        let write = write();
        let sync_id = write.sync_id;
        let (state, actions) = CaptureState::Capturing.on_event(CaptureEvent::Serialized {
            write: write.clone(),
        });

        assert_eq!(state, CaptureState::Dispatched { sync_id });
        assert!(state.is_dispatched());
        assert_eq!(
            actions,
            vec![
                CaptureAction::Broadcast(HostMessage::OfflineQueue { data: write }),
                CaptureAction::Acknowledge { sync_id },
            ]
        );
    }

    #[test]
    fn serialization_failure_rejects_without_broadcast() {
        let (state, actions) = CaptureState::Capturing.on_event(CaptureEvent::SerializationFailed {
            error: "serialization failed: key must be a string".into(),
        });
        assert_eq!(state, CaptureState::Idle);
        assert_eq!(
            actions,
            vec![CaptureAction::Reject {
                error: "serialization failed: key must be a string".into()
            }]
        );
        assert!(!actions
            .iter()
            .any(|a| matches!(a, CaptureAction::Broadcast(_))));
    }

    #[test]
    fn dispatched_ignores_further_events() {
        let sync_id = SyncId::new();
        let (state, actions) = CaptureState::Dispatched { sync_id }
            .on_event(CaptureEvent::Intercepted { online: false });
        assert_eq!(state, CaptureState::Dispatched { sync_id });
        assert!(actions.is_empty());
    }

    #[test]
    fn serialized_while_idle_is_ignored() {
        let (state, actions) =
            CaptureState::Idle.on_event(CaptureEvent::Serialized { write: write() });
        assert_eq!(state, CaptureState::Idle);
        assert!(actions.is_empty());
    }
}
