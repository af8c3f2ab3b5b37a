//! Install/activate lifecycle state machine.
//!
//! Pure and side-effect free: the machine takes events and produces a new
//! state plus a list of actions. The engine performs the actual cache and
//! client I/O and reports completion back as events.
//!
//! ```text
//! NoCache ─► Installing ─► Installed ─► Activating ─► Active
//!                              ▲                        │
//!                              └──── reinstall ◄────────┘
//! ```

use sync_types::BucketId;

/// Lifecycle state - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Nothing installed yet.
    #[default]
    NoCache,
    /// Buckets are being opened and precached.
    Installing {
        /// Version being installed.
        version: String,
    },
    /// Installed and waiting to activate.
    Installed {
        /// Installed version.
        version: String,
    },
    /// Stale buckets are being removed.
    Activating {
        /// Version being activated.
        version: String,
    },
    /// Serving requests from the current buckets.
    Active {
        /// Active version.
        version: String,
    },
}

/// Events that drive the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The platform asked the engine to install.
    InstallRequested {
        /// Version baked into the engine configuration.
        version: String,
    },
    /// Buckets opened and precache attempted.
    InstallCompleted {
        /// Activate immediately instead of waiting.
        skip_waiting: bool,
    },
    /// A host context asked a waiting engine to activate.
    SkipWaitingRequested,
    /// The platform asked the engine to activate.
    ActivateRequested {
        /// Version baked into the engine configuration.
        version: String,
    },
    /// Stale buckets deleted and clients reloaded.
    ActivateCompleted,
}

/// Actions to be executed by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Open every current bucket.
    OpenBuckets,
    /// Fetch the precache list into the static bucket.
    Precache,
    /// Run activation now.
    Activate,
    /// Delete every bucket outside the current set.
    DeleteStaleBuckets,
    /// Re-navigate every open client to its current URL.
    ReloadClients,
}

impl LifecycleState {
    /// Create a new state machine in the NoCache state.
    pub fn new() -> Self {
        Self::NoCache
    }

    /// Process an event and return the new state plus actions to execute.
    pub fn on_event(self, event: LifecycleEvent) -> (Self, Vec<LifecycleAction>) {
        match (self, event) {
            // Install (first install, retry, or reinstall of an active engine)
            (
                Self::NoCache | Self::Installed { .. } | Self::Active { .. },
                LifecycleEvent::InstallRequested { version },
            ) => (
                Self::Installing { version },
                vec![LifecycleAction::OpenBuckets, LifecycleAction::Precache],
            ),
            (Self::Installing { version }, LifecycleEvent::InstallCompleted { skip_waiting }) => {
                let actions = if skip_waiting {
                    vec![LifecycleAction::Activate]
                } else {
                    vec![]
                };
                (Self::Installed { version }, actions)
            }

            // Waiting
            (Self::Installed { version }, LifecycleEvent::SkipWaitingRequested) => {
                (Self::Installed { version }, vec![LifecycleAction::Activate])
            }

            // Activate. A previously installed engine may be activated by a
            // fresh process, so NoCache is accepted too.
            (
                Self::NoCache | Self::Installed { .. } | Self::Active { .. },
                LifecycleEvent::ActivateRequested { version },
            ) => (
                Self::Activating { version },
                vec![
                    LifecycleAction::DeleteStaleBuckets,
                    LifecycleAction::ReloadClients,
                ],
            ),
            (Self::Activating { version }, LifecycleEvent::ActivateCompleted) => {
                (Self::Active { version }, vec![])
            }

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// Check if serving from current buckets.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Check if installed and waiting for activation.
    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }

    /// The version this state refers to, if any.
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::NoCache => None,
            Self::Installing { version }
            | Self::Installed { version }
            | Self::Activating { version }
            | Self::Active { version } => Some(version),
        }
    }
}

/// Bucket names to delete on activation: every existing bucket whose name is
/// not in the current set.
///
/// Never returns a current bucket, so calling it again after deletion yields
/// an empty list.
pub fn stale_buckets(existing: &[String], current: &[BucketId]) -> Vec<String> {
    existing
        .iter()
        .filter(|name| {
            !current
                .iter()
                .any(|bucket| bucket.storage_name() == name.as_str())
        })
        .cloned()
        .collect()
}
