//! Engine - the event interface of offsync.
//!
//! The host adapter forwards platform events to [`Engine`]'s hooks. The
//! engine consults the pure state machines in sync-core and performs the
//! resulting I/O through its capabilities.
//!
//! ```text
//! Host adapter → Engine → CacheStore / Network / ClientContexts / Notifier
//!                   ↓
//!              sync-core (router, lifecycle, capture)
//! ```
//!
//! No hook returns an error. Failures end as a synthetic response, a count
//! in a report, or a logged no-op.

use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use sync_core::{
    build_intent, fallback, stale_buckets, validate_target, CaptureAction, CaptureEvent,
    CaptureState, ConfigError, EngineConfig, LifecycleAction, LifecycleEvent, LifecycleState,
    Router, Strategy,
};
use sync_types::{
    unix_millis, CacheKey, HostCommand, HostMessage, Method, NotificationIntent, PushPayload,
    QueuedWrite, Request, Response, SyncId,
};

use crate::clients::ClientContexts;
use crate::network::Network;
use crate::notify::Notifier;
use crate::store::{CacheBackend, CacheStore};
use crate::strategy::{self, NetworkFirst};

/// Engine construction errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration violates an engine invariant.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Platform capabilities the engine runs on.
#[derive(Clone)]
pub struct Capabilities {
    /// Cache bucket storage.
    pub cache: Arc<dyn CacheBackend>,
    /// Outbound requests and connectivity.
    pub network: Arc<dyn Network>,
    /// Open client contexts.
    pub clients: Arc<dyn ClientContexts>,
    /// Notification display.
    pub notifier: Arc<dyn Notifier>,
}

/// Outcome of an install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Precache assets stored.
    pub cached: usize,
    /// Precache assets that failed (network error, non-2xx, or store error).
    pub failed: usize,
    /// Activation run immediately after install, if any.
    pub activation: Option<ActivateReport>,
}

/// Outcome of an activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivateReport {
    /// Stale buckets deleted.
    pub deleted: Vec<String>,
    /// Clients re-navigated.
    pub reloaded: usize,
}

/// The offline-first cache-and-sync engine.
pub struct Engine {
    config: EngineConfig,
    router: Router,
    store: CacheStore,
    network: Arc<dyn Network>,
    clients: Arc<dyn ClientContexts>,
    notifier: Arc<dyn Notifier>,
    app_shell: Option<CacheKey>,
    lifecycle: Mutex<LifecycleState>,
}

impl Engine {
    /// Create an engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: EngineConfig, caps: Capabilities) -> Result<Self, EngineError> {
        config.validate()?;

        let app_shell = config
            .origin
            .join(&config.cache.app_shell)
            .ok()
            .map(|url| CacheKey::new(Method::GET, &url));

        Ok(Self {
            router: Router::new(&config.cache),
            store: CacheStore::new(caps.cache),
            network: caps.network,
            clients: caps.clients,
            notifier: caps.notifier,
            app_shell,
            lifecycle: Mutex::new(LifecycleState::new()),
            config,
        })
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The cache store.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Snapshot of the lifecycle state.
    pub async fn lifecycle(&self) -> LifecycleState {
        self.lifecycle.lock().await.clone()
    }

    // ===========================================
    // Lifecycle
    // ===========================================

    /// Install: open the current buckets and precache the configured assets.
    ///
    /// Individual asset failures are counted, never fatal. With
    /// `skip_waiting_on_install`, activation runs before returning.
    ///
    /// The lifecycle lock is not held while precaching. Meanwhile the engine
    /// is `Installing`, so activation and skip-waiting are ignored rather than
    /// blocked behind a slow asset.
    pub async fn on_install(&self) -> InstallReport {
        let version = self.config.cache.version.clone();
        let actions = {
            let mut state = self.lifecycle.lock().await;
            let actions = transition(&mut state, LifecycleEvent::InstallRequested { version });
            if actions.is_empty() {
                tracing::debug!("Install ignored in state {:?}", *state);
                return InstallReport::default();
            }
            actions
        };

        let mut report = InstallReport::default();
        for action in actions {
            match action {
                LifecycleAction::OpenBuckets => self.open_buckets().await,
                LifecycleAction::Precache => {
                    let (cached, failed) = self.precache().await;
                    report.cached = cached;
                    report.failed = failed;
                }
                other => tracing::debug!("Unexpected install action {:?}", other),
            }
        }

        let mut state = self.lifecycle.lock().await;
        let skip_waiting = self.config.lifecycle.skip_waiting_on_install;
        let actions = transition(&mut state, LifecycleEvent::InstallCompleted { skip_waiting });
        tracing::info!(
            version = %self.config.cache.version,
            "Installed: {} cached, {} failed",
            report.cached,
            report.failed
        );

        if actions.contains(&LifecycleAction::Activate) {
            report.activation = Some(self.activate_locked(&mut state).await);
        }
        report
    }

    /// Activate: delete stale buckets, then reload every open client.
    pub async fn on_activate(&self) -> ActivateReport {
        let mut state = self.lifecycle.lock().await;
        self.activate_locked(&mut state).await
    }

    async fn activate_locked(&self, state: &mut LifecycleState) -> ActivateReport {
        let version = self.config.cache.version.clone();
        let actions = transition(state, LifecycleEvent::ActivateRequested { version });
        if actions.is_empty() {
            tracing::debug!("Activate ignored in state {:?}", state);
            return ActivateReport::default();
        }

        let mut report = ActivateReport::default();
        for action in actions {
            match action {
                LifecycleAction::DeleteStaleBuckets => {
                    report.deleted = self.delete_stale_buckets().await;
                }
                LifecycleAction::ReloadClients => {
                    report.reloaded = self.reload_clients().await;
                }
                other => tracing::debug!("Unexpected activate action {:?}", other),
            }
        }

        transition(state, LifecycleEvent::ActivateCompleted);
        tracing::info!(
            version = %self.config.cache.version,
            "Activated: {} stale buckets deleted, {} clients reloaded",
            report.deleted.len(),
            report.reloaded
        );
        report
    }

    async fn open_buckets(&self) {
        for bucket in self.config.current_buckets() {
            if let Err(e) = self.store.open(&bucket).await {
                tracing::warn!(bucket = %bucket, "Failed to open bucket: {}", e);
            }
        }
    }

    async fn precache(&self) -> (usize, usize) {
        let bucket = self.config.static_bucket();
        let (mut cached, mut failed) = (0, 0);

        for path in &self.config.cache.precache {
            let url = match self.config.origin.join(path) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Precache {} skipped: {}", path, e);
                    failed += 1;
                    continue;
                }
            };
            let request = Request::new(Method::GET, url);

            let response = match self.network.fetch(&request).await {
                Ok(response) if response.is_ok() => response,
                Ok(response) => {
                    tracing::warn!("Precache {} failed: status {}", path, response.status());
                    failed += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Precache {} failed: {}", path, e);
                    failed += 1;
                    continue;
                }
            };

            match self.store.put(&bucket, request.cache_key(), &response).await {
                Ok(true) => cached += 1,
                Ok(false) => failed += 1,
                Err(e) => {
                    tracing::warn!("Precache {} not stored: {}", path, e);
                    failed += 1;
                }
            }
        }
        (cached, failed)
    }

    async fn delete_stale_buckets(&self) -> Vec<String> {
        let existing = match self.store.list_buckets().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!("Failed to list buckets: {}", e);
                return Vec::new();
            }
        };

        let mut deleted = Vec::new();
        for name in stale_buckets(&existing, &self.config.current_buckets()) {
            match self.store.delete(&name).await {
                Ok(true) => {
                    tracing::info!(bucket = %name, "Deleted stale bucket");
                    deleted.push(name);
                }
                Ok(false) => {}
                Err(e) => tracing::warn!(bucket = %name, "Failed to delete bucket: {}", e),
            }
        }
        deleted
    }

    async fn reload_clients(&self) -> usize {
        let clients = match self.clients.list().await {
            Ok(clients) => clients,
            Err(e) => {
                tracing::warn!("Failed to list clients: {}", e);
                return 0;
            }
        };

        let mut reloaded = 0;
        for client in clients {
            match self.clients.navigate(&client.id, &client.url).await {
                Ok(()) => reloaded += 1,
                Err(e) => tracing::warn!(client = %client.id, "Failed to reload: {}", e),
            }
        }
        reloaded
    }

    // ===========================================
    // Fetch
    // ===========================================

    /// Answer an intercepted request.
    pub async fn on_fetch(&self, request: Request) -> Response {
        match self.router.route(&request) {
            Strategy::PassThrough => match self.network.fetch(&request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!(url = %request.url(), "Bypass fetch failed: {}", e);
                    fallback::offline_document()
                }
            },
            Strategy::WriteCapture => self.capture(&request).await,
            Strategy::NetworkFirst {
                fallback,
                cache_writes,
            } => {
                let policy = NetworkFirst {
                    api_bucket: self.config.api_bucket(),
                    static_bucket: self.config.static_bucket(),
                    fallback,
                    cache_writes,
                    app_shell: self.app_shell.clone(),
                };
                strategy::network_first(&self.store, self.network.as_ref(), &policy, &request)
                    .await
            }
            Strategy::CacheFirst => {
                strategy::cache_first(
                    &self.store,
                    self.network.as_ref(),
                    &self.config.static_bucket(),
                    &request,
                )
                .await
            }
        }
    }

    async fn capture(&self, request: &Request) -> Response {
        let mut state = CaptureState::new();
        let online = self.network.is_online();
        let mut pending: VecDeque<CaptureAction> =
            transition_capture(&mut state, CaptureEvent::Intercepted { online }).into();
        let mut response = None;

        while let Some(action) = pending.pop_front() {
            match action {
                CaptureAction::PassThrough => {
                    response = Some(match self.network.fetch(request).await {
                        Ok(response) => response,
                        Err(e) => {
                            tracing::debug!(url = %request.url(), "Write failed while online: {}", e);
                            fallback::offline_api()
                        }
                    });
                }
                CaptureAction::Serialize => {
                    let write = QueuedWrite::from_request(request, SyncId::new(), unix_millis());
                    let event = match write.to_json() {
                        Ok(_) => CaptureEvent::Serialized { write },
                        Err(e) => CaptureEvent::SerializationFailed {
                            error: e.to_string(),
                        },
                    };
                    pending.extend(transition_capture(&mut state, event));
                }
                CaptureAction::Broadcast(message) => match self.clients.broadcast(&message).await {
                    Ok(0) => tracing::warn!("No client received {}", message.kind()),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Failed to broadcast {}: {}", message.kind(), e),
                },
                CaptureAction::Acknowledge { sync_id } => {
                    tracing::info!(
                        sync_id = %sync_id,
                        url = %request.url(),
                        "Queued {} for sync",
                        request.method()
                    );
                    response = Some(fallback::queued(sync_id));
                }
                CaptureAction::Reject { error } => {
                    tracing::warn!(url = %request.url(), "Failed to queue request: {}", error);
                    response = Some(fallback::capture_failed(&error));
                }
            }
        }

        response.unwrap_or_else(fallback::offline_api)
    }

    // ===========================================
    // Sync, push, notifications, host messages
    // ===========================================

    /// Handle a background sync trigger.
    ///
    /// Returns whether the tag was recognised. The engine only tells the
    /// host to flush; it never replays requests itself.
    pub async fn on_sync(&self, tag: &str) -> bool {
        if tag != self.config.sync.tag {
            tracing::debug!("Ignoring sync tag {}", tag);
            return false;
        }

        for message in [HostMessage::SyncStart, HostMessage::FlushQueue] {
            if let Err(e) = self.clients.broadcast(&message).await {
                tracing::warn!("Failed to broadcast {}: {}", message.kind(), e);
            }
        }
        true
    }

    /// Handle a push. Returns the notification shown, if any.
    pub async fn on_push(&self, data: Option<&[u8]>) -> Option<NotificationIntent> {
        let Some(payload) = PushPayload::parse(data) else {
            tracing::debug!("Ignoring push without a usable payload");
            return None;
        };

        let intent = build_intent(payload, &self.config.notifications);
        match self.notifier.show(&intent).await {
            Ok(()) => Some(intent),
            Err(e) => {
                tracing::warn!("Failed to show notification: {}", e);
                None
            }
        }
    }

    /// Handle a notification click. Returns the validated target path.
    pub async fn on_notification_click(&self, notification: &NotificationIntent) -> String {
        if let Err(e) = self.notifier.close(notification.tag.as_deref()).await {
            tracing::debug!("Failed to close notification: {}", e);
        }

        let target = validate_target(&notification.target_url, &self.config.origin);
        let absolute = self
            .config
            .origin
            .join(&target)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| target.clone());

        let existing = match self.clients.list().await {
            Ok(clients) => clients.into_iter().find(|c| c.url == absolute),
            Err(e) => {
                tracing::warn!("Failed to list clients: {}", e);
                None
            }
        };

        let focused = match existing {
            Some(client) => match self.clients.focus(&client.id).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!(client = %client.id, "Failed to focus: {}", e);
                    false
                }
            },
            None => false,
        };
        if !focused {
            if let Err(e) = self.clients.open_window(&absolute).await {
                tracing::warn!("Failed to open {}: {}", absolute, e);
            }
        }
        target
    }

    /// Handle a message posted by a client context.
    pub async fn on_message(&self, client_id: &str, data: &[u8]) {
        let command = match HostCommand::from_json(data) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(client = %client_id, "Ignoring message: {}", e);
                return;
            }
        };

        match command {
            HostCommand::SkipWaiting => {
                let mut state = self.lifecycle.lock().await;
                let actions = transition(&mut state, LifecycleEvent::SkipWaitingRequested);
                if actions.contains(&LifecycleAction::Activate) {
                    self.activate_locked(&mut state).await;
                } else {
                    tracing::debug!("SKIP_WAITING ignored in state {:?}", *state);
                }
            }
            HostCommand::GetVersion => {
                let reply = HostMessage::Version {
                    version: self.config.cache.version.clone(),
                };
                if let Err(e) = self.clients.post(client_id, &reply).await {
                    tracing::warn!(client = %client_id, "Failed to reply with version: {}", e);
                }
            }
            HostCommand::ClearCaches => {
                let names = match self.store.list_buckets().await {
                    Ok(names) => names,
                    Err(e) => {
                        tracing::warn!("Failed to list buckets: {}", e);
                        return;
                    }
                };
                for name in names {
                    if let Err(e) = self.store.delete(&name).await {
                        tracing::warn!(bucket = %name, "Failed to delete bucket: {}", e);
                    }
                }
                tracing::info!("Cleared all caches");
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("origin", &self.config.origin.as_str())
            .field("version", &self.config.cache.version)
            .finish_non_exhaustive()
    }
}

fn transition(state: &mut LifecycleState, event: LifecycleEvent) -> Vec<LifecycleAction> {
    let (next, actions) = std::mem::take(state).on_event(event);
    *state = next;
    actions
}

fn transition_capture(state: &mut CaptureState, event: CaptureEvent) -> Vec<CaptureAction> {
    let (next, actions) = std::mem::take(state).on_event(event);
    *state = next;
    actions
}
