//! Engine configuration.
//!
//! Everything the engine needs to know about its deployment is injected here
//! at construction: the origin it serves, bucket names and the version tag,
//! the precache list, the API allow-list and the sync trigger tag. Every
//! field has a default so a partial TOML section is enough.

use serde::{Deserialize, Serialize};
use sync_types::{BucketId, Url};

/// Root configuration for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Origin the engine serves (scheme, host, port).
    #[serde(default = "default_origin")]
    pub origin: Url,
    /// Cache buckets and strategy inputs.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Background sync settings.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Install/activate behaviour.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    /// Push notification defaults.
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Version tag baked into every bucket name (default: "v1").
    /// Bump on deploy to supersede old buckets.
    #[serde(default = "default_version")]
    pub version: String,
    /// Logical name of the static-asset bucket (default: "static").
    #[serde(default = "default_static_bucket")]
    pub static_bucket: String,
    /// Logical name of the API-response bucket (default: "api").
    #[serde(default = "default_api_bucket")]
    pub api_bucket: String,
    /// Paths fetched into the static bucket on install.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,
    /// Path prefix of the API namespace (default: "/api/").
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// API path prefixes whose GET responses may be cached (default: none).
    #[serde(default)]
    pub api_allow_list: Vec<String>,
    /// Document served for offline navigations when nothing better is cached.
    #[serde(default = "default_app_shell")]
    pub app_shell: String,
}

/// Background sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Sync trigger tag the engine reacts to (default: "sync-offline-queue").
    #[serde(default = "default_sync_tag")]
    pub tag: String,
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Activate immediately after install instead of waiting (default: true).
    #[serde(default = "default_skip_waiting")]
    pub skip_waiting_on_install: bool,
}

/// Push notification defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Title used when a payload has none.
    #[serde(default = "default_title")]
    pub default_title: String,
    /// Icon URL attached to every notification.
    #[serde(default)]
    pub icon: Option<String>,
    /// Badge URL attached to every notification.
    #[serde(default)]
    pub badge: Option<String>,
    /// Tag attached to every notification.
    #[serde(default)]
    pub tag: Option<String>,
}

// Default value functions
fn default_origin() -> Url {
    Url::parse("http://localhost:8080").expect("static origin parses")
}

fn default_version() -> String {
    "v1".to_string()
}

fn default_static_bucket() -> String {
    "static".to_string()
}

fn default_api_bucket() -> String {
    "api".to_string()
}

fn default_precache() -> Vec<String> {
    vec!["/".to_string(), "/index.html".to_string()]
}

fn default_api_prefix() -> String {
    "/api/".to_string()
}

fn default_app_shell() -> String {
    "/index.html".to_string()
}

fn default_sync_tag() -> String {
    "sync-offline-queue".to_string()
}

fn default_skip_waiting() -> bool {
    true
}

fn default_title() -> String {
    "New notification".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache: CacheConfig::default(),
            sync: SyncConfig::default(),
            lifecycle: LifecycleConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            static_bucket: default_static_bucket(),
            api_bucket: default_api_bucket(),
            precache: default_precache(),
            api_prefix: default_api_prefix(),
            api_allow_list: Vec::new(),
            app_shell: default_app_shell(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tag: default_sync_tag(),
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            skip_waiting_on_install: default_skip_waiting(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            icon: None,
            badge: None,
            tag: None,
        }
    }
}

impl EngineConfig {
    /// Create a configuration for the given origin with defaults elsewhere.
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    /// Set the cache version tag.
    pub fn with_version(mut self, version: &str) -> Self {
        self.cache.version = version.to_string();
        self
    }

    /// Set the precache list.
    pub fn with_precache<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cache.precache = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the API cache allow-list.
    pub fn with_api_allow_list<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cache.api_allow_list = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the sync trigger tag.
    pub fn with_sync_tag(mut self, tag: &str) -> Self {
        self.sync.tag = tag.to_string();
        self
    }

    /// The current static-asset bucket.
    pub fn static_bucket(&self) -> BucketId {
        BucketId::new(&self.cache.static_bucket, &self.cache.version)
    }

    /// The current API-response bucket.
    pub fn api_bucket(&self) -> BucketId {
        BucketId::new(&self.cache.api_bucket, &self.cache.version)
    }

    /// The fixed set of current buckets. Everything else is stale.
    pub fn current_buckets(&self) -> Vec<BucketId> {
        vec![self.static_bucket(), self.api_bucket()]
    }

    /// Check invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns an error if the two buckets would share a storage name, the
    /// version tag is empty, or the origin is not http(s).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.version.trim().is_empty() {
            return Err(ConfigError::EmptyVersion);
        }
        if self.static_bucket().storage_name() == self.api_bucket().storage_name() {
            return Err(ConfigError::BucketCollision {
                name: self.static_bucket().storage_name(),
            });
        }
        if !matches!(self.origin.scheme(), "http" | "https") || !self.origin.has_host() {
            return Err(ConfigError::InvalidOrigin {
                origin: self.origin.to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Static and API buckets resolve to the same storage name.
    #[error("static and api buckets collide on {name}")]
    BucketCollision {
        /// The colliding storage name.
        name: String,
    },
    /// The version tag is empty.
    #[error("cache version tag must not be empty")]
    EmptyVersion,
    /// The origin is not an http(s) origin.
    #[error("origin must be an http(s) URL with a host: {origin}")]
    InvalidOrigin {
        /// The rejected origin.
        origin: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.static_bucket().storage_name(), "static-v1");
        assert_eq!(config.api_bucket().storage_name(), "api-v1");
        assert_eq!(config.sync.tag, "sync-offline-queue");
        assert!(config.lifecycle.skip_waiting_on_install);
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
origin = "https://app.example.com"

[cache]
version = "v7"
precache = ["/", "/index.html", "/main.js", "/style.css"]
api_allow_list = ["/api/health", "/api/dashboard"]

[sync]
tag = "replay"

[notifications]
default_title = "Inventory"
icon = "/icons/192.png"
"#;

        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.origin.as_str(), "https://app.example.com/");
        assert_eq!(config.cache.version, "v7");
        assert_eq!(config.cache.precache.len(), 4);
        assert_eq!(config.cache.api_allow_list, vec!["/api/health", "/api/dashboard"]);
        assert_eq!(config.sync.tag, "replay");
        assert_eq!(config.notifications.default_title, "Inventory");
        assert_eq!(config.notifications.icon.as_deref(), Some("/icons/192.png"));
        assert_eq!(config.static_bucket().storage_name(), "static-v7");
    }

    #[test]
    fn config_missing_fields_use_defaults() {
        let config: EngineConfig = toml::from_str("[cache]\nversion = \"v2\"\n").unwrap();
        assert_eq!(config.cache.api_prefix, "/api/");
        assert_eq!(config.cache.app_shell, "/index.html");
        assert!(config.cache.api_allow_list.is_empty());
        assert_eq!(config.origin.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn bucket_collision_is_rejected() {
        let mut config = EngineConfig::default();
        config.cache.api_bucket = config.cache.static_bucket.clone();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BucketCollision { .. })
        ));
    }

    #[test]
    fn empty_version_is_rejected() {
        let config = EngineConfig::default().with_version(" ");
        assert_eq!(config.validate(), Err(ConfigError::EmptyVersion));
    }

    #[test]
    fn non_http_origin_is_rejected() {
        let config = EngineConfig::new(Url::parse("file:///srv/app").unwrap());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOrigin { .. })
        ));
    }

    #[test]
    fn builder_helpers() {
        let config = EngineConfig::default()
            .with_version("v3")
            .with_precache(["/", "/app.js"])
            .with_api_allow_list(["/api/health"])
            .with_sync_tag("outbox");
        assert_eq!(config.current_buckets().len(), 2);
        assert_eq!(config.cache.precache, vec!["/", "/app.js"]);
        assert_eq!(config.cache.api_allow_list, vec!["/api/health"]);
        assert_eq!(config.sync.tag, "outbox");
        assert_eq!(config.api_bucket().version(), "v3");
    }
}
