//! # sync-core
//!
//! Pure logic for offsync (no I/O, instant tests).
//!
//! This crate implements the decisions and state machines of the cache-and-sync
//! engine without any network, cache or client I/O, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (cache buckets, network fetches, client messaging) is
//! performed by `sync-engine`, which interprets the actions produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capture;
pub mod config;
pub mod fallback;
pub mod lifecycle;
pub mod notification;
pub mod router;

pub use capture::{CaptureAction, CaptureEvent, CaptureState};
pub use config::{
    CacheConfig, ConfigError, EngineConfig, LifecycleConfig, NotificationConfig, SyncConfig,
};
pub use lifecycle::{stale_buckets, LifecycleAction, LifecycleEvent, LifecycleState};
pub use notification::{build_intent, validate_target, ROOT_TARGET};
pub use router::{Fallback, RequestClass, Router, Strategy};
