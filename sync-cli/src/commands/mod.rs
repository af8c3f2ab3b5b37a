//! CLI command implementations.

pub mod activate;
pub mod buckets;
pub mod click;
pub mod fetch;
pub mod install;
pub mod message;
pub mod push;
pub mod sync;
