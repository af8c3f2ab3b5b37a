//! List cache buckets.

use anyhow::{Context, Result};
use sync_types::BucketId;

use crate::host::Host;

/// Run the buckets command.
pub async fn run(host: &Host, show_keys: bool) -> Result<()> {
    let store = host.engine.store();
    let current: Vec<String> = host
        .engine
        .config()
        .current_buckets()
        .iter()
        .map(BucketId::storage_name)
        .collect();

    let names = store
        .list_buckets()
        .await
        .context("Failed to list buckets")?;

    println!("=== offsync buckets ===");
    if names.is_empty() {
        println!("No buckets. Run 'offsync install' first.");
        return Ok(());
    }

    for name in names {
        let label = if current.contains(&name) { "current" } else { "stale" };
        let keys = store
            .keys_named(&name)
            .await
            .with_context(|| format!("Failed to list keys of {}", name))?;
        println!("{} ({}, {} entries)", name, label, keys.len());
        if show_keys {
            for key in keys {
                println!("  {}", key);
            }
        }
    }
    Ok(())
}
