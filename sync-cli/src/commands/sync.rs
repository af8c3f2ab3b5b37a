//! Fire a background sync trigger.

use anyhow::Result;

use crate::host::Host;

/// Run the sync command.
pub async fn run(host: &mut Host, tag: Option<&str>) -> Result<()> {
    let tag = tag.unwrap_or(&host.engine.config().sync.tag).to_string();

    if host.engine.on_sync(&tag).await {
        println!("Sync '{}': clients told to flush their queues", tag);
    } else {
        println!("Sync '{}': not handled", tag);
    }
    host.print_client_events();
    Ok(())
}
