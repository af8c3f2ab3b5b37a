//! Deliver a push payload.

use anyhow::Result;

use crate::host::Host;

/// Run the push command.
pub async fn run(host: &mut Host, payload: Option<&str>) -> Result<()> {
    match host.engine.on_push(payload.map(str::as_bytes)).await {
        Some(intent) => {
            println!("Notification shown:");
            println!("  Title:  {}", intent.title);
            println!("  Body:   {}", intent.body);
            println!("  Target: {}", intent.target_url);
        }
        None => println!("No notification (missing or unreadable payload)"),
    }
    Ok(())
}
