//! Deliver a host command as if posted by a client.

use anyhow::Result;

use crate::host::Host;

/// Run the message command.
pub async fn run(host: &mut Host, client_id: &str, json: &str) -> Result<()> {
    host.engine.on_message(client_id, json.as_bytes()).await;
    println!("Delivered from {}", client_id);
    host.print_client_events();
    Ok(())
}
