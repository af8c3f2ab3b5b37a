//! Install the current version.

use anyhow::Result;

use super::activate::print_activation;
use crate::host::Host;

/// Run the install command.
pub async fn run(host: &mut Host) -> Result<()> {
    let version = host.engine.config().cache.version.clone();
    println!("Installing {}...", version);

    let report = host.engine.on_install().await;

    println!("  Cached: {}", report.cached);
    println!("  Failed: {}", report.failed);
    match &report.activation {
        Some(activation) => print_activation(activation),
        None => println!("Installed and waiting. Send SKIP_WAITING or run 'offsync activate'."),
    }
    host.print_client_events();
    Ok(())
}
