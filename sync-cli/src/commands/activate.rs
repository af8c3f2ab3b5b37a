//! Activate the current version.

use anyhow::Result;
use sync_engine::ActivateReport;

use crate::host::Host;

/// Run the activate command.
pub async fn run(host: &mut Host) -> Result<()> {
    let report = host.engine.on_activate().await;
    print_activation(&report);
    host.print_client_events();
    Ok(())
}

/// Print an activation report.
pub fn print_activation(report: &ActivateReport) {
    println!("Activated.");
    if report.deleted.is_empty() {
        println!("  No stale buckets");
    } else {
        for name in &report.deleted {
            println!("  Deleted: {}", name);
        }
    }
    println!("  Reloaded clients: {}", report.reloaded);
}
