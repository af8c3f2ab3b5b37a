//! Simulate a notification click.

use anyhow::Result;
use sync_core::build_intent;
use sync_types::PushPayload;

use crate::host::Host;

/// Run the click command.
pub async fn run(host: &mut Host, url: Option<String>, tag: Option<String>) -> Result<()> {
    let payload = PushPayload {
        url,
        ..PushPayload::default()
    };
    let mut notification = build_intent(payload, &host.engine.config().notifications);
    if tag.is_some() {
        notification.tag = tag;
    }

    let target = host.engine.on_notification_click(&notification).await;

    println!("Target: {}", target);
    host.print_client_events();
    Ok(())
}
