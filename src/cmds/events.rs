use std::io::Write;

use crate::cache::CacheStorage;
use crate::cli::events::EventOptions;
use crate::clients::Clients;
use crate::controller::{CacheController, NotificationClick, SyncOutcome};
use crate::io::HttpRunner;
use crate::Result;

pub fn execute<S: CacheStorage, R: HttpRunner, C: Clients, W: Write>(
    options: EventOptions,
    controller: &CacheController<S, R, C>,
    mut writer: W,
) -> Result<()> {
    match options {
        EventOptions::Push { payload } => {
            let notification = controller.handle_push(payload.as_deref().map(str::as_bytes));
            writeln!(writer, "{}", serde_json::to_string_pretty(&notification)?)?;
        }
        EventOptions::Click { action } => {
            // Events are delivered one per invocation, so the click targets a
            // freshly built notification.
            let notification = controller.build_notification(None);
            match controller.handle_notification_click(&notification, action.as_deref()) {
                NotificationClick::Opened(url) => writeln!(writer, "Opened {url}")?,
                NotificationClick::Closed => writeln!(writer, "Closed")?,
            }
        }
        EventOptions::Sync { tag } => match controller.handle_sync(&tag) {
            SyncOutcome::Acknowledged => writeln!(writer, "Acknowledged {tag}")?,
            SyncOutcome::Ignored => writeln!(writer, "Ignored {tag}")?,
        },
    }
    Ok(())
}
