use clap::Parser;

use crate::api_defaults;

#[derive(Parser)]
pub struct PushCommand {
    /// Message body. The default update message is shown when absent
    #[clap(long)]
    payload: Option<String>,
}

#[derive(Parser)]
pub struct ClickCommand {
    /// Notification action clicked (explore, close). Omit for a click on the
    /// notification body
    #[clap(long)]
    action: Option<String>,
}

#[derive(Parser)]
pub struct SyncCommand {
    #[clap(long, default_value = api_defaults::BACKGROUND_SYNC_TAG)]
    tag: String,
}

pub enum EventOptions {
    Push { payload: Option<String> },
    Click { action: Option<String> },
    Sync { tag: String },
}

impl From<PushCommand> for EventOptions {
    fn from(options: PushCommand) -> Self {
        EventOptions::Push {
            payload: options.payload,
        }
    }
}

impl From<ClickCommand> for EventOptions {
    fn from(options: ClickCommand) -> Self {
        EventOptions::Click {
            action: options.action,
        }
    }
}

impl From<SyncCommand> for EventOptions {
    fn from(options: SyncCommand) -> Self {
        EventOptions::Sync { tag: options.tag }
    }
}
