use crate::notification::Notification;
use crate::Result;
use crate::{log_debug, log_info};

/// The pages and windows a controller serves, plus the platform surfaces it
/// can drive on their behalf (notifications, new windows).
pub trait Clients {
    /// Take control of every open page so the fetch policy applies without a
    /// reload.
    fn claim(&self) -> Result<()>;
    fn show_notification(&self, notification: &Notification) -> Result<()>;
    fn close_notification(&self, notification: &Notification) -> Result<()>;
    /// Open, or focus if already open, a window at `url`.
    fn open_window(&self, url: &str) -> Result<()>;
}

/// Host used by the command line: notifications go to the log and windows
/// open in the user's default browser.
pub struct DesktopClients;

impl Clients for DesktopClients {
    fn claim(&self) -> Result<()> {
        log_info!("Claimed all open clients");
        Ok(())
    }

    fn show_notification(&self, notification: &Notification) -> Result<()> {
        log_info!(
            "Notification: {} - {}",
            notification.title,
            notification.body
        );
        Ok(())
    }

    fn close_notification(&self, notification: &Notification) -> Result<()> {
        log_debug!("Closed notification: {}", notification.title);
        Ok(())
    }

    fn open_window(&self, url: &str) -> Result<()> {
        log_info!("Opening window at {}", url);
        Ok(open::that(url)?)
    }
}
