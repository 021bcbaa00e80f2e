use serde::Serialize;

use crate::api_defaults;
use crate::time::now_epoch_millis;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

impl NotificationAction {
    fn new(action: &str, title: &str) -> Self {
        NotificationAction {
            action: action.to_string(),
            title: title.to_string(),
            icon: api_defaults::NOTIFICATION_BADGE.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NotificationData {
    /// Epoch milliseconds at which the push was received.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Notification for a push event. Without a payload the default update
    /// message is shown.
    pub fn from_push(title: &str, payload: Option<&[u8]>) -> Self {
        let body = match payload {
            Some(payload) => String::from_utf8_lossy(payload).into_owned(),
            None => api_defaults::NOTIFICATION_DEFAULT_BODY.to_string(),
        };
        Notification {
            title: title.to_string(),
            body,
            icon: api_defaults::NOTIFICATION_ICON.to_string(),
            badge: api_defaults::NOTIFICATION_BADGE.to_string(),
            vibrate: api_defaults::NOTIFICATION_VIBRATE.to_vec(),
            data: NotificationData {
                date_of_arrival: now_epoch_millis(),
                primary_key: 1,
            },
            actions: vec![
                NotificationAction::new(api_defaults::NOTIFICATION_ACTION_EXPLORE, "Ver"),
                NotificationAction::new(api_defaults::NOTIFICATION_ACTION_CLOSE, "Cerrar"),
            ],
        }
    }
}
