//! User notifications and connectivity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::types::ApplicationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// A download, resume or update was refused because the device is offline.
    NoInternet,
}

/// A structured notification for the front end to display.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub app_id: Option<String>,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn no_internet(app: &ApplicationRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: NotificationKind::NoInternet,
            app_id: Some(app.id.clone()),
            title: format!(
                "No internet connection. {} will be available once you are back online.",
                app.name_or_package()
            ),
            created_at: Utc::now(),
        }
    }
}

pub type NotificationSender = mpsc::UnboundedSender<Notification>;
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

pub fn notification_channel() -> (NotificationSender, NotificationReceiver) {
    mpsc::unbounded_channel()
}

// =============================================================================
// Connectivity
// =============================================================================

/// Reports whether the device currently has network access.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Connectivity driven by an externally updated flag.
#[derive(Debug)]
pub struct OnlineFlag(AtomicBool);

impl OnlineFlag {
    pub fn new(online: bool) -> Self {
        Self(AtomicBool::new(online))
    }

    pub fn set_online(&self, online: bool) {
        self.0.store(online, Ordering::SeqCst);
    }
}

impl Default for OnlineFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for OnlineFlag {
    fn is_online(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_flag_toggles() {
        let flag = OnlineFlag::default();
        assert!(flag.is_online());
        flag.set_online(false);
        assert!(!flag.is_online());
    }

    #[test]
    fn test_no_internet_notification() {
        let app = ApplicationRecord::new("browser", "Safe Browser");
        let notification = Notification::no_internet(&app);
        assert_eq!(notification.kind, NotificationKind::NoInternet);
        assert_eq!(notification.app_id.as_deref(), Some("browser"));
        assert!(notification.title.contains("Safe Browser"));

        let json = serde_json::to_string(&notification).unwrap();
        assert!(json.contains("NO_INTERNET"));
    }

    #[test]
    fn test_notification_ids_are_unique() {
        let app = ApplicationRecord::new("browser", "Safe Browser");
        assert_ne!(
            Notification::no_internet(&app).id,
            Notification::no_internet(&app).id
        );
    }
}
