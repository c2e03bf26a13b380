//! Notification sink interface.
//!
//! Notifications are addressed by a stable [`NotificationId`] so a single
//! message can be updated in place as the work it describes progresses.

use std::{fmt, time::Duration};

use serde::Serialize;
use tracing::*;
use uuid::Uuid;

/// Stable id of a rendered notification.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub(crate) fn transaction() -> Self {
        Self(format!("tx-{}", Uuid::new_v4()))
    }

    pub(crate) fn authorization() -> Self {
        Self(format!("auth-{}", Uuid::new_v4()))
    }

    pub(crate) fn network() -> Self {
        Self(format!("net-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A transient message shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub level: NotificationLevel,
    pub message: String,
    /// Block-explorer link, if any.
    pub link: Option<String>,
    /// `None` keeps the notification open until updated or dismissed.
    pub auto_close: Option<Duration>,
}

impl Notification {
    pub fn new(id: NotificationId, level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            id,
            level,
            message: message.into(),
            link: None,
            auto_close: None,
        }
    }

    pub fn info(id: NotificationId, message: impl Into<String>) -> Self {
        Self::new(id, NotificationLevel::Info, message)
    }

    pub fn success(id: NotificationId, message: impl Into<String>) -> Self {
        Self::new(id, NotificationLevel::Success, message)
    }

    pub fn error(id: NotificationId, message: impl Into<String>) -> Self {
        Self::new(id, NotificationLevel::Error, message)
    }

    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }

    pub fn auto_closing(mut self, after: Duration) -> Self {
        self.auto_close = Some(after);
        self
    }
}

/// Partial update applied to an existing notification. Unset fields keep
/// their current value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotificationPatch {
    pub level: Option<NotificationLevel>,
    pub message: Option<String>,
    pub link: Option<String>,
    pub auto_close: Option<Duration>,
}

impl NotificationPatch {
    fn with_level(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level: Some(level),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Error, message)
    }

    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }

    pub fn auto_closing(mut self, after: Duration) -> Self {
        self.auto_close = Some(after);
        self
    }
}

/// UI surface that renders notifications.
pub trait NotificationSink: Send + Sync {
    fn show(&self, notification: Notification);

    fn update(&self, id: &NotificationId, patch: NotificationPatch);

    fn dismiss(&self, id: &NotificationId);
}

/// Sink that renders notifications as log lines, for headless hosts.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn show(&self, n: Notification) {
        match n.level {
            NotificationLevel::Error => {
                error!(id = %n.id, link = ?n.link, "{}", n.message)
            }
            NotificationLevel::Info | NotificationLevel::Success => {
                info!(id = %n.id, level = ?n.level, link = ?n.link, "{}", n.message)
            }
        }
    }

    fn update(&self, id: &NotificationId, patch: NotificationPatch) {
        let message = patch.message.as_deref().unwrap_or("(unchanged)");
        match patch.level {
            Some(NotificationLevel::Error) => error!(%id, link = ?patch.link, "{message}"),
            level => info!(%id, ?level, link = ?patch.link, "{message}"),
        }
    }

    fn dismiss(&self, id: &NotificationId) {
        debug!(%id, "notification dismissed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_prefixed() {
        let a = NotificationId::transaction();
        let b = NotificationId::transaction();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("tx-"));
        assert!(NotificationId::authorization().as_str().starts_with("auth-"));
        assert!(NotificationId::network().as_str().starts_with("net-"));
    }

    #[test]
    fn test_patch_builders_leave_unset_fields_empty() {
        let patch = NotificationPatch::success("done").auto_closing(Duration::from_secs(5));
        assert_eq!(patch.level, Some(NotificationLevel::Success));
        assert_eq!(patch.message.as_deref(), Some("done"));
        assert_eq!(patch.link, None);
        assert_eq!(patch.auto_close, Some(Duration::from_secs(5)));
    }
}
