//! Transient user-facing notifications

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// An action completed
    Success,
    /// An action failed
    Error,
    /// Something needs attention
    Warning,
    /// Neutral information
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        };
        f.write_str(label)
    }
}

/// A single notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Queue-unique id
    pub id: u64,
    /// Severity
    pub kind: NotificationKind,
    /// Text shown to the user
    pub message: String,
    /// When it was raised
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Coarse age: "just now", "N min ago" or "N h ago"
    #[must_use]
    pub fn format_elapsed(&self, now: DateTime<Utc>) -> String {
        let minutes = (now - self.timestamp).num_minutes();
        if minutes < 1 {
            "just now".to_string()
        } else if minutes < 60 {
            format!("{minutes} min ago")
        } else {
            format!("{} h ago", minutes / 60)
        }
    }
}

/// Append-only notification list, kept for the life of the process
#[derive(Debug, Default)]
pub struct NotificationQueue {
    next_id: u64,
    items: Vec<Notification>,
}

impl NotificationQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification raised now
    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        self.push_at(kind, message, Utc::now())
    }

    /// Append a notification with an explicit timestamp
    pub fn push_at(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        let message = message.into();
        tracing::debug!(id, %kind, %message, "Notification raised");
        self.items.push(Notification {
            id,
            kind,
            message,
            timestamp,
        });
        id
    }

    /// Shorthand for a success notification
    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Success, message)
    }

    /// Shorthand for an error notification
    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Error, message)
    }

    /// Shorthand for a warning notification
    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Warning, message)
    }

    /// Shorthand for an info notification
    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Info, message)
    }

    /// Dismiss one notification; false when the id is unknown
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Dismiss everything
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drop notifications older than `ttl`, returning how many went
    pub fn expire(&mut self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let before = self.items.len();
        self.items.retain(|n| now - n.timestamp < ttl);
        before - self.items.len()
    }

    /// Notifications in the order they were raised
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    /// Most recent notification
    #[must_use]
    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    /// Number of live notifications
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is shown
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
