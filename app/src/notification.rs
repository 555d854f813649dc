//! Transient messages shown on top of a view

use chrono::{DateTime, Utc};

/// Tone of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    /// Something the user asked for happened
    Success,
    /// Something the user asked for was refused or failed
    Error,
}

/// A queued, user-visible message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Tone
    pub kind: NotificationKind,
    /// Text shown to the user
    pub message: String,
    /// When it was raised
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    /// A success message
    #[must_use]
    pub fn success(message: impl Into<String>, raised_at: DateTime<Utc>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            raised_at,
        }
    }

    /// An error message
    #[must_use]
    pub fn error(message: impl Into<String>, raised_at: DateTime<Utc>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
            raised_at,
        }
    }
}
