use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transient user-facing notice emitted after every mutation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A complaint authored by the recipient left `pending`
    ComplaintStatus,
    /// Someone else commented on the recipient's complaint
    ComplaintComment,
    /// Someone else commented on the recipient's discussion
    DiscussionComment,
    /// The recipient's discussion has likes
    DiscussionLike,
}

/// Derived on demand from complaint and discussion snapshots; never stored.
/// `id` is a pure function of the source event so read receipts can be
/// reattached after re-derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub target_link: String,
}
