use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Identity --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Voter,
    Mla,
    District,
    Central,
}

impl Role {
    /// Representatives triage complaints and see the dashboard.
    pub fn is_representative(self) -> bool {
        !matches!(self, Role::Voter)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Voter => "voter",
            Role::Mla => "mla",
            Role::District => "district",
            Role::Central => "central",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(alias = "voterId")]
    pub voter_reference: String,
    pub role: Role,
}

// -- Complaints --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
    Pending,
    Reviewing,
    Escalated,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 5] = [
        ComplaintStatus::Pending,
        ComplaintStatus::Reviewing,
        ComplaintStatus::Escalated,
        ComplaintStatus::Resolved,
        ComplaintStatus::Rejected,
    ];

    /// Statuses reachable in one step through the triage workflow.
    pub fn next_statuses(self) -> &'static [ComplaintStatus] {
        use ComplaintStatus::*;
        match self {
            Pending => &[Reviewing, Rejected],
            Reviewing => &[Escalated, Resolved, Rejected],
            Escalated => &[Resolved, Rejected],
            Resolved | Rejected => &[],
        }
    }

    pub fn can_transition_to(self, next: ComplaintStatus) -> bool {
        self.next_statuses().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.next_statuses().is_empty()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::Reviewing => "reviewing",
            ComplaintStatus::Escalated => "escalated",
            ComplaintStatus::Resolved => "resolved",
            ComplaintStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComplaintStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown complaint status: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintComment {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(alias = "userId")]
    pub author_id: String,
    #[serde(alias = "userName")]
    pub author_name: String,
    #[serde(alias = "userRole")]
    pub author_role: Role,
}

/// A constituent grievance. Comments are append-only; display order is
/// derived elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(alias = "userId")]
    pub author_id: String,
    #[serde(alias = "userName")]
    pub author_name: String,
    #[serde(default)]
    pub comments: Vec<ComplaintComment>,
}

// -- Likes --

/// Like ledger for a discussion or discussion comment.
///
/// The count is never stored on its own: it is always the size of the
/// member set, so the two cannot drift apart. Flattened into its owner as
/// `likeCount` and `likedBy`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LikesRecord", into = "LikesRecord")]
pub struct Likes {
    liked_by: BTreeSet<String>,
}

impl Likes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.liked_by.len()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.liked_by.contains(user_id)
    }

    /// Flip membership for `user_id`. Returns true when the user now likes it.
    pub fn toggle(&mut self, user_id: &str) -> bool {
        if self.liked_by.remove(user_id) {
            false
        } else {
            self.liked_by.insert(user_id.to_string());
            true
        }
    }

    pub fn liked_by(&self) -> impl Iterator<Item = &str> {
        self.liked_by.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Likes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            liked_by: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// On-disk shape. `likeCount` is written for readers of the raw JSON; any
/// stored count (`likeCount` or a numeric `likes`) is ignored on load.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LikesRecord {
    #[serde(default, skip_deserializing)]
    like_count: usize,
    #[serde(default)]
    liked_by: Vec<String>,
    #[serde(default, skip_serializing)]
    likes: Option<LegacyLikes>,
}

/// Older records kept `likes` either as a bare count or as a nested ledger.
#[derive(Deserialize)]
#[serde(untagged)]
#[allow(dead_code)]
enum LegacyLikes {
    Nested {
        #[serde(rename = "likedBy", default)]
        liked_by: Vec<String>,
    },
    Count(serde::de::IgnoredAny),
}

impl From<LikesRecord> for Likes {
    fn from(record: LikesRecord) -> Self {
        let nested = match record.likes {
            Some(LegacyLikes::Nested { liked_by }) => liked_by,
            _ => Vec::new(),
        };
        record.liked_by.into_iter().chain(nested).collect()
    }
}

impl From<Likes> for LikesRecord {
    fn from(likes: Likes) -> Self {
        LikesRecord {
            like_count: likes.count(),
            liked_by: likes.liked_by.into_iter().collect(),
            likes: None,
        }
    }
}

/// Entities that carry a like ledger.
pub trait Likeable {
    fn likes(&self) -> &Likes;

    fn like_count(&self) -> usize {
        self.likes().count()
    }
}

// -- Discussions --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionComment {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(alias = "userId")]
    pub author_id: String,
    #[serde(alias = "userName")]
    pub author_name: String,
    #[serde(alias = "userRole")]
    pub author_role: Role,
    #[serde(flatten)]
    pub likes: Likes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(alias = "userId")]
    pub author_id: String,
    #[serde(alias = "userName")]
    pub author_name: String,
    #[serde(default)]
    pub comments: Vec<DiscussionComment>,
    #[serde(flatten)]
    pub likes: Likes,
}

impl Likeable for Discussion {
    fn likes(&self) -> &Likes {
        &self.likes
    }
}

impl Likeable for DiscussionComment {
    fn likes(&self) -> &Likes {
        &self.likes
    }
}

/// Anything with a creation timestamp, used for display ordering.
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}

impl Timestamped for Complaint {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Timestamped for ComplaintComment {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Timestamped for Discussion {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Timestamped for DiscussionComment {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
