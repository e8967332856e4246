use serde::{Deserialize, Serialize};

// -- Identity --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub voter_reference: String,
    #[serde(default)]
    pub password: String,
}

// -- Submissions --

/// Voter-supplied fields of a new complaint. Everything else is assigned
/// by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewDiscussion {
    pub title: String,
    pub content: String,
    pub category: String,
}

/// Categories offered by the complaint form. Free-form values are accepted.
pub const COMPLAINT_CATEGORIES: &[&str] = &[
    "Infrastructure",
    "Sanitation",
    "Utilities",
    "Transportation",
    "Healthcare",
    "Education",
    "Public Safety",
    "Environment",
    "Housing",
    "Other",
];

pub const DISCUSSION_CATEGORIES: &[&str] = &[
    "Parks & Recreation",
    "Transportation",
    "Healthcare",
    "Education",
    "Public Safety",
    "Environment",
    "Housing",
    "Infrastructure",
    "Community Events",
    "Government Policy",
    "Other",
];

// -- Read models --

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub reviewing: usize,
    pub escalated: usize,
    pub resolved: usize,
    pub rejected: usize,
    /// reviewing + escalated
    pub in_progress: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionStats {
    pub total_discussions: usize,
    pub total_comments: usize,
    pub top_categories: Vec<CategoryCount>,
    /// Comments per discussion; 0.0 when there are no discussions.
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub complaints: usize,
    pub discussions: usize,
    pub discussion_comments: usize,
}

/// Everything a representative's dashboard shows, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub complaint_stats: DashboardStats,
    pub recent_complaints: Vec<crate::models::Complaint>,
    pub discussion_stats: DiscussionStats,
}
