//! List filtering and display ordering. Nothing here mutates its input.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use civic_types::models::{Complaint, ComplaintStatus, Discussion, Likeable, Role, Timestamped, User};

#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    /// Case-insensitive match against title, description and location
    pub search: Option<String>,
    pub status: Option<ComplaintStatus>,
    pub category: Option<String>,
}

/// Complaints `viewer` may list, narrowed by `filter`, newest first.
/// Voters only ever see their own complaints.
pub fn filter_complaints(complaints: &[Complaint], filter: &ComplaintFilter, viewer: &User) -> Vec<Complaint> {
    let needle = normalized_search(filter.search.as_deref());

    let mut result: Vec<Complaint> = complaints
        .iter()
        .filter(|c| viewer.role != Role::Voter || c.author_id == viewer.id)
        .filter(|c| filter.status.is_none_or(|s| c.status == s))
        .filter(|c| filter.category.as_deref().is_none_or(|cat| c.category == cat))
        .filter(|c| match &needle {
            Some(n) => [&c.title, &c.description, &c.location]
                .iter()
                .any(|field| field.to_lowercase().contains(n.as_str())),
            None => true,
        })
        .cloned()
        .collect();

    result.sort_by_key(|c| Reverse(c.created_at));
    result
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscussionSort {
    #[default]
    Recent,
    Popular,
}

#[derive(Debug, Clone, Default)]
pub struct DiscussionFilter {
    /// Case-insensitive match against title and content
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: DiscussionSort,
}

pub fn filter_discussions(discussions: &[Discussion], filter: &DiscussionFilter) -> Vec<Discussion> {
    let needle = normalized_search(filter.search.as_deref());

    let mut result: Vec<Discussion> = discussions
        .iter()
        .filter(|d| filter.category.as_deref().is_none_or(|cat| d.category == cat))
        .filter(|d| match &needle {
            Some(n) => d.title.to_lowercase().contains(n.as_str()) || d.content.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .cloned()
        .collect();

    match filter.sort {
        DiscussionSort::Recent => result.sort_by_key(|d| Reverse(d.created_at)),
        DiscussionSort::Popular => result.sort_by_key(|d| (Reverse(d.like_count()), Reverse(d.created_at))),
    }
    result
}

/// Display order for a comment thread. Storage order is untouched.
pub fn comments_newest_first<C: Timestamped>(comments: &[C]) -> Vec<&C> {
    let mut sorted: Vec<&C> = comments.iter().collect();
    sorted.sort_by_key(|c| Reverse(c.created_at()));
    sorted
}

/// Distinct complaint categories in first-seen order.
pub fn complaint_categories(complaints: &[Complaint]) -> Vec<String> {
    distinct(complaints.iter().map(|c| c.category.as_str()))
}

pub fn discussion_categories(discussions: &[Discussion]) -> Vec<String> {
    distinct(discussions.iter().map(|d| d.category.as_str()))
}

pub fn has_liked<T: Likeable>(target: &T, user: &User) -> bool {
    target.likes().contains(&user.id)
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|v| v == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

fn normalized_search(search: Option<&str>) -> Option<String> {
    search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase)
}
