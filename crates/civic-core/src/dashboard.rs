//! Aggregate read models for the representative dashboard and profile page.
//! Pure functions of the snapshots they are given.

use civic_types::api::{CategoryCount, DashboardStats, DiscussionStats, ProfileStats};
use civic_types::models::{Complaint, ComplaintStatus, Discussion, Role, User};

pub const DEFAULT_RECENT_LIMIT: usize = 5;
pub const DEFAULT_TOP_CATEGORIES: usize = 3;

/// Representatives of every level see the dashboard; voters do not.
pub fn can_view_dashboard(user: &User) -> bool {
    user.role.is_representative()
}

pub fn dashboard_stats(complaints: &[Complaint]) -> DashboardStats {
    let mut stats = DashboardStats { total: complaints.len(), ..Default::default() };
    for complaint in complaints {
        match complaint.status {
            ComplaintStatus::Pending => stats.pending += 1,
            ComplaintStatus::Reviewing => stats.reviewing += 1,
            ComplaintStatus::Escalated => stats.escalated += 1,
            ComplaintStatus::Resolved => stats.resolved += 1,
            ComplaintStatus::Rejected => stats.rejected += 1,
        }
    }
    stats.in_progress = stats.reviewing + stats.escalated;
    stats
}

/// The complaints `role` should look at first, newest first, at most `limit`.
///
/// district only sees escalated complaints; voters get nothing here.
pub fn recent_complaints_for_role(complaints: &[Complaint], role: Role, limit: usize) -> Vec<Complaint> {
    let mut relevant: Vec<Complaint> = complaints
        .iter()
        .filter(|c| match role {
            Role::Mla | Role::Central => true,
            Role::District => c.status == ComplaintStatus::Escalated,
            Role::Voter => false,
        })
        .cloned()
        .collect();

    relevant.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    relevant.truncate(limit);
    relevant
}

pub fn discussion_stats(discussions: &[Discussion], top_n: usize) -> DiscussionStats {
    let total_discussions = discussions.len();
    let total_comments: usize = discussions.iter().map(|d| d.comments.len()).sum();

    // first-seen order, so equal counts keep a stable ranking
    let mut counts: Vec<CategoryCount> = Vec::new();
    for discussion in discussions {
        match counts.iter_mut().find(|c| c.category == discussion.category) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount { category: discussion.category.clone(), count: 1 }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top_n);

    let engagement_rate = if total_discussions == 0 {
        0.0
    } else {
        total_comments as f64 / total_discussions as f64
    };

    DiscussionStats { total_discussions, total_comments, top_categories: counts, engagement_rate }
}

pub fn profile_stats(user: &User, complaints: &[Complaint], discussions: &[Discussion]) -> ProfileStats {
    ProfileStats {
        complaints: complaints.iter().filter(|c| c.author_id == user.id).count(),
        discussions: discussions.iter().filter(|d| d.author_id == user.id).count(),
        discussion_comments: discussions
            .iter()
            .flat_map(|d| &d.comments)
            .filter(|c| c.author_id == user.id)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use chrono::{Duration, Utc};

    #[test]
    fn stats_count_every_status() {
        let now = Utc::now();
        let mut complaints = seed::complaints(now);
        complaints[0].status = ComplaintStatus::Resolved;

        let stats = dashboard_stats(&complaints);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.reviewing, 1);
        assert_eq!(stats.escalated, 1);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(dashboard_stats(&[]), DashboardStats::default());
    }

    #[test]
    fn recent_complaints_are_role_filtered_and_capped() {
        let now = Utc::now();
        let mut complaints = Vec::new();
        for i in 0..8 {
            let mut c = seed::complaints(now)[0].clone();
            c.id = format!("c{}", i);
            c.created_at = now - Duration::days(i);
            c.status = if i % 2 == 0 { ComplaintStatus::Escalated } else { ComplaintStatus::Pending };
            complaints.push(c);
        }
        complaints.reverse();

        let mla: Vec<_> = recent_complaints_for_role(&complaints, Role::Mla, 5)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(mla, vec!["c0", "c1", "c2", "c3", "c4"]);

        let district: Vec<_> = recent_complaints_for_role(&complaints, Role::District, 5)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(district, vec!["c0", "c2", "c4", "c6"]);

        assert_eq!(recent_complaints_for_role(&complaints, Role::Central, 5).len(), 5);
        assert!(recent_complaints_for_role(&complaints, Role::Voter, 5).is_empty());
    }

    #[test]
    fn discussion_stats_on_empty_input() {
        let stats = discussion_stats(&[], DEFAULT_TOP_CATEGORIES);
        assert_eq!(stats.total_discussions, 0);
        assert_eq!(stats.total_comments, 0);
        assert!(stats.top_categories.is_empty());
        assert_eq!(stats.engagement_rate, 0.0);
        assert!(!stats.engagement_rate.is_nan());
    }

    #[test]
    fn discussion_stats_rank_categories() {
        let now = Utc::now();
        let mut discussions = seed::discussions(now);
        let mut extra = discussions[1].clone();
        extra.id = "d3".into();
        extra.comments.clear();
        discussions.push(extra);

        let stats = discussion_stats(&discussions, 1);
        assert_eq!(stats.total_discussions, 3);
        assert_eq!(stats.total_comments, 2);
        assert_eq!(
            stats.top_categories,
            vec![CategoryCount { category: "Transportation".into(), count: 2 }]
        );
        assert!((stats.engagement_rate - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn profile_counts_authored_content() {
        let now = Utc::now();
        let user = User {
            id: "u2".into(),
            name: "Sarah Voter".into(),
            email: "sarah@example.com".into(),
            voter_reference: "V1".into(),
            role: Role::Voter,
        };
        let stats = profile_stats(&user, &seed::complaints(now), &seed::discussions(now));
        assert_eq!(stats, ProfileStats { complaints: 1, discussions: 0, discussion_comments: 1 });
    }
}
