//! Session facade: one active identity working against local snapshots.
//!
//! Presentation code talks to `Portal` only. Each operation resolves the
//! acting user from the Identity Holder, calls into the owning store, and
//! publishes a notice describing the outcome.

use std::sync::Arc;

use civic_db::Database;
use civic_types::api::{
    Dashboard, LoginRequest, NewComplaint, NewDiscussion, ProfileStats, RegisterRequest,
};
use civic_types::events::{Notice, Notification};
use civic_types::models::{Complaint, ComplaintComment, ComplaintStatus, Discussion, DiscussionComment, User};
use tracing::warn;

use crate::clock::{Clock, SystemClock};
use crate::complaints::{self, ComplaintStore, StatusUpdate, TransitionPolicy};
use crate::dashboard::{self, DEFAULT_RECENT_LIMIT, DEFAULT_TOP_CATEGORIES};
use crate::discussions::{DiscussionStore, LikeState};
use crate::error::{CivicError, Result};
use crate::identity::IdentityHolder;
use crate::notices::Notices;
use crate::notifications;
use crate::projections::{self, ComplaintFilter, DiscussionFilter};
use crate::receipts::ReadReceipts;

#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Write example records when a collection has never been stored
    pub seed_missing: bool,
    pub recent_limit: usize,
    pub top_categories: usize,
    pub transition_policy: TransitionPolicy,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            seed_missing: true,
            recent_limit: DEFAULT_RECENT_LIMIT,
            top_categories: DEFAULT_TOP_CATEGORIES,
            transition_policy: TransitionPolicy::default(),
        }
    }
}

pub struct Portal {
    db: Arc<Database>,
    config: PortalConfig,
    identity: IdentityHolder,
    complaints: ComplaintStore,
    discussions: DiscussionStore,
    receipts: ReadReceipts,
    notices: Notices,
}

impl Portal {
    pub fn open(db: Arc<Database>, config: PortalConfig) -> Result<Self> {
        Self::with_clock(db, config, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Arc<Database>, config: PortalConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let identity = IdentityHolder::open(db.clone());
        let complaints = ComplaintStore::open(
            db.clone(),
            clock.clone(),
            config.transition_policy,
            config.seed_missing,
        )?;
        let discussions = DiscussionStore::open(db.clone(), clock, config.seed_missing)?;
        let receipts = ReadReceipts::load(&db);

        Ok(Self {
            db,
            config,
            identity,
            complaints,
            discussions,
            receipts,
            notices: Notices::default(),
        })
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    // -- Identity --

    pub fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let req = LoginRequest { email: email.to_string(), password: password.to_string() };
        let result = self.identity.login(&req);
        report(&self.notices, result, |_| "Logged in successfully".into())
    }

    pub fn register(&mut self, name: &str, email: &str, voter_reference: &str, password: &str) -> Result<User> {
        let req = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            voter_reference: voter_reference.to_string(),
            password: password.to_string(),
        };
        let result = self.identity.register(&req);
        report(&self.notices, result, |_| "Registration successful".into())
    }

    pub fn logout(&mut self) -> Result<()> {
        let result = self.identity.logout();
        match &result {
            Ok(()) => self.notices.publish(Notice::info("Logged out successfully")),
            Err(e) => self.notices.publish(Notice::error(failure_message(e))),
        }
        result
    }

    pub fn current_user(&self) -> Option<&User> {
        self.identity.current_user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_authenticated()
    }

    // -- Complaints --

    pub fn complaints(&self) -> &[Complaint] {
        self.complaints.list()
    }

    pub fn complaint(&self, id: &str) -> Option<&Complaint> {
        self.complaints.find_by_id(id)
    }

    pub fn create_complaint(&mut self, data: &NewComplaint) -> Result<Complaint> {
        let result = acting(&self.identity).and_then(|user| self.complaints.create(data, user));
        report(&self.notices, result, |_| "Complaint submitted successfully".into())
    }

    pub fn update_complaint_status(&mut self, complaint_id: &str, status: ComplaintStatus) -> Result<StatusUpdate> {
        let result = acting(&self.identity)
            .and_then(|user| self.complaints.update_status(complaint_id, status, user));
        report(&self.notices, result, |update| {
            format!("Complaint status updated to {}", update.complaint.status)
        })
    }

    pub fn add_complaint_comment(&mut self, complaint_id: &str, text: &str) -> Result<ComplaintComment> {
        let result = acting(&self.identity)
            .and_then(|user| self.complaints.add_comment(complaint_id, text, user));
        report(&self.notices, result, |_| "Comment added successfully".into())
    }

    /// Complaints the current user may list, filtered and newest first.
    pub fn visible_complaints(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>> {
        let user = acting(&self.identity)?;
        Ok(projections::filter_complaints(self.complaints.list(), filter, user))
    }

    /// Whether the current user may change this complaint's status.
    pub fn can_change_status(&self, complaint_id: &str) -> bool {
        match (self.identity.current_user(), self.complaints.find_by_id(complaint_id)) {
            (Some(user), Some(complaint)) => complaints::can_change_status(user, complaint),
            _ => false,
        }
    }

    // -- Discussions --

    pub fn discussions(&self) -> &[Discussion] {
        self.discussions.list()
    }

    pub fn discussion(&self, id: &str) -> Option<&Discussion> {
        self.discussions.find_by_id(id)
    }

    pub fn create_discussion(&mut self, data: &NewDiscussion) -> Result<Discussion> {
        let result = acting(&self.identity).and_then(|user| self.discussions.create(data, user));
        report(&self.notices, result, |_| "Discussion created successfully".into())
    }

    pub fn add_discussion_comment(&mut self, discussion_id: &str, text: &str) -> Result<DiscussionComment> {
        let result = acting(&self.identity)
            .and_then(|user| self.discussions.add_comment(discussion_id, text, user));
        report(&self.notices, result, |_| "Comment added successfully".into())
    }

    pub fn toggle_discussion_like(&mut self, discussion_id: &str) -> Result<LikeState> {
        let result = acting(&self.identity)
            .and_then(|user| self.discussions.toggle_like(discussion_id, user));
        report(&self.notices, result, like_message)
    }

    pub fn toggle_comment_like(&mut self, discussion_id: &str, comment_id: &str) -> Result<LikeState> {
        let result = acting(&self.identity)
            .and_then(|user| self.discussions.toggle_like_comment(discussion_id, comment_id, user));
        report(&self.notices, result, like_message)
    }

    pub fn visible_discussions(&self, filter: &DiscussionFilter) -> Vec<Discussion> {
        projections::filter_discussions(self.discussions.list(), filter)
    }

    // -- Derived views --

    /// Representative dashboard for the current user.
    pub fn dashboard(&self) -> Result<Dashboard> {
        let user = acting(&self.identity)?;
        if !dashboard::can_view_dashboard(user) {
            return Err(CivicError::Unauthorized("the dashboard is for representatives".into()));
        }

        let complaints = self.complaints.list();
        Ok(Dashboard {
            complaint_stats: dashboard::dashboard_stats(complaints),
            recent_complaints: dashboard::recent_complaints_for_role(
                complaints,
                user.role,
                self.config.recent_limit,
            ),
            discussion_stats: dashboard::discussion_stats(
                self.discussions.list(),
                self.config.top_categories,
            ),
        })
    }

    pub fn profile(&self) -> Result<ProfileStats> {
        let user = acting(&self.identity)?;
        Ok(dashboard::profile_stats(user, self.complaints.list(), self.discussions.list()))
    }

    /// Freshly derived feed with this session's read receipts merged in.
    pub fn notifications(&self) -> Result<Vec<Notification>> {
        let user = acting(&self.identity)?;
        let mut feed =
            notifications::notifications_for(user, self.complaints.list(), self.discussions.list());
        notifications::apply_receipts(user, &mut feed, &self.receipts);
        Ok(feed)
    }

    pub fn unread_count(&self) -> Result<usize> {
        Ok(notifications::unread_count(&self.notifications()?))
    }

    /// Returns false if it was already read.
    pub fn mark_notification_read(&mut self, notification_id: &str) -> Result<bool> {
        let feed = self.notifications()?;
        if !feed.iter().any(|n| n.id == notification_id) {
            return Err(CivicError::not_found("notification", notification_id));
        }
        let user_id = acting(&self.identity)?.id.clone();

        let mut next = self.receipts.clone();
        let newly_read = next.mark_read(&user_id, notification_id);
        if newly_read {
            next.save(&self.db)?;
            self.receipts = next;
        }
        Ok(newly_read)
    }

    /// Returns how many notifications were newly marked.
    pub fn mark_all_notifications_read(&mut self) -> Result<usize> {
        let feed = self.notifications()?;
        let user_id = acting(&self.identity)?.id.clone();

        let mut next = self.receipts.clone();
        let marked = next.mark_all(&user_id, feed.iter().map(|n| n.id.as_str()));
        if marked > 0 {
            next.save(&self.db)?;
            self.receipts = next;
        }
        Ok(marked)
    }
}

fn acting(identity: &IdentityHolder) -> Result<&User> {
    identity.current_user().ok_or(CivicError::NotAuthenticated)
}

/// Publish a success or failure notice for `result` and pass it through.
fn report<T>(notices: &Notices, result: Result<T>, success: impl FnOnce(&T) -> String) -> Result<T> {
    match &result {
        Ok(value) => notices.publish(Notice::success(success(value))),
        Err(e) => {
            warn!("Operation failed: {}", e);
            notices.publish(Notice::error(failure_message(e)));
        }
    }
    result
}

fn like_message(state: &LikeState) -> String {
    if state.liked { "Like added".into() } else { "Like removed".into() }
}

fn failure_message(e: &CivicError) -> String {
    match e {
        CivicError::NotAuthenticated => "You must be logged in to do that".into(),
        CivicError::Storage(_) => "Something went wrong saving your change. Please try again.".into(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, Utc};
    use civic_types::events::NoticeLevel;
    use civic_types::models::Role;

    fn portal() -> (Portal, Arc<ManualClock>) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let portal = Portal::with_clock(db, PortalConfig::default(), clock.clone()).unwrap();
        (portal, clock)
    }

    fn pothole() -> NewComplaint {
        NewComplaint {
            title: "Pothole on Main St".into(),
            description: "Swallowed a scooter wheel".into(),
            category: "Infrastructure".into(),
            location: "Main St".into(),
        }
    }

    #[test]
    fn operations_need_an_identity() {
        let (mut portal, _clock) = portal();
        let mut rx = portal.notices().subscribe();

        assert!(matches!(portal.create_complaint(&pothole()), Err(CivicError::NotAuthenticated)));
        assert!(matches!(portal.toggle_discussion_like("d1"), Err(CivicError::NotAuthenticated)));
        assert!(matches!(portal.notifications(), Err(CivicError::NotAuthenticated)));
        assert_eq!(portal.complaints().len(), 3);

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
    }

    #[test]
    fn pothole_scenario_through_the_portal() {
        let (mut portal, clock) = portal();

        let voter = portal.login("v1@example.com", "").unwrap();
        let complaint = portal.create_complaint(&pothole()).unwrap();
        assert_eq!(portal.complaints()[0].id, complaint.id);
        assert!(!portal.can_change_status(&complaint.id));

        clock.advance(Duration::minutes(5));
        portal.login("rep.mla@gov.in", "").unwrap();
        assert!(portal.can_change_status(&complaint.id));
        portal.update_complaint_status(&complaint.id, ComplaintStatus::Escalated).unwrap();

        clock.advance(Duration::minutes(5));
        portal.login("officer@district.gov.in", "").unwrap();
        portal.update_complaint_status(&complaint.id, ComplaintStatus::Resolved).unwrap();
        let err = portal
            .update_complaint_status(&complaint.id, ComplaintStatus::Pending)
            .unwrap_err();
        assert!(err.is_unauthorized());

        let stored = portal.complaint(&complaint.id).unwrap();
        assert_eq!(stored.status, ComplaintStatus::Resolved);
        assert_eq!(stored.author_id, voter.id);
    }

    #[test]
    fn dashboard_is_for_representatives() {
        let (mut portal, _clock) = portal();
        portal.login("someone@example.com", "").unwrap();
        assert!(portal.dashboard().unwrap_err().is_unauthorized());

        portal.login("officer@district.gov.in", "").unwrap();
        let dashboard = portal.dashboard().unwrap();
        assert_eq!(dashboard.complaint_stats.total, 3);
        assert_eq!(dashboard.complaint_stats.in_progress, 2);
        let ids: Vec<_> = dashboard.recent_complaints.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c3"]);
        assert_eq!(dashboard.discussion_stats.total_comments, 2);
    }

    #[test]
    fn voter_listing_is_limited_to_own_complaints() {
        let (mut portal, _clock) = portal();
        portal.login("v1@example.com", "").unwrap();
        portal.create_complaint(&pothole()).unwrap();

        let visible = portal.visible_complaints(&ComplaintFilter::default()).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(portal.profile().unwrap().complaints, 1);
    }

    /// Resume a session as an existing user; login always mints a fresh id.
    fn act_as(portal: &mut Portal, user: &User) {
        crate::snapshot::save(&portal.db, civic_db::keys::USER, user).unwrap();
        portal.identity = IdentityHolder::open(portal.db.clone());
    }

    #[test]
    fn read_flags_survive_new_activity() {
        let (mut portal, clock) = portal();
        let author = portal.login("author@example.com", "").unwrap();
        let discussion = portal
            .create_discussion(&NewDiscussion {
                title: "Night buses".into(),
                content: "Route 12 should run past midnight".into(),
                category: "Transportation".into(),
            })
            .unwrap();

        clock.advance(Duration::minutes(1));
        let neighbour = portal.login("neighbour@example.com", "").unwrap();
        portal.add_discussion_comment(&discussion.id, "Yes please").unwrap();
        portal.toggle_discussion_like(&discussion.id).unwrap();

        act_as(&mut portal, &author);
        assert_eq!(portal.unread_count().unwrap(), 2);
        let first = portal.notifications().unwrap()[0].id.clone();
        assert!(portal.mark_notification_read(&first).unwrap());
        assert!(!portal.mark_notification_read(&first).unwrap());
        assert!(portal.mark_notification_read("notif-nope").unwrap_err().is_not_found());

        clock.advance(Duration::minutes(1));
        act_as(&mut portal, &neighbour);
        portal.add_discussion_comment(&discussion.id, "Me too").unwrap();

        act_as(&mut portal, &author);
        let feed = portal.notifications().unwrap();
        assert_eq!(feed.len(), 3);
        assert!(feed.iter().find(|n| n.id == first).unwrap().read);
        assert_eq!(portal.unread_count().unwrap(), 2);

        assert_eq!(portal.mark_all_notifications_read().unwrap(), 2);
        assert_eq!(portal.unread_count().unwrap(), 0);

        // receipts are per user
        act_as(&mut portal, &neighbour);
        assert_eq!(portal.unread_count().unwrap(), 0);
        assert!(portal.notifications().unwrap().is_empty());
    }

    #[test]
    fn failures_publish_error_notices() {
        let (mut portal, _clock) = portal();
        let mut rx = portal.notices().subscribe();

        portal.login("rep.mla@gov.in", "").unwrap();
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Success);

        let err = portal.create_complaint(&pothole()).unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Error);

        portal.toggle_discussion_like("d1").unwrap();
        assert_eq!(rx.try_recv().unwrap().message, "Like added");
        assert!(portal.toggle_comment_like("d1", "missing").unwrap_err().is_not_found());
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Error);

        portal.logout().unwrap();
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Info);
        assert!(!portal.is_authenticated());
    }

    #[test]
    fn session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("civic.db");

        let user = {
            let db = Arc::new(Database::open(&path).unwrap());
            let mut portal = Portal::open(db, PortalConfig::default()).unwrap();
            let user = portal.login("rep.central@gov.in", "").unwrap();
            portal.toggle_discussion_like("d2").unwrap();
            user
        };

        let db = Arc::new(Database::open(&path).unwrap());
        let portal = Portal::open(db, PortalConfig::default()).unwrap();
        assert_eq!(portal.current_user(), Some(&user));
        assert_eq!(user.role, Role::Central);
        assert!(portal.discussion("d2").unwrap().likes.contains(&user.id));
    }
}
