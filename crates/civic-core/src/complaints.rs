//! Complaint Store: owns the complaint collection and its comment threads.
//!
//! Every mutation is staged on a copy of the collection, written back as a
//! whole snapshot, and only then swapped in. A rejected or failed mutation
//! leaves both memory and storage exactly as they were.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use civic_db::{Database, keys};
use civic_types::api::NewComplaint;
use civic_types::models::{Complaint, ComplaintComment, ComplaintStatus, Role, User};

use crate::clock::Clock;
use crate::error::{CivicError, Result};
use crate::snapshot::{self, Loaded};
use crate::validation::{new_id, required};

/// How strictly status changes follow the triage workflow graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Role rules only: an authorized actor may set any status.
    #[default]
    Permissive,
    /// Role rules plus `ComplaintStatus::next_statuses` for every actor.
    Strict,
}

/// Whether `user` may change the status of `complaint` right now.
///
/// mla and central may always act; district only while the complaint is
/// escalated; voters never.
pub fn can_change_status(user: &User, complaint: &Complaint) -> bool {
    match user.role {
        Role::Mla | Role::Central => true,
        Role::District => complaint.status == ComplaintStatus::Escalated,
        Role::Voter => false,
    }
}

/// Only voters file complaints.
pub fn can_create_complaint(user: &User) -> bool {
    user.role == Role::Voter
}

/// Result of `update_status`.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub complaint: Complaint,
    pub previous: ComplaintStatus,
}

impl StatusUpdate {
    pub fn changed(&self) -> bool {
        self.previous != self.complaint.status
    }
}

pub struct ComplaintStore {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    policy: TransitionPolicy,
    complaints: Vec<Complaint>,
}

impl ComplaintStore {
    /// Load the persisted collection. A missing record is seeded (and written)
    /// when `seed_missing` is set; an unreadable one starts empty.
    pub fn open(
        db: Arc<Database>,
        clock: Arc<dyn Clock>,
        policy: TransitionPolicy,
        seed_missing: bool,
    ) -> Result<Self> {
        let complaints = match snapshot::load::<Vec<Complaint>>(&db, keys::COMPLAINTS) {
            Loaded::Present(complaints) => complaints,
            Loaded::Absent if seed_missing => {
                let seeded = crate::seed::complaints(clock.now());
                snapshot::save(&db, keys::COMPLAINTS, &seeded)?;
                info!("Seeded {} example complaints", seeded.len());
                seeded
            }
            Loaded::Absent | Loaded::Corrupt => Vec::new(),
        };

        debug!("Complaint store loaded with {} complaints", complaints.len());
        Ok(Self { db, clock, policy, complaints })
    }

    /// Most recently filed first.
    pub fn list(&self) -> &[Complaint] {
        &self.complaints
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Complaint> {
        self.complaints.iter().find(|c| c.id == id)
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn create(&mut self, data: &NewComplaint, acting: &User) -> Result<Complaint> {
        if !can_create_complaint(acting) {
            warn!("{} ({}) tried to file a complaint", acting.id, acting.role);
            return Err(CivicError::Unauthorized(format!(
                "only voters can file complaints, not {}",
                acting.role
            )));
        }

        let now = self.clock.now();
        let complaint = Complaint {
            id: new_id("c"),
            title: required("title", &data.title)?,
            description: required("description", &data.description)?,
            category: required("category", &data.category)?,
            location: required("location", &data.location)?,
            status: ComplaintStatus::Pending,
            created_at: now,
            updated_at: now,
            author_id: acting.id.clone(),
            author_name: acting.name.clone(),
            comments: Vec::new(),
        };

        let mut next = Vec::with_capacity(self.complaints.len() + 1);
        next.push(complaint.clone());
        next.extend(self.complaints.iter().cloned());
        self.commit(next)?;

        info!("Complaint {} filed by {}", complaint.id, acting.id);
        Ok(complaint)
    }

    pub fn update_status(
        &mut self,
        complaint_id: &str,
        status: ComplaintStatus,
        acting: &User,
    ) -> Result<StatusUpdate> {
        if acting.role == Role::Voter {
            warn!("Voter {} tried to change status of {}", acting.id, complaint_id);
            return Err(CivicError::Unauthorized("voters cannot change complaint status".into()));
        }

        let idx = self.index_of(complaint_id)?;
        let current = &self.complaints[idx];
        let previous = current.status;

        if !can_change_status(acting, current) {
            warn!(
                "{} ({}) denied status change on {} while {}",
                acting.id, acting.role, complaint_id, previous
            );
            return Err(CivicError::Unauthorized(format!(
                "{} may only act on escalated complaints; this one is {}",
                acting.role, previous
            )));
        }

        if previous == status {
            debug!("Complaint {} already {}", complaint_id, status);
            return Ok(StatusUpdate { complaint: current.clone(), previous });
        }

        if self.policy == TransitionPolicy::Strict && !previous.can_transition_to(status) {
            warn!("Rejected transition {} -> {} on {}", previous, status, complaint_id);
            return Err(CivicError::InvalidTransition { from: previous, to: status });
        }

        let now = self.clock.now();
        let mut next = self.complaints.clone();
        let complaint = &mut next[idx];
        complaint.status = status;
        complaint.updated_at = now.max(complaint.updated_at);
        let updated = complaint.clone();
        self.commit(next)?;

        info!("Complaint {} moved {} -> {} by {}", complaint_id, previous, status, acting.id);
        Ok(StatusUpdate { complaint: updated, previous })
    }

    /// Append a comment, snapshotting the author's current name and role.
    pub fn add_comment(
        &mut self,
        complaint_id: &str,
        text: &str,
        acting: &User,
    ) -> Result<ComplaintComment> {
        let idx = self.index_of(complaint_id)?;
        let text = required("comment", text)?;

        let now = self.clock.now();
        let comment = ComplaintComment {
            id: new_id("cmt"),
            text,
            created_at: now,
            author_id: acting.id.clone(),
            author_name: acting.name.clone(),
            author_role: acting.role,
        };

        let mut next = self.complaints.clone();
        let complaint = &mut next[idx];
        complaint.comments.push(comment.clone());
        complaint.updated_at = now.max(complaint.updated_at);
        self.commit(next)?;

        info!("Comment {} added to complaint {} by {}", comment.id, complaint_id, acting.id);
        Ok(comment)
    }

    fn index_of(&self, complaint_id: &str) -> Result<usize> {
        self.complaints
            .iter()
            .position(|c| c.id == complaint_id)
            .ok_or_else(|| CivicError::not_found("complaint", complaint_id))
    }

    fn commit(&mut self, next: Vec<Complaint>) -> Result<()> {
        snapshot::save(&self.db, keys::COMPLAINTS, &next)?;
        self.complaints = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, Utc};

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            name: format!("{} name", id),
            email: format!("{}@example.com", id),
            voter_reference: "V00000001".to_string(),
            role,
        }
    }

    fn pothole() -> NewComplaint {
        NewComplaint {
            title: "Pothole on Main St".to_string(),
            description: "Deep pothole outside the bakery".to_string(),
            category: "Infrastructure".to_string(),
            location: "Main St".to_string(),
        }
    }

    fn store(policy: TransitionPolicy) -> (ComplaintStore, Arc<ManualClock>, Arc<Database>) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = ComplaintStore::open(db.clone(), clock.clone(), policy, false).unwrap();
        (store, clock, db)
    }

    fn stored(db: &Database) -> Option<String> {
        db.get_record(keys::COMPLAINTS).unwrap()
    }

    #[test]
    fn pothole_lifecycle() {
        let (mut store, clock, _db) = store(TransitionPolicy::Permissive);
        let v1 = user("v1", Role::Voter);

        let created = store.create(&pothole(), &v1).unwrap();
        assert_eq!(created.status, ComplaintStatus::Pending);
        assert_eq!(created.created_at, created.updated_at);
        assert!(created.comments.is_empty());

        clock.advance(Duration::minutes(10));
        let mla = user("m1", Role::Mla);
        let update = store.update_status(&created.id, ComplaintStatus::Escalated, &mla).unwrap();
        assert!(update.changed());
        assert_eq!(update.complaint.status, ComplaintStatus::Escalated);
        assert!(update.complaint.updated_at > created.updated_at);

        clock.advance(Duration::minutes(10));
        let district = user("d1", Role::District);
        let update = store.update_status(&created.id, ComplaintStatus::Resolved, &district).unwrap();
        assert_eq!(update.complaint.status, ComplaintStatus::Resolved);

        let err = store
            .update_status(&created.id, ComplaintStatus::Pending, &district)
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(store.find_by_id(&created.id).unwrap().status, ComplaintStatus::Resolved);
    }

    #[test]
    fn voters_can_never_change_status() {
        let (mut store, _clock, db) = store(TransitionPolicy::Permissive);
        let v1 = user("v1", Role::Voter);
        let created = store.create(&pothole(), &v1).unwrap();
        let before = stored(&db);

        for status in ComplaintStatus::ALL {
            let err = store.update_status(&created.id, status, &v1).unwrap_err();
            assert!(err.is_unauthorized(), "{:?}", status);
        }
        // even on ids that do not exist
        assert!(store.update_status("missing", ComplaintStatus::Resolved, &v1).unwrap_err().is_unauthorized());
        assert_eq!(stored(&db), before);
    }

    #[test]
    fn district_acts_only_on_escalated() {
        let (mut store, _clock, _db) = store(TransitionPolicy::Permissive);
        let v1 = user("v1", Role::Voter);
        let district = user("d1", Role::District);
        let mla = user("m1", Role::Mla);
        let id = store.create(&pothole(), &v1).unwrap().id;

        for from in [ComplaintStatus::Pending, ComplaintStatus::Reviewing, ComplaintStatus::Rejected] {
            store.update_status(&id, from, &mla).unwrap();
            for to in ComplaintStatus::ALL {
                let err = store.update_status(&id, to, &district).unwrap_err();
                assert!(err.is_unauthorized(), "{} -> {}", from, to);
            }
        }

        store.update_status(&id, ComplaintStatus::Escalated, &mla).unwrap();
        store.update_status(&id, ComplaintStatus::Rejected, &district).unwrap();
    }

    #[test]
    fn same_status_is_a_noop() {
        let (mut store, clock, db) = store(TransitionPolicy::Permissive);
        let id = store.create(&pothole(), &user("v1", Role::Voter)).unwrap().id;
        let before = stored(&db);

        clock.advance(Duration::hours(1));
        let update = store
            .update_status(&id, ComplaintStatus::Pending, &user("c1", Role::Central))
            .unwrap();
        assert!(!update.changed());
        assert_eq!(update.complaint.updated_at, update.complaint.created_at);
        assert_eq!(stored(&db), before);
    }

    #[test]
    fn strict_policy_enforces_workflow_graph() {
        let (mut store, _clock, _db) = store(TransitionPolicy::Strict);
        let mla = user("m1", Role::Mla);
        let id = store.create(&pothole(), &user("v1", Role::Voter)).unwrap().id;

        let err = store.update_status(&id, ComplaintStatus::Resolved, &mla).unwrap_err();
        assert!(matches!(
            err,
            CivicError::InvalidTransition { from: ComplaintStatus::Pending, to: ComplaintStatus::Resolved }
        ));

        store.update_status(&id, ComplaintStatus::Reviewing, &mla).unwrap();
        store.update_status(&id, ComplaintStatus::Escalated, &mla).unwrap();
        store.update_status(&id, ComplaintStatus::Resolved, &user("d1", Role::District)).unwrap();

        let err = store.update_status(&id, ComplaintStatus::Reviewing, &mla).unwrap_err();
        assert!(matches!(err, CivicError::InvalidTransition { .. }));
    }

    #[test]
    fn only_voters_file_complaints() {
        let (mut store, _clock, _db) = store(TransitionPolicy::Permissive);
        let err = store.create(&pothole(), &user("m1", Role::Mla)).unwrap_err();
        assert!(err.is_unauthorized());
        assert!(store.list().is_empty());
    }

    #[test]
    fn create_validates_and_trims_fields() {
        let (mut store, _clock, _db) = store(TransitionPolicy::Permissive);
        let v1 = user("v1", Role::Voter);

        let mut blank = pothole();
        blank.location = "  ".to_string();
        assert!(matches!(store.create(&blank, &v1), Err(CivicError::ValidationError(_))));

        let mut padded = pothole();
        padded.title = "  Pothole  ".to_string();
        assert_eq!(store.create(&padded, &v1).unwrap().title, "Pothole");
    }

    #[test]
    fn newest_complaints_come_first() {
        let (mut store, clock, _db) = store(TransitionPolicy::Permissive);
        let v1 = user("v1", Role::Voter);
        let first = store.create(&pothole(), &v1).unwrap();
        clock.advance(Duration::seconds(1));
        let second = store.create(&pothole(), &v1).unwrap();

        let ids: Vec<_> = store.list().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn add_comment_appends_and_bumps_updated_at() {
        let (mut store, clock, _db) = store(TransitionPolicy::Permissive);
        let id = store.create(&pothole(), &user("v1", Role::Voter)).unwrap().id;
        let mla = user("m1", Role::Mla);

        clock.advance(Duration::minutes(1));
        let first = store.add_comment(&id, "On it", &mla).unwrap();
        clock.advance(Duration::minutes(1));
        let second = store.add_comment(&id, "Crew dispatched", &mla).unwrap();

        let complaint = store.find_by_id(&id).unwrap();
        let ids: Vec<_> = complaint.comments.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![first.id, second.id.clone()]);
        assert_eq!(complaint.updated_at, second.created_at);
        assert_eq!(second.author_role, Role::Mla);
        assert_eq!(second.author_name, "m1 name");
    }

    #[test]
    fn updated_at_never_moves_backwards() {
        let (mut store, clock, _db) = store(TransitionPolicy::Permissive);
        let start = clock.now();
        let id = store.create(&pothole(), &user("v1", Role::Voter)).unwrap().id;
        let mla = user("m1", Role::Mla);

        clock.set(start + Duration::hours(2));
        let comment = store.add_comment(&id, "Inspecting today", &mla).unwrap();

        // clock steps back behind the comment
        clock.set(start + Duration::hours(1));
        let update = store.update_status(&id, ComplaintStatus::Reviewing, &mla).unwrap();
        assert_eq!(update.complaint.status, ComplaintStatus::Reviewing);
        assert_eq!(update.complaint.updated_at, comment.created_at);
        assert_eq!(store.find_by_id(&id).unwrap().updated_at, comment.created_at);
    }

    #[test]
    fn failed_comments_leave_snapshot_untouched() {
        let (mut store, _clock, db) = store(TransitionPolicy::Permissive);
        let v1 = user("v1", Role::Voter);
        let id = store.create(&pothole(), &v1).unwrap().id;
        let before_mem = store.list().to_vec();
        let before_db = stored(&db);

        assert!(store.add_comment("nope", "hello", &v1).unwrap_err().is_not_found());
        assert!(matches!(store.add_comment(&id, "   ", &v1), Err(CivicError::ValidationError(_))));

        assert_eq!(store.list(), before_mem.as_slice());
        assert_eq!(stored(&db), before_db);
    }

    #[test]
    fn missing_collection_is_seeded_and_persisted() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = ComplaintStore::open(db.clone(), clock, TransitionPolicy::Permissive, true).unwrap();

        assert_eq!(store.list().len(), 3);
        let persisted: Vec<Complaint> = serde_json::from_str(&stored(&db).unwrap()).unwrap();
        assert_eq!(persisted, store.list());
    }

    #[test]
    fn corrupt_collection_falls_back_to_empty() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.put_record(keys::COMPLAINTS, "[{\"id\":").unwrap();
        let clock = Arc::new(ManualClock::new(Utc::now()));

        let store = ComplaintStore::open(db, clock, TransitionPolicy::Permissive, true).unwrap();
        assert!(store.list().is_empty());
    }
}
