//! Discussion Store: discussions, their comments, and the like ledgers of both.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use civic_db::{Database, keys};
use civic_types::api::NewDiscussion;
use civic_types::models::{Discussion, DiscussionComment, Likes, User};

use crate::clock::Clock;
use crate::error::{CivicError, Result};
use crate::snapshot::{self, Loaded};
use crate::validation::{new_id, required};

/// Like state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    /// true when the acting user now likes the target
    pub liked: bool,
    pub like_count: usize,
}

pub struct DiscussionStore {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    discussions: Vec<Discussion>,
}

impl DiscussionStore {
    pub fn open(db: Arc<Database>, clock: Arc<dyn Clock>, seed_missing: bool) -> Result<Self> {
        let discussions = match snapshot::load::<Vec<Discussion>>(&db, keys::DISCUSSIONS) {
            Loaded::Present(discussions) => discussions,
            Loaded::Absent if seed_missing => {
                let seeded = crate::seed::discussions(clock.now());
                snapshot::save(&db, keys::DISCUSSIONS, &seeded)?;
                info!("Seeded {} example discussions", seeded.len());
                seeded
            }
            Loaded::Absent | Loaded::Corrupt => Vec::new(),
        };

        debug!("Discussion store loaded with {} discussions", discussions.len());
        Ok(Self { db, clock, discussions })
    }

    pub fn list(&self) -> &[Discussion] {
        &self.discussions
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Discussion> {
        self.discussions.iter().find(|d| d.id == id)
    }

    pub fn create(&mut self, data: &NewDiscussion, acting: &User) -> Result<Discussion> {
        let now = self.clock.now();
        let discussion = Discussion {
            id: new_id("d"),
            title: required("title", &data.title)?,
            content: required("content", &data.content)?,
            category: required("category", &data.category)?,
            created_at: now,
            updated_at: now,
            author_id: acting.id.clone(),
            author_name: acting.name.clone(),
            comments: Vec::new(),
            likes: Likes::new(),
        };

        let mut next = Vec::with_capacity(self.discussions.len() + 1);
        next.push(discussion.clone());
        next.extend(self.discussions.iter().cloned());
        self.commit(next)?;

        info!("Discussion {} started by {}", discussion.id, acting.id);
        Ok(discussion)
    }

    pub fn add_comment(
        &mut self,
        discussion_id: &str,
        text: &str,
        acting: &User,
    ) -> Result<DiscussionComment> {
        let idx = self.index_of(discussion_id)?;
        let text = required("comment", text)?;

        let now = self.clock.now();
        let comment = DiscussionComment {
            id: new_id("dcmt"),
            text,
            created_at: now,
            author_id: acting.id.clone(),
            author_name: acting.name.clone(),
            author_role: acting.role,
            likes: Likes::new(),
        };

        let mut next = self.discussions.clone();
        let discussion = &mut next[idx];
        discussion.comments.push(comment.clone());
        discussion.updated_at = now.max(discussion.updated_at);
        self.commit(next)?;

        info!("Comment {} added to discussion {} by {}", comment.id, discussion_id, acting.id);
        Ok(comment)
    }

    /// Like or unlike a discussion. Does not touch `updated_at`.
    pub fn toggle_like(&mut self, discussion_id: &str, acting: &User) -> Result<LikeState> {
        let idx = self.index_of(discussion_id)?;

        let mut next = self.discussions.clone();
        let likes = &mut next[idx].likes;
        let state = LikeState { liked: likes.toggle(&acting.id), like_count: likes.count() };
        self.commit(next)?;

        debug!(
            "{} {} discussion {} ({} likes)",
            acting.id,
            if state.liked { "liked" } else { "unliked" },
            discussion_id,
            state.like_count
        );
        Ok(state)
    }

    /// Like or unlike one comment of a discussion.
    pub fn toggle_like_comment(
        &mut self,
        discussion_id: &str,
        comment_id: &str,
        acting: &User,
    ) -> Result<LikeState> {
        let idx = self.index_of(discussion_id)?;
        let comment_idx = self.discussions[idx]
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| CivicError::not_found("comment", comment_id))?;

        let mut next = self.discussions.clone();
        let likes = &mut next[idx].comments[comment_idx].likes;
        let state = LikeState { liked: likes.toggle(&acting.id), like_count: likes.count() };
        self.commit(next)?;

        debug!(
            "{} {} comment {} on {} ({} likes)",
            acting.id,
            if state.liked { "liked" } else { "unliked" },
            comment_id,
            discussion_id,
            state.like_count
        );
        Ok(state)
    }

    fn index_of(&self, discussion_id: &str) -> Result<usize> {
        self.discussions
            .iter()
            .position(|d| d.id == discussion_id)
            .ok_or_else(|| CivicError::not_found("discussion", discussion_id))
    }

    fn commit(&mut self, next: Vec<Discussion>) -> Result<()> {
        snapshot::save(&self.db, keys::DISCUSSIONS, &next)?;
        self.discussions = next;
        Ok(())
    }
}
