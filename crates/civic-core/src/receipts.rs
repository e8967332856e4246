//! Read receipts: which derived notifications each user has acknowledged.
//! Kept apart from the notifications themselves, which are recomputed.

use std::collections::{BTreeMap, BTreeSet};

use civic_db::{Database, keys};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::snapshot::{self, Loaded};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadReceipts {
    by_user: BTreeMap<String, BTreeSet<String>>,
}

impl ReadReceipts {
    /// Missing or unreadable receipts start empty: everything shows unread.
    pub fn load(db: &Database) -> Self {
        match snapshot::load(db, keys::NOTIFICATION_READS) {
            Loaded::Present(receipts) => receipts,
            Loaded::Absent | Loaded::Corrupt => Self::default(),
        }
    }

    pub fn save(&self, db: &Database) -> Result<()> {
        snapshot::save(db, keys::NOTIFICATION_READS, self)
    }

    pub fn is_read(&self, user_id: &str, notification_id: &str) -> bool {
        self.by_user.get(user_id).is_some_and(|ids| ids.contains(notification_id))
    }

    /// Returns false if it was already marked.
    pub fn mark_read(&mut self, user_id: &str, notification_id: &str) -> bool {
        self.by_user
            .entry(user_id.to_string())
            .or_default()
            .insert(notification_id.to_string())
    }

    /// Returns how many were newly marked.
    pub fn mark_all<'a>(&mut self, user_id: &str, notification_ids: impl IntoIterator<Item = &'a str>) -> usize {
        let acknowledged = self.by_user.entry(user_id.to_string()).or_default();
        notification_ids
            .into_iter()
            .filter(|id| acknowledged.insert(id.to_string()))
            .count()
    }
}
