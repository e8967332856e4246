//! # CivicError
//!
//! Every failure a store operation can report. All of them are recoverable:
//! the snapshot is left untouched and the caller decides what to show.

use civic_types::models::ComplaintStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CivicError {
    /// The acting user's role or the entity's state forbids the operation
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Referenced entity id does not exist
    #[error("{kind} not found with ID {id}")]
    NotFound { kind: &'static str, id: String },

    /// Empty or blank required text
    #[error("validation error: {0}")]
    ValidationError(String),

    /// No active identity for an operation that needs one
    #[error("not authenticated")]
    NotAuthenticated,

    /// Rejected by the strict status workflow
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: ComplaintStatus, to: ComplaintStatus },

    /// Snapshot write-back failed; in-memory state was not changed
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl CivicError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        CivicError::NotFound { kind, id: id.to_string() }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CivicError::Unauthorized(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CivicError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, CivicError>;
