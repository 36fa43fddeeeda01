//! Asynchronous action controllers for the review session.
//!
//! Two independent operations can be in flight against one session: running
//! the draft SQL and persisting the draft edits. Each controller owns its
//! busy flag as the authoritative re-entrancy guard, captures its inputs up
//! front, suspends exactly once at the collaborator call, and resets the
//! flag on every exit path.

mod execution;
mod persistence;

pub use execution::ExecutionController;
pub use persistence::PersistenceController;

use serde::Serialize;

use crate::record::QueryPatch;

/// Inputs captured for one execution attempt.
///
/// A retry replays exactly these values, not the draft as it stands at
/// retry time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunAttempt {
    pub query_id: String,
    pub sql: String,
}

/// Inputs captured for one persistence attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveAttempt {
    pub query_id: String,
    pub patch: QueryPatch,
}
