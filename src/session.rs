use std::sync::{Arc, Mutex, MutexGuard};

use crate::draft::DraftState;
use crate::record::QueryRecord;

/// One reviewer's session over a single query: the server-authoritative
/// record plus the local draft.
///
/// Created when the review opens on a fetched record and discarded when the
/// reviewer quits; nothing is persisted implicitly on close.
#[derive(Debug)]
pub struct ReviewSession {
    pub record: QueryRecord,
    pub draft: DraftState,
}

impl ReviewSession {
    pub fn open(record: QueryRecord) -> Self {
        let draft = DraftState::from_record(&record);
        Self { record, draft }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }
}

/// Session handle shared between the UI task and spawned controller tasks.
///
/// Held only for flag flips, draft edits, and response merges; never across
/// an await, so the run and save actions can be in flight simultaneously.
pub type SharedSession = Arc<Mutex<ReviewSession>>;

/// Locks the session. Poisoning can only follow a panic elsewhere.
pub fn lock_session(session: &SharedSession) -> MutexGuard<'_, ReviewSession> {
    session.lock().expect("review session lock poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_record;

    #[test]
    fn test_open_seeds_draft_from_record() {
        let record = sample_record();
        let session = ReviewSession::open(record.clone());

        assert_eq!(session.draft.current_sql_query(), record.sql_query);
        assert_eq!(session.draft.verified_status(), record.status);
    }

    #[test]
    fn test_shared_session_mutation_is_visible_across_clones() {
        let session = ReviewSession::open(sample_record()).into_shared();
        let other = session.clone();

        lock_session(&session).draft.set_sql("SELECT 2");

        assert_eq!(lock_session(&other).draft.current_sql_query(), "SELECT 2");
    }
}
