use crate::record::{QueryRecord, QueryStatus};

/// The reviewer's locally held, uncommitted edits for one review session.
///
/// Initialized from the record when the session opens; diverges on edit and
/// is reconciled only by the explicit run/save actions. Editing here never
/// triggers network activity on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftState {
    current_sql_query: String,
    verified_status: QueryStatus,
    /// Re-entrancy guard for the execution action.
    pub is_running: bool,
    /// Re-entrancy guard for the persistence action.
    pub is_saving: bool,
}

impl DraftState {
    pub fn from_record(record: &QueryRecord) -> Self {
        Self {
            current_sql_query: record.sql_query.clone(),
            verified_status: record.status,
            is_running: false,
            is_saving: false,
        }
    }

    pub fn current_sql_query(&self) -> &str {
        &self.current_sql_query
    }

    pub fn verified_status(&self) -> QueryStatus {
        self.verified_status
    }

    /// Replaces the candidate SQL text. Synchronous assignment, no side
    /// effects.
    pub fn set_sql(&mut self, text: impl Into<String>) {
        self.current_sql_query = text.into();
    }

    /// Replaces the candidate verification status. Synchronous assignment,
    /// no side effects.
    pub fn set_verified_status(&mut self, status: QueryStatus) {
        self.verified_status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_record;

    #[test]
    fn test_draft_initializes_from_record() {
        let record = sample_record();
        let draft = DraftState::from_record(&record);

        assert_eq!(draft.current_sql_query(), record.sql_query);
        assert_eq!(draft.verified_status(), record.status);
        assert!(!draft.is_running);
        assert!(!draft.is_saving);
    }

    #[test]
    fn test_setters_are_independent_assignments() {
        let record = sample_record();
        let mut draft = DraftState::from_record(&record);

        draft.set_sql("SELECT 2");
        assert_eq!(draft.current_sql_query(), "SELECT 2");
        assert_eq!(draft.verified_status(), record.status);

        draft.set_verified_status(QueryStatus::Verified);
        assert_eq!(draft.verified_status(), QueryStatus::Verified);
        assert_eq!(draft.current_sql_query(), "SELECT 2");
    }

    #[test]
    fn test_draft_does_not_follow_later_record_changes() {
        let mut record = sample_record();
        let draft = DraftState::from_record(&record);

        record.sql_query = "SELECT 99".to_string();
        record.status = QueryStatus::Rejected;

        assert_eq!(draft.current_sql_query(), "SELECT 1");
        assert_eq!(draft.verified_status(), QueryStatus::NotVerified);
    }
}
