use std::sync::Arc;

use crate::backend::QueryStore;
use crate::notify::{Notifier, RetryAction};
use crate::record::QueryPatch;
use crate::review_log::ReviewLogger;
use crate::session::{lock_session, SharedSession};

use super::SaveAttempt;

/// Drives the asynchronous "save" action for one review session.
///
/// Independent of the execution controller: both may be in flight at once,
/// each serialized against itself by its own busy flag.
pub struct PersistenceController {
    store: Arc<dyn QueryStore>,
    notifier: Notifier,
    logger: Arc<ReviewLogger>,
}

impl PersistenceController {
    pub fn new(store: Arc<dyn QueryStore>, notifier: Notifier, logger: Arc<ReviewLogger>) -> Self {
        Self {
            store,
            notifier,
            logger,
        }
    }

    /// Persists the draft SQL and verification status as they stand right
    /// now.
    ///
    /// Returns whether a collaborator call was dispatched; `false` means a
    /// save was already in flight.
    pub async fn save(&self, session: &SharedSession) -> bool {
        let attempt = {
            let guard = lock_session(session);
            SaveAttempt {
                query_id: guard.record.id.clone(),
                patch: QueryPatch {
                    sql_query: guard.draft.current_sql_query().to_string(),
                    status: guard.draft.verified_status(),
                },
            }
        };
        self.save_attempt(session, attempt).await
    }

    /// Persists an already-captured attempt. Retry actions come back
    /// through here so the inputs that failed are replayed verbatim.
    pub async fn save_attempt(&self, session: &SharedSession, attempt: SaveAttempt) -> bool {
        {
            let mut guard = lock_session(session);
            if guard.draft.is_saving {
                return false;
            }
            guard.draft.is_saving = true;
        }
        self.logger.log_save_started(&attempt);

        // Sole suspension point.
        let result = self.store.save(&attempt.query_id, &attempt.patch).await;

        let mut guard = lock_session(session);
        guard.draft.is_saving = false;
        match result {
            Ok(saved) => {
                // The response is authoritative for the record; the draft
                // keeps the reviewer's values without snapping back.
                guard.record.apply_saved(saved);
                drop(guard);
                self.logger.log_save_completed(&attempt.query_id);
                self.notifier.success("Query saved");
            }
            Err(error) => {
                drop(guard);
                let detail = format!("{error:#}");
                self.logger.log_save_failed(&attempt, &detail);
                self.notifier.failure(
                    format!("Failed to save query: {detail}"),
                    RetryAction::Save(attempt),
                );
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "tests/persistence_tests.rs"]
mod tests;
