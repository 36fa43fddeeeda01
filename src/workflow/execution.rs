use std::sync::Arc;

use crate::backend::ExecutionBackend;
use crate::notify::{Notifier, RetryAction};
use crate::review_log::ReviewLogger;
use crate::session::{lock_session, SharedSession};

use super::RunAttempt;

/// Drives the asynchronous "run SQL" action for one review session.
///
/// The session's `is_running` flag is the authoritative guard: a second
/// call while an execution is in flight is a no-op even when the surface
/// failed to disable its trigger.
pub struct ExecutionController {
    backend: Arc<dyn ExecutionBackend>,
    notifier: Notifier,
    logger: Arc<ReviewLogger>,
}

impl ExecutionController {
    pub fn new(
        backend: Arc<dyn ExecutionBackend>,
        notifier: Notifier,
        logger: Arc<ReviewLogger>,
    ) -> Self {
        Self {
            backend,
            notifier,
            logger,
        }
    }

    /// Runs the draft SQL as it stands right now.
    ///
    /// Returns whether a collaborator call was dispatched; `false` means an
    /// execution was already in flight.
    pub async fn run(&self, session: &SharedSession) -> bool {
        let attempt = {
            let guard = lock_session(session);
            RunAttempt {
                query_id: guard.record.id.clone(),
                sql: guard.draft.current_sql_query().to_string(),
            }
        };
        self.run_attempt(session, attempt).await
    }

    /// Runs an already-captured attempt. Retry actions come back through
    /// here so the inputs that failed are replayed verbatim.
    pub async fn run_attempt(&self, session: &SharedSession, attempt: RunAttempt) -> bool {
        {
            let mut guard = lock_session(session);
            if guard.draft.is_running {
                return false;
            }
            guard.draft.is_running = true;
        }
        self.logger.log_run_started(&attempt);

        // Sole suspension point; the session stays unlocked while the
        // collaborator works.
        let outcome = self.backend.execute(&attempt.query_id, &attempt.sql).await;

        let mut guard = lock_session(session);
        guard.draft.is_running = false;
        match outcome {
            Ok(fragment) => {
                let sql_errored = fragment.sql_error_message.is_some();
                guard.record.apply_execution(fragment);
                drop(guard);
                self.logger.log_run_completed(&attempt.query_id, sql_errored);
                self.notifier.success("Query executed");
            }
            Err(error) => {
                drop(guard);
                let detail = format!("{error:#}");
                self.logger.log_run_failed(&attempt, &detail);
                self.notifier.failure(
                    format!("Failed to run query: {detail}"),
                    RetryAction::Run(attempt),
                );
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "tests/execution_tests.rs"]
mod tests;
