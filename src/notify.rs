//! Notification sink for the action controllers.
//!
//! Controllers receive a [`Notifier`] at construction and report completion
//! and failure through it; the presentation surface renders the resulting
//! notices as toasts. Failure notices carry the exact inputs of the failed
//! operation so a retry replays them verbatim, even if the draft has been
//! edited since.

use tokio::sync::mpsc;

use crate::tui::Event;
use crate::workflow::{RunAttempt, SaveAttempt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

/// A captured operation payload that can be dispatched again as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryAction {
    Run(RunAttempt),
    Save(SaveAttempt),
}

/// One user-facing notice.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub retry: Option<RetryAction>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            retry: None,
        }
    }

    pub fn failure(message: impl Into<String>, retry: RetryAction) -> Self {
        Self {
            kind: NotificationKind::Failure,
            message: message.into(),
            retry: Some(retry),
        }
    }
}

/// Side-effect sink handed to each controller at construction.
///
/// Sends are fire-and-forget: a closed channel drops the notice rather
/// than failing the workflow.
#[derive(Clone)]
pub struct Notifier {
    inner: mpsc::UnboundedSender<Event>,
}

impl Notifier {
    pub fn new(sender: mpsc::UnboundedSender<Event>) -> Self {
        Self { inner: sender }
    }

    pub fn notify(&self, notice: Notification) {
        let _ = self.inner.send(Event::Notice(notice));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(Notification::success(message));
    }

    pub fn failure(&self, message: impl Into<String>, retry: RetryAction) {
        self.notify(Notification::failure(message, retry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_notice_carries_no_retry() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = Notifier::new(tx);

        notifier.success("Query saved");

        match rx.try_recv().unwrap() {
            Event::Notice(notice) => {
                assert_eq!(notice.kind, NotificationKind::Success);
                assert_eq!(notice.message, "Query saved");
                assert!(notice.retry.is_none());
            }
            _ => panic!("Expected Notice event"),
        }
    }

    #[test]
    fn test_failure_notice_carries_the_captured_attempt() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = Notifier::new(tx);
        let attempt = RunAttempt {
            query_id: "q1".to_string(),
            sql: "SELECT 1".to_string(),
        };

        notifier.failure("Failed to run query", RetryAction::Run(attempt.clone()));

        match rx.try_recv().unwrap() {
            Event::Notice(notice) => {
                assert_eq!(notice.kind, NotificationKind::Failure);
                assert_eq!(notice.retry, Some(RetryAction::Run(attempt)));
            }
            _ => panic!("Expected Notice event"),
        }
    }

    #[test]
    fn test_send_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let notifier = Notifier::new(tx);

        notifier.success("nobody listening");
    }
}
