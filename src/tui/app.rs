use std::time::{Duration, Instant};

use crate::notify::{Notification, NotificationKind, RetryAction};
use crate::session::{lock_session, SharedSession};

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Results,
    Trace,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Editor => Focus::Results,
            Focus::Results => Focus::Trace,
            Focus::Trace => Focus::Editor,
        }
    }
}

/// A toast currently on screen.
#[derive(Debug, Clone)]
pub struct ActiveNotice {
    pub notice: Notification,
    pub shown_at: Instant,
}

/// View state of the review screen.
///
/// Editing goes through the draft's setters under the session lock; the
/// busy checks here only gate key dispatch, the controllers keep the
/// authoritative guard.
pub struct App {
    pub session: SharedSession,
    pub focus: Focus,
    /// Cursor position in the draft SQL, counted in chars.
    pub cursor: usize,
    pub results_scroll: usize,
    pub trace_scroll: usize,
    pub notices: Vec<ActiveNotice>,
    notice_ttl: Duration,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: SharedSession, notice_ttl: Duration) -> Self {
        let cursor = lock_session(&session)
            .draft
            .current_sql_query()
            .chars()
            .count();
        Self {
            session,
            focus: Focus::Editor,
            cursor,
            results_scroll: 0,
            trace_scroll: 0,
            notices: Vec::new(),
            notice_ttl,
            should_quit: false,
        }
    }

    pub fn is_running(&self) -> bool {
        lock_session(&self.session).draft.is_running
    }

    pub fn is_saving(&self) -> bool {
        lock_session(&self.session).draft.is_saving
    }

    pub fn cycle_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Advances the draft's verification status to the next value in the
    /// selector order.
    pub fn cycle_status(&mut self) {
        let mut guard = lock_session(&self.session);
        let next = guard.draft.verified_status().cycled();
        guard.draft.set_verified_status(next);
    }

    // --- SQL editor ---

    pub fn insert_char(&mut self, c: char) {
        let mut guard = lock_session(&self.session);
        let mut text: Vec<char> = guard.draft.current_sql_query().chars().collect();
        let at = self.cursor.min(text.len());
        text.insert(at, c);
        guard.draft.set_sql(text.into_iter().collect::<String>());
        self.cursor = at + 1;
    }

    /// Inserts pasted text at the cursor, dropping carriage returns.
    pub fn insert_text(&mut self, pasted: &str) {
        let inserted: Vec<char> = pasted.chars().filter(|c| *c != '\r').collect();
        if inserted.is_empty() {
            return;
        }
        let count = inserted.len();
        let mut guard = lock_session(&self.session);
        let mut text: Vec<char> = guard.draft.current_sql_query().chars().collect();
        let at = self.cursor.min(text.len());
        text.splice(at..at, inserted);
        guard.draft.set_sql(text.into_iter().collect::<String>());
        self.cursor = at + count;
    }

    /// Backspace: removes the char before the cursor.
    pub fn delete_char(&mut self) {
        let mut guard = lock_session(&self.session);
        let mut text: Vec<char> = guard.draft.current_sql_query().chars().collect();
        let at = self.cursor.min(text.len());
        if at == 0 {
            return;
        }
        text.remove(at - 1);
        guard.draft.set_sql(text.into_iter().collect::<String>());
        self.cursor = at - 1;
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let len = lock_session(&self.session)
            .draft
            .current_sql_query()
            .chars()
            .count();
        if self.cursor < len {
            self.cursor += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = lock_session(&self.session)
            .draft
            .current_sql_query()
            .chars()
            .count();
    }

    // --- pane scrolling ---

    pub fn scroll_up(&mut self) {
        match self.focus {
            Focus::Results => self.results_scroll = self.results_scroll.saturating_sub(1),
            Focus::Trace => self.trace_scroll = self.trace_scroll.saturating_sub(1),
            Focus::Editor => {}
        }
    }

    pub fn scroll_down(&mut self) {
        let guard = lock_session(&self.session);
        match self.focus {
            Focus::Results => {
                let rows = guard
                    .record
                    .sql_query_result
                    .as_ref()
                    .map(|r| r.rows.len())
                    .unwrap_or(0);
                if self.results_scroll + 1 < rows {
                    self.results_scroll += 1;
                }
            }
            Focus::Trace => {
                let steps = guard.record.ai_process.len();
                if self.trace_scroll + 1 < steps {
                    self.trace_scroll += 1;
                }
            }
            Focus::Editor => {}
        }
    }

    // --- notices ---

    pub fn push_notice(&mut self, notice: Notification) {
        self.notices.push(ActiveNotice {
            notice,
            shown_at: Instant::now(),
        });
    }

    pub fn expire_notices(&mut self, now: Instant) {
        let ttl = self.notice_ttl;
        self.notices
            .retain(|active| now.duration_since(active.shown_at) < ttl);
    }

    /// Takes the most recent failure notice's retry payload, removing that
    /// notice from the screen.
    pub fn take_retry(&mut self) -> Option<RetryAction> {
        let idx = self
            .notices
            .iter()
            .rposition(|active| active.notice.kind == NotificationKind::Failure)?;
        self.notices.remove(idx).notice.retry
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
