use std::time::{Duration, Instant};

use super::{App, Focus};
use crate::notify::{Notification, RetryAction};
use crate::record::{sample_record, QueryPatch, QueryStatus};
use crate::session::{lock_session, ReviewSession};
use crate::workflow::{RunAttempt, SaveAttempt};

fn test_app() -> App {
    App::new(
        ReviewSession::open(sample_record()).into_shared(),
        Duration::from_secs(6),
    )
}

fn draft_sql(app: &App) -> String {
    lock_session(&app.session).draft.current_sql_query().to_string()
}

#[test]
fn test_new_places_cursor_at_end_of_draft() {
    let app = test_app();
    assert_eq!(app.cursor, "SELECT 1".chars().count());
    assert_eq!(app.focus, Focus::Editor);
}

#[test]
fn test_insert_and_backspace_edit_the_draft() {
    let mut app = test_app();

    app.insert_char('0');
    assert_eq!(draft_sql(&app), "SELECT 10");
    assert_eq!(app.cursor, 9);

    app.delete_char();
    app.delete_char();
    assert_eq!(draft_sql(&app), "SELECT ");
    assert_eq!(app.cursor, 7);
}

#[test]
fn test_editing_mid_string_respects_char_boundaries() {
    let mut app = test_app();
    app.move_cursor_home();
    app.insert_char('µ');
    assert_eq!(draft_sql(&app), "µSELECT 1");
    assert_eq!(app.cursor, 1);

    app.delete_char();
    assert_eq!(draft_sql(&app), "SELECT 1");
    assert_eq!(app.cursor, 0);
}

#[test]
fn test_insert_text_pastes_at_cursor_and_drops_carriage_returns() {
    let mut app = test_app();
    app.move_cursor_end();
    app.insert_text("\r\nWHERE x = 1\r\n");

    assert_eq!(draft_sql(&app), "SELECT 1\nWHERE x = 1\n");
    assert_eq!(app.cursor, "SELECT 1\nWHERE x = 1\n".chars().count());
}

#[test]
fn test_cursor_movement_clamps_to_the_text() {
    let mut app = test_app();
    app.move_cursor_end();
    app.move_cursor_right();
    assert_eq!(app.cursor, 8);

    app.move_cursor_home();
    app.move_cursor_left();
    assert_eq!(app.cursor, 0);
}

#[test]
fn test_focus_cycle_covers_all_panes() {
    let mut app = test_app();
    let mut seen = vec![app.focus];
    for _ in 0..2 {
        app.cycle_focus();
        seen.push(app.focus);
    }
    app.cycle_focus();
    assert_eq!(app.focus, Focus::Editor);
    assert!(seen.contains(&Focus::Results));
    assert!(seen.contains(&Focus::Trace));
}

#[test]
fn test_cycle_status_advances_the_draft_only() {
    let mut app = test_app();
    app.cycle_status();

    let guard = lock_session(&app.session);
    assert_eq!(guard.draft.verified_status(), QueryStatus::Verified);
    assert_eq!(guard.record.status, QueryStatus::NotVerified);
}

#[test]
fn test_busy_accessors_mirror_the_session_flags() {
    let app = test_app();
    assert!(!app.is_running());
    assert!(!app.is_saving());

    lock_session(&app.session).draft.is_running = true;
    assert!(app.is_running());
    assert!(!app.is_saving());
}

#[test]
fn test_take_retry_picks_the_most_recent_failure() {
    let mut app = test_app();
    app.push_notice(Notification::success("Query executed"));
    app.push_notice(Notification::failure(
        "Failed to run query",
        RetryAction::Run(RunAttempt {
            query_id: "q1".to_string(),
            sql: "SELECT old".to_string(),
        }),
    ));
    app.push_notice(Notification::failure(
        "Failed to save query",
        RetryAction::Save(SaveAttempt {
            query_id: "q1".to_string(),
            patch: QueryPatch {
                sql_query: "SELECT new".to_string(),
                status: QueryStatus::Verified,
            },
        }),
    ));

    match app.take_retry() {
        Some(RetryAction::Save(attempt)) => {
            assert_eq!(attempt.patch.sql_query, "SELECT new");
        }
        other => panic!("Expected the save retry, got {:?}", other),
    }
    // The taken notice is gone; the earlier failure is next in line.
    match app.take_retry() {
        Some(RetryAction::Run(attempt)) => assert_eq!(attempt.sql, "SELECT old"),
        other => panic!("Expected the run retry, got {:?}", other),
    }
    assert!(app.take_retry().is_none());
}

#[test]
fn test_expire_notices_drops_old_toasts_only() {
    let mut app = test_app();
    app.push_notice(Notification::success("Query saved"));
    assert_eq!(app.notices.len(), 1);

    app.expire_notices(Instant::now());
    assert_eq!(app.notices.len(), 1);

    app.expire_notices(Instant::now() + Duration::from_secs(7));
    assert!(app.notices.is_empty());
}

#[test]
fn test_scroll_down_is_bounded_by_the_trace_length() {
    let mut app = test_app();
    app.focus = Focus::Trace;

    // Sample record has two process steps.
    app.scroll_down();
    app.scroll_down();
    app.scroll_down();
    assert_eq!(app.trace_scroll, 1);

    app.scroll_up();
    app.scroll_up();
    assert_eq!(app.trace_scroll, 0);
}
