use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::backend::{ExecutionBackend, QueryStore};
use crate::config::ConsoleConfig;
use crate::notify::{Notifier, RetryAction};
use crate::review_log::ReviewLogger;
use crate::session::SharedSession;
use crate::workflow::{ExecutionController, PersistenceController};

use super::app::{App, Focus};
use super::event::{Event, EventHandler};
use super::ui;

/// Runs the review TUI until the reviewer quits. The draft is discarded on
/// exit; nothing is persisted implicitly.
pub async fn run_tui(
    session: SharedSession,
    backend: Arc<dyn ExecutionBackend>,
    store: Arc<dyn QueryStore>,
    logger: Arc<ReviewLogger>,
    config: &ConsoleConfig,
) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableBracketedPaste
    )?;

    // Restore the terminal even when drawing panics.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::event::DisableBracketedPaste,
            crossterm::cursor::Show
        );
        original_hook(panic_info);
    }));

    let term_backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(term_backend)?;

    let mut event_handler = EventHandler::new(Duration::from_millis(config.ui.tick_rate_ms));
    let notifier = Notifier::new(event_handler.sender());
    let execution = Arc::new(ExecutionController::new(
        backend,
        notifier.clone(),
        logger.clone(),
    ));
    let persistence = Arc::new(PersistenceController::new(store, notifier, logger));

    let mut app = App::new(session, Duration::from_secs(config.ui.notice_ttl_secs));

    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        match event_handler.next().await? {
            Event::Key(key) => handle_key(&mut app, key, &execution, &persistence),
            Event::Paste(text) => {
                if app.focus == Focus::Editor {
                    app.insert_text(&text);
                }
            }
            Event::Notice(notice) => app.push_notice(notice),
            Event::Tick => app.expire_notices(Instant::now()),
            Event::Resize => {}
        }

        if app.should_quit {
            break;
        }
    }

    restore_terminal(&mut terminal)
}

fn handle_key(
    app: &mut App,
    key: KeyEvent,
    execution: &Arc<ExecutionController>,
    persistence: &Arc<PersistenceController>,
) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Char('r') if ctrl => spawn_run(app, execution),
        KeyCode::Char('s') if ctrl => spawn_save(app, persistence),
        KeyCode::Char('v') if ctrl => app.cycle_status(),
        KeyCode::Char('y') if ctrl => spawn_retry(app, execution, persistence),
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Left if app.focus == Focus::Editor => app.move_cursor_left(),
        KeyCode::Right if app.focus == Focus::Editor => app.move_cursor_right(),
        KeyCode::Home if app.focus == Focus::Editor => app.move_cursor_home(),
        KeyCode::End if app.focus == Focus::Editor => app.move_cursor_end(),
        KeyCode::Backspace if app.focus == Focus::Editor => app.delete_char(),
        KeyCode::Enter if app.focus == Focus::Editor => app.insert_char('\n'),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        KeyCode::Char(c) if app.focus == Focus::Editor && !ctrl => app.insert_char(c),
        _ => {}
    }
}

/// The key is inert while a run is in flight; the controller guard stays
/// authoritative for races.
fn spawn_run(app: &App, execution: &Arc<ExecutionController>) {
    if app.is_running() {
        return;
    }
    let controller = execution.clone();
    let session = app.session.clone();
    tokio::spawn(async move {
        controller.run(&session).await;
    });
}

fn spawn_save(app: &App, persistence: &Arc<PersistenceController>) {
    if app.is_saving() {
        return;
    }
    let controller = persistence.clone();
    let session = app.session.clone();
    tokio::spawn(async move {
        controller.save(&session).await;
    });
}

/// Replays the most recent failed attempt with the inputs it was captured
/// with, not the draft as it stands now.
fn spawn_retry(
    app: &mut App,
    execution: &Arc<ExecutionController>,
    persistence: &Arc<PersistenceController>,
) {
    match app.take_retry() {
        Some(RetryAction::Run(attempt)) => {
            let controller = execution.clone();
            let session = app.session.clone();
            tokio::spawn(async move {
                controller.run_attempt(&session, attempt).await;
            });
        }
        Some(RetryAction::Save(attempt)) => {
            let controller = persistence.clone();
            let session = app.session.clone();
            tokio::spawn(async move {
                controller.save_attempt(&session, attempt).await;
            });
        }
        None => {}
    }
}

pub fn restore_terminal<B>(terminal: &mut ratatui::Terminal<B>) -> Result<()>
where
    B: ratatui::backend::Backend + std::io::Write,
    <B as ratatui::backend::Backend>::Error: std::error::Error + Send + Sync + 'static,
{
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableBracketedPaste,
        crossterm::cursor::Show
    )?;
    terminal.show_cursor()?;
    Ok(())
}
