use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};
use crate::notify::NotificationKind;
use crate::record::{QueryStatus, SqlQueryResult};
use crate::session::{lock_session, ReviewSession};

use super::app::{App, Focus};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(2), // Footer
        ])
        .split(frame.area());

    {
        let session = lock_session(&app.session);
        draw_header(frame, &session, chunks[0]);
        draw_main(frame, app, &session, chunks[1]);
        draw_footer(frame, app, &session, chunks[2]);
    }
    draw_notices(frame, app);
}

fn status_style(status: QueryStatus) -> Style {
    match status {
        QueryStatus::Verified => Style::default().fg(Color::Green),
        QueryStatus::Rejected => Style::default().fg(Color::Red),
        QueryStatus::NotVerified => Style::default().fg(Color::Yellow),
    }
}

fn pane_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_header(frame: &mut Frame, session: &ReviewSession, area: Rect) {
    let record = &session.record;

    let mut meta = vec![
        Span::raw(format!("asked by {} on ", record.username)),
        Span::raw(record.question_date.format("%Y-%m-%d %H:%M UTC").to_string()),
    ];
    if let Some(score) = record.confidence_score {
        meta.push(Span::raw(format!("  confidence {:.0}%", score * 100.0)));
    }

    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", record.display_id),
                Style::default().fg(Color::Cyan).bold(),
            ),
            Span::styled(record.question.clone(), Style::default().bold()),
        ]),
        Line::from(meta),
        Line::from(vec![
            Span::raw("status "),
            Span::styled(record.status.label(), status_style(record.status)),
            Span::styled(
                format!(
                    "  last updated {}",
                    record.last_updated.format("%Y-%m-%d %H:%M UTC")
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ])
    .block(Block::default().borders(Borders::BOTTOM));

    frame.render_widget(header, area);
}

fn draw_main(frame: &mut Frame, app: &App, session: &ReviewSession, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(columns[0]);

    draw_editor(frame, app, session, left[0]);
    draw_results(frame, app, session, left[1]);
    draw_trace(frame, app, session, columns[1]);
}

fn draw_editor(frame: &mut Frame, app: &App, session: &ReviewSession, area: Rect) {
    let edited = session.draft.current_sql_query() != session.record.sql_query;
    let title = if edited { " SQL (edited) " } else { " SQL " };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(pane_border(app.focus == Focus::Editor));

    let lines = editor_lines(
        session.draft.current_sql_query(),
        app.cursor,
        app.focus == Focus::Editor,
    );
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Three-way exclusive display: running indicator, error banner, or
/// results-or-empty-state.
fn draw_results(frame: &mut Frame, app: &App, session: &ReviewSession, area: Rect) {
    let focused = app.focus == Focus::Results;

    if session.draft.is_running {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Results ")
            .border_style(pane_border(focused));
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "Running query...",
            Style::default().fg(Color::Yellow),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(error) = &session.record.sql_error_message {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" SQL Error ")
            .border_style(Style::default().fg(Color::Red));
        let paragraph = Paragraph::new(error.clone())
            .style(Style::default().fg(Color::Red))
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Results ")
        .border_style(pane_border(focused));

    let Some(result) = &session.record.sql_query_result else {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "No result yet. Ctrl-R runs the draft SQL.",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (answer_area, table_area) = match &session.record.nl_response {
        Some(_) => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(2), Constraint::Min(0)])
                .split(inner);
            (Some(parts[0]), parts[1])
        }
        None => (None, inner),
    };

    if let (Some(answer_area), Some(answer)) = (answer_area, &session.record.nl_response) {
        let paragraph = Paragraph::new(answer.clone())
            .style(Style::default().fg(Color::Green))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, answer_area);
    }

    let column_count = result.columns.len().max(1);
    let header = Row::new(
        result
            .columns
            .iter()
            .map(|name| Cell::from(name.as_str()).style(Style::default().bold())),
    );
    let rows = result
        .rows
        .iter()
        .skip(app.results_scroll)
        .map(|row| Row::new(row.iter().map(|value| Cell::from(SqlQueryResult::cell_text(value)))));
    let widths = vec![Constraint::Ratio(1, column_count as u32); column_count];

    let table = Table::new(rows, widths).header(header);
    frame.render_widget(table, table_area);
}

fn draw_trace(frame: &mut Frame, app: &App, session: &ReviewSession, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" AI Process ")
        .border_style(pane_border(app.focus == Focus::Trace));

    let lines: Vec<Line> = session
        .record
        .ai_process
        .iter()
        .enumerate()
        .skip(app.trace_scroll)
        .map(|(i, step)| {
            Line::from(vec![
                Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::raw(step.clone()),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn draw_footer(frame: &mut Frame, app: &App, session: &ReviewSession, area: Rect) {
    let busy_style = Style::default().fg(Color::DarkGray);
    let ready_style = Style::default().fg(Color::Cyan);

    let run_style = if session.draft.is_running {
        busy_style
    } else {
        ready_style
    };
    let save_style = if session.draft.is_saving {
        busy_style
    } else {
        ready_style
    };

    let mut hints = vec![
        Span::styled("[Tab]", ready_style),
        Span::raw(" pane  "),
        Span::styled("[Ctrl-R]", run_style),
        Span::raw(if session.draft.is_running {
            " running...  "
        } else {
            " run  "
        }),
        Span::styled("[Ctrl-S]", save_style),
        Span::raw(if session.draft.is_saving {
            " saving...  "
        } else {
            " save  "
        }),
        Span::styled("[Ctrl-V]", ready_style),
        Span::raw(" status  "),
        Span::styled("[Ctrl-Y]", ready_style),
        Span::raw(" retry  "),
        Span::styled("[Esc]", ready_style),
        Span::raw(" quit"),
    ];
    if session.draft.current_sql_query() != session.record.sql_query
        || session.draft.verified_status() != session.record.status
    {
        hints.push(Span::styled(
            "  * unsaved edits",
            Style::default().fg(Color::Yellow),
        ));
    }

    let status_line = Line::from(vec![
        Span::raw("draft status: "),
        Span::styled(
            session.draft.verified_status().label(),
            status_style(session.draft.verified_status()),
        ),
    ]);

    let footer = Paragraph::new(vec![Line::from(hints), status_line]);
    frame.render_widget(footer, area);
}

fn draw_notices(frame: &mut Frame, app: &App) {
    if app.notices.is_empty() {
        return;
    }
    let area = frame.area();
    let shown = app.notices.iter().rev().take(3).collect::<Vec<_>>();

    let width = area.width.saturating_sub(4).min(64);
    let height = shown.len() as u16 + 2;
    let rect = Rect {
        x: area.width.saturating_sub(width.saturating_add(2)),
        y: area.height.saturating_sub(height.saturating_add(2)),
        width,
        height,
    };

    let lines: Vec<Line> = shown
        .iter()
        .rev()
        .map(|active| match active.notice.kind {
            NotificationKind::Success => Line::from(Span::styled(
                format!("ok  {}", active.notice.message),
                Style::default().fg(Color::Green),
            )),
            NotificationKind::Failure => {
                let suffix = if active.notice.retry.is_some() {
                    " (Ctrl-Y retries)"
                } else {
                    ""
                };
                Line::from(Span::styled(
                    format!("err {}{}", active.notice.message, suffix),
                    Style::default().fg(Color::Red),
                ))
            }
        })
        .collect();

    frame.render_widget(Clear, rect);
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Notices "))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, rect);
}

/// Splits the draft SQL into display lines, marking the cursor cell with a
/// reversed style when the editor has focus. The linear char cursor counts
/// `'\n'` as one char ending its row.
fn editor_lines(text: &str, cursor: usize, focused: bool) -> Vec<Line<'static>> {
    let mut rows: Vec<Vec<char>> = vec![Vec::new()];
    let mut cursor_row = 0usize;
    let mut cursor_col = 0usize;
    let mut index = 0usize;

    for c in text.chars() {
        if index == cursor {
            cursor_row = rows.len() - 1;
            cursor_col = rows.last().map(|row| row.len()).unwrap_or(0);
        }
        if c == '\n' {
            rows.push(Vec::new());
        } else {
            rows.last_mut().expect("rows is never empty").push(c);
        }
        index += 1;
    }
    if cursor >= index {
        cursor_row = rows.len() - 1;
        cursor_col = rows.last().map(|row| row.len()).unwrap_or(0);
    }

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            if focused && i == cursor_row {
                let col = cursor_col.min(row.len());
                let prefix: String = row.iter().take(col).collect();
                let cursor_cell = row
                    .get(col)
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| " ".to_string());
                let suffix: String = row.iter().skip(col + 1).collect();
                Line::from(vec![
                    Span::raw(prefix),
                    Span::styled(cursor_cell, Style::default().add_modifier(Modifier::REVERSED)),
                    Span::raw(suffix),
                ])
            } else {
                Line::from(row.into_iter().collect::<String>())
            }
        })
        .collect()
}
