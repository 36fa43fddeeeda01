mod backend;
mod config;
mod draft;
mod notify;
mod record;
mod review_log;
mod session;
mod tui;
mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthStr;
use uuid::Uuid;

use backend::{ExecutionBackend, HttpApi, QueryStore};
use config::{session_logs_dir, ConsoleConfig};
use notify::{Notifier, NotificationKind};
use record::{QueryRecord, SqlQueryResult};
use review_log::ReviewLogger;
use session::{lock_session, ReviewSession, SharedSession};
use tui::Event;
use workflow::ExecutionController;

#[derive(Parser)]
#[command(name = "querydesk")]
#[command(about = "Terminal review console for AI-generated SQL queries")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), "+", env!("QUERYDESK_GIT_SHA")))]
struct Cli {
    /// Identifier of the query record to review
    query_id: String,

    /// Base URL of the review API (overrides the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Path to a console config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the review summary and exit instead of opening the TUI
    #[arg(long)]
    headless: bool,

    /// With --headless, execute the stored SQL once and print the outcome
    #[arg(long, requires = "headless")]
    run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConsoleConfig::load_or_default(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    config.validate()?;

    let api = Arc::new(HttpApi::new(&config.api)?);
    let store: Arc<dyn QueryStore> = api.clone();
    let exec_backend: Arc<dyn ExecutionBackend> = api;

    let session_id = Uuid::new_v4().to_string();
    let logs_dir = session_logs_dir(&session_id)?;
    let logger = Arc::new(ReviewLogger::new(&session_id, &logs_dir)?);

    let record = store
        .fetch(&cli.query_id)
        .await
        .with_context(|| format!("Failed to load query {}", cli.query_id))?;
    let session = ReviewSession::open(record).into_shared();

    let result = if cli.headless {
        run_headless(&cli, session, exec_backend, logger.clone()).await
    } else {
        tui::run_tui(session, exec_backend, store, logger.clone(), &config).await
    };
    eprintln!("session log: {}", logger.path().display());
    result
}

/// Prints the review summary to stdout; with `--run`, performs one
/// execution through the real controller first.
async fn run_headless(
    cli: &Cli,
    session: SharedSession,
    backend: Arc<dyn ExecutionBackend>,
    logger: Arc<ReviewLogger>,
) -> Result<()> {
    if cli.run {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let controller = ExecutionController::new(backend, Notifier::new(tx), logger);
        controller.run(&session).await;

        while let Ok(event) = rx.try_recv() {
            if let Event::Notice(notice) = event {
                let prefix = match notice.kind {
                    NotificationKind::Success => "ok",
                    NotificationKind::Failure => "failed",
                };
                println!("[{}] {}", prefix, notice.message);
            }
        }
    }

    let guard = lock_session(&session);
    print_summary(&guard.record, guard.draft.current_sql_query());
    Ok(())
}

fn print_summary(record: &QueryRecord, sql: &str) {
    println!("{}  {}", record.display_id, record.question);
    println!(
        "asked by {} on {}",
        record.username,
        record.question_date.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "status: {}  last updated {}",
        record.status.label(),
        record.last_updated.format("%Y-%m-%d %H:%M UTC")
    );
    if let Some(score) = record.confidence_score {
        println!("confidence: {:.0}%", score * 100.0);
    }
    println!();
    println!("SQL:");
    println!("{}", sql);
    println!();

    if let Some(error) = &record.sql_error_message {
        println!("SQL error: {}", error);
        return;
    }
    if let Some(answer) = &record.nl_response {
        println!("{}", answer);
        println!();
    }
    match &record.sql_query_result {
        Some(result) => print_table(result),
        None => println!("(no result yet)"),
    }
}

/// Column-aligned plain-text rendering of a result table.
fn print_table(result: &SqlQueryResult) {
    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.width()).collect();
    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(SqlQueryResult::cell_text).collect())
        .collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.width());
            }
        }
    }

    let header: Vec<String> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| pad_to_width(name, widths[i]))
        .collect();
    println!("{}", header.join("  "));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
    );
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| pad_to_width(cell, widths.get(i).copied().unwrap_or(0)))
            .collect();
        println!("{}", line.join("  "));
    }
}

fn pad_to_width(text: &str, width: usize) -> String {
    let mut padded = text.to_string();
    let current = text.width();
    if current < width {
        padded.extend(std::iter::repeat(' ').take(width - current));
    }
    padded
}
