//! Structured JSONL log of review-session activity.
//!
//! Machine-parseable record of the run/save lifecycle with:
//! - Monotonic sequence numbers for ordering
//! - ISO 8601 UTC timestamps with microsecond precision
//! - The session ID for correlation across files

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::workflow::{RunAttempt, SaveAttempt};

/// Append-only JSONL logger shared by both action controllers.
pub struct ReviewLogger {
    session_id: String,
    seq: AtomicU64,
    log_file: Mutex<File>,
    log_path: PathBuf,
}

/// A single log entry in JSONL format.
#[derive(Serialize, serde::Deserialize)]
pub struct LogEntry {
    /// Monotonic sequence number, unique within the session
    pub seq: u64,
    /// ISO 8601 UTC timestamp with microseconds
    pub ts: String,
    pub session_id: String,
    /// Component that emitted the entry
    pub component: String,
    /// Structured event payload
    pub event: Value,
}

impl ReviewLogger {
    /// Creates a logger writing to `<logs_dir>/events.jsonl`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the log file
    /// cannot be opened.
    pub fn new(session_id: &str, logs_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(logs_dir)?;
        let log_path = logs_dir.join("events.jsonl");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            session_id: session_id.to_string(),
            seq: AtomicU64::new(0),
            log_file: Mutex::new(file),
            log_path,
        })
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Logs a structured event as a single JSON line. Thread-safe; write
    /// failures are swallowed so logging never disturbs the workflow.
    pub fn log(&self, component: &str, event: impl Serialize) {
        let entry = LogEntry {
            seq: self.next_seq(),
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            session_id: self.session_id.clone(),
            component: component.to_string(),
            event: serde_json::to_value(event).unwrap_or(Value::Null),
        };

        if let Ok(mut file) = self.log_file.lock() {
            if let Ok(line) = serde_json::to_string(&entry) {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }
    }

    pub fn log_run_started(&self, attempt: &RunAttempt) {
        self.log(
            "Execution",
            serde_json::json!({
                "type": "RunStarted",
                "attempt": attempt
            }),
        );
    }

    pub fn log_run_completed(&self, query_id: &str, sql_errored: bool) {
        self.log(
            "Execution",
            serde_json::json!({
                "type": "RunCompleted",
                "query_id": query_id,
                "sql_errored": sql_errored
            }),
        );
    }

    pub fn log_run_failed(&self, attempt: &RunAttempt, error: &str) {
        self.log(
            "Execution",
            serde_json::json!({
                "type": "RunFailed",
                "attempt": attempt,
                "error": error
            }),
        );
    }

    pub fn log_save_started(&self, attempt: &SaveAttempt) {
        self.log(
            "Persistence",
            serde_json::json!({
                "type": "SaveStarted",
                "attempt": attempt
            }),
        );
    }

    pub fn log_save_completed(&self, query_id: &str) {
        self.log(
            "Persistence",
            serde_json::json!({
                "type": "SaveCompleted",
                "query_id": query_id
            }),
        );
    }

    pub fn log_save_failed(&self, attempt: &SaveAttempt, error: &str) {
        self.log(
            "Persistence",
            serde_json::json!({
                "type": "SaveFailed",
                "attempt": attempt,
                "error": error
            }),
        );
    }

    /// Path of the log file.
    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{QueryPatch, QueryStatus};
    use tempfile::TempDir;

    fn read_entries(logger: &ReviewLogger) -> Vec<LogEntry> {
        let content = std::fs::read_to_string(logger.path()).unwrap();
        content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_entries_are_ordered_and_parseable() {
        let dir = TempDir::new().unwrap();
        let logger = ReviewLogger::new("session-1", dir.path()).unwrap();

        logger.log_run_started(&RunAttempt {
            query_id: "q1".to_string(),
            sql: "SELECT 1".to_string(),
        });
        logger.log_run_completed("q1", false);

        let entries = read_entries(&logger);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].seq, 1);
        assert_eq!(entries[1].seq, 2);
        assert_eq!(entries[0].session_id, "session-1");
        assert_eq!(entries[0].component, "Execution");
        assert_eq!(entries[0].event["type"], "RunStarted");
        assert_eq!(entries[0].event["attempt"]["sql"], "SELECT 1");
    }

    #[test]
    fn test_save_failure_entry_keeps_the_attempt_payload() {
        let dir = TempDir::new().unwrap();
        let logger = ReviewLogger::new("session-2", dir.path()).unwrap();

        logger.log_save_failed(
            &SaveAttempt {
                query_id: "q7".to_string(),
                patch: QueryPatch {
                    sql_query: "SELECT 2".to_string(),
                    status: QueryStatus::Verified,
                },
            },
            "connection refused",
        );

        let entries = read_entries(&logger);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].component, "Persistence");
        assert_eq!(entries[0].event["type"], "SaveFailed");
        assert_eq!(entries[0].event["attempt"]["patch"]["status"], "VERIFIED");
        assert_eq!(entries[0].event["error"], "connection refused");
    }

    #[test]
    fn test_logger_appends_across_instances() {
        let dir = TempDir::new().unwrap();
        {
            let logger = ReviewLogger::new("session-3", dir.path()).unwrap();
            logger.log_run_completed("q1", true);
        }
        let logger = ReviewLogger::new("session-3", dir.path()).unwrap();
        logger.log_run_completed("q1", false);

        let entries = read_entries(&logger);
        assert_eq!(entries.len(), 2);
    }
}
