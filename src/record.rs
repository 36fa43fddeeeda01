use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Verification state of a reviewed query.
///
/// The set of states is defined by the backing API; the console reads,
/// selects, and passes values through without interpreting individual
/// variants beyond equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStatus {
    NotVerified,
    Verified,
    Rejected,
}

impl QueryStatus {
    /// Human-readable label for the status selector and headless output.
    pub fn label(&self) -> &'static str {
        match self {
            QueryStatus::NotVerified => "Not verified",
            QueryStatus::Verified => "Verified",
            QueryStatus::Rejected => "Rejected",
        }
    }

    /// Next status in selector order, wrapping at the end.
    pub fn cycled(&self) -> QueryStatus {
        match self {
            QueryStatus::NotVerified => QueryStatus::Verified,
            QueryStatus::Verified => QueryStatus::Rejected,
            QueryStatus::Rejected => QueryStatus::NotVerified,
        }
    }
}

/// Tabular result of the most recent successful execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlQueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Server-authoritative snapshot of a reviewed query and its AI-derived
/// artifacts.
///
/// Read-only to the review workflow except for the two merge points:
/// [`QueryRecord::apply_execution`] after a completed run and
/// [`QueryRecord::apply_saved`] after a successful save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Identifier used in collaborator URLs.
    pub id: String,
    /// Human-facing identifier, e.g. `QR-00042`.
    pub display_id: String,
    pub question: String,
    pub question_date: DateTime<Utc>,
    pub username: String,
    /// Natural-language answer, present only once a result exists.
    #[serde(default)]
    pub nl_response: Option<String>,
    pub sql_query: String,
    #[serde(default)]
    pub sql_query_result: Option<SqlQueryResult>,
    /// Domain-level SQL execution error, mutually exclusive with a
    /// populated `sql_query_result`.
    #[serde(default)]
    pub sql_error_message: Option<String>,
    pub status: QueryStatus,
    /// Ordered trace of the generation engine's steps. Read-only here.
    #[serde(default)]
    pub ai_process: Vec<String>,
    /// Evaluator confidence for the generated SQL, display-only.
    #[serde(default)]
    pub confidence_score: Option<f64>,
    /// Set by the persistence collaborator on each successful save.
    pub last_updated: DateTime<Utc>,
}

/// Fragment returned by the execution collaborator.
///
/// Exactly one of `sql_query_result` / `sql_error_message` is expected to
/// be populated; a populated error means the SQL itself failed when run,
/// which is a completed execution, not a transport failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    #[serde(default)]
    pub nl_response: Option<String>,
    #[serde(default)]
    pub sql_query_result: Option<SqlQueryResult>,
    #[serde(default)]
    pub sql_error_message: Option<String>,
}

/// Fields sent to the persistence collaborator on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPatch {
    pub sql_query: String,
    pub status: QueryStatus,
}

/// Persisted fields echoed back by a successful save. Authoritative for
/// the record; the draft is deliberately left untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedFields {
    pub sql_query: String,
    pub status: QueryStatus,
    pub last_updated: DateTime<Utc>,
}

impl SqlQueryResult {
    /// Plain-text rendering of one result cell.
    pub fn cell_text(value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl QueryRecord {
    /// Merges a completed execution into the record.
    ///
    /// Keeps the result/error fields mutually exclusive: an error clears
    /// any stale result, a result clears any stale error. If a misbehaving
    /// collaborator populates both, the error wins.
    pub fn apply_execution(&mut self, outcome: ExecutionOutcome) {
        self.nl_response = outcome.nl_response;
        if outcome.sql_error_message.is_some() {
            self.sql_error_message = outcome.sql_error_message;
            self.sql_query_result = None;
        } else {
            self.sql_query_result = outcome.sql_query_result;
            self.sql_error_message = None;
        }
    }

    /// Merges the persisted fields from a successful save.
    pub fn apply_saved(&mut self, saved: SavedFields) {
        self.sql_query = saved.sql_query;
        self.status = saved.status;
        self.last_updated = saved.last_updated;
    }
}

/// Representative record for tests across the crate.
#[cfg(test)]
pub(crate) fn sample_record() -> QueryRecord {
    QueryRecord {
        id: "65b2e1f4a9c3d200".to_string(),
        display_id: "QR-00042".to_string(),
        question: "How many orders shipped last month?".to_string(),
        question_date: Utc::now(),
        username: "reviewer@example.com".to_string(),
        nl_response: None,
        sql_query: "SELECT 1".to_string(),
        sql_query_result: None,
        sql_error_message: None,
        status: QueryStatus::NotVerified,
        ai_process: vec![
            "Inspected schema for relevant tables".to_string(),
            "Drafted aggregate over orders".to_string(),
        ],
        confidence_score: Some(0.87),
        last_updated: Utc::now(),
    }
}
