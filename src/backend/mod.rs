//! Collaborator seams for the review workflow.
//!
//! The execution and persistence collaborators live behind async traits so
//! the controllers can be exercised against recording stubs; the real
//! implementation is the HTTP client in [`http`].

pub mod http;

pub use http::HttpApi;

use anyhow::Result;
use async_trait::async_trait;

use crate::record::{ExecutionOutcome, QueryPatch, QueryRecord, SavedFields};

/// Executes candidate SQL for a query against the target database.
///
/// A domain-level SQL failure comes back inside the outcome; `Err` means
/// the collaborator itself was unreachable or rejected the request.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn execute(&self, query_id: &str, sql: &str) -> Result<ExecutionOutcome>;
}

/// Stores query records and reviewer edits.
#[async_trait]
pub trait QueryStore: Send + Sync {
    async fn fetch(&self, query_id: &str) -> Result<QueryRecord>;

    /// Persists the patch; the returned fields are authoritative for the
    /// record, including the fresh `last_updated` timestamp.
    async fn save(&self, query_id: &str, patch: &QueryPatch) -> Result<SavedFields>;
}
