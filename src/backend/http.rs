use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ExecutionBackend, QueryStore};
use crate::config::ApiConfig;
use crate::record::{ExecutionOutcome, QueryPatch, QueryRecord, SavedFields};

/// HTTP client for the review API, covering both the execution and the
/// persistence collaborators.
pub struct HttpApi {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    sql_query: &'a str,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Decodes a JSON body; a non-2xx status is a transport failure
    /// carrying the status and the response body.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} request failed with {}: {}", what, status, body.trim());
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode {} response", what))
    }
}

#[async_trait]
impl ExecutionBackend for HttpApi {
    async fn execute(&self, query_id: &str, sql: &str) -> Result<ExecutionOutcome> {
        tracing::debug!(query_id, "executing candidate SQL");
        let response = self
            .with_auth(
                self.client
                    .post(self.url(&format!("/queries/{}/executions", query_id))),
            )
            .json(&ExecuteRequest { sql_query: sql })
            .send()
            .await
            .with_context(|| format!("Execution request for {} could not be sent", query_id))?;
        Self::read_json(response, "Execution").await
    }
}

#[async_trait]
impl QueryStore for HttpApi {
    async fn fetch(&self, query_id: &str) -> Result<QueryRecord> {
        tracing::debug!(query_id, "fetching query record");
        let response = self
            .with_auth(self.client.get(self.url(&format!("/queries/{}", query_id))))
            .send()
            .await
            .with_context(|| format!("Fetch request for {} could not be sent", query_id))?;
        Self::read_json(response, "Fetch").await
    }

    async fn save(&self, query_id: &str, patch: &QueryPatch) -> Result<SavedFields> {
        tracing::debug!(query_id, "saving reviewed query");
        let response = self
            .with_auth(
                self.client
                    .patch(self.url(&format!("/queries/{}", query_id))),
            )
            .json(patch)
            .send()
            .await
            .with_context(|| format!("Save request for {} could not be sent", query_id))?;
        Self::read_json(response, "Save").await
    }
}
