//! BigQuery REST client.
//!
//! Implements the QueryService trait over the BigQuery v2 API: `jobs.query`
//! submits the first page and `jobs.getQueryResults` fetches every later one.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::wire::{ApiErrorResponse, QueryResponse};
use super::{Continuation, Page, PageRequest, QueryService};
use crate::error::{QueryError, Result};
use crate::query::QueryRequest;

/// Default BigQuery API root.
pub const DEFAULT_API_URL: &str = "https://bigquery.googleapis.com/bigquery/v2/";

/// Default timeout for a single HTTP request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// BigQuery client configuration.
#[derive(Debug, Clone)]
pub struct BigQueryConfig {
    /// Project that runs (and is billed for) the query.
    pub project_id: String,
    /// OAuth2 bearer token.
    pub access_token: String,
    pub api_base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl BigQueryConfig {
    /// Creates a new config with the given project and access token.
    pub fn new(project_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            access_token: access_token.into(),
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Points the client at a different API root (emulators, test servers).
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Paging parameters carried from the original request to every follow-up.
#[derive(Debug, Clone, Default)]
struct Carry {
    max_results: Option<u64>,
    timeout_ms: Option<u64>,
    location: Option<String>,
}

impl Carry {
    fn from_request(request: &QueryRequest) -> Self {
        Self {
            max_results: request.max_results(),
            timeout_ms: request.timeout_ms(),
            location: request.location().map(String::from),
        }
    }

    fn from_continuation(continuation: &Continuation) -> Self {
        Self {
            max_results: continuation.max_results,
            timeout_ms: continuation.timeout_ms,
            location: continuation.job.location.clone(),
        }
    }
}

/// BigQuery query client.
#[derive(Debug, Clone)]
pub struct BigQueryClient {
    config: BigQueryConfig,
    base_url: Url,
    client: Client,
}

impl BigQueryClient {
    /// Creates a new BigQuery client with the given configuration.
    pub fn new(config: BigQueryConfig) -> Result<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            QueryError::config(format!("Invalid API URL '{}': {e}", config.api_base_url))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(QueryError::config(format!(
                "Invalid API URL '{}': cannot be used as a base",
                config.api_base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QueryError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Builds `{base}/projects/{project}/queries[/{job}]`.
    fn queries_url(&self, project_id: &str, job_id: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| QueryError::config("API URL cannot be used as a base"))?;
            segments
                .pop_if_empty()
                .extend(["projects", project_id, "queries"]);
            if let Some(job_id) = job_id {
                segments.push(job_id);
            }
        }
        Ok(url)
    }

    /// Builds the `getQueryResults` URL for a continuation.
    fn results_url(&self, continuation: &Continuation) -> Result<Url> {
        let job = &continuation.job;
        let mut url = self.queries_url(&job.project_id, Some(&job.job_id))?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(token) = &continuation.page_token {
                query.append_pair("pageToken", token);
            }
            if let Some(max_results) = continuation.max_results {
                query.append_pair("maxResults", &max_results.to_string());
            }
            if let Some(timeout_ms) = continuation.timeout_ms {
                query.append_pair("timeoutMs", &timeout_ms.to_string());
            }
            if let Some(location) = &job.location {
                query.append_pair("location", location);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<QueryResponse> {
        let response = builder
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QueryError::remote("Request timed out")
                } else if e.is_connect() {
                    QueryError::remote("Failed to connect to the BigQuery API. Check your network.")
                } else {
                    QueryError::remote(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::remote(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| QueryError::internal(format!("Failed to parse response: {e}")))
    }

    /// Parses an API error response.
    fn parse_error(status: StatusCode, body: &str) -> QueryError {
        let detail = serde_json::from_str::<ApiErrorResponse>(body)
            .map(|r| r.error.message)
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => QueryError::remote(format!(
                "Authentication failed ({status}): {detail}. Check your access token and project."
            )),
            _ => QueryError::remote(format!("BigQuery API error ({status}): {detail}")),
        }
    }

    /// Converts a response into a page, deriving the continuation.
    fn into_page(response: QueryResponse, carry: Carry) -> Result<Page> {
        let complete = response.is_complete();

        if complete && response.rows.is_empty() && response.page_token.is_none() {
            if let Some(summary) = response.error_summary() {
                return Err(QueryError::remote(summary));
            }
        }

        if let Some(summary) = response.error_summary() {
            warn!(errors = %summary, "BigQuery reported errors alongside results");
        }
        if let Some(total_rows) = &response.total_rows {
            debug!(%total_rows, complete, "Query response");
        }

        let rows = response.decode_rows();

        if complete && response.page_token.is_none() {
            return Ok(Page::last(rows));
        }

        let mut job = response.job_reference.ok_or_else(|| {
            QueryError::internal("Response has more results but no job reference")
        })?;
        if job.location.is_none() {
            job.location = carry.location;
        }

        Ok(Page::more(
            rows,
            Continuation {
                job,
                page_token: response.page_token,
                max_results: carry.max_results,
                timeout_ms: carry.timeout_ms,
            },
        ))
    }
}

#[async_trait]
impl QueryService for BigQueryClient {
    async fn execute(&self, request: PageRequest) -> Result<Page> {
        match request {
            PageRequest::Query(query) => {
                let url = self.queries_url(&self.config.project_id, None)?;
                debug!(%url, "Submitting query");
                let response = self.send(self.client.post(url).json(&query)).await?;
                Self::into_page(response, Carry::from_request(&query))
            }
            PageRequest::Continue(continuation) => {
                let url = self.results_url(&continuation)?;
                debug!(%url, "Fetching next page");
                let response = self.send(self.client.get(url)).await?;
                Self::into_page(response, Carry::from_continuation(&continuation))
            }
        }
    }
}
