//! Remote query service boundary.
//!
//! The pagination loop only talks to a [`QueryService`]: submit a request or a
//! continuation, get back one page of rows and maybe another continuation.
//! BigQuery is the production implementation; the mocks drive tests.

pub mod bigquery;
mod mock;
pub mod wire;

pub use bigquery::{BigQueryClient, BigQueryConfig};
pub use mock::{EchoQueryService, FailingQueryService, ScriptedQueryService};
pub use wire::JobReference;

use async_trait::async_trait;

use crate::error::Result;
use crate::query::QueryRequest;

/// An opaque record returned by the remote service.
pub type Row = serde_json::Value;

/// What to send to the service next.
#[derive(Debug, Clone, PartialEq)]
pub enum PageRequest {
    /// The initial query submission.
    Query(QueryRequest),
    /// A follow-up fetch for a job that has more rows pending.
    Continue(Continuation),
}

/// Reference to the remaining rows of a query job.
///
/// Produced by the service and handed straight back to it; callers never
/// need to look inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub job: JobReference,
    /// `None` while the job is still running and no page has been produced.
    pub page_token: Option<String>,
    pub max_results: Option<u64>,
    pub timeout_ms: Option<u64>,
}

impl Continuation {
    /// Creates a continuation that polls the given job from the start.
    pub fn new(job: JobReference) -> Self {
        Self {
            job,
            page_token: None,
            max_results: None,
            timeout_ms: None,
        }
    }

    pub fn with_page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }
}

/// One response from the remote service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub rows: Vec<Row>,
    /// Present when more rows are pending. Absence ends pagination.
    pub next: Option<Continuation>,
}

impl Page {
    /// A final page with no continuation.
    pub fn last(rows: Vec<Row>) -> Self {
        Self { rows, next: None }
    }

    /// A page followed by more rows.
    pub fn more(rows: Vec<Row>, next: Continuation) -> Self {
        Self {
            rows,
            next: Some(next),
        }
    }

    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

/// Interface to a remote query endpoint.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Executes a query or fetches the page behind a continuation.
    async fn execute(&self, request: PageRequest) -> Result<Page>;
}
