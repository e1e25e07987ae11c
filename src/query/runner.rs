//! Paginated query execution.
//!
//! Submits a query, follows continuations until the service stops returning
//! them, and hands back every row in page order. The first remote error ends
//! the run and discards whatever was accumulated.

use tracing::{debug, info, warn};

use super::request::{QueryOptions, QueryRequest};
use crate::error::Result;
use crate::remote::{PageRequest, QueryService, Row};

/// Runs queries to completion against a [`QueryService`].
pub struct QueryRunner<'a, S: QueryService + ?Sized> {
    service: &'a S,
}

impl<'a, S: QueryService + ?Sized> QueryRunner<'a, S> {
    /// Creates a new runner over the given service.
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// Validates `query`, merges it with `options` and fetches every page.
    ///
    /// Validation happens before any remote call.
    pub async fn run(&self, query: &str, options: Option<QueryOptions>) -> Result<Vec<Row>> {
        let request = QueryRequest::new(query, options)?;
        self.run_request(request).await
    }

    /// Fetches every page for an already validated request.
    pub async fn run_request(&self, request: QueryRequest) -> Result<Vec<Row>> {
        let mut rows: Vec<Row> = Vec::new();
        let mut next = PageRequest::Query(request);
        let mut pages = 0usize;

        loop {
            let page = self.service.execute(next).await.inspect_err(|e| {
                warn!(page = pages, error = %e, "Query failed; discarding partial results");
            })?;
            pages += 1;

            debug!(
                page = pages,
                rows = page.rows.len(),
                more = page.next.is_some(),
                "Received page"
            );
            rows.extend(page.rows);

            match page.next {
                Some(continuation) => next = PageRequest::Continue(continuation),
                None => break,
            }
        }

        info!(rows = rows.len(), pages, "Query complete");
        Ok(rows)
    }
}

/// Runs `query` against `service` and returns the full result set.
pub async fn sync_query<S: QueryService + ?Sized>(
    service: &S,
    query: &str,
    options: Option<QueryOptions>,
) -> Result<Vec<Row>> {
    QueryRunner::new(service).run(query, options).await
}
