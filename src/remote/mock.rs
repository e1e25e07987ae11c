//! Stub query services for testing.
//!
//! Provides scripted and failing implementations so the pagination loop can
//! run without a live BigQuery project.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use super::{Page, PageRequest, QueryService};
use crate::error::{QueryError, Result};

/// Replays a fixed sequence of responses and records every request.
#[derive(Debug, Default)]
pub struct ScriptedQueryService {
    responses: Mutex<VecDeque<Result<Page>>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl ScriptedQueryService {
    /// Creates a service that answers calls with `responses`, in order.
    pub fn new(responses: impl IntoIterator<Item = Result<Page>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns a copy of every request received so far.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of calls made against this service.
    pub fn call_count(&self) -> usize {
        self.requests().len()
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .map(|responses| responses.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QueryService for ScriptedQueryService {
    async fn execute(&self, request: PageRequest) -> Result<Page> {
        self.requests
            .lock()
            .map_err(|_| QueryError::internal("request log poisoned"))?
            .push(request);

        self.responses
            .lock()
            .map_err(|_| QueryError::internal("response script poisoned"))?
            .pop_front()
            .unwrap_or_else(|| Err(QueryError::internal("no scripted response left")))
    }
}

/// A query service that always fails with the given message.
#[derive(Debug, Clone)]
pub struct FailingQueryService {
    message: String,
}

impl FailingQueryService {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl QueryService for FailingQueryService {
    async fn execute(&self, _request: PageRequest) -> Result<Page> {
        Err(QueryError::remote(self.message.clone()))
    }
}

/// Answers every query with a single row echoing the query text.
///
/// Backs the `--mock` command-line flag.
#[derive(Debug, Clone, Default)]
pub struct EchoQueryService;

impl EchoQueryService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QueryService for EchoQueryService {
    async fn execute(&self, request: PageRequest) -> Result<Page> {
        match request {
            PageRequest::Query(query) => Ok(Page::last(vec![json!({ "query": query.query() })])),
            PageRequest::Continue(_) => Ok(Page::default()),
        }
    }
}
