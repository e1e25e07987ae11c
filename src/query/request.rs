//! Query request construction.
//!
//! A [`QueryRequest`] is a string-keyed option map that always carries a
//! non-empty `query` entry. Options are passed through to the remote service
//! verbatim, so any `jobs.query` field the service understands can be set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{QueryError, Result};

/// Key holding the query text in a request.
pub const QUERY_KEY: &str = "query";

/// Caller-supplied options merged into a query request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryOptions(Map<String, Value>);

impl QueryOptions {
    /// Creates an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an arbitrary option.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Maximum rows returned per page.
    pub fn with_max_results(self, max_results: u64) -> Self {
        self.with("maxResults", max_results)
    }

    /// How long the service may wait for the job before returning an
    /// incomplete page.
    pub fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        self.with("timeoutMs", timeout_ms)
    }

    pub fn with_use_legacy_sql(self, legacy: bool) -> Self {
        self.with("useLegacySql", legacy)
    }

    pub fn with_use_query_cache(self, cache: bool) -> Self {
        self.with("useQueryCache", cache)
    }

    pub fn with_location(self, location: impl Into<String>) -> Self {
        self.with("location", location.into())
    }

    /// Merges another option set into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &QueryOptions) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Returns the option stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for QueryOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A validated query request, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryRequest {
    options: Map<String, Value>,
}

impl QueryRequest {
    /// Builds a request from query text and optional caller options.
    ///
    /// Fails with [`QueryError::InvalidArgument`] when the query is blank.
    /// The query text always replaces any `query` key present in `options`.
    pub fn new(query: &str, options: Option<QueryOptions>) -> Result<Self> {
        if query.trim().is_empty() {
            return Err(QueryError::invalid_argument("query cannot be empty"));
        }

        let mut options = options.map(|o| o.0).unwrap_or_default();
        options.insert(QUERY_KEY.to_string(), Value::String(query.to_string()));

        Ok(Self { options })
    }

    /// Returns the query text.
    pub fn query(&self) -> &str {
        self.options
            .get(QUERY_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Returns the full option map, including the query.
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    pub fn max_results(&self) -> Option<u64> {
        self.options.get("maxResults").and_then(value_as_u64)
    }

    pub fn timeout_ms(&self) -> Option<u64> {
        self.options.get("timeoutMs").and_then(value_as_u64)
    }

    pub fn location(&self) -> Option<&str> {
        self.options.get("location").and_then(Value::as_str)
    }
}

/// The REST API encodes int64 fields as strings, so accept both forms.
fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
