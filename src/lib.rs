//! bq-sync-query - run a synchronous BigQuery query and collect every page.
//!
//! This library exposes the core modules for the binary and integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod query;
pub mod remote;

pub use error::{QueryError, Result};
pub use query::{sync_query, QueryOptions, QueryRequest, QueryRunner};
pub use remote::{Continuation, Page, PageRequest, QueryService, Row};
