//! Query construction and paginated execution.

pub mod request;
pub mod runner;

pub use request::{QueryOptions, QueryRequest};
pub use runner::{sync_query, QueryRunner};
