//! Live BigQuery tests.
//!
//! Skipped unless GCLOUD_PROJECT and BIGQUERY_ACCESS_TOKEN are set.

use bq_sync_query::config::BigQuerySettings;
use bq_sync_query::query::{sync_query, QueryOptions};
use bq_sync_query::remote::BigQueryClient;

/// Helper to create a client from the environment.
fn get_live_client() -> Option<BigQueryClient> {
    let mut settings = BigQuerySettings::default();
    settings.apply_env_defaults();
    let config = settings.client_config().ok()?;
    BigQueryClient::new(config).ok()
}

fn natality(limit: usize) -> String {
    format!("SELECT * FROM publicdata:samples.natality LIMIT {limit};")
}

fn legacy_paged() -> QueryOptions {
    QueryOptions::new()
        .with_use_legacy_sql(true)
        .with_max_results(10)
}

#[tokio::test]
async fn test_fetch_single_page() {
    let Some(client) = get_live_client() else {
        eprintln!("Skipping test: BigQuery credentials not set");
        return;
    };

    let rows = sync_query(&client, &natality(5), Some(legacy_paged()))
        .await
        .unwrap();

    assert_eq!(rows.len(), 5);
}

#[tokio::test]
async fn test_paginate() {
    let Some(client) = get_live_client() else {
        eprintln!("Skipping test: BigQuery credentials not set");
        return;
    };

    let rows = sync_query(&client, &natality(50), Some(legacy_paged()))
        .await
        .unwrap();

    assert_eq!(rows.len(), 50);
}

#[tokio::test]
async fn test_override_query_in_options() {
    let Some(client) = get_live_client() else {
        eprintln!("Skipping test: BigQuery credentials not set");
        return;
    };

    let options = legacy_paged().with("query", natality(5));
    let rows = sync_query(&client, &natality(10), Some(options))
        .await
        .unwrap();

    assert_eq!(rows.len(), 10);
}
