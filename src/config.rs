//! Configuration management for bq-sync-query.
//!
//! Handles loading configuration from TOML files and environment variables:
//! BigQuery project and credentials, plus default query options.

use crate::error::{QueryError, Result};
use crate::query::QueryOptions;
use crate::remote::bigquery::{BigQueryConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variables checked for the project id, in order.
pub const PROJECT_ENV_VARS: [&str; 2] = ["GCLOUD_PROJECT", "GOOGLE_CLOUD_PROJECT"];

/// Environment variables checked for the access token, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["BIGQUERY_ACCESS_TOKEN", "GOOGLE_OAUTH_ACCESS_TOKEN"];

/// Environment variable overriding the API root.
pub const API_URL_ENV_VAR: &str = "BIGQUERY_API_URL";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// BigQuery connection settings.
    #[serde(default)]
    pub bigquery: BigQuerySettings,

    /// Options applied to every query unless overridden.
    #[serde(default)]
    pub query: QueryDefaults,
}

/// BigQuery connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BigQuerySettings {
    pub project_id: Option<String>,

    /// OAuth2 access token (prefer the environment over storing it here).
    pub access_token: Option<String>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for BigQuerySettings {
    fn default() -> Self {
        Self {
            project_id: None,
            access_token: None,
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BigQuerySettings {
    /// Applies environment variables as defaults for unset fields.
    pub fn apply_env_defaults(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Same as [`Self::apply_env_defaults`] with an explicit variable lookup.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let first_set = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .find(|value| !value.is_empty())
        };

        if self.project_id.is_none() {
            self.project_id = first_set(&PROJECT_ENV_VARS);
        }
        if self.access_token.is_none() {
            self.access_token = first_set(&TOKEN_ENV_VARS);
        }
        if self.api_base_url == DEFAULT_API_URL {
            if let Some(url) = first_set(&[API_URL_ENV_VAR]) {
                self.api_base_url = url;
            }
        }
    }

    /// Builds the client configuration, failing if project or token is missing.
    pub fn client_config(&self) -> Result<BigQueryConfig> {
        let project_id = self.project_id.clone().ok_or_else(|| {
            QueryError::config(format!(
                "No project id configured. Set {} or bigquery.project_id",
                PROJECT_ENV_VARS.join(" / ")
            ))
        })?;
        let access_token = self.access_token.clone().ok_or_else(|| {
            QueryError::config(format!(
                "No access token configured. Set {} or bigquery.access_token",
                TOKEN_ENV_VARS.join(" / ")
            ))
        })?;

        Ok(BigQueryConfig::new(project_id, access_token)
            .with_api_base_url(self.api_base_url.clone())
            .with_timeout(self.timeout_secs))
    }

    /// Returns a display-safe string (no token) for logging.
    pub fn display_string(&self) -> String {
        let project = self.project_id.as_deref().unwrap_or("unknown");
        format!("{project} @ {}", self.api_base_url)
    }
}

/// Default options for every query.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct QueryDefaults {
    /// Rows per page.
    pub max_results: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub use_legacy_sql: Option<bool>,
    pub use_query_cache: Option<bool>,
    pub location: Option<String>,
}

impl QueryDefaults {
    /// Converts the configured defaults into request options.
    pub fn to_options(&self) -> QueryOptions {
        let mut options = QueryOptions::new();
        if let Some(max_results) = self.max_results {
            options = options.with_max_results(max_results);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            options = options.with_timeout_ms(timeout_ms);
        }
        if let Some(legacy) = self.use_legacy_sql {
            options = options.with_use_legacy_sql(legacy);
        }
        if let Some(cache) = self.use_query_cache {
            options = options.with_use_query_cache(cache);
        }
        if let Some(location) = &self.location {
            options = options.with_location(location.clone());
        }
        options
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bq-sync-query")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| QueryError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            QueryError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
