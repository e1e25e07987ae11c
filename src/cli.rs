//! Command-line argument parsing for sync_query.
//!
//! Uses clap with the built-in help flag disabled: `-h`/`--help` print the
//! one-line usage instead of clap's generated help.

use crate::output::OutputFormat;
use crate::query::QueryOptions;
use clap::Parser;
use std::path::PathBuf;

/// One-line usage message.
pub const USAGE: &str = "Usage: node sync_query.js QUERY";

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print usage and do nothing else.
    Usage,
    /// Run the given query text.
    Query(String),
}

/// Run a synchronous BigQuery query and print every row.
#[derive(Parser, Debug)]
#[command(name = "sync_query")]
#[command(about, long_about = None, disable_help_flag = true)]
pub struct Cli {
    /// Query text. Exactly one is required.
    ///
    /// Text starting with `-` (a leading SQL comment, say) is still query
    /// text unless it names one of the flags below. Flags go before the query.
    #[arg(value_name = "QUERY", allow_hyphen_values = true)]
    pub query: Vec<String>,

    /// Print usage
    #[arg(short = 'h', long = "help")]
    pub help: bool,

    /// Maximum rows per page
    #[arg(long, value_name = "N")]
    pub max_results: Option<u64>,

    /// Project to run the query in (overrides config and environment)
    #[arg(long, value_name = "PROJECT_ID")]
    pub project: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Answer queries with an in-memory echo service (no network)
    #[arg(long)]
    pub mock: bool,

    /// Output format
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Decides between printing usage and running a query.
    ///
    /// Anything other than exactly one positional argument prints usage.
    pub fn invocation(&self) -> Invocation {
        match self.query.as_slice() {
            [query] if !self.help => Invocation::Query(query.clone()),
            _ => Invocation::Usage,
        }
    }

    /// Query options set on the command line.
    pub fn query_options(&self) -> QueryOptions {
        let mut options = QueryOptions::new();
        if let Some(max_results) = self.max_results {
            options = options.with_max_results(max_results);
        }
        options
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }
}
