//! sync_query - run a synchronous BigQuery query and print every row.

use bq_sync_query::cli::{Cli, Invocation, USAGE};
use bq_sync_query::config::Config;
use bq_sync_query::error::Result;
use bq_sync_query::logging;
use bq_sync_query::output;
use bq_sync_query::query::QueryRunner;
use bq_sync_query::remote::{BigQueryClient, EchoQueryService, QueryService, Row};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Credentials may live in a local .env file
    let _ = dotenvy::dotenv();
    logging::init_stderr_logging();

    let cli = Cli::parse_args();

    let query = match cli.invocation() {
        Invocation::Usage => {
            println!("{USAGE}");
            return;
        }
        Invocation::Query(query) => query,
    };

    let outcome = run(&cli, &query).await;
    output::print_outcome(&outcome, cli.format);

    if let Err(e) = outcome {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, query: &str) -> Result<Vec<Row>> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    // Option precedence: config defaults < command-line flags < query text
    let mut options = config.query.to_options();
    options.merge(&cli.query_options());

    let service = build_service(cli, config)?;
    QueryRunner::new(service.as_ref()).run(query, Some(options)).await
}

fn build_service(cli: &Cli, config: Config) -> Result<Box<dyn QueryService>> {
    if cli.mock {
        info!("Using mock query service");
        return Ok(Box::new(EchoQueryService::new()));
    }

    let mut settings = config.bigquery;
    if let Some(project) = &cli.project {
        settings.project_id = Some(project.clone());
    }
    settings.apply_env_defaults();
    info!("BigQuery: {}", settings.display_string());

    let client = BigQueryClient::new(settings.client_config()?)?;
    Ok(Box::new(client))
}
