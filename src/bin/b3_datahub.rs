use b3_datahub::config::{self, Config};
use b3_datahub::data_provider::PartitionProvider;
use b3_datahub::errors::DataHubError;
use b3_datahub::models::partition::Partition;
use b3_datahub::scrapers::b3::B3Scraper;
use b3_datahub::services::pipeline_service::PipelineService;
use b3_datahub::storage;
use b3_datahub::trigger::{HttpFunctionInvoker, HttpJobRunner, JobRequestHandler, Trigger};
use b3_datahub::util;

use clap::{App, Arg, ArgMatches, SubCommand};
use log::info;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

fn build_app() -> App<'static> {
    App::new("B3 DataHub")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Daily IBOV index ingestion: scrape, store as parquet, trigger downstream")
        .arg(
            Arg::with_name("bucket")
                .long("bucket")
                .env("B3_STORAGE_BUCKET")
                .help("Object store bucket")
                .takes_value(true)
                .default_value(config::DEFAULT_STORAGE_BUCKET),
        )
        .arg(
            Arg::with_name("source-url")
                .long("source-url")
                .env("B3_SOURCE_URL")
                .help("Index page to scrape")
                .takes_value(true)
                .default_value(config::DEFAULT_SOURCE_URL),
        )
        .arg(
            Arg::with_name("downstream-function")
                .long("downstream-function")
                .env("B3_DOWNSTREAM_FUNCTION")
                .help("Function notified after each stored partition")
                .takes_value(true)
                .default_value(config::DEFAULT_DOWNSTREAM_FUNCTION),
        )
        .arg(
            Arg::with_name("bulk-job")
                .long("bulk-job")
                .env("B3_BULK_JOB")
                .help("Bulk-transform job started by start-job")
                .takes_value(true)
                .default_value(config::DEFAULT_BULK_JOB),
        )
        .arg(
            Arg::with_name("data-dir")
                .long("data-dir")
                .env("B3_DATA_DIR")
                .help("Root directory of the local object store")
                .takes_value(true)
                .default_value("data"),
        )
        .arg(
            Arg::with_name("storage-endpoint")
                .long("storage-endpoint")
                .env("B3_STORAGE_ENDPOINT")
                .help("HTTP object store endpoint; local directory store when absent")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("invoke-endpoint")
                .long("invoke-endpoint")
                .env("B3_INVOKE_ENDPOINT")
                .help("Function invocation service endpoint")
                .takes_value(true)
                .default_value("http://localhost:9001"),
        )
        .arg(
            Arg::with_name("job-endpoint")
                .long("job-endpoint")
                .env("B3_JOB_ENDPOINT")
                .help("Job-control service endpoint")
                .takes_value(true)
                .default_value("http://localhost:9002"),
        )
        .arg(
            Arg::with_name("timeout")
                .long("timeout")
                .env("B3_TIMEOUT_SECS")
                .help("Timeout in seconds for every outbound request")
                .takes_value(true)
                .default_value("30"),
        )
        .arg(
            Arg::with_name("timezone")
                .long("timezone")
                .env("B3_TIMEZONE")
                .help("Exchange timezone deciding today's partition")
                .takes_value(true)
                .default_value("America/Sao_Paulo"),
        )
        .arg(
            Arg::with_name("fail-on-empty")
                .long("fail-on-empty")
                .env("B3_FAIL_ON_EMPTY")
                .help("Fail the run instead of storing an empty table")
                .takes_value(false),
        )
        .subcommand(SubCommand::with_name("run").about("Run the pipeline for today's partition"))
        .subcommand(
            SubCommand::with_name("start-job")
                .about("Job-control entry point: start the bulk-transform job")
                .arg(
                    Arg::with_name("event")
                        .long("event")
                        .value_name("JSON")
                        .help("Event passed by the job-control service")
                        .takes_value(true)
                        .default_value("{}"),
                ),
        )
        .subcommand(
            SubCommand::with_name("inspect")
                .about("Show a stored raw partition")
                .arg(
                    Arg::with_name("date")
                        .short('d')
                        .long("date")
                        .value_name("DATE")
                        .help("Partition date (YYYY-MM-DD), defaults to today")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("symbol")
                        .short('s')
                        .long("symbol")
                        .value_name("SYMBOL")
                        .help("Only show symbols containing this text")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("limit")
                        .short('l')
                        .long("limit")
                        .value_name("LIMIT")
                        .help("Limit the number of records to display")
                        .takes_value(true)
                        .default_value("10"),
                ),
        )
}

fn value<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches.value_of(name).unwrap_or_default()
}

fn config_from_matches(matches: &ArgMatches) -> Result<Config, DataHubError> {
    let timeout_secs = value(matches, "timeout")
        .parse::<u64>()
        .map_err(|e| DataHubError::ConfigError(format!("Invalid timeout {:?}: {}", value(matches, "timeout"), e)))?;

    Config::new()
        .with_storage_bucket(value(matches, "bucket"))
        .with_source_url(value(matches, "source-url"))
        .with_downstream_function_name(value(matches, "downstream-function"))
        .with_bulk_job_name(value(matches, "bulk-job"))
        .with_data_dir(value(matches, "data-dir"))
        .with_storage_endpoint(matches.value_of("storage-endpoint"))
        .with_invoke_endpoint(value(matches, "invoke-endpoint"))
        .with_job_endpoint(value(matches, "job-endpoint"))
        .with_request_timeout(Duration::from_secs(timeout_secs))
        .with_fail_on_empty(matches.is_present("fail-on-empty"))
        .with_timezone(value(matches, "timezone"))
}

async fn run_pipeline(config: Config) -> Result<(), DataHubError> {
    let scraper = Arc::new(B3Scraper::new(&config)?);
    let store = storage::blob_store_from_config(&config)?;
    let invoker = Arc::new(HttpFunctionInvoker::new(&config.invoke_endpoint, config.request_timeout)?);
    let trigger = Trigger::new(config.trigger_config(), invoker);

    let service = PipelineService::new(config, scraper, store, trigger);
    let report = service.run().await?;

    info!(
        "Partition {}: {} records, {} bytes -> {}",
        report.partition, report.rows, report.bytes, report.location
    );
    Ok(())
}

async fn start_job(config: Config, event: &str) -> Result<(), DataHubError> {
    let event: Value = serde_json::from_str(event)?;
    let runner = Arc::new(HttpJobRunner::new(&config.job_endpoint, config.request_timeout)?);
    let handler = JobRequestHandler::new(config.trigger_config(), runner);

    let response = handler.handle_job_request(&event, &Value::Null).await?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

async fn inspect(config: Config, matches: &ArgMatches) -> Result<(), DataHubError> {
    let date = match matches.value_of("date") {
        Some(date_str) => util::parse_partition_date(date_str)?,
        None => Partition::today(config.timezone).date,
    };
    let limit = matches.value_of("limit")
        .unwrap_or("10")
        .parse::<usize>()
        .unwrap_or(10);

    let store = storage::blob_store_from_config(&config)?;
    let provider = PartitionProvider::load(store.as_ref(), date).await?;

    let records = match matches.value_of("symbol") {
        Some(symbol) => provider.filter_by_symbol(symbol),
        None => provider.records().iter().collect(),
    };
    info!("Partition {}: showing {} of {} records", provider.partition(), records.len().min(limit), provider.len());

    info!("{:-<48}", "");
    info!("{:<12} {:>12} {:>10} {:<12}", "Symbol", "Price", "Change %", "Date");
    info!("{:-<48}", "");
    for record in records.iter().take(limit) {
        info!(
            "{:<12} {:>12.2} {:>10.2} {:<12}",
            record.symbol, record.price, record.change_pct, record.trade_date
        );
    }
    if records.len() > limit {
        info!("... and {} more records", records.len() - limit);
    } else if records.is_empty() {
        info!("No records in this partition");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let matches = build_app().get_matches();
    let config = config_from_matches(&matches)?;

    let result = match matches.subcommand() {
        Some(("run", _)) => run_pipeline(config).await,
        Some(("start-job", sub)) => start_job(config, sub.value_of("event").unwrap_or("{}")).await,
        Some(("inspect", sub)) => inspect(config, sub).await,
        _ => {
            info!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    result.map_err(|e| anyhow::anyhow!("{}: {}", e.kind(), e))
}
