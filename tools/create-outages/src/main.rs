//! create-outages - submit a site's recent outages to the outage API
//!
//! Fetches every outage and the site's device inventory, keeps the outages
//! of the site's devices that began on or after `--date-after`, names them
//! by device and posts them to `/site-outages/{site-id}`.

use anyhow::Result;
use clap::Parser;
use common::LogConfig;
use dotenv::dotenv;
use errors::OutageError;
use outage_client::{ClientConfig, OutageClient};
use outage_model::Timestamp;
use outage_pipeline::{OutagePipeline, RunSummary};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

const SERVICE_NAME: &str = "create-outages";
const ENV_PREFIX: &str = "OUTAGE_";
const DEFAULT_SITE_ID: &str = "norwich-pear-tree";
const DEFAULT_DATE_AFTER: &str = "2022-01-01T00:00:00.000Z";

#[derive(Parser, Debug)]
#[command(name = "create-outages")]
#[command(about = "Create outages for a site from the outage API")]
#[command(version)]
struct Cli {
    /// API key sent in the x-api-key header
    #[arg(short = 'a', long, env = "OUTAGE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Site whose outages are created
    #[arg(short = 's', long, default_value = DEFAULT_SITE_ID)]
    site_id: String,

    /// Keep outages that begin at or after this ISO-8601 date
    #[arg(short = 'd', long, default_value = DEFAULT_DATE_AFTER, value_parser = parse_date_after)]
    date_after: Timestamp,

    /// Client configuration file (default: config/create-outages.yaml when present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write logs to stderr as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn parse_date_after(value: &str) -> Result<Timestamp, String> {
    Timestamp::parse(value).map_err(|e| match e {
        OutageError::InvalidInput(msg) => msg,
        other => other.to_string(),
    })
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let api_key = cli
        .api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            OutageError::invalid_input("API key must be provided with --api-key or OUTAGE_API_KEY")
        })?;

    let config: ClientConfig =
        common::load_config(SERVICE_NAME, ENV_PREFIX, cli.config.as_deref())?;
    debug!(?config, "Loaded client configuration");

    let client = OutageClient::new(&config, &api_key)?;
    let pipeline = OutagePipeline::new(client);

    let summary = pipeline.run(&cli.site_id, cli.date_after).await?;
    Ok(summary)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: cli.log_level.clone(),
        enable_json: cli.json_logs,
        ..Default::default()
    };
    if let Err(e) = common::init_logging(&log_config) {
        eprintln!("Warning: logging not initialised: {e}");
    }
    info!(site_id = %cli.site_id, date_after = %cli.date_after, "Starting create-outages");

    match run(cli).await {
        Ok(summary) => {
            info!(
                fetched = summary.fetched,
                devices = summary.devices,
                submitted = summary.submitted,
                "Run complete"
            );
            println!("Outages created successfully!");
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["create-outages", "-a", "key"]).unwrap();

        assert_eq!(cli.site_id, DEFAULT_SITE_ID);
        assert_eq!(cli.date_after.as_str(), DEFAULT_DATE_AFTER);
        assert_eq!(cli.log_level, "info");
        assert!(!cli.json_logs);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_explicit_arguments() {
        let cli = Cli::try_parse_from([
            "create-outages",
            "--api-key",
            "key",
            "-s",
            "kingfisher",
            "-d",
            "2022-06-01",
            "-c",
            "custom.toml",
        ])
        .unwrap();

        assert_eq!(cli.api_key.as_deref(), Some("key"));
        assert_eq!(cli.site_id, "kingfisher");
        assert_eq!(cli.date_after, Timestamp::parse("2022-06-01T00:00:00Z").unwrap());
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_date_after_accepts_minute_precision_and_padding() {
        let cli = Cli::try_parse_from(["create-outages", "-a", "key", "-d", "2022-01-01T00:00Z"]).unwrap();
        assert_eq!(cli.date_after, Timestamp::parse(DEFAULT_DATE_AFTER).unwrap());

        let cli = Cli::try_parse_from(["create-outages", "-a", "key", "-d", " 2022-01-01 "]).unwrap();
        assert_eq!(cli.date_after.to_string(), "2022-01-01");
    }

    #[test]
    fn test_invalid_date_is_rejected_while_parsing() {
        let err = Cli::try_parse_from(["create-outages", "-a", "key", "-d", "yesterday"]).unwrap_err();
        assert!(err
            .to_string()
            .contains("Date must be provided in ISO-8601 format"));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_request() {
        let cli = Cli {
            api_key: Some("   ".to_string()),
            site_id: DEFAULT_SITE_ID.to_string(),
            date_after: Timestamp::parse(DEFAULT_DATE_AFTER).unwrap(),
            config: None,
            log_level: "info".to_string(),
            json_logs: false,
        };

        let err = run(cli).await.unwrap_err();
        let err = err.downcast_ref::<OutageError>().unwrap();
        assert!(matches!(err, OutageError::InvalidInput(_)));
    }
}
