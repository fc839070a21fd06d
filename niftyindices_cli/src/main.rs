mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use niftyindices_lib::niftyindices_api::parse_date;
use niftyindices_lib::{FetchConfig, RequestEnvelope, RunOutcome, RunSummary, Shutdown};

use crate::output::OutputFormat;

/// Exit status for problems found before any index is fetched.
const EXIT_SETUP_FAILURE: u8 = 2;

#[derive(Parser)]
#[command(name = "niftyindices")]
#[command(about = "Download total-return index history from niftyindices.com")]
struct Cli {
    /// Index list file ({"d": [{"indextype": ..}]})
    #[arg(long, global = true)]
    index_list: Option<PathBuf>,

    /// Trading-name mapping file ([{"Index_long_name": .., "Trading_Index_Name": ..}])
    #[arg(long, global = true)]
    mapping: Option<PathBuf>,

    /// Directory the per-index JSON files are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// First day requested (DD-Mon-YYYY or YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date_arg)]
    start_date: Option<NaiveDate>,

    /// Last day requested, defaults to today (DD-Mon-YYYY or YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date_arg)]
    end_date: Option<NaiveDate>,

    /// Attempts per index, including the first
    #[arg(long, global = true)]
    max_attempts: Option<u32>,

    /// Character replacing '/' in index names when naming files
    #[arg(long, global = true)]
    separator: Option<char>,

    /// POST body shape: plain or cinfo
    #[arg(long, global = true)]
    envelope: Option<RequestEnvelope>,

    /// Summary format: text or json
    #[arg(long, value_enum, default_value = "text", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every index in the index list
    All,
    /// Fetch a single index by its internal name
    Index(commands::fetch_index::IndexArgs),
}

fn parse_date_arg(input: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(input).ok_or_else(|| {
        format!(
            "invalid date '{}' (expected DD-Mon-YYYY or YYYY-MM-DD)",
            input
        )
    })
}

impl Cli {
    /// Environment-derived settings with any command-line overrides applied.
    fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig::from_env();
        if let Some(path) = &self.index_list {
            config.index_list_path = path.clone();
        }
        if let Some(path) = &self.mapping {
            config.mapping_path = path.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(date) = self.start_date {
            config.start_date = date;
        }
        if self.end_date.is_some() {
            config.end_date = self.end_date;
        }
        if let Some(attempts) = self.max_attempts {
            config.max_attempts = attempts;
        }
        if let Some(separator) = self.separator {
            config.separator = separator;
        }
        if let Some(envelope) = self.envelope {
            config.envelope = envelope;
        }
        config
    }
}

async fn run(cli: &Cli, shutdown: &Shutdown) -> Result<RunSummary> {
    let config = cli.fetch_config();
    match &cli.command {
        Commands::All => commands::fetch_all::run(&config, shutdown).await,
        Commands::Index(args) => commands::fetch_index::run(args, &config, shutdown).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("niftyindices=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let shutdown = Shutdown::new();
    shutdown.cancel_on_ctrl_c();

    let summary = match run(&cli, &shutdown).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::from(EXIT_SETUP_FAILURE);
        }
    };

    match cli.output {
        OutputFormat::Text => output::print_summary(&summary),
        OutputFormat::Json => output::print_json(&summary.report()),
    }

    match summary.outcome() {
        RunOutcome::Complete => ExitCode::SUCCESS,
        RunOutcome::Partial => ExitCode::FAILURE,
    }
}
