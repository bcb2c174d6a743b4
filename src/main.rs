use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use cloudsweep::config::{init_config, SweepConfig};
use cloudsweep::pricing::{CostModel, PriceTable};
use cloudsweep::providers::{AwsProvider, FixtureProvider};
use cloudsweep::report::ScanReport;
use cloudsweep::scan::run_scan;

#[derive(Parser)]
#[command(name = "cloudsweep")]
#[command(
    about = "AWS cost-hygiene scanner",
    long_about = "cloudsweep inventories an AWS account, flags likely-unused resources\n(unattached volumes, idle databases, orphaned snapshots, ...) and estimates\nthe monthly cost of each finding.\n\nThe scan is read-only: nothing is ever modified or deleted."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the account and write a savings report
    Scan {
        /// AWS profile to use
        #[arg(short, long)]
        profile: Option<String>,
        /// AWS region to scan
        #[arg(short, long)]
        region: Option<String>,
        /// Report output path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Scan offline against a JSON fixture instead of AWS
        #[arg(long)]
        fixture: Option<PathBuf>,
        /// TOML price table replacing the built-in one
        #[arg(long)]
        price_table: Option<PathBuf>,
    },
    /// Create a default config file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".cloudsweep.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Suppress INFO by default, only show warnings and errors
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = SweepConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan {
            profile,
            region,
            output,
            fixture,
            price_table,
        } => {
            scan_command(&config, profile, region, output, fixture, price_table).await?;
        }
        Commands::Init { output } => {
            init_config(&output)?;
        }
    }

    Ok(())
}

async fn scan_command(
    config: &SweepConfig,
    profile: Option<String>,
    region: Option<String>,
    output: Option<PathBuf>,
    fixture: Option<PathBuf>,
    price_table: Option<PathBuf>,
) -> Result<()> {
    // price table problems are fatal before any provider call
    let table = match price_table.or_else(|| config.scan.price_table.clone()) {
        Some(path) => PriceTable::load(&path)
            .with_context(|| format!("Failed to load price table: {}", path.display()))?,
        None => PriceTable::builtin(),
    };
    let model = CostModel::new(table).context("Price table is incomplete")?;

    let region = region.unwrap_or_else(|| config.aws.region.clone());
    let profile = profile.or_else(|| config.aws.profile.clone());
    let timeout = Duration::from_secs(config.scan.timeout_secs);

    let scan_output = if let Some(fixture_path) = fixture {
        let provider = FixtureProvider::load(&fixture_path)
            .with_context(|| format!("Failed to load fixture: {}", fixture_path.display()))?;
        run_scan(&provider, &model, timeout).await?
    } else {
        let provider = AwsProvider::connect(&region, profile.as_deref())
            .await
            .context("Failed to connect to AWS")?;
        run_scan(&provider, &model, timeout).await?
    };

    let report = ScanReport::new(
        scan_output.account,
        scan_output.region,
        scan_output.aggregated,
        model.table_version(),
        chrono::Utc::now(),
    );

    let report_path = output.unwrap_or_else(|| config.output.report_path.clone());
    report
        .save(&report_path)
        .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
    report.print_console();
    println!("\nReport written to {}", report_path.display());

    Ok(())
}
