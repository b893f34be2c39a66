use anyhow::{Context, Result};
use clap::Parser;
use review_etl::{JobConfig, ReviewPipeline, WriteMode};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "review-etl")]
#[command(about = "Clean product-review CSV files and build review analytics")]
struct Args {
    /// JSON job configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Landing zone with the raw CSV files
    #[arg(long)]
    input: Option<String>,

    /// Destination of the cleaned dataset
    #[arg(long)]
    processed: Option<String>,

    /// Parent location of the analytics result sets
    #[arg(long)]
    analytics: Option<String>,

    /// append | overwrite
    #[arg(long)]
    write_mode: Option<WriteMode>,

    /// Maximum rows per part file of the cleaned dataset
    #[arg(long)]
    rows_per_file: Option<usize>,

    /// Write the run report as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = load_config(&args)?;
    let pipeline = ReviewPipeline::new(config).context("Invalid job configuration")?;

    let report = match pipeline.run() {
        Ok(report) => report,
        Err(e) => {
            error!("❌ Review ETL run failed: {}", e);
            return Err(e.into());
        }
    };

    if let Some(path) = &args.report {
        report
            .save(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<JobConfig> {
    let mut config = match &args.config {
        Some(path) => JobConfig::load(path)?,
        None => JobConfig::default(),
    };
    config.apply_env().context("Invalid REVIEW_ETL_* environment variable")?;

    if let Some(input) = &args.input {
        config.input_path = input.clone();
    }
    if let Some(processed) = &args.processed {
        config.processed_path = processed.clone();
    }
    if let Some(analytics) = &args.analytics {
        config.analytics_path = analytics.clone();
    }
    if let Some(mode) = args.write_mode {
        config.write_mode = mode;
    }
    if let Some(rows) = args.rows_per_file {
        config.rows_per_file = rows;
    }

    Ok(config)
}
