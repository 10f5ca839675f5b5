// file: src/main.rs
// description: commandline application entry point
// reference: thin caller of the csv2parquet pipeline

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use csv2parquet::utils::logging::{
    format_error, format_info, format_step, format_success, format_warning,
};
use csv2parquet::{Config, PipelineOrchestrator, PipelineReport, ReportExporter};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "csv2parquet")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Extract CSVs from a ZIP file and convert them to Parquet format.", long_about = None)]
struct Cli {
    /// Path to the input ZIP file.
    #[arg(long, value_name = "FILE", env = "CSV2PARQUET_ZIP_PATH")]
    zip_path: Option<PathBuf>,

    /// Path to the directory to extract CSV files into.
    #[arg(long, value_name = "DIR", env = "CSV2PARQUET_CSV_PATH")]
    csv_path: Option<PathBuf>,

    /// Path to the directory to save Parquet files.
    #[arg(long, value_name = "DIR", env = "CSV2PARQUET_PARQUET_PATH")]
    parquet_path: Option<PathBuf>,

    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "NUM")]
    workers: Option<usize>,

    /// Tolerate an existing output directory and overwrite same-named files.
    #[arg(long, action = ArgAction::SetTrue)]
    reuse_output_dir: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    no_progress: bool,

    /// Write the run report as JSON.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,

    /// Exit with an error when any entry or file failed.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;

    csv2parquet::utils::logging::init_logger(&config.logging)?;

    info!("csv2parquet pipeline");
    if let Some(path) = &cli.config {
        info!("Loaded configuration from: {}", path.display());
    }

    config
        .pipeline
        .validate()
        .context("Missing --zip-path, --csv-path or --parquet-path")?;

    println!(
        "{}",
        format_info(&format!(
            "{} -> {} -> {}",
            config.pipeline.archive_path.display(),
            config.pipeline.csv_path.display(),
            config.pipeline.parquet_path.display()
        ))
    );

    let mut orchestrator =
        PipelineOrchestrator::new(&config).context("Failed to build pipeline")?;
    let report = orchestrator
        .run(None)
        .await
        .context("Pipeline failed")?
        .last_report()
        .cloned()
        .context("Pipeline finished without a report")?;

    print_summary(&report);

    if let Some(path) = cli.report {
        ReportExporter::new(path, cli.pretty)
            .export(&report)
            .context("Failed to write run report")?;
    }

    if cli.strict && !report.is_clean() {
        anyhow::bail!("{} items failed", report.total_failures());
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(path) = &cli.zip_path {
        config.pipeline.archive_path = path.clone();
    }
    if let Some(path) = &cli.csv_path {
        config.pipeline.csv_path = path.clone();
    }
    if let Some(path) = &cli.parquet_path {
        config.pipeline.parquet_path = path.clone();
    }
    if cli.workers.is_some() {
        config.workers.parallel_workers = cli.workers;
    }
    if cli.reuse_output_dir {
        config.conversion.reuse_output_dir = true;
    }
    if cli.no_progress {
        config.workers.show_progress = false;
    }
    config.logging.colored = cli.color && config.logging.colored;
    config.logging.verbose = cli.verbose || config.logging.verbose;
}

fn print_summary(report: &PipelineReport) {
    let extraction = &report.extraction;
    let conversion = &report.conversion;

    println!(
        "{}",
        format_step(
            1,
            2,
            &format!(
                "Extracted {} entries ({} failed) in {} ms",
                extraction.succeeded, extraction.failed, extraction.duration_ms
            )
        )
    );
    println!(
        "{}",
        format_step(
            2,
            2,
            &format!(
                "Converted {} files ({} failed) in {} ms",
                conversion.succeeded, conversion.failed, conversion.duration_ms
            )
        )
    );

    for failure in extraction.failures.iter().chain(conversion.failures.iter()) {
        println!("{}", format_error(&format!("{}: {}", failure.key, failure.error)));
    }

    if report.is_clean() {
        println!("{}", format_success("All items processed"));
    } else {
        warn!("Run {} finished with failures", report.run_id);
        println!(
            "{}",
            format_warning(&format!("{} items failed", report.total_failures()))
        );
    }
}
