//! actions-usage - GitHub Actions usage analyzer
//!
//! Summarizes a GitHub usage-billing export per day, user, workflow and
//! repository.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze an export
//! actions-usage usage_report.csv
//!
//! # Emit JSON instead of tables
//! actions-usage usage_report.csv --format json
//!
//! # With verbose logging written to a log directory
//! actions-usage usage_report.csv -v --log-dir /tmp/actions-usage-logs
//! ```

mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use actions_usage_config::AnalyzerConfig;
use actions_usage_core::{LogGuard, init_logging, logging};
use actions_usage_report::{FileUpload, Outcome, UploadSource, UsageAnalyzer};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{debug, error, info};

/// Exit code for uploads refused with a diagnostic.
const EXIT_REJECTED: u8 = 2;

/// GitHub Actions usage analyzer
///
/// Reads a usage-billing CSV export and prints minutes and cost per day,
/// user, workflow and repository.
#[derive(Parser, Debug)]
#[command(name = "actions-usage")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Usage report to analyze
    file: Option<PathBuf>,

    /// Declared content type of the file (guessed from the extension if omitted)
    #[arg(long)]
    content_type: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for JSON log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Write JSON log files to ~/.actions-usage/logs/ (ignored with --log-dir)
    #[arg(long)]
    log_file: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("actions-usage failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> actions_usage_core::Result<LogGuard> {
    let log_dir = match (&cli.log_dir, cli.log_file) {
        (Some(dir), _) => Some(dir.clone()),
        (None, true) => Some(logging::default_log_dir()?),
        (None, false) => None,
    };
    init_logging(log_dir, cli.verbose > 0)
}

fn load_config(cli: &Cli) -> anyhow::Result<AnalyzerConfig> {
    match &cli.config {
        Some(path) => AnalyzerConfig::from_yaml(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(AnalyzerConfig::default()),
    }
}

/// Build the upload for the given file, declaring its content type.
fn build_upload(cli: &Cli) -> Option<FileUpload> {
    let path = cli.file.as_ref()?;
    let upload = FileUpload::new(path);

    let content_type = cli
        .content_type
        .clone()
        .or_else(|| mime_guess::from_path(path).first_raw().map(str::to_string));

    Some(match content_type {
        Some(content_type) => upload.with_content_type(content_type),
        None => upload,
    })
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli)?;
    let analyzer = UsageAnalyzer::new(config);

    let upload = build_upload(cli);
    debug!(upload = ?upload, "Handling upload");

    let outcome = analyzer
        .handle_upload(upload.as_ref().map(|u| u as &dyn UploadSource))
        .context("usage report violates a data assumption")?;

    match outcome {
        Outcome::Empty => {
            print!("{}", render::EMPTY_FORM);
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Rejected(message) => {
            eprintln!("{message}");
            Ok(ExitCode::from(EXIT_REJECTED))
        }
        Outcome::Success(report) => {
            match cli.format {
                OutputFormat::Text => print!("{}", render::render_report(&report)),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
            }
            info!(decimal_places = report.decimal_places(), "Report written");
            Ok(ExitCode::SUCCESS)
        }
    }
}
