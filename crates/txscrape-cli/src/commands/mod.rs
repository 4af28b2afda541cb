//! Subcommands and the output handling they share.

pub mod batch;
pub mod config;
pub mod count;
pub mod extract;
pub mod pdf;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use txscrape_core::export::{export_file_name, to_csv, SourceLabel};
use txscrape_core::models::{ExtractionReport, ScrapeConfig};

/// Output format for extraction results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// CSV with the export column rules
    Csv,
    /// Full report as JSON
    Json,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

/// Where and how to write a report.
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output file (default: stdout)
    #[arg(short, long, conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Write into this directory using the export naming convention
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: OutputFormat,
}

/// Configuration from `--config`, else the user config file, else defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<ScrapeConfig> {
    if let Some(path) = path {
        return Ok(ScrapeConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config at {}", default_path.display());
        Ok(ScrapeConfig::from_file(&default_path)?)
    } else {
        Ok(ScrapeConfig::default())
    }
}

pub fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

pub fn format_report(report: &ExtractionReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Csv => Ok(to_csv(&report.transactions)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_text(report: &ExtractionReport) -> String {
    let mut output = String::new();

    if let Some(info) = &report.account_info {
        if let Some(name) = &info.name {
            output.push_str(&format!("Account: {}\n", name));
        }
        if let Some(number) = &info.number {
            output.push_str(&format!("Number:  {}\n", number));
        }
        if let Some(balance) = &info.balance {
            output.push_str(&format!("Balance: {}\n", balance));
        }
        output.push('\n');
    }

    output.push_str(&format!("Transactions: {}", report.count));
    if let Some(expected) = report.expected_count {
        output.push_str(&format!(" (page reports {})", expected));
    }
    output.push('\n');

    for record in &report.transactions {
        output.push_str(&format!(
            "  {:<12} {:>12}  {}",
            record.date, record.amount, record.description
        ));
        if !record.vendor.is_empty() {
            output.push_str(&format!(" / {}", record.vendor));
        }
        output.push('\n');
    }

    output
}

/// Write a report to a file, a directory (convention name) or stdout.
pub fn write_report(
    report: &ExtractionReport,
    output: &OutputArgs,
    config: &ScrapeConfig,
    label: SourceLabel,
) -> anyhow::Result<()> {
    let content = format_report(report, output.format)?;

    let path = match (&output.output, &output.output_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => {
            fs::create_dir_all(dir)?;
            let today = chrono::Local::now().date_naive();
            let name = export_file_name(&config.export.file_prefix, label, today);
            Some(dir.join(name).with_extension(output.format.extension()))
        }
        (None, None) => None,
    };

    match path {
        Some(path) => {
            fs::write(&path, &content)?;
            println!(
                "{} {} transactions written to {}",
                style("✓").green(),
                report.count,
                path.display()
            );
        }
        None => println!("{}", content),
    }

    Ok(())
}
