//! Batch command - many PDF statements in one run.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use txscrape_core::models::{ExtractionReport, ScrapeConfig};
use txscrape_core::pdf::{PdfExtractor, StatementProcessor};
use txscrape_core::Strategy;

use super::{format_report, load_config, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for statement PDFs
    #[arg(required = true)]
    input: String,

    /// Output directory (default: next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Also write summary.csv with one line per input file
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome for one input file.
struct FileResult {
    path: PathBuf,
    report: Option<ExtractionReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} statements to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // One document at a time; the processor rejects overlapping calls.
    let processor = StatementProcessor::new(config.pdf.clone());
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome = process_file(&path, &processor).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(report) => {
                write_output(&path, &report, &args, &config)?;
                results.push(FileResult {
                    path,
                    report: Some(report),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(FileResult {
                        path,
                        report: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let transactions: usize = results
        .iter()
        .filter_map(|r| r.report.as_ref())
        .map(|r| r.count)
        .sum();

    println!();
    println!(
        "{} Processed {} statements in {:?} ({} transactions)",
        style("✓").green(),
        results.len(),
        start.elapsed(),
        transactions
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn process_file(path: &Path, processor: &StatementProcessor) -> anyhow::Result<ExtractionReport> {
    let extractor = PdfExtractor::from_file(path)?;
    let report = processor.try_process_document(&extractor).await?;
    debug!("{}: {} transactions", path.display(), report.count);
    Ok(report)
}

fn write_output(
    path: &Path,
    report: &ExtractionReport,
    args: &BatchArgs,
    config: &ScrapeConfig,
) -> anyhow::Result<()> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("statement");
    let name = format!(
        "{}_{}.{}",
        config.export.file_prefix,
        stem,
        args.format.extension()
    );

    let output_path = match &args.output_dir {
        Some(dir) => dir.join(name),
        None => path.with_file_name(name),
    };

    fs::write(&output_path, format_report(report, args.format)?)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "transactions",
        "strategy",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let (status, count, strategy) = match &result.report {
            Some(report) => (
                "success",
                report.count.to_string(),
                report.strategy.as_ref().map(Strategy::as_str).unwrap_or(""),
            ),
            None => ("failed", String::new(), ""),
        };

        wtr.write_record([
            filename,
            status,
            count.as_str(),
            strategy,
            result.processing_time_ms.to_string().as_str(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
