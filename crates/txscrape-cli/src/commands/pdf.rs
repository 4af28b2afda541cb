//! PDF command - extract transactions from a statement file.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use tracing::{debug, info};

use txscrape_core::export::SourceLabel;
use txscrape_core::pdf::{PdfExtractor, StatementProcessor};

use super::{load_config, spinner, write_report, OutputArgs};

/// Arguments for the pdf command.
#[derive(Args)]
pub struct PdfArgs {
    /// Statement PDF
    #[arg(required = true)]
    input: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    /// Override the line grouping tolerance
    #[arg(long)]
    line_tolerance: Option<f32>,
}

pub async fn run(args: PdfArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    if let Some(tolerance) = args.line_tolerance {
        config.pdf.line_tolerance = tolerance;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing statement {}", args.input.display());
    let pb = spinner("Loading PDF...")?;

    let extractor = PdfExtractor::from_file(&args.input)?;
    debug!("PDF has {} pages", extractor.page_count());

    pb.set_message("Extracting transactions...");
    let report = StatementProcessor::new(config.pdf.clone())
        .process_document(&extractor)
        .await;
    pb.finish_and_clear();

    if !report.success {
        anyhow::bail!(
            "Statement processing failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }

    write_report(&report, &args.output, &config, SourceLabel::Pdf)?;

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}
