//! Extract command - scrape transactions from a saved page.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use txscrape_core::export::SourceLabel;
use txscrape_core::source::HtmlPage;
use txscrape_core::Extractor;

use super::{load_config, spinner, write_report, OutputArgs};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Saved transaction page (HTML)
    #[arg(required = true)]
    input: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    /// Show which strategy produced the records
    #[arg(long)]
    show_strategy: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Extracting from {}", args.input.display());
    let pb = spinner("Parsing page...")?;

    let page = HtmlPage::from_file(&args.input)?;
    pb.set_message("Extracting transactions...");
    let report = Extractor::new(config.clone()).extract(&page).await;
    pb.finish_and_clear();

    if !report.success {
        anyhow::bail!(
            "Extraction failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }

    write_report(&report, &args.output, &config, SourceLabel::Web)?;

    if args.show_strategy {
        eprintln!(
            "{} Strategy: {}, skipped units: {}",
            style("ℹ").blue(),
            report
                .strategy
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".to_string()),
            report.skipped
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}
