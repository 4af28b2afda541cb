//! Count command - cheap unit count without parsing.

use std::path::PathBuf;

use clap::Args;

use txscrape_core::source::HtmlPage;
use txscrape_core::Extractor;

use super::load_config;

/// Arguments for the count command.
#[derive(Args)]
pub struct CountArgs {
    /// Saved transaction page (HTML)
    #[arg(required = true)]
    input: PathBuf,

    /// Print the count report as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: CountArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let page = HtmlPage::from_file(&args.input)?;
    let report = Extractor::new(config).count_units(&page);

    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    } else if report.success {
        println!("{}", report.count);
    } else {
        anyhow::bail!("Could not count transaction rows");
    }

    Ok(())
}
