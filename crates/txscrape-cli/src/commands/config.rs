//! Config command - inspect and edit the user configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use txscrape_core::models::ScrapeConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with the default values
    Init {
        /// Where to write it (default: the user config path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value by dotted key (e.g. "load.max_attempts")
    Get { key: String },

    /// Change one value by dotted key; JSON values are parsed, anything else is a string
    Set { key: String, value: String },

    /// Print the configuration file path
    Path,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let path = default_config_path();
    match args.command {
        ConfigCommand::Show => {
            if !path.exists() {
                eprintln!("{} No config file found, showing defaults.", style("ℹ").blue());
            }
            println!("{}", serde_json::to_string_pretty(&load_or_default(&path)?)?);
            Ok(())
        }
        ConfigCommand::Init { output, force } => init(output.unwrap_or(path), force),
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(load_or_default(&path)?)?;
            let value = lookup(&json, &key)
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
        ConfigCommand::Set { key, value } => set(&path, &key, &value),
        ConfigCommand::Path => {
            println!("Configuration file: {}", path.display());
            if path.exists() {
                println!("Status: {}", style("exists").green());
            } else {
                println!("Status: {}", style("not created").yellow());
                println!();
                println!("Run 'txscrape config init' to create a configuration file.");
            }
            Ok(())
        }
    }
}

/// `<config dir>/txscrape/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("txscrape")
        .join("config.json")
}

fn load_or_default(path: &Path) -> anyhow::Result<ScrapeConfig> {
    if path.exists() {
        Ok(ScrapeConfig::from_file(path)?)
    } else {
        Ok(ScrapeConfig::default())
    }
}

fn save(config: &ScrapeConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn init(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    save(&ScrapeConfig::default(), &path)?;
    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

fn set(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let value: Value =
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut json = serde_json::to_value(load_or_default(path)?)?;
    let (section, field) = match key.rsplit_once('.') {
        Some((section, field)) => (
            section
                .split('.')
                .try_fold(&mut json, |current, part| current.get_mut(part))
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?,
            field,
        ),
        None => (&mut json, key),
    };

    let section = section
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Cannot set value at non-object path: {}", key))?;
    if !section.contains_key(field) {
        anyhow::bail!("Configuration key not found: {}", key);
    }
    section.insert(field.to_string(), value.clone());

    // Round-trip through the typed config so a wrongly typed value is rejected.
    let config: ScrapeConfig = serde_json::from_value(json)?;
    save(&config, path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&value)?
    );
    Ok(())
}
