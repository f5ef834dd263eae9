use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::info;
use weather_core::{BatchLog, Config, OpenWeatherProvider, collect_batch};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Fetch current weather for a list of locations and log it")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every configured location, print the table and append it to the log (default).
    Run {
        /// Log file to append to, overriding the configured one.
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Interactively set the API key and location list.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command.unwrap_or(Command::Run { log_file: None }) {
            Command::Run { log_file } => {
                let config = Config::load_from(&config_path)?;
                run_batch(config, log_file).await
            }
            Command::Configure => configure(&config_path),
        }
    }
}

async fn run_batch(config: Config, log_file: Option<PathBuf>) -> anyhow::Result<()> {
    let api_key = config.api_key()?;
    let provider = OpenWeatherProvider::with_base_url(api_key, config.base_url.clone());
    let log = BatchLog::new(log_file.unwrap_or_else(|| config.log_file.clone()));

    info!(locations = config.locations.len(), "starting batch");
    let batch = collect_batch(
        &provider,
        &config.locations,
        &config.dispatch_options(),
        |location, outcome| println!("{}", render::progress_line(location, outcome)),
    )
    .await;

    print!("{}", render::table(&batch));

    log.append(&batch)
        .with_context(|| format!("Failed to save results to {}", log.path().display()))?;
    println!("\nResults saved to {}", log.path().display());

    Ok(())
}

fn configure(config_path: &Path) -> anyhow::Result<()> {
    let mut config = Config::load_from(config_path)?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let current = config.locations.join(", ");
    let locations = Text::new("Locations (comma-separated):")
        .with_default(&current)
        .prompt()
        .context("Failed to read locations")?;
    config.locations = parse_locations(&locations);

    config.save_to(config_path)?;
    println!("Configuration saved to {}", config_path.display());

    Ok(())
}

fn parse_locations(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
