use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use listing_scraper_lib::application::{PageOrchestrator, ScrapeSections};
use listing_scraper_lib::infrastructure::{
    AppSettings, ConfigProvider, HttpClient, create_product_distribution_report,
    init_logging_with_config, logging, write_table,
};

#[derive(Parser)]
#[command(
    name = "listing-scraper",
    about = "Configuration-driven scraper for category and product listing pages",
    version
)]
struct Cli {
    /// Configuration file (defaults to config/config.yml, then the user config directory)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of the configured level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every configured page, save the CSV and write the report
    Run {
        /// Do not write the distribution report
        #[arg(long)]
        skip_report: bool,
        /// CSV destination, overriding output.result_file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write the distribution report from an existing CSV
    Report {
        /// CSV to read, overriding output.result_file
        #[arg(long)]
        input: Option<PathBuf>,
        /// SVG destination, overriding output.report_file_main
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The report only needs output paths, so it can run without a config file
    let provider = match (ConfigProvider::discover(cli.config.as_deref()), &cli.command) {
        (Ok(provider), _) => Some(provider),
        (Err(e), Commands::Report { .. }) if cli.config.is_none() => {
            eprintln!("No configuration loaded ({e}), using defaults");
            None
        }
        (Err(e), _) => return Err(e).context("Failed to load configuration"),
    };

    let mut settings = match &provider {
        Some(provider) => provider.app_settings().context("Invalid configuration")?,
        None => AppSettings::default(),
    };
    if cli.verbose {
        settings.logging.level = "debug".to_string();
    }
    init_logging_with_config(&settings.logging)?;
    logging::log_system_info();
    if let Some(path) = provider.as_ref().and_then(ConfigProvider::source) {
        info!("Using configuration {}", path.display());
    }

    match cli.command {
        Commands::Run {
            skip_report,
            output,
        } => {
            let provider = provider.context("A configuration file is required to scrape")?;
            let result_file = output.unwrap_or_else(|| settings.output.result_file.clone());

            let client = HttpClient::with_config(settings.http.clone())?;
            let sections = ScrapeSections::from_provider(&provider);
            let orchestrator = PageOrchestrator::new(client, settings.crawl.clone(), sections);

            let table = orchestrator.run().await?;
            write_table(&result_file, &table)?;

            if table.is_empty() {
                warn!("No products scraped");
            }
            if skip_report {
                info!("Skipping distribution report");
            } else {
                create_product_distribution_report(&result_file, &settings.output.report_file_main)?;
            }
        }
        Commands::Report { input, output } => {
            let input = input.unwrap_or(settings.output.result_file);
            let output = output.unwrap_or(settings.output.report_file_main);
            let counts = create_product_distribution_report(&input, &output)?;
            for (category, count) in counts {
                info!("{}: {}", category, count);
            }
        }
    }

    Ok(())
}
