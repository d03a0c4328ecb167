use clap::Parser;
use yield_jobs::config::ScraperConfig;
use yield_jobs::driver::SnapshotDriver;
use yield_jobs::error::ScrapeError;
use yield_jobs::orchestrator::{Orchestrator, ScrapeReport};
use yield_jobs::session::Credentials;
use yield_jobs::store::JobStore;
use yield_jobs::server;

mod args;
use args::{Args, Command};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Credentials and WEBDRIVER_URL may live in a .env file
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            ::log::warn!("Failed to load .env file: {}", e);
        }
    }

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match ScraperConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => ScraperConfig::default(),
    }
    .with_env_overrides();
    if let Some(database) = args.database {
        config.database_path = database;
    }

    match args.command {
        Command::Scrape {
            query,
            location,
            max_pages,
            replay,
        } => {
            let max_pages = max_pages.unwrap_or(config.max_pages);
            let report = if replay.is_empty() {
                orchestrator(config)
                    .run(&query, &location, max_pages)
                    .await
            } else {
                replay_run(config, &replay, &query, &location, max_pages).await
            };

            match report {
                Ok(report) => print_report(&report),
                Err(e) => {
                    ::log::error!("Scraping failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Serve { addr } => {
            if let Err(e) = server::serve(orchestrator(config), &addr).await {
                ::log::error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        Command::CheckDuplicates => check_duplicates(&config).await,
    }
}

/// Build the orchestrator, exiting on an invalid configuration
fn orchestrator(config: ScraperConfig) -> Orchestrator {
    match Orchestrator::new(config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            ::log::error!("{}", e);
            std::process::exit(2);
        }
    }
}

/// Run the pipeline over saved result pages, as an already signed-in session
async fn replay_run(
    config: ScraperConfig,
    pages: &[std::path::PathBuf],
    query: &str,
    location: &str,
    max_pages: usize,
) -> Result<ScrapeReport, ScrapeError> {
    let signed_in_url = format!("https://www.{}/", config.logged_in_marker);
    let driver = SnapshotDriver::from_files(pages)?.with_redirect(&config.login_url, &signed_in_url);
    let credentials = Credentials::new(Some("replay".to_string()), Some("replay".to_string()))?;

    ::log::info!("Replaying {} saved result pages", pages.len());
    Orchestrator::new(config)?
        .with_credentials(credentials)
        .run_with_driver(driver, query, location, max_pages)
        .await
}

fn print_report(report: &ScrapeReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => ::log::error!("Failed to serialize report: {}", e),
    }
}

async fn check_duplicates(config: &ScraperConfig) {
    ::log::info!("Starting duplicate check on {}", config.database_path);
    let store = JobStore::new(&config.database_path);

    match store.find_duplicate_links().await {
        Ok(duplicates) if duplicates.is_empty() => ::log::info!("No duplicates found."),
        Ok(duplicates) => {
            ::log::info!("Duplicates found:");
            for duplicate in duplicates {
                ::log::info!("Link: {} appears {} times", duplicate.link, duplicate.count);
            }
        }
        Err(e) => {
            ::log::error!("Duplicate check failed: {}", e);
            std::process::exit(1);
        }
    }
}
