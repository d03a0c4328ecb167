use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "yield-jobs")]
#[command(about = "Collects job listings from an authenticated search feed into SQLite")]
#[command(version)]
pub struct Args {
    /// JSON configuration file (defaults apply to anything it omits)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file, overriding the configured one
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one scrape and print the report as JSON
    Scrape {
        /// Search keywords
        #[arg(short, long, default_value = "AI developer")]
        query: String,

        /// Search location
        #[arg(short, long, default_value = "United States")]
        location: String,

        /// Maximum number of result pages (defaults to the configured value)
        #[arg(short, long)]
        max_pages: Option<usize>,

        /// Replay saved result pages instead of driving a browser
        #[arg(long, num_args = 1..)]
        replay: Vec<PathBuf>,
    },

    /// Serve GET /scrape_jobs over HTTP
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8000")]
        addr: String,
    },

    /// Report links stored more than once
    CheckDuplicates,
}
