//! Collects job listings from a paginated, sign-in protected search feed.
//!
//! A run signs in through a [`driver::PageDriver`], walks the result pages
//! with a [`pager::ResultPager`], reads every card with
//! [`extract::extract_card`] and stores new listings in a [`store::JobStore`].
//! [`orchestrator::Orchestrator`] ties the stages together.

pub mod config;
pub mod driver;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod pager;
pub mod record;
pub mod server;
pub mod session;
pub mod store;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types for convenience
pub use config::ScraperConfig;
pub use error::{DriverError, ScrapeError, StoreError};
pub use orchestrator::{Orchestrator, ScrapeReport};
pub use record::{JobRecord, NOT_AVAILABLE};
