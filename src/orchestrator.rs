use crate::config::ScraperConfig;
use crate::driver::{PageDriver, WebDriverSession};
use crate::error::{ConfigError, ScrapeError};
use crate::pager::{Paginated, ResultPager, StopReason};
use crate::record::JobRecord;
use crate::session::{CredentialSource, Credentials, Session};
use crate::store::{InsertSummary, JobStore};
use crate::utils::build_search_url;
use serde::Serialize;

/// Result of one scrape run
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub query: String,
    pub location: String,
    /// Every job seen this run, including ones the store already had
    pub jobs: Vec<JobRecord>,
    pub stop_reason: StopReason,
    /// `None` when writing to the store failed
    pub storage: Option<InsertSummary>,
}

/// Runs the sign-in, pagination and storage stages for one search
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: ScraperConfig,
    store: JobStore,
    credentials: CredentialSource,
}

impl Orchestrator {
    /// Validate `config` and build an orchestrator over its store
    ///
    /// Credentials are read from the environment at the start of each run
    /// unless set with [`Orchestrator::with_credentials`].
    pub fn new(config: ScraperConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let store = JobStore::new(&config.database_path);
        Ok(Self {
            config,
            store,
            credentials: CredentialSource::default(),
        })
    }

    pub fn with_credentials(mut self, credentials: impl Into<CredentialSource>) -> Self {
        self.credentials = credentials.into();
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    fn credentials(&self) -> Result<Credentials, ScrapeError> {
        self.credentials.resolve()
    }

    /// Scrape with a fresh WebDriver browser session
    pub async fn run(
        &self,
        query: &str,
        location: &str,
        max_pages: usize,
    ) -> Result<ScrapeReport, ScrapeError> {
        // Fail before a browser is started
        build_search_url(&self.config.search_base_url, query, location)?;
        self.credentials()?;
        let driver = WebDriverSession::connect(&self.config).await?;
        self.run_with_driver(driver, query, location, max_pages).await
    }

    /// Scrape with a caller-supplied driver
    ///
    /// The driver is closed before this returns, on success and on failure.
    /// Records gathered before a fatal error are discarded.
    pub async fn run_with_driver<D: PageDriver>(
        &self,
        mut driver: D,
        query: &str,
        location: &str,
        max_pages: usize,
    ) -> Result<ScrapeReport, ScrapeError> {
        let outcome = self.scrape(&mut driver, query, location, max_pages).await;

        if let Err(e) = driver.close().await {
            ::log::warn!("Failed to close driver: {}", e);
        }
        ::log::info!("Driver closed");

        let paginated = match outcome {
            Ok(paginated) => paginated,
            Err(e) => {
                ::log::error!("Error during scraping: {}", e);
                return Err(e);
            }
        };

        let storage = match self.store.insert_all(&paginated.records).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                ::log::error!("Error with database operations: {}", e);
                None
            }
        };

        Ok(ScrapeReport {
            query: query.to_string(),
            location: location.to_string(),
            jobs: paginated.records,
            stop_reason: paginated.stop_reason,
            storage,
        })
    }

    async fn scrape<D: PageDriver>(
        &self,
        driver: &mut D,
        query: &str,
        location: &str,
        max_pages: usize,
    ) -> Result<Paginated, ScrapeError> {
        let credentials = self.credentials()?;
        let search_url = build_search_url(&self.config.search_base_url, query, location)?;

        let mut session = Session::new();
        session
            .authenticate(driver, &credentials, &self.config)
            .await?;

        ResultPager::new(driver, &self.config, search_url, max_pages)
            .collect()
            .await
    }
}
