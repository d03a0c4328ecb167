use crate::config::ScraperConfig;
use crate::driver::PageDriver;
use crate::error::ScrapeError;
use crate::extract::{CardPosition, extract_card};
use crate::record::JobRecord;
use crate::utils::scroll_delay;
use serde::Serialize;
use url::Url;

/// Why pagination ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The page bound was reached
    MaxPages,
    /// The results container never rendered on `page`; earlier pages are kept
    ContainerTimeout { page: usize },
    /// No clickable "next" control after `page`; the normal end of results
    NextControlUnavailable { page: usize },
}

/// Progress of one pagination iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub page_index: usize,
    pub cards_found: usize,
}

/// Records kept from one results page, in card order
#[derive(Debug, Clone)]
pub struct PageBatch {
    pub state: PageState,
    pub records: Vec<JobRecord>,
}

/// Everything a finished pager produced
#[derive(Debug, Clone)]
pub struct Paginated {
    pub records: Vec<JobRecord>,
    pub stop_reason: StopReason,
}

/// Cursor over the pages of one search
///
/// Pagination mutates the live browser session, so the cursor holds the driver
/// exclusively, moves strictly forward, and cannot be restarted. Each call to
/// [`ResultPager::next_page`] processes exactly one page.
pub struct ResultPager<'a, D: PageDriver> {
    driver: &'a mut D,
    config: &'a ScraperConfig,
    search_url: Url,
    max_pages: usize,
    next_index: usize,
    started: bool,
    stop: Option<StopReason>,
}

impl<'a, D: PageDriver> ResultPager<'a, D> {
    pub fn new(driver: &'a mut D, config: &'a ScraperConfig, search_url: Url, max_pages: usize) -> Self {
        Self {
            driver,
            config,
            search_url,
            max_pages,
            next_index: 0,
            started: false,
            stop: None,
        }
    }

    /// Why the cursor is exhausted, `None` while pages may remain
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    /// Process the next page
    ///
    /// Returns `Ok(None)` once pagination has ended. Container and "next"
    /// control failures end pagination instead of erroring; any other driver
    /// failure is returned as an error.
    pub async fn next_page(&mut self) -> Result<Option<PageBatch>, ScrapeError> {
        if self.stop.is_some() {
            return Ok(None);
        }
        if self.next_index >= self.max_pages {
            self.stop = Some(StopReason::MaxPages);
            return Ok(None);
        }

        let config = self.config;
        if !self.started {
            ::log::info!("Navigating to: {}", self.search_url);
            self.driver.goto(self.search_url.as_str()).await?;
            tokio::time::sleep(config.timeouts.render()).await;
            self.started = true;
        }

        let page = self.next_index;
        ::log::info!("--- Processing page {} ---", page + 1);

        self.scroll(page).await?;

        let selectors = &config.selectors;
        let container = match self
            .driver
            .wait_for(&selectors.container, config.timeouts.container())
            .await
        {
            Ok(container) => container,
            Err(e) => {
                ::log::error!(
                    "Page {}: Timeout waiting for job results container: {}",
                    page + 1,
                    e
                );
                self.stop = Some(StopReason::ContainerTimeout { page });
                return Ok(None);
            }
        };
        ::log::info!("Page {}: Job results container detected", page + 1);

        let cards = self.driver.find_all_in(&container, &selectors.card).await?;
        let state = PageState {
            page_index: page,
            cards_found: cards.len(),
        };
        ::log::info!("Page {}: Found {} job cards", page + 1, state.cards_found);

        let mut records = Vec::with_capacity(cards.len());
        for (index, card) in cards.iter().enumerate() {
            let position = CardPosition { page, card: index };
            ::log::debug!("{}: Processing job card", position);
            let record =
                extract_card(&mut *self.driver, card, selectors, Some(&self.search_url), position)
                    .await;
            if record.is_retained() {
                records.push(record);
            } else {
                ::log::debug!("{}: Dropped card with neither title nor company", position);
            }
        }

        self.next_index += 1;
        if self.next_index >= self.max_pages {
            self.stop = Some(StopReason::MaxPages);
        } else {
            self.advance(page).await;
        }

        Ok(Some(PageBatch { state, records }))
    }

    /// Drain the cursor, concatenating records in page order
    pub async fn collect(mut self) -> Result<Paginated, ScrapeError> {
        let mut records = Vec::new();
        while let Some(batch) = self.next_page().await? {
            records.extend(batch.records);
        }

        let stop_reason = self.stop.unwrap_or(StopReason::MaxPages);
        ::log::info!(
            "Pagination finished with {} jobs ({:?})",
            records.len(),
            stop_reason
        );
        Ok(Paginated {
            records,
            stop_reason,
        })
    }

    /// Scroll to the bottom repeatedly so lazy-loaded cards render
    async fn scroll(&mut self, page: usize) -> Result<(), ScrapeError> {
        let pacing = &self.config.pacing;
        for i in 0..pacing.scroll_count {
            self.driver.scroll_to_bottom().await?;
            let delay = scroll_delay(pacing);
            ::log::info!(
                "Page {}: Scrolled down {} times, waiting {:.2} seconds",
                page + 1,
                i + 1,
                delay.as_secs_f64()
            );
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    /// Click "next"; any failure marks the end of results
    async fn advance(&mut self, page: usize) {
        let config = self.config;
        let clicked = match self
            .driver
            .wait_for_clickable(&config.selectors.next, config.timeouts.next())
            .await
        {
            Ok(next) => {
                ::log::info!("Page {}: Clicking 'Next' button", page + 1);
                self.driver.click(&next).await
            }
            Err(e) => Err(e),
        };

        match clicked {
            Ok(()) => tokio::time::sleep(config.timeouts.render()).await,
            Err(e) => {
                ::log::info!(
                    "Page {}: 'Next' button not found or not clickable: {}",
                    page + 1,
                    e
                );
                self.stop = Some(StopReason::NextControlUnavailable { page });
            }
        }
    }
}
