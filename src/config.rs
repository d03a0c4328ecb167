use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for a scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Page that hosts the sign-in form
    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// Substring of the location that means the session is already signed in
    #[serde(default = "default_logged_in_marker")]
    pub logged_in_marker: String,

    /// Job search page; query and location are appended as parameters
    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,

    /// SQLite database file for the job store
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Upper bound on result pages per run
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub pacing: PacingConfig,

    #[serde(default)]
    pub selectors: SelectorConfig,

    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Bounded waits, all in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Wait for the login form and for the post-login landmark
    #[serde(default = "default_login_secs")]
    pub login_secs: u64,

    /// Wait for the results container on each page
    #[serde(default = "default_container_secs")]
    pub container_secs: u64,

    /// Wait for the "next page" control to become clickable
    #[serde(default = "default_next_secs")]
    pub next_secs: u64,

    /// Pause after opening the login page, for client-side redirects
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,

    /// Pause after navigating to a results page
    #[serde(default = "default_render_secs")]
    pub render_secs: u64,
}

/// Scrolling cadence used to trigger lazy-loaded cards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_scroll_count")]
    pub scroll_count: usize,

    #[serde(default = "default_scroll_delay_min_ms")]
    pub scroll_delay_min_ms: u64,

    #[serde(default = "default_scroll_delay_max_ms")]
    pub scroll_delay_max_ms: u64,
}

/// CSS selectors for every element the pipeline touches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_username_selector")]
    pub username: String,

    #[serde(default = "default_password_selector")]
    pub password: String,

    #[serde(default = "default_submit_selector")]
    pub submit: String,

    /// Element only present once signed in
    #[serde(default = "default_landmark_selector")]
    pub landmark: String,

    /// Element holding every card of the current results page
    #[serde(default = "default_container_selector")]
    pub container: String,

    #[serde(default = "default_card_selector")]
    pub card: String,

    /// Anchor carrying both the title text and the listing href
    #[serde(default = "default_title_link_selector")]
    pub title_link: String,

    #[serde(default = "default_company_selector")]
    pub company: String,

    #[serde(default = "default_location_selector")]
    pub location: String,

    #[serde(default = "default_next_selector")]
    pub next: String,
}

/// Browser session options passed to the WebDriver as capabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub headless: bool,

    /// Persistent profile directory, so a signed-in session survives runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data_dir: Option<String>,

    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_login_url() -> String {
    "https://www.linkedin.com/login".to_string()
}

fn default_logged_in_marker() -> String {
    "linkedin.com/feed".to_string()
}

fn default_search_base_url() -> String {
    "https://www.linkedin.com/jobs/search".to_string()
}

fn default_database_path() -> String {
    "jobs.db".to_string()
}

fn default_max_pages() -> usize {
    5
}

fn default_login_secs() -> u64 {
    20
}

fn default_container_secs() -> u64 {
    60
}

fn default_next_secs() -> u64 {
    10
}

fn default_settle_secs() -> u64 {
    2
}

fn default_render_secs() -> u64 {
    5
}

fn default_scroll_count() -> usize {
    5
}

fn default_scroll_delay_min_ms() -> u64 {
    2000
}

fn default_scroll_delay_max_ms() -> u64 {
    3000
}

fn default_username_selector() -> String {
    "#username".to_string()
}

fn default_password_selector() -> String {
    "#password".to_string()
}

fn default_submit_selector() -> String {
    "button[type='submit']".to_string()
}

fn default_landmark_selector() -> String {
    "input.search-global-typeahead__input".to_string()
}

fn default_container_selector() -> String {
    "ul[class^='insiAph']".to_string()
}

fn default_card_selector() -> String {
    "li[data-occludable-job-id]".to_string()
}

fn default_title_link_selector() -> String {
    "a.job-card-list__title--link".to_string()
}

fn default_company_selector() -> String {
    "div.artdeco-entity-lockup__subtitle".to_string()
}

fn default_location_selector() -> String {
    "ul.job-card-container__metadata-wrapper li".to_string()
}

fn default_next_selector() -> String {
    "button.jobs-search-pagination__button--next".to_string()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            login_url: default_login_url(),
            logged_in_marker: default_logged_in_marker(),
            search_base_url: default_search_base_url(),
            database_path: default_database_path(),
            max_pages: default_max_pages(),
            timeouts: TimeoutConfig::default(),
            pacing: PacingConfig::default(),
            selectors: SelectorConfig::default(),
            browser: BrowserConfig::default(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            login_secs: default_login_secs(),
            container_secs: default_container_secs(),
            next_secs: default_next_secs(),
            settle_secs: default_settle_secs(),
            render_secs: default_render_secs(),
        }
    }
}

impl TimeoutConfig {
    pub fn login(&self) -> Duration {
        Duration::from_secs(self.login_secs)
    }

    pub fn container(&self) -> Duration {
        Duration::from_secs(self.container_secs)
    }

    pub fn next(&self) -> Duration {
        Duration::from_secs(self.next_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    pub fn render(&self) -> Duration {
        Duration::from_secs(self.render_secs)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            scroll_count: default_scroll_count(),
            scroll_delay_min_ms: default_scroll_delay_min_ms(),
            scroll_delay_max_ms: default_scroll_delay_max_ms(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            username: default_username_selector(),
            password: default_password_selector(),
            submit: default_submit_selector(),
            landmark: default_landmark_selector(),
            container: default_container_selector(),
            card: default_card_selector(),
            title_link: default_title_link_selector(),
            company: default_company_selector(),
            location: default_location_selector(),
            next: default_next_selector(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Override the WebDriver URL with the `WEBDRIVER_URL` environment variable if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    /// Reject settings the pipeline cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pacing = &self.pacing;
        if pacing.scroll_count == 0 {
            return Err(ConfigError::Invalid(
                "pacing.scroll_count must be greater than zero".to_string(),
            ));
        }
        if pacing.scroll_delay_min_ms == 0 {
            return Err(ConfigError::Invalid(
                "pacing.scroll_delay_min_ms must be greater than zero".to_string(),
            ));
        }
        if pacing.scroll_delay_min_ms >= pacing.scroll_delay_max_ms {
            return Err(ConfigError::Invalid(format!(
                "pacing.scroll_delay_min_ms ({}) must be below pacing.scroll_delay_max_ms ({})",
                pacing.scroll_delay_min_ms, pacing.scroll_delay_max_ms
            )));
        }
        Ok(())
    }
}
