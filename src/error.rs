use thiserror::Error;

/// Failures reported by a [`PageDriver`](crate::driver::PageDriver)
#[derive(Debug, Error)]
pub enum DriverError {
    /// No WebDriver server accepted a session
    #[error("failed to connect to a WebDriver server at {url}: {reason}")]
    Connect { url: String, reason: String },

    /// A bounded wait elapsed before the element showed up
    #[error("timed out waiting for `{selector}`")]
    Timeout { selector: String },

    #[error("no element matches `{selector}`")]
    NoSuchElement { selector: String },

    /// The element exists but is hidden or disabled
    #[error("element `{selector}` is not clickable")]
    NotClickable { selector: String },

    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    /// Any other WebDriver command failure
    #[error("webdriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DriverError {
    /// True when the error came from a bounded wait running out
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout { .. })
    }
}

/// Failures of the persistent job store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failures while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Fatal outcome of a scrape run
///
/// Non-fatal conditions (a results container that never rendered, a missing
/// "next" control, a field that could not be read) never show up here; they
/// end pagination or fall back to the sentinel value instead.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("login credentials not provided")]
    MissingCredentials,

    #[error("timed out waiting for the login page")]
    LoginPageTimeout,

    #[error("login failed: {0}")]
    LoginFailed(String),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid search url: {0}")]
    SearchUrl(#[from] url::ParseError),
}
