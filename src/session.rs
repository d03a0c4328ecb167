use crate::config::ScraperConfig;
use crate::driver::PageDriver;
use crate::error::{DriverError, ScrapeError};

/// Environment variable holding the account name
pub const USERNAME_VAR: &str = "LINKEDIN_USERNAME";

/// Environment variable holding the account password
pub const PASSWORD_VAR: &str = "LINKEDIN_PASSWORD";

/// Account used to sign in
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Both values are required; absent or empty ones fail with `MissingCredentials`
    pub fn new(username: Option<String>, password: Option<String>) -> Result<Self, ScrapeError> {
        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok(Self { username, password })
            }
            _ => Err(ScrapeError::MissingCredentials),
        }
    }

    /// Read credentials from `LINKEDIN_USERNAME` and `LINKEDIN_PASSWORD`
    pub fn from_env() -> Result<Self, ScrapeError> {
        Self::new(
            std::env::var(USERNAME_VAR).ok(),
            std::env::var(PASSWORD_VAR).ok(),
        )
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Where a run gets its account from
#[derive(Clone, Default)]
pub enum CredentialSource {
    /// Read `LINKEDIN_USERNAME` and `LINKEDIN_PASSWORD` at the start of each run
    #[default]
    Environment,
    /// Fixed values; `None` behaves like an unset variable
    Fixed {
        username: Option<String>,
        password: Option<String>,
    },
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment => f.write_str("Environment"),
            Self::Fixed { username, password } => f
                .debug_struct("Fixed")
                .field("username", username)
                .field("password", &password.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

impl CredentialSource {
    pub fn resolve(&self) -> Result<Credentials, ScrapeError> {
        match self {
            Self::Environment => Credentials::from_env(),
            Self::Fixed { username, password } => {
                Credentials::new(username.clone(), password.clone())
            }
        }
    }
}

impl From<Credentials> for CredentialSource {
    fn from(credentials: Credentials) -> Self {
        Self::Fixed {
            username: Some(credentials.username),
            password: Some(credentials.password),
        }
    }
}

/// Where the sign-in state machine currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Failed,
}

/// Sign-in state of the shared driver
///
/// Signing in has no product besides its effect on the driver: later stages
/// navigate from wherever the driver was left.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Unauthenticated,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        ::log::debug!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Sign in on the driver, or confirm an existing signed-in session
    ///
    /// Any failure is final: the state becomes [`SessionState::Failed`] and
    /// no retry is attempted.
    pub async fn authenticate<D: PageDriver>(
        &mut self,
        driver: &mut D,
        credentials: &Credentials,
        config: &ScraperConfig,
    ) -> Result<(), ScrapeError> {
        if self.state == SessionState::Authenticated {
            return Ok(());
        }
        self.transition(SessionState::Authenticating);

        match sign_in(driver, credentials, config).await {
            Ok(()) => {
                self.transition(SessionState::Authenticated);
                Ok(())
            }
            Err(e) => {
                ::log::error!("Error during login: {}", e);
                self.transition(SessionState::Failed);
                Err(e)
            }
        }
    }
}

async fn sign_in<D: PageDriver>(
    driver: &mut D,
    credentials: &Credentials,
    config: &ScraperConfig,
) -> Result<(), ScrapeError> {
    let selectors = &config.selectors;
    let timeout = config.timeouts.login();

    ::log::info!("Navigating to login page: {}", config.login_url);
    driver.goto(&config.login_url).await.map_err(login_failed)?;
    tokio::time::sleep(config.timeouts.settle()).await;

    let current_url = driver.current_url().await.map_err(login_failed)?;
    if current_url.contains(&config.logged_in_marker) {
        ::log::info!("Already logged in. Current URL: {}", current_url);
        return Ok(());
    }

    let username_input = match driver.wait_for(&selectors.username, timeout).await {
        Ok(element) => element,
        Err(e) if e.is_timeout() => return Err(ScrapeError::LoginPageTimeout),
        Err(e) => return Err(login_failed(e)),
    };
    ::log::info!("Login page loaded, proceeding with login");

    driver
        .send_keys(&username_input, &credentials.username)
        .await
        .map_err(login_failed)?;
    let password_input = driver.find(&selectors.password).await.map_err(login_failed)?;
    driver
        .send_keys(&password_input, &credentials.password)
        .await
        .map_err(login_failed)?;
    let submit = driver.find(&selectors.submit).await.map_err(login_failed)?;
    driver.click(&submit).await.map_err(login_failed)?;

    driver
        .wait_for(&selectors.landmark, timeout)
        .await
        .map_err(login_failed)?;
    ::log::info!("Successfully logged in");
    Ok(())
}

fn login_failed(error: DriverError) -> ScrapeError {
    ScrapeError::LoginFailed(error.to_string())
}
