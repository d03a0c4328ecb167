use crate::config::{BrowserConfig, ScraperConfig};
use crate::driver::PageDriver;
use crate::error::DriverError;
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tokio::time::Instant;

/// How often clickability is re-checked while waiting
const CLICKABLE_POLL: Duration = Duration::from_millis(250);

/// WebDriver server ports tried when the configured one refuses a session
const FALLBACK_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// A real browser session driven through a WebDriver server
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Open a browser session on the configured WebDriver server
    pub async fn connect(config: &ScraperConfig) -> Result<Self, DriverError> {
        let capabilities = chrome_capabilities(&config.browser);
        let webdriver_url = config.webdriver_url.as_str();

        let first_error = match connect_to(webdriver_url, &capabilities).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", webdriver_url);
                return Ok(Self { client });
            }
            Err(e) => {
                ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
                e
            }
        };

        for url in FALLBACK_URLS.iter() {
            if *url == webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = connect_to(url, &capabilities).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(Self { client });
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(DriverError::Connect {
            url: webdriver_url.to_string(),
            reason: first_error,
        })
    }
}

async fn connect_to(url: &str, capabilities: &Map<String, Value>) -> Result<Client, String> {
    ClientBuilder::native()
        .capabilities(capabilities.clone())
        .connect(url)
        .await
        .map_err(|e| e.to_string())
}

/// Chrome capabilities for the configured browser options
fn chrome_capabilities(browser: &BrowserConfig) -> Map<String, Value> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
    ];
    if browser.headless {
        args.push("--headless=new".to_string());
    }
    if let Some(dir) = &browser.user_data_dir {
        args.push(format!("--user-data-dir={}", dir));
    }
    args.extend(browser.extra_args.iter().cloned());

    let mut capabilities = Map::new();
    capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    capabilities
}

/// Map a fantoccini lookup failure onto the driver error taxonomy
fn lookup_error(error: CmdError, selector: &str) -> DriverError {
    match error {
        CmdError::WaitTimeout => DriverError::Timeout {
            selector: selector.to_string(),
        },
        e if e.is_no_such_element() => DriverError::NoSuchElement {
            selector: selector.to_string(),
        },
        e => DriverError::Command(e),
    }
}

#[async_trait]
impl PageDriver for WebDriverSession {
    type Element = Element;

    async fn goto(&mut self, url: &str) -> Result<(), DriverError> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn find(&mut self, selector: &str) -> Result<Element, DriverError> {
        self.client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| lookup_error(e, selector))
    }

    async fn find_in(&mut self, parent: &Element, selector: &str) -> Result<Element, DriverError> {
        parent
            .find(Locator::Css(selector))
            .await
            .map_err(|e| lookup_error(e, selector))
    }

    async fn find_all_in(
        &mut self,
        parent: &Element,
        selector: &str,
    ) -> Result<Vec<Element>, DriverError> {
        parent
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| lookup_error(e, selector))
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<Element, DriverError> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .map_err(|e| lookup_error(e, selector))
    }

    async fn wait_for_clickable(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, DriverError> {
        let deadline = Instant::now() + timeout;
        let mut seen = false;

        loop {
            match self.client.find(Locator::Css(selector)).await {
                Ok(element) => {
                    seen = true;
                    if element.is_displayed().await? && element.is_enabled().await? {
                        return Ok(element);
                    }
                }
                Err(e) if e.is_no_such_element() => {}
                Err(e) => return Err(lookup_error(e, selector)),
            }

            if Instant::now() + CLICKABLE_POLL > deadline {
                let selector = selector.to_string();
                return Err(if seen {
                    DriverError::NotClickable { selector }
                } else {
                    DriverError::Timeout { selector }
                });
            }
            tokio::time::sleep(CLICKABLE_POLL).await;
        }
    }

    async fn text(&mut self, element: &Element) -> Result<String, DriverError> {
        Ok(element.text().await?)
    }

    async fn attr(&mut self, element: &Element, name: &str) -> Result<Option<String>, DriverError> {
        Ok(element.attr(name).await?)
    }

    async fn send_keys(&mut self, element: &Element, text: &str) -> Result<(), DriverError> {
        element.send_keys(text).await?;
        Ok(())
    }

    async fn click(&mut self, element: &Element) -> Result<(), DriverError> {
        element.click().await?;
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), DriverError> {
        self.client
            .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.client.clone().close().await?;
        Ok(())
    }
}
