//! Replay driver over saved HTML documents.
//!
//! Each document stands for one rendered results page. Navigation rewinds to the
//! first document and any click moves to the next one, which is how the "next
//! page" control behaves on a live results feed. Nothing is rendered: waits
//! succeed or time out immediately, because a saved document never changes.

use crate::driver::PageDriver;
use crate::error::DriverError;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const BLANK_DOCUMENT: &str = "<html><head></head><body></body></html>";

/// Element handle: the document it came from plus the selector path to it
///
/// Handles are re-resolved on every call, so a handle taken before a click
/// points at a document that is no longer shown and reads as missing.
#[derive(Debug, Clone)]
pub struct SnapshotElement {
    document: usize,
    path: Vec<(String, usize)>,
}

/// [`PageDriver`] backed by a list of saved HTML pages
#[derive(Debug, Default)]
pub struct SnapshotDriver {
    documents: Vec<String>,
    cursor: usize,
    location: Option<String>,
    redirects: HashMap<String, String>,
    scrolls: usize,
    typed: Vec<String>,
    closed: bool,
}

impl SnapshotDriver {
    /// Create a driver replaying the given documents in order
    pub fn new(documents: Vec<String>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    /// Load documents from files, in the given order
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, DriverError> {
        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            documents.push(std::fs::read_to_string(path)?);
        }
        Ok(Self::new(documents))
    }

    /// Report `to` as the location after navigating to `from`
    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// Index of the document currently shown
    pub fn document_index(&self) -> usize {
        self.cursor
    }

    /// Number of scroll-to-bottom actions performed
    pub fn scroll_count(&self) -> usize {
        self.scrolls
    }

    /// Text typed into inputs, in order
    pub fn typed(&self) -> &[String] {
        &self.typed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn current_document(&self) -> Html {
        let source = self
            .documents
            .get(self.cursor)
            .map(String::as_str)
            .unwrap_or(BLANK_DOCUMENT);
        Html::parse_document(source)
    }

    /// Run `f` against the element a handle points at
    fn with_element<T>(
        &self,
        element: &SnapshotElement,
        f: impl FnOnce(ElementRef<'_>) -> T,
    ) -> Result<T, DriverError> {
        let stale = || DriverError::NoSuchElement {
            selector: describe_path(&element.path),
        };
        if element.document != self.cursor {
            return Err(stale());
        }

        let html = self.current_document();
        let mut current = html.root_element();
        for (selector, index) in &element.path {
            let parsed = parse_selector(selector)?;
            current = current.select(&parsed).nth(*index).ok_or_else(stale)?;
        }
        Ok(f(current))
    }

    /// Handles for every match of `selector` below `parent`
    fn select_all(
        &self,
        parent: &SnapshotElement,
        selector: &str,
    ) -> Result<Vec<SnapshotElement>, DriverError> {
        let parsed = parse_selector(selector)?;
        let matches = self.with_element(parent, |el| el.select(&parsed).count())?;

        Ok((0..matches)
            .map(|index| {
                let mut path = parent.path.clone();
                path.push((selector.to_string(), index));
                SnapshotElement {
                    document: self.cursor,
                    path,
                }
            })
            .collect())
    }

    fn select_first(
        &self,
        parent: &SnapshotElement,
        selector: &str,
    ) -> Result<SnapshotElement, DriverError> {
        self.select_all(parent, selector)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement {
                selector: selector.to_string(),
            })
    }

    fn root(&self) -> SnapshotElement {
        SnapshotElement {
            document: self.cursor,
            path: Vec::new(),
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, DriverError> {
    Selector::parse(selector).map_err(|_| DriverError::InvalidSelector(selector.to_string()))
}

fn describe_path(path: &[(String, usize)]) -> String {
    path.iter()
        .map(|(selector, _)| selector.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl PageDriver for SnapshotDriver {
    type Element = SnapshotElement;

    async fn goto(&mut self, url: &str) -> Result<(), DriverError> {
        let location = self
            .redirects
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());
        ::log::debug!("Snapshot navigation to {} (shown as {})", url, location);
        self.location = Some(location);
        self.cursor = 0;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        Ok(self
            .location
            .clone()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn find(&mut self, selector: &str) -> Result<SnapshotElement, DriverError> {
        let root = self.root();
        self.select_first(&root, selector)
    }

    async fn find_in(
        &mut self,
        parent: &SnapshotElement,
        selector: &str,
    ) -> Result<SnapshotElement, DriverError> {
        self.select_first(parent, selector)
    }

    async fn find_all_in(
        &mut self,
        parent: &SnapshotElement,
        selector: &str,
    ) -> Result<Vec<SnapshotElement>, DriverError> {
        self.select_all(parent, selector)
    }

    async fn wait_for(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<SnapshotElement, DriverError> {
        let root = self.root();
        self.select_first(&root, selector).map_err(|e| match e {
            DriverError::NoSuchElement { selector } => DriverError::Timeout { selector },
            other => other,
        })
    }

    async fn wait_for_clickable(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<SnapshotElement, DriverError> {
        let element = self.wait_for(selector, timeout).await?;
        let disabled = self.with_element(&element, |el| el.value().attr("disabled").is_some())?;
        if disabled {
            return Err(DriverError::NotClickable {
                selector: selector.to_string(),
            });
        }
        Ok(element)
    }

    async fn text(&mut self, element: &SnapshotElement) -> Result<String, DriverError> {
        self.with_element(element, |el| el.text().collect::<Vec<_>>().join(""))
    }

    async fn attr(
        &mut self,
        element: &SnapshotElement,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        self.with_element(element, |el| el.value().attr(name).map(str::to_string))
    }

    async fn send_keys(&mut self, element: &SnapshotElement, text: &str) -> Result<(), DriverError> {
        self.with_element(element, |_| ())?;
        self.typed.push(text.to_string());
        Ok(())
    }

    async fn click(&mut self, element: &SnapshotElement) -> Result<(), DriverError> {
        self.with_element(element, |_| ())?;
        self.cursor += 1;
        ::log::debug!("Snapshot click, now showing document {}", self.cursor);
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), DriverError> {
        self.scrolls += 1;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <ul class="results">
            <li class="card"><a href="/jobs/1">First</a></li>
            <li class="card"><a href="/jobs/2">Second</a></li>
        </ul>
        <button class="next">Next</button>
    </body></html>"#;

    const LAST_PAGE: &str = r#"<html><body>
        <ul class="results"><li class="card"><a href="/jobs/3">Third</a></li></ul>
        <button class="next" disabled>Next</button>
    </body></html>"#;

    #[tokio::test]
    async fn test_find_and_read() {
        let mut driver = SnapshotDriver::new(vec![PAGE.to_string()]);
        driver.goto("https://example.com/search").await.unwrap();

        let list = driver.find("ul.results").await.unwrap();
        let cards = driver.find_all_in(&list, "li.card").await.unwrap();
        assert_eq!(cards.len(), 2);

        let anchor = driver.find_in(&cards[1], "a").await.unwrap();
        assert_eq!(driver.text(&anchor).await.unwrap(), "Second");
        assert_eq!(
            driver.attr(&anchor, "href").await.unwrap().as_deref(),
            Some("/jobs/2")
        );
        assert_eq!(driver.attr(&anchor, "title").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_click_advances_and_stales_handles() {
        let mut driver = SnapshotDriver::new(vec![PAGE.to_string(), LAST_PAGE.to_string()]);
        driver.goto("https://example.com/search").await.unwrap();

        let next = driver
            .wait_for_clickable("button.next", Duration::from_secs(1))
            .await
            .unwrap();
        driver.click(&next).await.unwrap();
        assert_eq!(driver.document_index(), 1);

        assert!(matches!(
            driver.text(&next).await,
            Err(DriverError::NoSuchElement { .. })
        ));
        assert!(matches!(
            driver
                .wait_for_clickable("button.next", Duration::from_secs(1))
                .await,
            Err(DriverError::NotClickable { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_element_times_out() {
        let mut driver = SnapshotDriver::new(vec![PAGE.to_string()]);
        let result = driver.wait_for("div.absent", Duration::from_secs(1)).await;
        assert!(result.unwrap_err().is_timeout());
    }

    #[tokio::test]
    async fn test_redirect_and_invalid_selector() {
        let mut driver = SnapshotDriver::new(vec![PAGE.to_string()])
            .with_redirect("https://example.com/login", "https://example.com/feed/");
        driver.goto("https://example.com/login").await.unwrap();
        assert_eq!(
            driver.current_url().await.unwrap(),
            "https://example.com/feed/"
        );

        assert!(matches!(
            driver.find("ul[[").await,
            Err(DriverError::InvalidSelector(_))
        ));
    }
}
