pub mod snapshot;
pub mod webdriver;

pub use snapshot::SnapshotDriver;
pub use webdriver::WebDriverSession;

use crate::error::DriverError;
use async_trait::async_trait;
use std::time::Duration;

/// Capabilities the pipeline needs from a rendered page
///
/// One driver is one browser session with a single cursor. Every method takes
/// `&mut self`, so a driver can only be used by one stage at a time.
#[async_trait]
pub trait PageDriver: Send {
    /// Handle to an element of the current page
    type Element: Clone + Send + Sync;

    /// Navigate to a URL
    async fn goto(&mut self, url: &str) -> Result<(), DriverError>;

    /// Location of the current page
    async fn current_url(&mut self) -> Result<String, DriverError>;

    /// Find the first element matching a CSS selector
    async fn find(&mut self, selector: &str) -> Result<Self::Element, DriverError>;

    /// Find the first descendant of `parent` matching a CSS selector
    async fn find_in(
        &mut self,
        parent: &Self::Element,
        selector: &str,
    ) -> Result<Self::Element, DriverError>;

    /// Find every descendant of `parent` matching a CSS selector
    async fn find_all_in(
        &mut self,
        parent: &Self::Element,
        selector: &str,
    ) -> Result<Vec<Self::Element>, DriverError>;

    /// Wait until an element matching the selector is present
    ///
    /// Fails with [`DriverError::Timeout`] once `timeout` elapses.
    async fn wait_for(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError>;

    /// Wait until an element matching the selector is present and can be clicked
    async fn wait_for_clickable(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError>;

    /// Visible text of an element
    async fn text(&mut self, element: &Self::Element) -> Result<String, DriverError>;

    /// Attribute value of an element, `None` if the attribute is absent
    async fn attr(
        &mut self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    /// Type text into an element
    async fn send_keys(&mut self, element: &Self::Element, text: &str) -> Result<(), DriverError>;

    async fn click(&mut self, element: &Self::Element) -> Result<(), DriverError>;

    /// Scroll the window to the bottom of the document
    async fn scroll_to_bottom(&mut self) -> Result<(), DriverError>;

    /// End the browser session
    async fn close(&mut self) -> Result<(), DriverError>;
}

#[async_trait]
impl<T: PageDriver + ?Sized> PageDriver for &mut T {
    type Element = T::Element;

    async fn goto(&mut self, url: &str) -> Result<(), DriverError> {
        (**self).goto(url).await
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        (**self).current_url().await
    }

    async fn find(&mut self, selector: &str) -> Result<Self::Element, DriverError> {
        (**self).find(selector).await
    }

    async fn find_in(
        &mut self,
        parent: &Self::Element,
        selector: &str,
    ) -> Result<Self::Element, DriverError> {
        (**self).find_in(parent, selector).await
    }

    async fn find_all_in(
        &mut self,
        parent: &Self::Element,
        selector: &str,
    ) -> Result<Vec<Self::Element>, DriverError> {
        (**self).find_all_in(parent, selector).await
    }

    async fn wait_for(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError> {
        (**self).wait_for(selector, timeout).await
    }

    async fn wait_for_clickable(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError> {
        (**self).wait_for_clickable(selector, timeout).await
    }

    async fn text(&mut self, element: &Self::Element) -> Result<String, DriverError> {
        (**self).text(element).await
    }

    async fn attr(
        &mut self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        (**self).attr(element, name).await
    }

    async fn send_keys(&mut self, element: &Self::Element, text: &str) -> Result<(), DriverError> {
        (**self).send_keys(element, text).await
    }

    async fn click(&mut self, element: &Self::Element) -> Result<(), DriverError> {
        (**self).click(element).await
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), DriverError> {
        (**self).scroll_to_bottom().await
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        (**self).close().await
    }
}
