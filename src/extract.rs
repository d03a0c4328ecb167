use crate::config::SelectorConfig;
use crate::driver::PageDriver;
use crate::error::DriverError;
use crate::record::{JobRecord, NOT_AVAILABLE, normalize_field};
use url::Url;

/// Position of a card, used to label log lines
#[derive(Debug, Clone, Copy)]
pub struct CardPosition {
    /// Zero-based page index
    pub page: usize,
    /// Zero-based card index within the page
    pub card: usize,
}

impl std::fmt::Display for CardPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Page {}, card {}", self.page + 1, self.card + 1)
    }
}

/// Read one result card into a [`JobRecord`]
///
/// The title/link target, the company and the location are looked up
/// independently. A failed lookup leaves only its own fields at
/// [`NOT_AVAILABLE`]; it is logged and never returned to the caller.
pub async fn extract_card<D: PageDriver>(
    driver: &mut D,
    card: &D::Element,
    selectors: &SelectorConfig,
    page_url: Option<&Url>,
    position: CardPosition,
) -> JobRecord {
    let mut record = JobRecord::default();

    match driver.find_in(card, &selectors.title_link).await {
        Ok(anchor) => {
            match driver.text(&anchor).await {
                Ok(text) => record.title = normalize_field(&text),
                Err(e) => ::log::error!("{}: Title extraction error: {}", position, e),
            }
            match driver.attr(&anchor, "href").await {
                Ok(Some(href)) => record.link = resolve_link(&href, page_url),
                Ok(None) => ::log::error!("{}: Link extraction error: no href", position),
                Err(e) => ::log::error!("{}: Link extraction error: {}", position, e),
            }
            ::log::debug!("{}: Extracted title: {}", position, record.title);
            ::log::debug!("{}: Extracted link: {}", position, record.link);
        }
        Err(e) => ::log::error!("{}: Title/Link extraction error: {}", position, e),
    }

    match read_text(driver, card, &selectors.company).await {
        Ok(company) => {
            record.company = company;
            ::log::debug!("{}: Extracted company: {}", position, record.company);
        }
        Err(e) => ::log::error!("{}: Company extraction error: {}", position, e),
    }

    match read_text(driver, card, &selectors.location).await {
        Ok(location) => {
            record.location = location;
            ::log::debug!("{}: Extracted location: {}", position, record.location);
        }
        Err(e) => ::log::error!("{}: Location extraction error: {}", position, e),
    }

    record
}

async fn read_text<D: PageDriver>(
    driver: &mut D,
    card: &D::Element,
    selector: &str,
) -> Result<String, DriverError> {
    let element = driver.find_in(card, selector).await?;
    let text = driver.text(&element).await?;
    Ok(normalize_field(&text))
}

/// Make an href absolute against the page it was found on
fn resolve_link(href: &str, page_url: Option<&Url>) -> String {
    let href = href.trim();
    if href.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    match Url::parse(href) {
        Ok(absolute) => absolute.to_string(),
        Err(_) => page_url
            .and_then(|base| base.join(href).ok())
            .map(|resolved| resolved.to_string())
            .unwrap_or_else(|| href.to_string()),
    }
}
