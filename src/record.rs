use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Placeholder stored in a field that could not be extracted
pub const NOT_AVAILABLE: &str = "N/A";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// One job listing as scraped from a result card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Job title
    pub title: String,

    /// Hiring company
    pub company: String,

    /// Location as displayed on the card
    pub location: String,

    /// Absolute URL of the listing; the natural key in the store
    pub link: String,
}

impl Default for JobRecord {
    fn default() -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            company: NOT_AVAILABLE.to_string(),
            location: NOT_AVAILABLE.to_string(),
            link: NOT_AVAILABLE.to_string(),
        }
    }
}

impl JobRecord {
    /// Create a record from already-normalized field values
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            link: link.into(),
        }
    }

    /// A record is worth keeping when it names either a title or a company
    pub fn is_retained(&self) -> bool {
        self.title != NOT_AVAILABLE || self.company != NOT_AVAILABLE
    }

    /// Whether the listing link was resolved
    pub fn has_link(&self) -> bool {
        self.link != NOT_AVAILABLE
    }
}

/// Trim and collapse whitespace; empty text becomes [`NOT_AVAILABLE`]
pub fn normalize_field(raw: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(raw.trim(), " ");
    if collapsed.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        collapsed.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_rule() {
        let empty = JobRecord::default();
        assert!(!empty.is_retained());

        let title_only = JobRecord::new("Engineer", NOT_AVAILABLE, NOT_AVAILABLE, NOT_AVAILABLE);
        assert!(title_only.is_retained());

        let company_only = JobRecord::new(NOT_AVAILABLE, "Acme", NOT_AVAILABLE, NOT_AVAILABLE);
        assert!(company_only.is_retained());
    }

    #[test]
    fn test_normalize_field() {
        assert_eq!(normalize_field("  Senior   Rust\n Engineer "), "Senior Rust Engineer");
        assert_eq!(normalize_field("   "), NOT_AVAILABLE);
        assert_eq!(normalize_field(""), NOT_AVAILABLE);
        assert_eq!(normalize_field("Remote"), "Remote");
    }
}
