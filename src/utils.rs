use crate::config::PacingConfig;
use rand::Rng;
use std::time::Duration;
use url::Url;

/// Draw one scroll delay uniformly from the configured bounds
pub fn scroll_delay(pacing: &PacingConfig) -> Duration {
    let min = pacing.scroll_delay_min_ms;
    let max = pacing.scroll_delay_max_ms.max(min);
    Duration::from_millis(rand::rng().random_range(min..=max))
}

/// Build the job search URL with the query and location as encoded parameters
pub fn build_search_url(base: &str, query: &str, location: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(base, &[("keywords", query), ("location", location)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_delay_within_bounds() {
        let pacing = PacingConfig {
            scroll_count: 5,
            scroll_delay_min_ms: 2000,
            scroll_delay_max_ms: 3000,
        };
        for _ in 0..100 {
            let delay = scroll_delay(&pacing);
            assert!(delay >= Duration::from_millis(2000));
            assert!(delay <= Duration::from_millis(3000));
        }
    }

    #[test]
    fn test_build_search_url_encodes_parameters() {
        let url = build_search_url(
            "https://www.linkedin.com/jobs/search",
            "AI developer",
            "United States",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.linkedin.com/jobs/search?keywords=AI+developer&location=United+States"
        );

        let url = build_search_url("https://example.com/search", "C++ & Rust", "Zürich").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("keywords".to_string(), "C++ & Rust".to_string()));
        assert_eq!(pairs[1], ("location".to_string(), "Zürich".to_string()));
    }

    #[test]
    fn test_build_search_url_rejects_bad_base() {
        assert!(build_search_url("not a url", "q", "l").is_err());
    }
}
