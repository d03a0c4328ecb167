use super::scripted::{Card, Login, Page, ScriptedDriver};
use crate::config::{PacingConfig, ScraperConfig, TimeoutConfig};
use crate::error::{ConfigError, ScrapeError};
use crate::orchestrator::Orchestrator;
use crate::pager::StopReason;
use crate::record::NOT_AVAILABLE;
use crate::session::{CredentialSource, Credentials};
use tempfile::TempDir;

/// Defaults with millisecond pacing, so runs finish quickly on a real clock
fn fast_config(dir: &TempDir) -> ScraperConfig {
    ScraperConfig {
        database_path: dir.path().join("jobs.db").to_string_lossy().into_owned(),
        timeouts: TimeoutConfig {
            settle_secs: 0,
            render_secs: 0,
            ..TimeoutConfig::default()
        },
        pacing: PacingConfig {
            scroll_count: 2,
            scroll_delay_min_ms: 1,
            scroll_delay_max_ms: 3,
        },
        ..ScraperConfig::default()
    }
}

fn orchestrator(dir: &TempDir) -> Orchestrator {
    let config = fast_config(dir);
    let credentials =
        Credentials::new(Some("operator@example.com".to_string()), Some("hunter2".to_string()))
            .unwrap();
    Orchestrator::new(config)
        .unwrap()
        .with_credentials(credentials)
}

/// One fully resolvable card and one with only its title anchor
fn two_card_page() -> Page {
    Page::with_cards(vec![
        Card::full(
            "AI Engineer",
            "Acme",
            "New York, NY",
            "https://www.linkedin.com/jobs/view/100/",
        ),
        Card {
            title: Some("ML Developer"),
            link: Some("https://www.linkedin.com/jobs/view/200/"),
            ..Card::default()
        },
    ])
    .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_end_to_end_runs_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(&dir);

        let mut driver = ScriptedDriver::new(Login::Form { accepts: true }, vec![two_card_page()]);
        let report = orchestrator
            .run_with_driver(&mut driver, "AI developer", "United States", 1)
            .await
            .unwrap();

        assert!(driver.closed);
        assert_eq!(
            driver.visits[1],
            "https://www.linkedin.com/jobs/search?keywords=AI+developer&location=United+States"
        );
        assert_eq!(report.jobs.len(), 2);
        assert_eq!(report.jobs[1].title, "ML Developer");
        assert_eq!(report.jobs[1].company, NOT_AVAILABLE);
        assert_eq!(report.stop_reason, StopReason::MaxPages);
        assert_eq!(report.storage.unwrap().inserted, 2);
        assert_eq!(orchestrator.store().count().await.unwrap(), 2);

        let mut driver = ScriptedDriver::new(Login::AlreadySignedIn, vec![two_card_page()]);
        let again = orchestrator
            .run_with_driver(&mut driver, "AI developer", "United States", 1)
            .await
            .unwrap();

        assert_eq!(again.jobs, report.jobs);
        let storage = again.storage.unwrap();
        assert_eq!(storage.inserted, 0);
        assert_eq!(storage.ignored, 2);
        assert_eq!(orchestrator.store().count().await.unwrap(), 2);
        assert!(orchestrator.store().find_duplicate_links().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credentials_abort_before_navigation() {
        let dir = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(fast_config(&dir))
            .unwrap()
            .with_credentials(CredentialSource::Fixed {
                username: None,
                password: Some("hunter2".to_string()),
            });

        let mut driver = ScriptedDriver::new(Login::AlreadySignedIn, vec![two_card_page()]);
        let result = orchestrator
            .run_with_driver(&mut driver, "AI developer", "United States", 1)
            .await;

        assert!(matches!(result, Err(ScrapeError::MissingCredentials)));
        assert!(driver.visits.is_empty());
        assert!(driver.closed);
    }

    #[tokio::test]
    async fn test_login_failure_releases_driver_and_stores_nothing() {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(&dir);

        let mut driver = ScriptedDriver::new(Login::Form { accepts: false }, vec![two_card_page()]);
        let result = orchestrator
            .run_with_driver(&mut driver, "AI developer", "United States", 1)
            .await;

        assert!(matches!(result, Err(ScrapeError::LoginFailed(_))));
        assert!(driver.closed);
        assert!(driver.container_waits.is_empty());
        assert_eq!(orchestrator.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fatal_paging_error_discards_records() {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(&dir);

        let mut driver = ScriptedDriver::new(Login::AlreadySignedIn, vec![two_card_page()]);
        driver.fail_scroll = true;
        let result = orchestrator
            .run_with_driver(&mut driver, "AI developer", "United States", 3)
            .await;

        assert!(matches!(result, Err(ScrapeError::Driver(_))));
        assert!(driver.closed);
        assert_eq!(orchestrator.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_early_termination_returns_partial_results() {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(&dir);
        let first = Page::with_cards(vec![Card::full(
            "Backend Engineer",
            "Globex",
            "Remote",
            "https://www.linkedin.com/jobs/view/300/",
        )]);

        let mut driver =
            ScriptedDriver::new(Login::AlreadySignedIn, vec![first, Page::unrendered()]);
        let report = orchestrator
            .run_with_driver(&mut driver, "backend", "Remote", 5)
            .await
            .unwrap();

        assert_eq!(report.jobs.len(), 1);
        assert_eq!(report.stop_reason, StopReason::ContainerTimeout { page: 1 });
        assert_eq!(orchestrator.store().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unresolved_links_returned_but_not_stored() {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(&dir);
        let page = Page::with_cards(vec![
            Card {
                company: Some("Umbrella"),
                ..Card::default()
            },
            Card {
                company: Some("Hooli"),
                ..Card::default()
            },
        ])
        .last();

        let mut driver = ScriptedDriver::new(Login::AlreadySignedIn, vec![page]);
        let report = orchestrator
            .run_with_driver(&mut driver, "anything", "anywhere", 1)
            .await
            .unwrap();

        assert_eq!(report.jobs.len(), 2);
        assert!(report.jobs.iter().all(|job| job.link == NOT_AVAILABLE));
        assert_eq!(report.storage.unwrap().unresolved, 2);
        assert_eq!(orchestrator.store().count().await.unwrap(), 0);
    }

    #[test]
    fn test_config_without_scrolling_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut config = fast_config(&dir);
        config.pacing.scroll_count = 0;

        assert!(matches!(
            Orchestrator::new(config),
            Err(ConfigError::Invalid(_))
        ));
    }
}
