//! Integration tests for the crawl orchestrator
//!
//! These tests use wiremock to create mock HTTP servers and drive full jobs
//! through the service: storage, engine and notification hub together.

use std::sync::Arc;
use std::time::Duration;
use sumi_sonar::config::{Config, EngineConfig, HubConfig, StorageConfig, UserAgentConfig};
use sumi_sonar::hub::{Client, Hub};
use sumi_sonar::state::{CrawlJob, CrawlStatus, UserId};
use sumi_sonar::storage::{SqliteStorage, StorageError};
use sumi_sonar::{CrawlService, SonarError, WebAnalyzer};
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config() -> Config {
    Config {
        engine: EngineConfig {
            preflight_timeout_secs: 5,
            fetch_timeout_secs: 5,
            probe_timeout_secs: 5,
            max_concurrent_probes: 8,
            cache_ttl_secs: 60,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestSonar".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        storage: StorageConfig {
            database_path: ":memory:".to_string(),
        },
        hub: HubConfig::default(),
    }
}

fn create_service() -> (CrawlService, Arc<Hub>) {
    let config = create_test_config();
    let storage = SqliteStorage::in_memory().expect("Failed to open storage");
    let analyzer = WebAnalyzer::new(&config).expect("Failed to build analyzer");
    let hub = Arc::new(Hub::new());
    let service = CrawlService::new(Arc::new(storage), Arc::new(analyzer), hub.clone());
    (service, hub)
}

fn connect(hub: &Hub, user_id: UserId) -> mpsc::Receiver<Vec<u8>> {
    let (client, receiver) = Client::new(user_id, 16);
    hub.register(client);
    receiver
}

async fn next_update(session: &mut mpsc::Receiver<Vec<u8>>) -> CrawlJob {
    let payload = tokio::time::timeout(Duration::from_secs(10), session.recv())
        .await
        .expect("Timed out waiting for notification")
        .expect("Session closed");
    serde_json::from_slice(&payload).expect("Malformed notification")
}

/// Mounts a reachable home page with two internal links and one mailto link
async fn mount_site(mock_server: &MockServer) {
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<!DOCTYPE html><html><head><title>Example</title></head><body>
                    <h1>Example</h1>
                    <a href="/about">About</a>
                    <a href="/contact">Contact</a>
                    <a href="mailto:hello@example.test">Mail us</a>
                    </body></html>"#,
                )
                .insert_header("content-type", "text/html"),
        )
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_start_crawl_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let (service, hub) = create_service();
    let mut session = connect(&hub, 1);

    let job = service
        .start_crawl(1, &mock_server.uri())
        .await
        .expect("Failed to start crawl");
    assert_eq!(job.status, CrawlStatus::Pending);
    assert_eq!(job.total_links, 0);

    let processing = next_update(&mut session).await;
    assert_eq!(processing.id, job.id);
    assert_eq!(processing.status, CrawlStatus::Processing);

    let finished = next_update(&mut session).await;
    assert_eq!(finished.status, CrawlStatus::Completed);
    assert_eq!(finished.title, "Example");
    assert_eq!(finished.html_version, "HTML5");
    assert_eq!(finished.total_links, 2);
    assert_eq!(finished.internal_links, 2);
    assert_eq!(finished.external_links, 0);
    assert_eq!(finished.broken_links, 0);
    assert!(finished
        .broken_link_detail
        .iter()
        .all(|detail| !detail.url.starts_with("mailto:")));
    assert!(finished.error_message.is_none());
    assert!(finished.has_consistent_counts());

    while service.is_running(job.id) {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let stored = service.get_crawl_result(job.id, 1).await.unwrap();
    assert_eq!(stored.status, CrawlStatus::Completed);
    assert_eq!(stored.total_links, 2);
    assert_eq!(stored.heading_counts.get("H1"), Some(&1));
}

#[tokio::test]
async fn test_unreachable_page_fails_job() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let (service, hub) = create_service();
    let mut session = connect(&hub, 1);

    let job = service.start_crawl(1, &mock_server.uri()).await.unwrap();

    assert_eq!(next_update(&mut session).await.status, CrawlStatus::Processing);
    let failed = next_update(&mut session).await;
    assert_eq!(failed.id, job.id);
    assert_eq!(failed.status, CrawlStatus::Failed);
    assert!(failed.error_message.as_deref().unwrap_or("").contains("500"));
    assert_eq!(failed.total_links, 0);
    assert!(failed.broken_link_detail.is_empty());
}

#[tokio::test]
async fn test_rerun_completed_job() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let (service, hub) = create_service();
    let mut session = connect(&hub, 1);

    let job = service.start_crawl(1, &mock_server.uri()).await.unwrap();
    next_update(&mut session).await;
    assert_eq!(next_update(&mut session).await.status, CrawlStatus::Completed);

    while service.is_running(job.id) {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let reset = service.rerun_crawl(job.id, 1).await.unwrap();
    assert_eq!(reset.id, job.id);
    assert_eq!(reset.status, CrawlStatus::Pending);
    assert_eq!(reset.total_links, 0);
    assert!(reset.title.is_empty());

    let statuses = [
        next_update(&mut session).await.status,
        next_update(&mut session).await.status,
        next_update(&mut session).await.status,
    ];
    assert_eq!(
        statuses,
        [
            CrawlStatus::Pending,
            CrawlStatus::Processing,
            CrawlStatus::Completed
        ]
    );

    let history = service.get_crawl_history(1).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_jobs_are_private_to_their_owner() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let (service, hub) = create_service();
    let mut owner_session = connect(&hub, 1);
    let mut other_session = connect(&hub, 2);

    let job = service.start_crawl(1, &mock_server.uri()).await.unwrap();
    next_update(&mut owner_session).await;
    next_update(&mut owner_session).await;

    let is_not_found =
        |err: SonarError| matches!(err, SonarError::Storage(StorageError::JobNotFound { .. }));

    assert!(is_not_found(service.get_crawl_result(job.id, 2).await.unwrap_err()));
    assert!(is_not_found(service.rerun_crawl(job.id, 2).await.unwrap_err()));
    assert!(is_not_found(service.delete_crawl(job.id, 2).await.unwrap_err()));
    assert!(service.get_crawl_history(2).await.unwrap().is_empty());
    assert_eq!(service.delete_crawls_bulk(&[job.id], 2).await.unwrap(), 0);

    assert!(other_session.try_recv().is_err());
    assert!(service.get_crawl_result(job.id, 1).await.is_ok());
}

#[tokio::test]
async fn test_invalid_target_is_rejected_synchronously() {
    let (service, _hub) = create_service();

    let result = service.start_crawl(1, "javascript:alert(1)").await;
    assert!(matches!(result, Err(SonarError::InvalidTarget(_))));
    assert!(service.get_crawl_history(1).await.unwrap().is_empty());
}
