//! Integration tests for the page-analysis engine
//!
//! These tests use wiremock to serve pages and link targets and check the
//! engine's counts, broken-link classification and liveness caching.

use sumi_sonar::config::{Config, EngineConfig, HubConfig, StorageConfig, UserAgentConfig};
use sumi_sonar::crawler::AnalysisError;
use sumi_sonar::{PageAnalyzer, WebAnalyzer};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config() -> Config {
    Config {
        engine: EngineConfig {
            preflight_timeout_secs: 5,
            fetch_timeout_secs: 5,
            probe_timeout_secs: 5,
            max_concurrent_probes: 4,
            cache_ttl_secs: 0,
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

async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_head(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_page_analysis() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r##"<!DOCTYPE html>
        <html><head><title>  Home  </title></head><body>
        <h1>Welcome</h1><h2>One</h2><h2>Two</h2>
        <form action="/login"><input type="text" name="u"><input type="password" name="p"></form>
        <a href="/ok">OK</a>
        <a href="/missing">Missing</a>
        <a href="/ok">OK again</a>
        <a href="mailto:someone@example.com">Mail</a>
        <a href="#top">Top</a>
        <a href="javascript:void(0)">JS</a>
        <a href="http://127.0.0.1:9/down">Down</a>
        </body></html>"##
            .to_string(),
    )
    .await;
    mount_head(&mock_server, "/ok", 200).await;
    mount_head(&mock_server, "/missing", 404).await;

    let analyzer = WebAnalyzer::new(&create_test_config()).unwrap();
    let analysis = analyzer
        .analyze(&format!("{}/", base_url))
        .await
        .expect("analysis should succeed");

    assert_eq!(analysis.html_version, "HTML5");
    assert_eq!(analysis.title, "Home");
    assert_eq!(analysis.heading_counts.get("H1"), Some(&1));
    assert_eq!(analysis.heading_counts.get("H2"), Some(&2));
    assert!(analysis.has_login_form);

    assert_eq!(analysis.total_links, 3);
    assert_eq!(analysis.internal_links, 2);
    assert_eq!(analysis.external_links, 1);
    assert_eq!(
        analysis.internal_links + analysis.external_links,
        analysis.total_links
    );

    assert_eq!(analysis.broken_links, 2);
    assert_eq!(analysis.broken_link_detail.len(), 2);

    let missing = format!("{}/missing", base_url);
    let mut broken: Vec<(String, u16)> = analysis
        .broken_link_detail
        .iter()
        .map(|d| (d.url.clone(), d.status_code))
        .collect();
    broken.sort();
    let mut expected = vec![("http://127.0.0.1:9/down".to_string(), 0), (missing, 404)];
    expected.sort();
    assert_eq!(broken, expected);
    assert!(broken.iter().all(|(url, _)| !url.starts_with("mailto:")));
}

#[tokio::test]
async fn test_preflight_error_status_still_analyzes() {
    let mock_server = MockServer::start().await;

    mount_head(&mock_server, "/", 405).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>hi</body></html>"))
        .mount(&mock_server)
        .await;

    let analyzer = WebAnalyzer::new(&create_test_config()).unwrap();
    let analysis = analyzer
        .analyze(&format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(analysis.html_version, "Unknown");
    assert_eq!(analysis.title, "");
    assert_eq!(analysis.total_links, 0);
    assert!(analysis.broken_link_detail.is_empty());
}

#[tokio::test]
async fn test_unreachable_target_fails() {
    let analyzer = WebAnalyzer::new(&create_test_config()).unwrap();
    let result = analyzer.analyze("http://127.0.0.1:9/").await;

    match result {
        Err(AnalysisError::Unreachable { url, .. }) => assert_eq!(url, "http://127.0.0.1:9/"),
        other => panic!("expected Unreachable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_page_fails_whole_analysis() {
    let mock_server = MockServer::start().await;

    mount_head(&mock_server, "/gone", 200).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<a href=\"/x\">x</a>"))
        .mount(&mock_server)
        .await;

    let analyzer = WebAnalyzer::new(&create_test_config()).unwrap();
    let result = analyzer
        .analyze(&format!("{}/gone", mock_server.uri()))
        .await;

    assert!(matches!(
        result,
        Err(AnalysisError::HttpStatus {
            status_code: 404,
            ..
        })
    ));
    assert_eq!(analyzer.liveness().cache_len(), 0);
}

#[tokio::test]
async fn test_liveness_verdicts_are_cached_across_invocations() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/linked">a</a><a href="/linked">b</a></body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("HEAD"))
        .and(path("/linked"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let analyzer = WebAnalyzer::new(&create_test_config()).unwrap();
    let target = format!("{}/", mock_server.uri());

    let first = analyzer.analyze(&target).await.unwrap();
    let second = analyzer.analyze(&target).await.unwrap();

    assert_eq!(first.total_links, 1);
    assert_eq!(first.broken_link_detail, second.broken_link_detail);
    assert_eq!(second.broken_link_detail[0].status_code, 500);
    assert_eq!(analyzer.liveness().cache_len(), 1);
}

#[tokio::test]
async fn test_link_checks_send_user_agent() {
    let mock_server = MockServer::start().await;
    let config = create_test_config();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/needs-ua">a</a></body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("HEAD"))
        .and(path("/needs-ua"))
        .and(header(
            "user-agent",
            config.user_agent.header_value().as_str(),
        ))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let analyzer = WebAnalyzer::new(&config).unwrap();
    let analysis = analyzer
        .analyze(&format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(analysis.total_links, 1);
    assert_eq!(analysis.broken_links, 0);
}
