//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end through the reqwest backend.

use site_sweep::config::Config;
use site_sweep::crawler::{crawl, Crawl};
use site_sweep::output::{
    ReportWriter, TextReportWriter, BROKEN_INTERNAL_FILE, HARDCODED_FILE, INTERNAL_PAGES_FILE,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration seeded at the mock server's root
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::with_start_url(&format!("{}/", base_url));
    config.crawler.max_concurrency = 4;
    config.crawler.request_timeout = 5;
    config.crawler.idle_poll_interval = 10;
    config.crawler.idle_threshold = 5;
    config.crawler.sitemap_passes = 0;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(format!("<html><body>{}</body></html>", body))
}

/// HEAD answers 200 text/html for every path not mounted more specifically
async fn mount_html_heads(server: &MockServer) {
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .with_priority(10)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_html_heads(&server).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/page1">One</a> <a href="page2">Two</a> <a href="/missing">Gone</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(r#"<a href="/">Home</a> <a href="/page2">Two</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(r#"<a href="mailto:someone@example.com">Mail</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(create_test_config(&base_url)).await.unwrap();

    assert!(!report.cancelled);
    assert_eq!(report.unfinished, 0);
    assert_eq!(report.base_domain, "127.0.0.1");
    assert_eq!(report.pages.len(), 4);

    let home = report.page(&format!("{}/", base_url)).unwrap();
    assert_eq!(home.response_code, 200);
    assert_eq!(home.children.len(), 3);

    let page2 = report.page(&format!("{}/page2", base_url)).unwrap();
    assert_eq!(page2.parents.len(), 2);
    assert!(page2.children.is_empty());

    let missing = report.page(&format!("{}/missing", base_url)).unwrap();
    assert_eq!(missing.response_code, 404);
    assert!(!missing.external);
}

#[tokio::test]
async fn test_external_links_are_checked_not_followed() {
    let server = MockServer::start().await;
    let external = MockServer::start().await;
    // Same machine, different registered domain
    let external_url = external.uri().replace("127.0.0.1", "localhost");

    mount_html_heads(&server).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(r#"<a href="{}/elsewhere">Away</a>"#, external_url)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html(r#"<a href="/deeper">Never followed</a>"#))
        .expect(0)
        .mount(&external)
        .await;
    mount_html_heads(&external).await;

    let report = crawl(create_test_config(&server.uri())).await.unwrap();

    assert_eq!(report.pages.len(), 2);
    let away = report.page(&format!("{}/elsewhere", external_url)).unwrap();
    assert!(away.external);
    assert!(away.children.is_empty());
    assert!(report.page(&format!("{}/deeper", external_url)).is_none());
}

#[tokio::test]
async fn test_sitemap_seeds_unlinked_pages() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_html_heads(&server).await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>{base}/orphan</loc></url>
              <url><loc>{base}/</loc></url>
            </urlset>"#,
            base = base_url
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("no links here"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orphan"))
        .respond_with(html("only in the sitemap"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&base_url);
    config.crawler.sitemap_passes = 2;
    let report = crawl(config).await.unwrap();

    assert_eq!(report.sitemap_passes, 2);
    let orphan = report.page(&format!("{}/orphan", base_url)).unwrap();
    assert_eq!(orphan.response_code, 200);
    assert_eq!(orphan.parents.len(), 1);
}

#[tokio::test]
async fn test_redirect_is_followed_and_recorded() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("HEAD"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", base_url).as_str()),
        )
        .mount(&server)
        .await;
    mount_html_heads(&server).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/old">Moved</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(html(""))
        .with_priority(10)
        .mount(&server)
        .await;

    let report = crawl(create_test_config(&base_url)).await.unwrap();

    let old = report.page(&format!("{}/old", base_url)).unwrap();
    assert_eq!(old.response_code, 200);
    assert_eq!(old.effective_url.as_deref(), Some(format!("{}/new", base_url).as_str()));
    assert!(!old.redirected_external);
}

#[tokio::test]
async fn test_reports_written_after_crawl() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("HEAD"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_html_heads(&server).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<a href="{}/about">About</a> <a href="/broken">Broken</a>"#,
            base_url
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(""))
        .mount(&server)
        .await;

    let mut config = create_test_config(&base_url);
    config.policy.hardcoded_domains = vec!["127.0.0.1".to_string()];
    let report = Crawl::new(config).unwrap().run().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let writer = TextReportWriter::new(dir.path());
    writer.write(&report).unwrap();

    let inventory = std::fs::read_to_string(dir.path().join(INTERNAL_PAGES_FILE)).unwrap();
    assert_eq!(inventory.lines().count(), 2);

    let broken = std::fs::read_to_string(dir.path().join(BROKEN_INTERNAL_FILE)).unwrap();
    assert!(broken.contains("Pages with response Code 404 : "));
    assert!(broken.contains(&format!("{}/broken", base_url)));

    let hardcoded = std::fs::read_to_string(dir.path().join(HARDCODED_FILE)).unwrap();
    assert!(hardcoded.contains("Hardcoded links found : 1"));
    assert!(hardcoded.contains(&format!("{}/about", base_url)));
}

#[tokio::test]
async fn test_unreachable_seed_reported_as_no_response() {
    // Bind and release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let report = crawl(create_test_config(&base_url)).await.unwrap();

    assert_eq!(report.pages.len(), 1);
    let seed = report.page(&format!("{}/", base_url)).unwrap();
    assert_eq!(seed.response_code, -1);
    assert!(!seed.failure_message.is_empty());
}

#[tokio::test]
async fn test_redirect_loop_reported_as_no_response() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("HEAD"))
        .and(path("/loop"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/loop", base_url).as_str()),
        )
        .mount(&server)
        .await;
    mount_html_heads(&server).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/loop">Around</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&base_url);
    config.crawler.max_redirects = 3;
    let report = crawl(config).await.unwrap();

    let looped = report.page(&format!("{}/loop", base_url)).unwrap();
    assert_eq!(looped.response_code, -1);
    assert!(looped.failure_message.starts_with("Redirect error"));
}
