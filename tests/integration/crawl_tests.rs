//! Integration tests for the crawler
//!
//! These tests use wiremock to serve directory index pages and test
//! the full crawl cycle end-to-end.

use dirmap::config::Config;
use dirmap::crawler::{crawl, CrawlMode, CrawlSettings, Crawler, RetryPolicy};
use dirmap::output::{load_statistics, load_tree, save_tree};
use dirmap::tree::{FolderNode, TreeNode};
use dirmap::{DirmapError, StatsSnapshot};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders an nginx-style autoindex page
fn listing(entries: &[(&str, &str)]) -> String {
    let mut html = String::from(
        "<html><head><title>Index of /</title></head><body><h1>Index of /</h1><hr><pre>\
         <a href=\"../\">../</a>\n",
    );
    for (href, trailing) in entries {
        html.push_str(&format!("<a href=\"{}\">{}</a>{}\n", href, href, trailing));
    }
    html.push_str("</pre><hr></body></html>");
    html
}

async fn mount_listing(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = format!("{}/", server.uri());
    config.crawler.timeout_secs = 5;
    config.crawler.max_retries = 1;
    config.crawler.retry_delay_ms = 0;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

fn not_interrupted() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

/// A small media library three levels deep
async fn mount_library(server: &MockServer) {
    mount_listing(
        server,
        "/",
        listing(&[
            ("Movies/", "                15-Jan-2024 14:30       -"),
            ("Series/", "                16-Jan-2024 09:00       -"),
            ("notes.txt", "              17-Jan-2024 10:00   4 KB"),
        ]),
    )
    .await;
    mount_listing(
        server,
        "/Movies/",
        listing(&[
            ("Am%C3%A9lie%20(2001)/", "  15-Jan-2024 14:30       -"),
            ("poster.jpg", "             15-Jan-2024 14:31   220 KB"),
        ]),
    )
    .await;
    mount_listing(
        server,
        "/Movies/Am%C3%A9lie%20(2001)/",
        listing(&[("movie.mkv", "  15-Jan-2024 14:32   1.4 GB")]),
    )
    .await;
    mount_listing(
        server,
        "/Series/",
        listing(&[("S01/", ""), ("S02/", "")]),
    )
    .await;
    mount_listing(
        server,
        "/Series/S01/",
        listing(&[("e01.mkv", "  700 MB"), ("e02.mkv", "  702 MB")]),
    )
    .await;
    mount_listing(server, "/Series/S02/", listing(&[("e01.mkv", "  690 MB")])).await;
}

#[tokio::test]
async fn test_end_to_end_small_site() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/", mock_server.uri());

    mount_listing(
        &mock_server,
        "/",
        listing(&[("a.txt", "    10 MB"), ("SubDir/", "    -")]),
    )
    .await;
    mount_listing(
        &mock_server,
        "/SubDir/",
        listing(&[("b.mkv", "    2024-01-15 14:30    1.4 GB")]),
    )
    .await;

    let config = create_test_config(&mock_server);
    let report = crawl(&config, not_interrupted()).await.expect("crawl failed");

    let mut sub = FolderNode {
        url: format!("{}SubDir/", base_url),
        ..FolderNode::default()
    };
    sub.insert_child(
        "b.mkv",
        TreeNode::file(
            format!("{}SubDir/b.mkv", base_url),
            Some("1.4 GB".to_string()),
            Some("2024-01-15 14:30".to_string()),
        ),
    );
    let mut root = FolderNode {
        url: base_url.clone(),
        ..FolderNode::default()
    };
    root.insert_child(
        "a.txt",
        TreeNode::file(format!("{}a.txt", base_url), Some("10 MB".to_string()), None),
    );
    root.insert_child("SubDir", TreeNode::Folder(sub));

    assert_eq!(report.tree, TreeNode::Folder(root));
    assert_eq!(
        report.stats,
        StatsSnapshot {
            folders_visited: 2,
            files_found: 2,
            errors_encountered: 0
        }
    );
}

#[tokio::test]
async fn test_root_timeout_yields_error_tree() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing(&[("a.txt", "")]))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(4)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server);
    config.crawler.timeout_secs = 1;
    config.crawler.max_retries = 3;

    let report = crawl(&config, not_interrupted()).await.expect("crawl failed");

    assert!(report.tree.is_error());
    assert_eq!(report.tree.error(), Some("Timeout"));
    assert!(report.tree.children().unwrap().is_empty());
    assert_eq!(
        report.stats,
        StatsSnapshot {
            folders_visited: 0,
            files_found: 0,
            errors_encountered: 1
        }
    );
}

#[tokio::test]
async fn test_failing_subfolders_become_error_nodes() {
    let mock_server = MockServer::start().await;

    mount_listing(
        &mock_server,
        "/",
        listing(&[("missing/", ""), ("broken/", ""), ("fine/", "")]),
    )
    .await;
    mount_listing(&mock_server, "/fine/", listing(&[("ok.txt", "  1 KB")])).await;

    Mock::given(method("GET"))
        .and(path("/missing/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let report = crawl(&config, not_interrupted()).await.expect("crawl failed");

    let missing = report.tree.find(&["missing"]).unwrap();
    assert_eq!(missing.error(), Some("HTTP 404"));
    assert!(missing.children().unwrap().is_empty());

    let broken = report.tree.find(&["broken"]).unwrap();
    assert_eq!(broken.error(), Some("HTTP 500"));

    assert!(report.tree.find(&["fine", "ok.txt"]).unwrap().is_file());
    assert_eq!(report.stats.errors_encountered, 2);
    assert_eq!(report.stats.folders_visited, 2);
    assert_eq!(report.stats.files_found, 1);
}

#[tokio::test]
async fn test_parallel_and_sequential_trees_match() {
    let mock_server = MockServer::start().await;
    mount_library(&mock_server).await;

    let config = create_test_config(&mock_server);
    let root = Url::parse(&config.crawler.base_url).unwrap();

    let mut results = Vec::new();
    for (mode, workers) in [
        (CrawlMode::Sequential, 1),
        (CrawlMode::Parallel, 1),
        (CrawlMode::Parallel, 2),
        (CrawlMode::Parallel, 8),
    ] {
        let settings = CrawlSettings {
            mode,
            max_concurrency: workers,
            ..CrawlSettings::from_config(&config.crawler)
        };
        let crawler = Crawler::new(
            crawler_fetcher(&config),
            Arc::new(dirmap::crawler::HtmlListingExtractor),
            settings,
        );
        assert_eq!(crawler.settings().mode, mode);

        let report = crawler.crawl(&root).await.expect("crawl failed");
        results.push((serde_json::to_string(&report.tree).unwrap(), report.stats));
    }

    let (expected_json, expected_stats) = &results[0];
    for (json, stats) in &results[1..] {
        assert_eq!(json, expected_json);
        assert_eq!(stats, expected_stats);
    }
    assert_eq!(
        *expected_stats,
        StatsSnapshot {
            folders_visited: 6,
            files_found: 6,
            errors_encountered: 0
        }
    );
}

fn crawler_fetcher(config: &Config) -> Arc<dyn dirmap::crawler::Fetcher> {
    Arc::new(dirmap::crawler::HttpFetcher::from_config(&config.user_agent).unwrap())
}

#[tokio::test]
async fn test_percent_encoded_names_are_decoded() {
    let mock_server = MockServer::start().await;
    mount_library(&mock_server).await;

    let config = create_test_config(&mock_server);
    let report = crawl(&config, not_interrupted()).await.expect("crawl failed");

    let folder = report.tree.find(&["Movies", "Amélie (2001)"]).unwrap();
    assert!(folder.is_folder());
    assert!(folder.url().ends_with("/Movies/Am%C3%A9lie%20(2001)/"));

    let movie = folder.find(&["movie.mkv"]).and_then(TreeNode::as_file).unwrap();
    assert_eq!(movie.size.as_deref(), Some("1.4 GB"));
    assert_eq!(movie.last_modified.as_deref(), Some("15-Jan-2024 14:32"));
}

#[tokio::test]
async fn test_exported_tree_round_trips() {
    let mock_server = MockServer::start().await;
    mount_library(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let tree_path = dir.path().join("tree.json");

    let config = create_test_config(&mock_server);
    let report = crawl(&config, not_interrupted()).await.expect("crawl failed");
    save_tree(&report.tree, &tree_path).unwrap();

    let loaded = load_tree(&tree_path).unwrap();
    assert_eq!(loaded, report.tree);

    let stats = load_statistics(&tree_path).unwrap();
    assert_eq!(stats.folders, report.stats.folders_visited);
    assert_eq!(stats.files, report.stats.files_found);
    assert_eq!(stats.errors, 0);
}

#[tokio::test]
async fn test_interrupted_crawl_returns_error() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, "/", listing(&[("Movies/", ""), ("Series/", "")])).await;
    Mock::given(method("GET"))
        .and(path("/Movies/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Series/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let result = crawl(&config, Arc::new(AtomicBool::new(true))).await;

    assert!(matches!(result, Err(DirmapError::Interrupted)));
}

#[tokio::test]
async fn test_retry_policy_from_config() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server);

    let settings = CrawlSettings::from_config(&config.crawler);
    assert_eq!(settings.retry, RetryPolicy::new(1, Duration::ZERO));
    assert_eq!(settings.retry.max_attempts(), 2);
    assert_eq!(settings.timeout, Duration::from_secs(5));
}
