//! Integration tests for the crawler
//!
//! The first group drives the scheduling engine through a scripted backend so
//! outcomes and timing are under test control. The second group uses wiremock
//! to create mock HTTP servers and test the full crawl cycle end-to-end.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sumi_harvest::config::{Config, CrawlConfig, QueueOrder, UserAgentConfig};
use sumi_harvest::crawler::{crawl, start_crawl, CrawlBackend, Task};
use sumi_harvest::HarvestError;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "https://example.com";

fn url(p: &str) -> Url {
    Url::parse(&format!("{}{}", BASE, p)).unwrap()
}

/// Backend driven by a fixed site map
///
/// Pages return their scripted links; any identifier listed in `failures`
/// fails that many times (with status 500 + attempt number) before succeeding.
#[derive(Default)]
struct ScriptedBackend {
    links: HashMap<String, Vec<Task>>,
    failures: HashMap<String, usize>,
    delay: Duration,
    attempts: Mutex<HashMap<String, usize>>,
    fetches: AtomicUsize,
    downloads: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ScriptedBackend {
    fn page(mut self, p: &str, links: Vec<Task>) -> Self {
        self.links.insert(url(p).to_string(), links);
        self
    }

    fn failing(mut self, p: &str, times: usize) -> Self {
        self.failures.insert(url(p).to_string(), times);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn attempts_for(&self, p: &str) -> usize {
        let attempts = self.attempts.lock().unwrap();
        attempts.get(url(p).as_str()).copied().unwrap_or(0)
    }

    fn total_attempts(&self) -> usize {
        self.attempts.lock().unwrap().values().sum()
    }

    /// Records the attempt and returns an error if it is scripted to fail
    async fn attempt(&self, task: &Task) -> Result<(), HarvestError> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(task.identifier().to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        let fails = self.failures.get(task.identifier()).copied().unwrap_or(0);
        if attempt <= fails {
            return Err(HarvestError::HttpStatus {
                url: task.identifier().to_string(),
                status: 500 + attempt as u16,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CrawlBackend for ScriptedBackend {
    async fn fetch_and_extract(&self, task: &Task) -> Result<Vec<Task>, HarvestError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.attempt(task).await?;
        Ok(self
            .links
            .get(task.identifier())
            .map(|links| fresh(links))
            .unwrap_or_default())
    }

    async fn download_leaf(&self, task: &Task) -> Result<(), HarvestError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.attempt(task).await
    }
}

/// Fresh queued copies of `tasks`
fn fresh(tasks: &[Task]) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| Task::new(t.url().clone(), t.is_leaf()))
        .collect()
}

fn engine_config(worker_count: usize, max_attempts: usize) -> CrawlConfig {
    CrawlConfig {
        worker_count,
        max_attempts,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_each_identifier_processed_once() {
    let images: Vec<Task> = (0..5)
        .map(|i| Task::leaf(url(&format!("/img/{}.png", i))))
        .collect();

    let mut seed_links = Vec::new();
    let mut backend = ScriptedBackend::default().with_delay(Duration::from_millis(2));
    for i in 0..10 {
        let p = format!("/page/{}", i);
        seed_links.push(Task::page(url(&p)));
        // every page links back to the seed and to the same images
        let mut links = fresh(&images);
        links.push(Task::page(url("/")));
        backend = backend.page(&p, links);
    }
    let backend = Arc::new(backend.page("/", seed_links));

    let report = start_crawl(Task::page(url("/")), &engine_config(4, 3), backend.clone()).await;

    assert_eq!(report.admitted, 16);
    assert_eq!(report.dispatched, 16);
    assert_eq!(report.succeeded, 16);
    // the first page to finish admits the images, every other link is a repeat
    assert_eq!(report.duplicates, 10 * 6 - 5);
    assert_eq!(backend.fetches.load(Ordering::SeqCst), 11);
    assert_eq!(backend.downloads.load(Ordering::SeqCst), 5);
    assert_eq!(backend.attempts_for("/"), 1);
    assert_eq!(backend.attempts_for("/img/3.png"), 1);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_concurrency_never_exceeds_worker_count() {
    let leaves = (0..30)
        .map(|i| Task::leaf(url(&format!("/{}.jpg", i))))
        .collect();
    let backend = Arc::new(
        ScriptedBackend::default()
            .page("/", leaves)
            .with_delay(Duration::from_millis(10)),
    );

    let report = start_crawl(Task::page(url("/")), &engine_config(3, 3), backend.clone()).await;

    assert_eq!(report.succeeded, 31);
    assert_eq!(report.peak_in_flight, 3);
    assert!(backend.max_active.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn test_task_succeeds_on_last_allowed_attempt() {
    let backend = Arc::new(
        ScriptedBackend::default()
            .page("/", vec![Task::leaf(url("/flaky.png"))])
            .failing("/flaky.png", 2),
    );

    let report = start_crawl(Task::page(url("/")), &engine_config(2, 3), backend.clone()).await;

    assert_eq!(backend.attempts_for("/flaky.png"), 3);
    assert_eq!(report.retried, 2);
    assert_eq!(report.dispatched, 4);
    assert_eq!(report.succeeded, 2);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_exhausted_task_is_retired_with_first_error() {
    let backend = Arc::new(
        ScriptedBackend::default()
            .page("/", vec![Task::leaf(url("/broken.png"))])
            .failing("/broken.png", usize::MAX),
    );

    let report = start_crawl(Task::page(url("/")), &engine_config(2, 3), backend.clone()).await;

    assert_eq!(backend.attempts_for("/broken.png"), 3);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.abandoned, 0);

    let retired = &report.retired_failed[0];
    assert_eq!(retired.identifier, url("/broken.png").to_string());
    assert_eq!(retired.attempts, 3);
    assert!(retired.first_error.contains("501"), "{}", retired.first_error);
}

#[tokio::test]
async fn test_single_attempt_budget() {
    let backend = Arc::new(ScriptedBackend::default().failing("/", usize::MAX));

    let report = start_crawl(Task::page(url("/")), &engine_config(1, 1), backend.clone()).await;

    assert_eq!(backend.total_attempts(), 1);
    assert_eq!(report.retried, 0);
    assert_eq!(report.failed(), 1);
}

#[tokio::test]
async fn test_retries_do_not_block_other_work() {
    let leaves = (0..6)
        .map(|i| Task::leaf(url(&format!("/{}.gif", i))))
        .collect();
    let backend = Arc::new(
        ScriptedBackend::default()
            .page("/", leaves)
            .failing("/0.gif", usize::MAX)
            .failing("/1.gif", 1),
    );
    let config = CrawlConfig {
        queue_order: QueueOrder::FewestErrorsFirst,
        ..engine_config(2, 4)
    };

    let report = start_crawl(Task::page(url("/")), &config, backend.clone()).await;

    assert_eq!(backend.attempts_for("/0.gif"), 4);
    assert_eq!(backend.attempts_for("/1.gif"), 2);
    assert_eq!(backend.attempts_for("/5.gif"), 1);
    assert_eq!(report.succeeded, 6);
    assert_eq!(report.failed(), 1);
}

#[tokio::test]
async fn test_leaves_and_pages_are_routed() {
    let backend = Arc::new(ScriptedBackend::default().page(
        "/",
        vec![
            Task::leaf(url("/a.png")),
            Task::page(url("/frame")),
            Task::leaf(url("/b.png")),
        ],
    ));

    start_crawl(Task::page(url("/")), &engine_config(2, 3), backend.clone()).await;

    assert_eq!(backend.fetches.load(Ordering::SeqCst), 2);
    assert_eq!(backend.downloads.load(Ordering::SeqCst), 2);
}

/// Pages link to one image; downloading it always panics
struct PanickingDownloads {
    downloads: AtomicUsize,
}

#[async_trait]
impl CrawlBackend for PanickingDownloads {
    async fn fetch_and_extract(&self, task: &Task) -> Result<Vec<Task>, HarvestError> {
        Ok(vec![Task::leaf(task.url().join("/boom.png")?)])
    }

    async fn download_leaf(&self, task: &Task) -> Result<(), HarvestError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        panic!("decoder crashed on {}", task.identifier());
    }
}

#[tokio::test]
async fn test_panicking_download_is_retried_then_retired() {
    let backend = Arc::new(PanickingDownloads {
        downloads: AtomicUsize::new(0),
    });

    let report = start_crawl(Task::page(url("/")), &engine_config(2, 3), backend.clone()).await;

    assert_eq!(backend.downloads.load(Ordering::SeqCst), 3);
    assert_eq!(report.admitted, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed(), 1);
    assert!(!report.is_clean());
    assert!(report.retired_failed[0].first_error.contains("did not finish"));
}

// --- end-to-end over HTTP ---

/// Creates a test configuration writing into `output`
fn create_test_config(output: &std::path::Path, recurse: bool, dry_run: bool) -> Config {
    Config {
        crawler: CrawlConfig {
            worker_count: 4,
            max_attempts: 3,
            recurse_same_host: recurse,
            dry_run,
            output_directory: output.to_path_buf(),
            ..Default::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: Some("https://example.com/contact".to_string()),
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
        },
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><head><title>Test</title></head><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn image() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_bytes(vec![0x89, b'P', b'N', b'G'])
        .insert_header("content-type", "image/png")
}

fn downloaded_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_full_crawl_downloads_images() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<img src="/img/cat.png"><img data-src="dog.png"><img src="/img/cat.png">"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/cat.png"))
        .respond_with(image())
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dog.png"))
        .respond_with(image())
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), false, false);
    let report = crawl(&format!("{}/", mock_server.uri()), &config)
        .await
        .unwrap();

    assert_eq!(report.admitted, 3);
    assert_eq!(report.duplicates, 1);
    assert!(report.is_clean());

    let names = downloaded_names(output.path());
    assert_eq!(names.len(), 2);
    assert!(names[0].starts_with("cat-") && names[0].ends_with(".png"));
    assert!(names[1].starts_with("dog-") && names[1].ends_with(".png"));
}

#[tokio::test]
async fn test_anchors_ignored_without_recursion() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/about">About</a><frame src="/frame">"#))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/frame"))
        .respond_with(html(""))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), false, false);
    let report = crawl(&mock_server.uri(), &config).await.unwrap();

    assert_eq!(report.admitted, 2);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_recursion_follows_same_host_pages() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/about">About</a><a href="https://elsewhere.invalid/">Away</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(r#"<a href="/">Home</a><img src="/team.jpg">"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/team.jpg"))
        .respond_with(image())
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), true, false);
    let report = crawl(&mock_server.uri(), &config).await.unwrap();

    assert_eq!(report.admitted, 3);
    assert!(report.is_clean());
    assert_eq!(downloaded_names(output.path()).len(), 1);
}

#[tokio::test]
async fn test_dry_run_downloads_nothing() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<img src="/a.png"><img src="/b.png">"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a.png"))
        .respond_with(image())
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.png"))
        .respond_with(image())
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), false, true);
    let report = crawl(&mock_server.uri(), &config).await.unwrap();

    assert_eq!(report.succeeded, 3);
    assert!(downloaded_names(output.path()).is_empty());
}

#[tokio::test]
async fn test_failing_leaf_retired_after_max_attempts() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<img src="/broken.png"><img src="/fine.png">"#))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken.png"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fine.png"))
        .respond_with(image())
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), false, false);
    let report = crawl(&mock_server.uri(), &config).await.unwrap();

    assert_eq!(report.failed(), 1);
    assert_eq!(report.retried, 2);
    assert!(report.retired_failed[0].identifier.ends_with("/broken.png"));
    assert!(report.retired_failed[0].first_error.contains("500"));
    assert_eq!(downloaded_names(output.path()).len(), 1);
}

#[tokio::test]
async fn test_unreachable_seed_is_reported() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), false, false);
    let report = crawl(&format!("{}/missing", mock_server.uri()), &config)
        .await
        .unwrap();

    assert_eq!(report.admitted, 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.succeeded, 0);
}
