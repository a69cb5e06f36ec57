use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use mirror_engine::{
    run, FetchError, FetchSettings, MirrorConfig, NoopPublisher, PipelineError, PublishError,
    PublishOutcome, Publisher, ReqwestFetcher,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-data";

const PAGE_HTML: &str = r#"<html>
<head><title>Acme Changelog</title></head>
<body>
<h1>Acme Changelog</h1>
<p>Version <strong>1.2</strong> is out.</p>
<img src="/img/shot.png" alt="Screenshot">
<img src="/img/gone.png" alt="Missing">
</body>
</html>"#;

/// Fake publisher capturing every call, per the narrow publish seam.
struct RecordingPublisher {
    dirty: bool,
    calls: Mutex<Vec<String>>,
}

impl RecordingPublisher {
    fn new(dirty: bool) -> Self {
        Self {
            dirty,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Publisher for RecordingPublisher {
    fn status(&self) -> Result<String, PublishError> {
        self.calls.lock().unwrap().push("status".to_string());
        Ok(if self.dirty {
            "?? changelog.md".to_string()
        } else {
            String::new()
        })
    }

    fn stage_all(&self) -> Result<(), PublishError> {
        self.calls.lock().unwrap().push("stage".to_string());
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<(), PublishError> {
        self.calls.lock().unwrap().push(format!("commit {message}"));
        Ok(())
    }

    fn push(&self) -> Result<(), PublishError> {
        self.calls.lock().unwrap().push("push".to_string());
        Ok(())
    }
}

fn test_config(server_uri: &str, output_dir: &Path) -> MirrorConfig {
    let mut config = MirrorConfig::new(format!("{server_uri}/changelog"), output_dir);
    config.now_utc = Arc::new(|| "2025-01-02 03:04:05 UTC".to_string());
    config
}

async fn mount_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/changelog"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE_HTML, "text/html; charset=utf-8"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/shot.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PNG_BYTES, "image/png"))
        .mount(server)
        .await;
    // /img/gone.png stays unmocked and answers 404.
}

#[tokio::test]
async fn a_full_run_produces_document_images_and_shell() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    mount_page(&server).await;

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let config = test_config(&server.uri(), &out);
    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let publisher = RecordingPublisher::new(true);

    let report = run(&config, &fetcher, &publisher).await.expect("run ok");

    // Document with the generated header, title pulled from the page.
    let document = fs::read_to_string(&report.document_path).unwrap();
    let expected_header = format!(
        "# Acme Changelog\n\n\
         Last updated: 2025-01-02 03:04:05 UTC\n\n\
         Source: {}/changelog\n\n\
         ---\n\n",
        server.uri()
    );
    assert!(
        document.starts_with(&expected_header),
        "unexpected document start:\n{document}"
    );
    assert!(document.contains("Version **1.2** is out."));

    // Localized image points at the local copy; failed one keeps its address.
    assert!(document.contains("![Screenshot](images/shot.png)"));
    assert!(document.contains(&format!("![Missing]({}/img/gone.png)", server.uri())));
    assert_eq!(fs::read(out.join("images/shot.png")).unwrap(), PNG_BYTES);
    assert!(!out.join("images/gone.png").exists());
    assert_eq!(report.images.localized(), 1);
    assert_eq!(report.images.failed(), 1);

    // Viewer shell.
    let shell = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(shell.contains("fetch('changelog.md')"));
    assert!(shell.contains("Acme Changelog"));

    // Publish ran through the whole sequence with the timestamped message.
    assert_eq!(report.publish, PublishOutcome::Pushed);
    assert_eq!(
        publisher.calls(),
        vec![
            "status".to_string(),
            "stage".to_string(),
            "commit Update changelog - 2025-01-02 03:04:05 UTC".to_string(),
            "push".to_string(),
        ]
    );
}

#[tokio::test]
async fn a_page_without_images_leaves_the_images_dir_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/changelog"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>T</title></head><body><p>No pictures.</p></body></html>",
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let config = test_config(&server.uri(), &out);
    let fetcher = ReqwestFetcher::new(FetchSettings::default());

    let report = run(&config, &fetcher, &NoopPublisher).await.expect("run ok");

    assert!(report.images.outcomes.is_empty());
    assert!(!out.join("images").exists());
    let document = fs::read_to_string(out.join("changelog.md")).unwrap();
    assert!(!document.contains("images/"));
}

#[tokio::test]
async fn a_failed_page_fetch_aborts_before_touching_the_filesystem() {
    let server = MockServer::start().await;
    // No mock for /changelog; the fetch sees a 404.

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let config = test_config(&server.uri(), &out);
    let fetcher = ReqwestFetcher::new(FetchSettings::default());

    let err = run(&config, &fetcher, &NoopPublisher).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Fetch(FetchError::HttpStatus(404))
    ));
    assert!(!out.exists());
}

#[tokio::test]
async fn unchanged_input_produces_byte_identical_artifacts() {
    let server = MockServer::start().await;
    mount_page(&server).await;

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let config = test_config(&server.uri(), &out);
    let fetcher = ReqwestFetcher::new(FetchSettings::default());

    run(&config, &fetcher, &NoopPublisher).await.expect("first run");
    let first_doc = fs::read(out.join("changelog.md")).unwrap();
    let first_index = fs::read(out.join("index.html")).unwrap();
    let first_image = fs::read(out.join("images/shot.png")).unwrap();

    let report = run(&config, &fetcher, &NoopPublisher).await.expect("second run");

    assert_eq!(fs::read(out.join("changelog.md")).unwrap(), first_doc);
    assert_eq!(fs::read(out.join("index.html")).unwrap(), first_index);
    assert_eq!(fs::read(out.join("images/shot.png")).unwrap(), first_image);
    assert_eq!(report.publish, PublishOutcome::NoChanges);
}
