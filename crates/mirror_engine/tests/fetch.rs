use std::time::Duration;

use mirror_engine::{FetchError, FetchSettings, Fetcher, ReqwestFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetches_and_decodes_an_html_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/changelog"))
        .and(header(
            "user-agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/changelog", server.uri());

    let page = fetcher.fetch_page(&url).await.expect("fetch ok");
    assert_eq!(page.html, "<html>ok</html>");
    assert_eq!(page.final_url, url);
    assert_eq!(page.encoding, "UTF-8");
    assert!(page.content_type.unwrap().starts_with("text/html"));
}

#[tokio::test]
async fn decodes_the_charset_from_the_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latin1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"caf\xe9".to_vec(), "text/html; charset=ISO-8859-1"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/latin1", server.uri());

    let page = fetcher.fetch_page(&url).await.expect("fetch ok");
    assert_eq!(page.html, "caf\u{e9}");
    assert!(
        page.encoding.eq_ignore_ascii_case("ISO-8859-1")
            || page.encoding.eq_ignore_ascii_case("windows-1252")
    );
}

#[tokio::test]
async fn non_success_status_is_a_fatal_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/missing", server.uri());

    let err = fetcher.fetch_page(&url).await.unwrap_err();
    assert_eq!(err, FetchError::HttpStatus(404));
}

#[tokio::test]
async fn times_out_on_a_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let url = format!("{}/slow", server.uri());

    let err = fetcher.fetch_page(&url).await.unwrap_err();
    assert_eq!(err, FetchError::Timeout);
}

#[tokio::test]
async fn rejects_a_response_over_the_byte_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .insert_header("Content-Length", "11")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let url = format!("{}/large", server.uri());

    let err = fetcher.fetch_page(&url).await.unwrap_err();
    assert_eq!(err, FetchError::TooLarge { max_bytes: 10 });
}

#[tokio::test]
async fn fetch_bytes_returns_the_raw_body() {
    let server = MockServer::start().await;
    let body: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";
    Mock::given(method("GET"))
        .and(path("/img/pic.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "image/png"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/img/pic.png", server.uri());

    let bytes = fetcher.fetch_bytes(&url).await.expect("fetch ok");
    assert_eq!(bytes, body);
}

#[tokio::test]
async fn invalid_urls_are_rejected_before_any_request() {
    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let err = fetcher.fetch_page("not a url").await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl(_)));
}
