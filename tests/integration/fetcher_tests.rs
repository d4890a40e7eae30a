//! Fetcher behaviour against a mock server: retries, rate limiting, redirects

use crate::common::create_test_config;
use std::time::Duration;
use sumi_sieve::pipeline::{FetchOutcome, FetchProvider, FetchRequest, HttpFetcher, MAX_RETRIES_EXCEEDED};
use sumi_sieve::ErrorKind;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(server: &MockServer, route: &str, timeout: Duration, max_retries: u32) -> FetchRequest {
    let url = Url::parse(&format!("{}{}", server.uri(), route)).unwrap();
    FetchRequest::new(url, timeout, max_retries)
}

#[tokio::test]
async fn test_always_500_makes_exactly_four_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&create_test_config()).unwrap();
    let outcome = fetcher
        .fetch(&request(&server, "/flaky", Duration::from_secs(5), 3))
        .await;

    match outcome {
        FetchOutcome::Failure {
            reason,
            kind,
            last_status_code,
            attempts_made,
        } => {
            assert_eq!(reason, MAX_RETRIES_EXCEEDED);
            assert_eq!(kind, ErrorKind::Server);
            assert_eq!(last_status_code, Some(500));
            assert_eq!(attempts_made, 4);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limited_then_success() {
    let server = MockServer::start().await;

    // Mounted first, so it answers the first request only
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&create_test_config()).unwrap();
    let outcome = fetcher
        .fetch(&request(&server, "/busy", Duration::from_secs(5), 3))
        .await;

    assert!(outcome.is_success());
    assert_eq!(outcome.status_code(), Some(200));

    // The 429 doubled the 1ms base delay; one success does not fill the window
    let delay = fetcher.limiter().current_delay("127.0.0.1").await;
    assert_eq!(delay, Duration::from_millis(2));
}

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&create_test_config()).unwrap();
    let outcome = fetcher
        .fetch(&request(&server, "/private", Duration::from_secs(5), 3))
        .await;

    assert_eq!(
        outcome,
        FetchOutcome::Failure {
            reason: "HTTP 403".to_string(),
            kind: ErrorKind::Http,
            last_status_code: Some(403),
            attempts_made: 1,
        }
    );
}

#[tokio::test]
async fn test_timeout_is_network_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&create_test_config()).unwrap();
    let outcome = fetcher
        .fetch(&request(&server, "/slow", Duration::from_millis(200), 0))
        .await;

    match outcome {
        FetchOutcome::Failure {
            kind,
            attempts_made,
            last_status_code,
            ..
        } => {
            assert_eq!(kind, ErrorKind::Network);
            assert_eq!(attempts_made, 1);
            assert_eq!(last_status_code, None);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&create_test_config()).unwrap();
    let outcome = fetcher
        .fetch(&request(&server, "/old", Duration::from_secs(5), 0))
        .await;

    match outcome {
        FetchOutcome::Success {
            final_url, body, ..
        } => {
            assert!(final_url.ends_with("/new"));
            assert_eq!(body, "moved");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}
