use std::time::Duration;

use httpmock::prelude::*;
use ipso::error::SWError;
use ipso::http::{Client, Method, Request};
use ipso::io::HttpRunner;
use ipso::time::Seconds;

#[test]
fn test_http_runner() {
    let server = MockServer::start();
    let body_str = r#"{"name": "IPStream Radio", "short_name": "IPStream"}"#;
    let server_mock = server.mock(|when, then| {
        when.method(GET).path("/manifest.json");
        then.status(200)
            .header("content-type", "application/json")
            .body(body_str);
    });

    let runner = Client::new(Seconds::new(5));
    let request = Request::get(&server.url("/manifest.json"));
    let response = runner.fetch(&request).unwrap();
    assert_eq!(200, response.status);
    assert_eq!("OK", response.status_text);
    assert_eq!(Some("application/json"), response.header("Content-Type"));
    assert!(response.text().contains("IPStream Radio"));
    server_mock.assert();
}

#[test]
fn test_http_runner_large_body_is_a_response() {
    let server = MockServer::start();
    let body = vec![b'x'; 11 * 1024 * 1024];
    let server_mock = server.mock(|when, then| {
        when.method(GET).path("/podcasts/episode-1.mp3");
        then.status(200)
            .header("content-type", "audio/mpeg")
            .body(&body);
    });

    let runner = Client::new(Seconds::new(30));
    let request = Request::get(&server.url("/podcasts/episode-1.mp3"));
    let response = runner.fetch(&request).unwrap();
    assert_eq!(200, response.status);
    assert_eq!(body.len(), response.body.len());
    server_mock.assert();
}

#[test]
fn test_http_error_status_is_a_response() {
    let server = MockServer::start();
    let server_mock = server.mock(|when, then| {
        when.method(GET).path("/api/public/7/news");
        then.status(404).body(r#"{"error": "not found"}"#);
    });

    let runner = Client::new(Seconds::new(5));
    let request = Request::get(&server.url("/api/public/7/news"));
    let response = runner.fetch(&request).unwrap();
    assert_eq!(404, response.status);
    assert!(!response.is_ok());
    server_mock.assert();
}

#[test]
fn test_http_runner_post_request() {
    let server = MockServer::start();
    let server_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/subscribe")
            .header("content-type", "application/json")
            .body(r#"{"endpoint": "push"}"#);
        then.status(201).body("created");
    });

    let runner = Client::new(Seconds::new(5));
    let mut request = Request::builder()
        .method(Method::POST)
        .url(server.url("/api/subscribe"))
        .body(r#"{"endpoint": "push"}"#.as_bytes().to_vec())
        .build()
        .unwrap();
    request.set_header("Content-Type", "application/json");
    let response = runner.fetch(&request).unwrap();
    assert_eq!(201, response.status);
    assert_eq!("created", response.text());
    server_mock.assert();
}

#[test]
fn test_http_runner_server_down() {
    let runner = Client::new(Seconds::new(5));
    let request = Request::get("http://127.0.0.1:1/offline.html");
    let err = runner.fetch(&request).unwrap_err();
    match err.downcast_ref::<SWError>() {
        Some(SWError::HttpTransportError(msg)) => assert!(msg.contains("127.0.0.1:1")),
        _ => panic!("Expected HttpTransportError, got {err}"),
    }
}

#[test]
fn test_http_runner_timeout_is_a_transport_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200).delay(Duration::from_secs(3)).body("late");
    });

    let runner = Client::new(Seconds::new(1));
    let err = runner.fetch(&Request::get(&server.url("/slow"))).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SWError>(),
        Some(SWError::HttpTransportError(_))
    ));
}

#[test]
fn test_http_runner_rejects_non_http_scheme() {
    let runner = Client::new(Seconds::new(5));
    let err = runner
        .fetch(&Request::get("chrome-extension://abc/script.js"))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SWError>(),
        Some(SWError::UnsupportedScheme(_))
    ));
}
