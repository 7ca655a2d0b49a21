//! E2E tests: fixtures activated on the mock server, exercised over HTTP.

#![cfg(feature = "mock-server")]

use webfixtures::mock_server::{MockServer, ServerConfig};
use webfixtures::{
    Activation, Catalog, FixtureManager, RequestDescription, ResponseSpec, UrlPattern, Verb,
};

const HTTPBIN_CAPTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/get_httpbin_200.raw"
);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn example_catalog(namespace: &str) -> Catalog {
    let catalog = Catalog::new(namespace);
    catalog.register_response(
        "get_example",
        Verb::Get,
        UrlPattern::regex("www.example.org").unwrap(),
        "Hello World",
    );
    catalog
}

// =============================================================================
// Literal Fixtures
// =============================================================================

#[tokio::test]
async fn test_literal_fixture_responds_to_web_request() {
    init_tracing();
    let catalog = example_catalog("e2e::literal");
    let server = MockServer::start().await;

    let manager = catalog.activate(&server, &["get_example"]).unwrap();

    let client = server.client().unwrap();
    let body = client
        .get("http://www.example.org/")
        .send()
        .await
        .expect("Failed to send request")
        .text()
        .await
        .unwrap();

    assert_eq!(body, "Hello World");
    assert!(manager.stub("get_example").unwrap().was_requested(1));

    server.shutdown().await;
}

#[tokio::test]
async fn test_unmatched_request_gets_configured_status() {
    let catalog = example_catalog("e2e::unmatched");
    let config = ServerConfig::default().with_unmatched_status(418);
    let server = MockServer::try_start(config).await.unwrap();

    let manager = catalog.activate(&server, &["get_example"]).unwrap();

    let response = server
        .client()
        .unwrap()
        .get("http://www.google.com/")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 418);
    assert!(manager.stub("get_example").unwrap().was_requested(0));

    server.shutdown().await;
}

// =============================================================================
// File Fixtures
// =============================================================================

#[tokio::test]
async fn test_file_fixture_replays_raw_capture() {
    let catalog = Catalog::new("e2e::file");
    catalog
        .register_from_file(
            "get_httpbin",
            Verb::Get,
            UrlPattern::regex(r"^http://httpbin\.org/get\?page=1$").unwrap(),
            HTTPBIN_CAPTURE,
        )
        .unwrap();

    let server = MockServer::start().await;
    let manager = catalog.activate(&server, &["get_httpbin"]).unwrap();

    let response = server
        .client()
        .unwrap()
        .get("http://httpbin.org/get?page=1")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let payload = std::fs::read_to_string(HTTPBIN_CAPTURE).unwrap();
    let expected_body = payload.split_once("\r\n\r\n").unwrap().1;
    let body = response.text().await.unwrap();
    assert_eq!(body, expected_body);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["url"], "http://httpbin.org/get?page=1");

    assert!(manager.stub("get_httpbin").unwrap().was_requested(1));

    server.shutdown().await;
}

#[tokio::test]
async fn test_file_fixture_replays_binary_body() {
    let mut capture = b"HTTP/1.1 200 OK\r\nContent-Type: image/png\r\n\r\n".to_vec();
    let payload = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0xff, 0xfe, 0x00, 0x80];
    capture.extend_from_slice(&payload);

    let path = std::env::temp_dir().join(format!(
        "webfixtures-e2e-binary-{}.raw",
        std::process::id()
    ));
    std::fs::write(&path, &capture).unwrap();

    let catalog = Catalog::new("e2e::binary");
    let registered =
        catalog.register_from_file("get_logo", Verb::Get, "http://img.test/logo.png", &path);
    std::fs::remove_file(&path).unwrap();
    registered.unwrap();

    let server = MockServer::start().await;
    let manager = catalog.activate(&server, &["get_logo"]).unwrap();

    let response = server
        .client()
        .unwrap()
        .get("http://img.test/logo.png")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "image/png"
    );
    let body = response.bytes().await.unwrap();
    assert_eq!(body.as_ref(), &payload[..]);
    assert!(manager.stub("get_logo").unwrap().was_requested(1));

    server.shutdown().await;
}

// =============================================================================
// Dynamic Fixtures
// =============================================================================

#[tokio::test]
async fn test_handler_fixture_sees_request_and_siblings() {
    let catalog = example_catalog("e2e::handler");
    catalog.register_handler(
        "post_echo",
        Verb::Post,
        UrlPattern::regex(r"^http://echo\.test/").unwrap(),
        |request: &RequestDescription, manager: &FixtureManager| {
            let example_hits = manager
                .stub("get_example")
                .map(|stub| stub.hits())
                .unwrap_or_default();
            ResponseSpec::json(&serde_json::json!({
                "echo": request.body_text(),
                "example_hits": example_hits,
            }))
            .unwrap_or_else(|_| ResponseSpec::new(500))
        },
    );

    let server = MockServer::start().await;
    let manager = catalog
        .activate(&server, &["get_example", "post_echo"])
        .unwrap();
    let client = server.client().unwrap();

    client.get("http://www.example.org/").send().await.unwrap();
    let body: serde_json::Value = client
        .post("http://echo.test/messages")
        .body("ping")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["echo"], "ping");
    assert_eq!(body["example_hits"], 1);

    let echo = manager.stub("post_echo").unwrap();
    assert!(echo.was_requested(1));
    assert_eq!(echo.received_requests()[0].body_text(), "ping");

    server.shutdown().await;
}

fn counter(manager: &FixtureManager, _request: &RequestDescription) -> ResponseSpec {
    let calls = match manager.get("calls") {
        Ok(Activation::Substitute(value)) => value.as_u64().unwrap_or(0) + 1,
        _ => 1,
    };
    manager.set("calls", serde_json::json!(calls));
    ResponseSpec::body(calls.to_string())
}

#[tokio::test]
async fn test_method_fixture_keeps_state_on_its_manager() {
    let catalog = Catalog::new("e2e::method");
    catalog.register_method("counter", Verb::Get, "http://counter.test/", counter);

    let server = MockServer::start().await;
    let manager = catalog.activate(&server, &["counter"]).unwrap();
    let client = server.client().unwrap();

    for expected in ["1", "2", "3"] {
        let body = client
            .get("http://counter.test/")
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, expected);
    }

    assert_eq!(
        manager.get("calls").unwrap().as_value(),
        Some(&serde_json::json!(3))
    );
    assert!(manager.stub("counter").unwrap().was_requested(3));

    server.shutdown().await;
}

// =============================================================================
// Manager Isolation
// =============================================================================

#[tokio::test]
async fn test_two_managers_get_independent_handles() {
    let catalog = example_catalog("e2e::isolation");
    let server = MockServer::start().await;

    let first = catalog.activate(&server, &["get_example"]).unwrap();
    let second = catalog.activate(&server, &["get_example"]).unwrap();

    // The most recent stub answers.
    server
        .client()
        .unwrap()
        .get("http://www.example.org/")
        .send()
        .await
        .unwrap();

    assert!(first.stub("get_example").unwrap().was_requested(0));
    assert!(second.stub("get_example").unwrap().was_requested(1));

    second.set("get_example", "Test");
    assert_eq!(second.get("get_example").unwrap(), "Test");
    assert!(first.get("get_example").unwrap().as_stub().is_some());

    server.shutdown().await;
}

#[tokio::test]
async fn test_failed_activation_starts_nothing() {
    let catalog = example_catalog("e2e::atomic");
    let server = MockServer::start().await;

    let err = catalog
        .activate(&server, &["get_example", "unknown_fixture"])
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(server.stub_count(), 0);

    server.shutdown().await;
}

#[tokio::test]
async fn test_server_reset_between_tests_keeps_catalog() {
    let catalog = example_catalog("e2e::reset");
    let server = MockServer::start().await;
    let client = server.client().unwrap();

    catalog.activate(&server, &["get_example"]).unwrap();
    server.reset();

    let response = client.get("http://www.example.org/").send().await.unwrap();
    assert_eq!(response.status().as_u16(), 501);

    // Definitions survive an engine reset and can be activated again.
    let manager = catalog.activate(&server, &["get_example"]).unwrap();
    let body = client
        .get("http://www.example.org/")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "Hello World");
    assert!(manager.stub("get_example").unwrap().was_requested(1));

    server.shutdown().await;
}
