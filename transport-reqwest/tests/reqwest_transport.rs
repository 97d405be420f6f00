//! End-to-end tests: courier lifecycle over the reqwest transport against a
//! wiremock server.

use courier_core::{Client, RequestConfig, RequestError};
use courier_reqwest::ReqwestTransport;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, config: RequestConfig) -> Client {
    Client::with_config(
        Arc::new(ReqwestTransport::new()),
        config.with_base_url(server.uri()),
    )
}

#[tokio::test]
async fn get_payload_rides_in_the_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RequestConfig::new());
    match client.get_with("/search", json!({"q": "rust"})).await {
        Ok(response) => {
            assert_eq!(response.raw.status, 200);
            assert_eq!(response.data, Some(json!({"hits": 3})));
        }
        Err(err) => panic!("expected success, got {err}"),
    }
}

#[tokio::test]
async fn post_payload_rides_in_the_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_json(json!({"sku": "ab-1", "qty": 2})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RequestConfig::new());
    match client.post("/orders", json!({"sku": "ab-1", "qty": 2})).await {
        Ok(response) => {
            assert_eq!(response.raw.status, 201);
            assert_eq!(response.data, Some(json!({"id": 7})));
        }
        Err(err) => panic!("expected success, got {err}"),
    }
}

#[tokio::test]
async fn lazy_headers_are_resolved_per_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .and(header("x-api-key", "secret-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = RequestConfig::new().with_header("x-api-key", || "secret-token".to_string());
    let client = client_for(&server, config);
    let result = client.get("/private").await;
    assert!(result.is_ok(), "expected success, got {result:?}");
}

#[tokio::test]
async fn validator_driven_retries_hit_the_server_once_per_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3) // 1 + 2 budgeted retries
        .mount(&server)
        .await;

    let config = RequestConfig::new().with_validation(|raw, outcome| {
        if raw.status == 503 {
            outcome.retry(2);
        }
    });
    let client = client_for(&server, config);

    let result = client.get("/flaky").await;
    assert!(matches!(result, Err(RequestError::RetriesExhausted { .. })));
}

#[tokio::test]
async fn plain_text_bodies_come_back_as_strings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let client = client_for(&server, RequestConfig::new());
    match client.get("/ping").await {
        Ok(response) => assert_eq!(response.data, Some(json!("pong"))),
        Err(err) => panic!("expected success, got {err}"),
    }
}

#[tokio::test]
async fn signaling_the_registry_cancels_an_in_flight_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let client = client_for(&server, RequestConfig::new());
    let in_flight = client.clone();
    let task = tokio::spawn(async move { in_flight.get("/slow").await });

    // Give the request time to register its handle, then cancel everything.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(client.registry().active(), 1);
    client.registry().cancel_all();

    match task.await {
        Ok(result) => assert!(matches!(result, Err(RequestError::Canceled))),
        Err(err) => panic!("request task panicked: {err}"),
    }
    assert_eq!(client.registry().active(), 0);
}

#[tokio::test]
async fn connection_failures_surface_as_transport_errors() {
    // Nothing is listening on this port.
    let config = RequestConfig::new().with_base_url("http://127.0.0.1:9");
    let client = Client::with_config(Arc::new(ReqwestTransport::new()), config);

    let result = client.get("/anything").await;
    assert!(matches!(result, Err(RequestError::Transport(_))));
}
