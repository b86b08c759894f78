//! Integration tests for the gateway HTTP surface
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::{sync::Arc, time::Duration};

use application::ports::UpstreamPort;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use infrastructure::{
    AppConfig, CredentialEntry, HttpUpstreamAdapter, RouteConfig, SecurityValidator, TargetConfig,
};
use presentation_http::{ErrorResponse, ReloadableConfig, routes::create_router, state::AppState};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const LOCAL_TOKEN: &str = "tok-local";
const CLOUD_TOKEN: &str = "tok-cloud";

/// Config with `local` and `cloud` targets and one inbound token for each
fn gateway_config(local_url: &str, cloud_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    for (name, url) in [("local", local_url), ("cloud", cloud_url)] {
        config.gateway.targets.insert(
            name.to_string(),
            TargetConfig {
                base_url: url.to_string(),
                token: SecretString::from(format!("up-{name}")),
            },
        );
        config.gateway.credentials.push(CredentialEntry {
            token: SecretString::from(format!("tok-{name}")),
            target: name.to_string(),
        });
    }
    config
}

fn create_test_server(config: AppConfig) -> TestServer {
    let upstream: Arc<dyn UpstreamPort> = Arc::new(
        HttpUpstreamAdapter::new(&config.upstream).expect("Failed to create upstream client"),
    );
    let reloadable = ReloadableConfig::new(config).expect("Invalid test topology");
    let router = create_router(AppState::new(reloadable, upstream));
    TestServer::new(router).expect("Failed to create test server")
}

async fn two_upstreams() -> (MockServer, MockServer) {
    (MockServer::start().await, MockServer::start().await)
}

fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Matches the raw query string exactly
struct RawQuery(&'static str);

impl Match for RawQuery {
    fn matches(&self, request: &Request) -> bool {
        request.url.query() == Some(self.0)
    }
}

/// Matches a header value byte for byte
struct HeaderBytes(&'static str, &'static [u8]);

impl Match for HeaderBytes {
    fn matches(&self, request: &Request) -> bool {
        request.headers.get(self.0).map(HeaderValue::as_bytes) == Some(self.1)
    }
}

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn health_reports_configured_default_target() {
    let (local, cloud) = two_upstreams().await;
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["activeTarget"], "local");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_is_unaffected_by_authentication() {
    let (local, cloud) = two_upstreams().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&cloud)
        .await;
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    server
        .post("/sms")
        .authorization_bearer(CLOUD_TOKEN)
        .json(&json!({}))
        .await
        .assert_status_ok();

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["activeTarget"], "local");

    let body: Value = server
        .get("/health")
        .authorization_bearer("not-a-token")
        .await
        .json();
    assert_eq!(body["activeTarget"], "local");
}

#[tokio::test]
async fn repeated_health_checks_have_identical_shape() {
    let (local, cloud) = two_upstreams().await;
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let mut shapes = Vec::new();
    for _ in 0..5 {
        let response = server.get("/health").authorization_bearer(LOCAL_TOKEN).await;
        response.assert_status_ok();
        let mut body: Value = response.json();
        let object = body.as_object_mut().unwrap();
        assert!(object.remove("timestamp").is_some());
        shapes.push(body);
    }

    assert!(shapes.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn mock_health_is_public() {
    let (local, cloud) = two_upstreams().await;
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let response = server.get("/mock/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

// ============ Authentication Tests ============

#[tokio::test]
async fn protected_routes_without_token_are_401() {
    let (local, cloud) = two_upstreams().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&local)
        .await;
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    for route in ["/sms", "/sms/send", "/mock/api/sms", "/complaints"] {
        let response = server.post(route).json(&json!({})).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "no_token_provided", "route {route}");
        assert_eq!(body.message, "No token provided");
    }
}

#[tokio::test]
async fn protected_routes_with_unknown_token_are_401() {
    let (local, cloud) = two_upstreams().await;
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    for route in ["/sms", "/mock/api/sms"] {
        let response = server
            .post(route)
            .authorization_bearer("tok-staging")
            .json(&json!({}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "invalid_token", "route {route}");
    }
}

#[tokio::test]
async fn inbound_token_is_not_an_upstream_credential() {
    let (local, cloud) = two_upstreams().await;
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let response = server
        .post("/sms")
        .authorization_bearer("up-local")
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

// ============ Forwarding Tests ============

#[tokio::test]
async fn forwards_with_upstream_credential_and_body() {
    let (local, cloud) = two_upstreams().await;
    let payload = json!({ "phone": "+911234567890", "message": "Train 12951 delayed" });

    Mock::given(method("POST"))
        .and(path("/api/sms"))
        .and(header("authorization", "Bearer up-local"))
        .and(header("content-type", "application/json"))
        .and(body_json(&payload))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": 7, "status": "queued" })),
        )
        .expect(1)
        .mount(&local)
        .await;

    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let response = server
        .post("/sms")
        .authorization_bearer(LOCAL_TOKEN)
        .json(&payload)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["status"], "queued");
}

#[tokio::test]
async fn request_id_is_propagated_upstream() {
    let (local, cloud) = two_upstreams().await;
    let id = "0190a6c5-0000-7000-8000-0000000000aa";

    Mock::given(header("x-request-id", id))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&local)
        .await;

    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let response = server
        .post("/sms")
        .authorization_bearer(LOCAL_TOKEN)
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .json(&json!({}))
        .await;

    response.assert_status_ok();
    assert_eq!(response.headers()["x-request-id"], id);
}

#[tokio::test]
async fn rewrite_strips_prefix_and_keeps_query_verbatim() {
    let (local, cloud) = two_upstreams().await;

    Mock::given(method("GET"))
        .and(path("/foo"))
        .and(RawQuery("x=1&y=%20z&x=2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("stripped"))
        .expect(1)
        .mount(&local)
        .await;

    let mut config = gateway_config(&local.uri(), &cloud.uri());
    config.gateway.routes = vec![RouteConfig {
        prefix: "/sms".to_string(),
        replacement: String::new(),
    }];
    let server = create_test_server(config);

    let response = server
        .get("/sms/foo?x=1&y=%20z&x=2")
        .authorization_bearer(LOCAL_TOKEN)
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "stripped");
}

#[tokio::test]
async fn default_rule_maps_sms_to_api_sms() {
    let (local, cloud) = two_upstreams().await;

    Mock::given(method("POST"))
        .and(path("/api/sms/bulk"))
        .and(RawQuery("dry_run=true"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&cloud)
        .await;

    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    server
        .post("/sms/bulk?dry_run=true")
        .authorization_bearer(CLOUD_TOKEN)
        .json(&json!([]))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn prefix_match_respects_segment_boundary() {
    let (local, cloud) = two_upstreams().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&local)
        .await;
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let response = server
        .post("/smsx")
        .authorization_bearer(LOCAL_TOKEN)
        .json(&json!({}))
        .await;

    response.assert_status_not_found();
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "not_found");
}

#[tokio::test]
async fn upstream_error_status_is_relayed() {
    let (local, cloud) = two_upstreams().await;
    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "detail": "phone is invalid" })),
        )
        .mount(&local)
        .await;
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let response = server
        .post("/sms")
        .authorization_bearer(LOCAL_TOKEN)
        .json(&json!({ "phone": "x" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["detail"], "phone is invalid");
}

#[tokio::test]
async fn oversized_body_is_413() {
    let (local, cloud) = two_upstreams().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&local)
        .await;
    let mut config = gateway_config(&local.uri(), &cloud.uri());
    config.server.max_body_size_bytes = 64;
    let server = create_test_server(config);

    let response = server
        .post("/sms")
        .authorization_bearer(LOCAL_TOKEN)
        .json(&json!({ "message": "x".repeat(256) }))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "payload_too_large");
}

// ============ Concurrency Tests ============

#[tokio::test]
async fn concurrent_tokens_reach_their_own_upstreams() {
    let (local, cloud) = two_upstreams().await;

    // Local answers slowly so cloud requests authenticate while local ones are in flight
    Mock::given(header("authorization", "Bearer up-local"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("local")
                .set_delay(Duration::from_millis(150)),
        )
        .mount(&local)
        .await;
    Mock::given(header("authorization", "Bearer up-cloud"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("cloud")
                .set_delay(Duration::from_millis(10)),
        )
        .mount(&cloud)
        .await;

    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let requests = (0..20).map(|i| {
        let (token, expected) = if i % 2 == 0 {
            (LOCAL_TOKEN, "local")
        } else {
            (CLOUD_TOKEN, "cloud")
        };
        let server = &server;
        async move {
            let response = server
                .post("/sms")
                .authorization_bearer(token)
                .json(&json!({ "n": i }))
                .await;
            (expected, response.status_code(), response.text())
        }
    });

    for (expected, status, body) in futures::future::join_all(requests).await {
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, expected);
    }

    assert_eq!(local.received_requests().await.unwrap().len(), 10);
    assert_eq!(cloud.received_requests().await.unwrap().len(), 10);
}

// ============ Failure Tests ============

#[tokio::test]
async fn unreachable_upstream_is_502_and_gateway_keeps_serving() {
    let (_, cloud) = two_upstreams().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string("cloud"))
        .mount(&cloud)
        .await;
    let server = create_test_server(gateway_config(&refused_url(), &cloud.uri()));

    let response = server
        .post("/sms")
        .authorization_bearer(LOCAL_TOKEN)
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "bad_gateway");
    assert_eq!(body.message, "Target server unreachable");
    assert!(!body.message.contains("127.0.0.1"));

    server.get("/health").await.assert_status_ok();
    let response = server
        .post("/sms")
        .authorization_bearer(CLOUD_TOKEN)
        .json(&json!({}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "cloud");
}

#[tokio::test]
async fn slow_upstream_is_504() {
    let (local, cloud) = two_upstreams().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .expect(1)
        .mount(&local)
        .await;
    let mut config = gateway_config(&local.uri(), &cloud.uri());
    config.upstream.timeout_secs = 1;
    let server = create_test_server(config);

    let response = server
        .post("/sms")
        .authorization_bearer(LOCAL_TOKEN)
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "gateway_timeout");
}

// ============ Header Relay Tests ============

const UTF8_DISPOSITION: &str = "attachment; filename=\"café.pdf\"";

#[tokio::test]
async fn non_ascii_header_values_are_relayed_byte_for_byte() {
    let (local, cloud) = two_upstreams().await;
    Mock::given(method("POST"))
        .and(path("/api/sms"))
        .and(HeaderBytes("x-caller-name", b"Jos\xe9"))
        .respond_with(ResponseTemplate::new(200).insert_header(
            HeaderName::from_static("content-disposition"),
            HeaderValue::from_bytes(UTF8_DISPOSITION.as_bytes()).unwrap(),
        ))
        .expect(1)
        .mount(&cloud)
        .await;
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let response = server
        .post("/sms")
        .authorization_bearer(CLOUD_TOKEN)
        .add_header(
            HeaderName::from_static("x-caller-name"),
            HeaderValue::from_bytes(b"Jos\xe9").unwrap(),
        )
        .json(&json!({}))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-disposition").as_bytes(),
        UTF8_DISPOSITION.as_bytes()
    );
}

// ============ Method Mismatch Tests ============

#[tokio::test]
async fn wrong_method_on_mock_sms_is_405_json() {
    let (local, cloud) = two_upstreams().await;
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let response = server
        .get("/mock/api/sms")
        .authorization_bearer(LOCAL_TOKEN)
        .await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "method_not_allowed");
    assert!(body.message.contains("GET"));
    assert!(body.message.contains("/mock/api/sms"));
}

#[tokio::test]
async fn wrong_method_on_public_health_is_405_json() {
    let (local, cloud) = two_upstreams().await;
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let response = server.post("/health").await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "method_not_allowed");
}

// ============ Mock SMS Tests ============

#[tokio::test]
async fn mock_sms_echoes_without_outbound_call() {
    let (local, cloud) = two_upstreams().await;
    for upstream in [&local, &cloud] {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(upstream)
            .await;
    }
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let response = server
        .post("/mock/api/sms")
        .authorization_bearer(LOCAL_TOKEN)
        .json(&json!({ "phone": "+911234567890", "message": "test" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "SMS sent successfully (mock)",
            "data": { "phone": "+911234567890", "message": "test" }
        })
    );
}

#[tokio::test]
async fn mock_sms_rejects_empty_fields() {
    let (local, cloud) = two_upstreams().await;
    let server = create_test_server(gateway_config(&local.uri(), &cloud.uri()));

    let response = server
        .post("/mock/api/sms")
        .authorization_bearer(LOCAL_TOKEN)
        .json(&json!({ "phone": "", "message": "test" }))
        .await;

    response.assert_status_bad_request();
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "bad_request");
}

#[tokio::test]
async fn mock_target_loops_back_with_its_own_credential() {
    const MOCK_TOKEN: &str = "8b0e4d7a-52c1-4e0f-9d3a-7f6e5d4c3b2a";

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let (local, cloud) = two_upstreams().await;
    let mut config = gateway_config(&local.uri(), &cloud.uri());
    config.server.port = port;
    config.gateway.targets.insert(
        "mock".to_string(),
        TargetConfig {
            base_url: format!("http://127.0.0.1:{port}/mock"),
            token: SecretString::from(MOCK_TOKEN.to_string()),
        },
    );
    config.gateway.credentials.push(CredentialEntry {
        token: SecretString::from(MOCK_TOKEN.to_string()),
        target: "mock".to_string(),
    });
    assert!(
        SecurityValidator::validate(&config)
            .iter()
            .all(|w| w.code != "SEC005")
    );

    // The gateway the mock target points back at
    let upstream: Arc<dyn UpstreamPort> =
        Arc::new(HttpUpstreamAdapter::new(&config.upstream).unwrap());
    let loopback = create_router(AppState::new(
        ReloadableConfig::new(config.clone()).unwrap(),
        upstream,
    ));
    tokio::spawn(async move { axum::serve(listener, loopback).await });

    let server = create_test_server(config);
    let response = server
        .post("/sms")
        .authorization_bearer(MOCK_TOKEN)
        .json(&json!({ "phone": "+911234567890", "message": "loop" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "SMS sent successfully (mock)");
    assert_eq!(body["data"]["message"], "loop");
}
