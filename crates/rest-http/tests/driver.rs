//! REST driver tests against a mocked tool server.
//!
//! These tests use wiremock to serve an OpenAPI document and tool endpoints,
//! and check request dispatch, base-URL resolution and error propagation.

use driver::{Driver, Error};
use rest_http::{ProxyConfig, RestHttpDriver};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============= Helper Functions =============

/// FastAPI-style spec for the Fibonacci tool.
fn fibonacci_spec(servers: Option<Value>) -> Value {
    let mut spec = json!({
        "openapi": "3.1.0",
        "info": {"title": "Fibonacci API", "version": "1.0.0"},
        "paths": {
            "/tools/fibonacci": {
                "get": {
                    "summary": "Fibonacci number",
                    "parameters": [
                        {"name": "n", "in": "query", "required": true, "schema": {"type": "integer"}}
                    ],
                    "responses": {
                        "200": {"description": "Successful Response"},
                        "422": {"description": "Validation Error"}
                    }
                }
            }
        },
        "components": {"schemas": {"HTTPValidationError": {"type": "object"}}}
    });
    if let Some(servers) = servers {
        spec["servers"] = servers;
    }
    spec
}

/// Mount the spec at `/openapi.json`.
async fn mount_spec(server: &MockServer, spec: &Value) {
    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(spec.to_string()))
        .mount(server)
        .await;
}

fn driver_for(server: &MockServer) -> RestHttpDriver {
    RestHttpDriver::builder([format!("{}/openapi.json", server.uri())])
        .build()
        .unwrap()
}

// ============= Process Response =============

#[tokio::test]
async fn get_call_sends_arguments_as_query() {
    let server = MockServer::start().await;
    mount_spec(&server, &fibonacci_spec(None)).await;

    Mock::given(method("GET"))
        .and(path("/tools/fibonacci"))
        .and(query_param("n", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"result": 6}"#))
        .expect(1)
        .mount(&server)
        .await;

    let driver = driver_for(&server);
    let result = driver
        .process_response(r#"{"path": "/tools/fibonacci", "arguments": {"n": 4}}"#)
        .await
        .unwrap();

    assert_eq!(result, r#"{"result": 6}"#);
    assert_eq!(driver.resolved_base_url(), Some(server.uri().as_str()));
}

#[tokio::test]
async fn fenced_call_is_executed() {
    let server = MockServer::start().await;
    mount_spec(&server, &fibonacci_spec(None)).await;

    Mock::given(method("GET"))
        .and(path("/tools/fibonacci"))
        .and(query_param("n", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_string("110"))
        .mount(&server)
        .await;

    let driver = driver_for(&server);
    let output = "```json\n{\"path\":\"tools/fibonacci\",\"arguments\":{\"n\":10}}\n```";
    assert_eq!(driver.process_response(output).await.unwrap(), "110");
}

#[tokio::test]
async fn post_call_sends_arguments_as_json_body() {
    let server = MockServer::start().await;
    mount_spec(&server, &fibonacci_spec(None)).await;

    Mock::given(method("POST"))
        .and(path("/tools/sum"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"a": 1, "b": 2})))
        .respond_with(ResponseTemplate::new(201).set_body_string("3"))
        .expect(1)
        .mount(&server)
        .await;

    let driver = driver_for(&server);
    let result = driver
        .process_response(r#"{"path": "/tools/sum", "method": "post", "arguments": {"a": 1, "b": 2}}"#)
        .await
        .unwrap();
    assert_eq!(result, "3");
}

#[tokio::test]
async fn plain_text_is_returned_unchanged() {
    let server = MockServer::start().await;
    mount_spec(&server, &fibonacci_spec(None)).await;

    let driver = driver_for(&server);
    let text = "The 4th Fibonacci number is 3. Anything else?";
    assert_eq!(driver.process_response(text).await.unwrap(), text);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
    assert!(driver.resolved_base_url().is_none());
}

#[tokio::test]
async fn not_found_is_http_status_error() {
    let server = MockServer::start().await;
    mount_spec(&server, &fibonacci_spec(None)).await;

    Mock::given(method("GET"))
        .and(path("/tools/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"detail":"Not Found"}"#))
        .mount(&server)
        .await;

    let driver = driver_for(&server);
    let err = driver
        .process_response(r#"{"path": "/tools/missing"}"#)
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, r#"{"detail":"Not Found"}"#);
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn spec_failure_propagates_from_process_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let driver = driver_for(&server);
    let err = driver
        .process_response(r#"{"path": "/tools/fibonacci", "arguments": {"n": 1}}"#)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(driver.resolved_base_url().is_none());
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let driver = RestHttpDriver::builder(["http://127.0.0.1:1/openapi.json"])
        .build()
        .unwrap();

    let err = driver.describe().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
}

// ============= Base URL =============

#[tokio::test]
async fn servers_entry_wins_over_spec_url() {
    let server = MockServer::start().await;
    let servers = json!([{"url": format!("{}/api/", server.uri())}]);
    mount_spec(&server, &fibonacci_spec(Some(servers))).await;

    Mock::given(method("GET"))
        .and(path("/api/tools/fibonacci"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let driver = driver_for(&server);
    let result = driver
        .process_response(r#"{"path": "/tools/fibonacci", "arguments": {"n": 2}}"#)
        .await
        .unwrap();

    assert_eq!(result, "ok");
    assert_eq!(
        driver.resolved_base_url(),
        Some(format!("{}/api", server.uri()).as_str())
    );
}

#[tokio::test]
async fn base_url_is_resolved_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fibonacci_spec(None).to_string()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tools/fibonacci"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(2)
        .mount(&server)
        .await;

    let driver = driver_for(&server);
    for n in [1, 2] {
        let call = format!(r#"{{"path": "/tools/fibonacci", "arguments": {{"n": {n}}}}}"#);
        assert_eq!(driver.process_response(&call).await.unwrap(), "ok");
    }
}

#[tokio::test]
async fn custom_description_drives_base_url() {
    let server = MockServer::start().await;
    let spec = fibonacci_spec(Some(json!([{"url": server.uri()}])));

    Mock::given(method("GET"))
        .and(path("/tools/fibonacci"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    // The spec url is never fetched when a custom description is set.
    let driver = RestHttpDriver::builder(["http://127.0.0.1:1/openapi.json"])
        .custom_description(spec.to_string())
        .build()
        .unwrap();

    assert_eq!(driver.describe().await.unwrap(), spec.to_string());
    let result = driver
        .process_response(r#"{"path": "/tools/fibonacci", "arguments": {"n": 3}}"#)
        .await
        .unwrap();
    assert_eq!(result, "ok");
}

// ============= Describe / System Prompt =============

#[tokio::test]
async fn reduced_describe_is_stable() {
    let server = MockServer::start().await;
    mount_spec(&server, &fibonacci_spec(None)).await;

    let driver = RestHttpDriver::builder([format!("{}/openapi.json", server.uri())])
        .reduced_spec(true)
        .build()
        .unwrap();

    let first = driver.describe().await.unwrap();
    let second = driver.describe().await.unwrap();
    assert_eq!(first, second);

    let reduced: Value = serde_json::from_str(&first).unwrap();
    assert!(reduced.get("components").is_none());
    for item in reduced["paths"].as_object().unwrap().values() {
        for op in item.as_object().unwrap().values() {
            for code in op["responses"].as_object().unwrap().keys() {
                assert!(code.starts_with('2') || code.starts_with('3'), "kept {code}");
            }
        }
    }
}

#[tokio::test]
async fn unreduced_describe_is_verbatim() {
    let server = MockServer::start().await;
    let spec = fibonacci_spec(None);
    mount_spec(&server, &spec).await;

    let driver = driver_for(&server);
    assert_eq!(driver.describe().await.unwrap(), spec.to_string());
}

#[tokio::test]
async fn system_prompt_embeds_spec() {
    let server = MockServer::start().await;
    let spec = fibonacci_spec(None);
    mount_spec(&server, &spec).await;

    let driver = driver_for(&server);
    let prompt = driver.system_prompt().await.unwrap();
    assert!(prompt.contains(&spec.to_string()));
    assert!(prompt.contains("\"path\""));
}

#[tokio::test]
async fn custom_system_message_skips_fetch() {
    let server = MockServer::start().await;
    let driver = RestHttpDriver::builder([format!("{}/openapi.json", server.uri())])
        .custom_system_message("Call tools as JSON.")
        .build()
        .unwrap();

    assert_eq!(driver.system_prompt().await.unwrap(), "Call tools as JSON.");
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============= Headers =============

#[tokio::test]
async fn basic_auth_and_default_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .and(header("Authorization", "Basic YWxpY2U6c2VjcmV0"))
        .and(header("X-Client", "mcs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fibonacci_spec(None).to_string()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tools/fibonacci"))
        .and(header("Authorization", "Basic YWxpY2U6c2VjcmV0"))
        .and(header("X-Client", "per-call"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let driver = RestHttpDriver::builder([format!("{}/openapi.json", server.uri())])
        .default_header("X-Client", "mcs")
        .basic_auth("alice", "secret")
        .build()
        .unwrap();

    let call = r#"{"path": "/tools/fibonacci", "arguments": {"n": 1}, "headers": {"X-Client": "per-call"}}"#;
    assert_eq!(driver.process_response(call).await.unwrap(), "ok");
}

#[tokio::test]
async fn call_header_overrides_default_regardless_of_case() {
    let server = MockServer::start().await;
    mount_spec(&server, &fibonacci_spec(None)).await;

    Mock::given(method("GET"))
        .and(path("/tools/fibonacci"))
        .and(header("x-api-key", "per-call"))
        .respond_with(ResponseTemplate::new(200).set_body_string("call-won"))
        .expect(1)
        .mount(&server)
        .await;

    let driver = RestHttpDriver::builder([format!("{}/openapi.json", server.uri())])
        .default_header("x-api-key", "default")
        .build()
        .unwrap();

    let call = r#"{"path": "/tools/fibonacci", "headers": {"X-Api-Key": "per-call"}}"#;
    assert_eq!(driver.process_response(call).await.unwrap(), "call-won");

    let requests = server.received_requests().await.unwrap();
    let tool_request = requests
        .iter()
        .find(|r| r.url.path() == "/tools/fibonacci")
        .unwrap();
    let values: Vec<&str> = tool_request
        .headers
        .get_all("x-api-key")
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert_eq!(values, ["per-call"]);
}

// ============= Proxy / TLS =============

#[tokio::test]
async fn requests_go_through_configured_proxy() {
    let proxy = MockServer::start().await;
    let addr = proxy.address();

    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fibonacci_spec(None).to_string()))
        .mount(&proxy)
        .await;

    Mock::given(method("GET"))
        .and(path("/tools/fibonacci"))
        .and(query_param("n", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_string("via-proxy"))
        .expect(1)
        .mount(&proxy)
        .await;

    // The target host does not resolve; only the proxy can answer.
    let driver = RestHttpDriver::builder(["http://tools.example.invalid/openapi.json"])
        .proxy(ProxyConfig::new(addr.ip().to_string(), addr.port()))
        .build()
        .unwrap();

    let result = driver
        .process_response(r#"{"path": "/tools/fibonacci", "arguments": {"n": 4}}"#)
        .await
        .unwrap();
    assert_eq!(result, "via-proxy");
    assert_eq!(driver.resolved_base_url(), Some("http://tools.example.invalid"));

    // Absolute-form request targets keep the original host.
    let requests = proxy.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.url.host_str(), Some("tools.example.invalid"));
    }
}

#[tokio::test]
async fn tls_verification_can_be_disabled() {
    let server = MockServer::start().await;
    mount_spec(&server, &fibonacci_spec(None)).await;

    let driver = RestHttpDriver::builder([format!("{}/openapi.json", server.uri())])
        .verify_tls(false)
        .build()
        .unwrap();

    assert!(!driver.config().verify_tls);
    assert_eq!(
        driver.describe().await.unwrap(),
        fibonacci_spec(None).to_string()
    );
}
