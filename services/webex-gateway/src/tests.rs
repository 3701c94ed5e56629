//! Integration tests for the CDR fetch path and MCP dispatch, against a
//! mocked analytics upstream.

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use callbridge_mcp_sdk::protocol::{McpRequest, RequestId};

use crate::cdr::{time::TimeSpec, CdrQuery};
use crate::client::{WebexClient, WebexClientOptions, WebexError};
use crate::server::McpServer;

fn client_for(server: &MockServer) -> WebexClient {
    WebexClient::new(WebexClientOptions {
        access_token: "test-token".to_string(),
        base_url: format!("{}/api", server.uri()),
        analytics_base_url: server.uri(),
        request_timeout_secs: 5,
        pad_zero_millis: true,
    })
}

fn cdr_query(start: &str, end: &str) -> CdrQuery {
    CdrQuery {
        start_time: Some(TimeSpec::from(start)),
        end_time: Some(TimeSpec::from(end)),
        person_id: None,
        location_id: None,
        max_results: 100,
    }
}

fn invalid_input_400() -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "message": "POST failed",
        "errors": [{ "description": "Invalid input for query parameters" }],
        "trackingId": "ROUTER_TEST",
    }))
}

#[tokio::test]
async fn fetch_falls_back_through_variants_until_one_succeeds() {
    let server = MockServer::start().await;

    // Variant 4 is the first without a location filter but with max.
    Mock::given(method("GET"))
        .and(path("/cdr_feed"))
        .and(query_param("max", "100"))
        .and(query_param_is_missing("locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "Call ID": "c1", "Call type": "SIP_PSTN", "Duration": 30 }],
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cdr_feed"))
        .respond_with(invalid_input_400())
        .with_priority(5)
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let configured_base = client.base_url().to_string();

    let mut query = cdr_query("2024-01-15T10:00:00Z", "2024-01-15T12:00:00Z");
    query.location_id = Some("loc-1".to_string());

    let records = client.get_call_detail_records(&query).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("Call ID"), Some(&json!("c1")));

    // The primary base is untouched by an analytics fetch.
    assert_eq!(client.base_url(), configured_base);
}

#[tokio::test]
async fn terminal_status_aborts_without_trying_more_variants() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdr_feed"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "User does not have the required role",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut query = cdr_query("2024-01-15T10:00:00Z", "2024-01-15T12:00:00Z");
    query.location_id = Some("loc-1".to_string());

    let err = client.get_call_detail_records(&query).await.unwrap_err();
    assert!(matches!(err, WebexError::Forbidden { .. }));
    assert!(err.to_string().contains("Detailed Call History"));
}

#[tokio::test]
async fn non_input_400_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdr_feed"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Organization is not entitled to the CDR feed",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_call_detail_records(&cdr_query("2024-01-15T10:00:00Z", "2024-01-15T12:00:00Z"))
        .await
        .unwrap_err();
    assert!(matches!(err, WebexError::Rejected { retryable: false, .. }));
}

#[tokio::test]
async fn exhaustion_reports_window_diagnostics() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdr_feed"))
        .respond_with(invalid_input_400())
        .expect(4)
        .mount(&server)
        .await;

    let client = client_for(&server);
    // A window from 2020 is far outside the feed's 48-hour horizon.
    let mut query = cdr_query("2020-01-01T00:00:00Z", "2020-01-02T00:00:00Z");
    query.location_id = Some("loc-1".to_string());

    let err = client.get_call_detail_records(&query).await.unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, WebexError::RetryExhausted(_)));
    assert!(message.contains("All 4 CDR request variants"));
    assert!(message.contains("POST failed"));
    assert!(message.contains("more than 48 hours"));
}

#[tokio::test]
async fn missing_window_bound_fails_before_any_request() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let query = CdrQuery {
        end_time: Some(TimeSpec::from("2024-01-15T12:00:00Z")),
        ..CdrQuery::default()
    };
    let err = client.get_call_detail_records(&query).await.unwrap_err();
    assert!(matches!(err, WebexError::InvalidArgument(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn person_filter_is_applied_locally() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdr_feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Call ID": "c1", "from": { "personId": "p1" } },
            { "Call ID": "c2", "to": { "personId": "p1" } },
            { "Call ID": "c3", "personId": "p1" },
            { "Call ID": "c4", "personId": "p2" },
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut query = cdr_query("2024-01-15T10:00:00Z", "2024-01-15T12:00:00Z");
    query.person_id = Some("p1".to_string());

    let records = client.get_call_detail_records(&query).await.unwrap();
    let ids: Vec<_> = records
        .iter()
        .map(|r| r.get("Call ID").and_then(Value::as_str).unwrap_or_default())
        .collect();
    assert_eq!(ids, ["c1", "c2", "c3"]);
}

#[tokio::test]
async fn pstn_minutes_summarizes_fetched_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdr_feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "Call type": "SIP_PSTN", "Duration": 100 },
                { "Call type": "SIP_PSTN", "Duration": 50 },
                { "Call type": "SIP_ENTERPRISE", "Duration": 600 },
                { "Call type": "SIP_PSTN", "Duration": 0 },
            ],
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let summary = client
        .get_pstn_minutes(&cdr_query("2024-01-15T10:00:00Z", "2024-01-15T12:00:00Z"))
        .await
        .unwrap();

    assert_eq!(summary.total_seconds, 150);
    assert_eq!(summary.total_calls, 2);
    assert_eq!(summary.total_minutes, 2.5);
    assert_eq!(summary.sample_records.len(), 2);
    // Wire bounds carry the zero-millisecond substitution.
    assert_eq!(summary.start_time, "2024-01-15T10:00:00.001Z");
}

// MCP dispatch

fn request(method: &str, params: Value) -> McpRequest {
    let mut req = McpRequest::new(1i64, method);
    if !params.is_null() {
        req = req.with_params(params);
    }
    req
}

fn result_text(result: &Value) -> String {
    result["content"][0]["text"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn dispatch_lists_tools_and_serves_initialize() {
    let server = MockServer::start().await;
    let mcp = McpServer::new(Arc::new(client_for(&server)));

    let response = mcp.dispatch(request("initialize", Value::Null)).await;
    let result = response.result.unwrap();
    assert_eq!(result["serverInfo"]["name"], "webex-gateway");
    assert!(result["capabilities"]["tools"].is_object());

    let response = mcp.dispatch(request("tools/list", Value::Null)).await;
    let tools = response.result.unwrap();
    let names: Vec<_> = tools["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap_or_default().to_string())
        .collect();
    for expected in ["get_organization_info", "get_call_detail_records", "get_pstn_minutes"] {
        assert!(names.contains(&expected.to_string()), "missing tool {}", expected);
    }
}

#[tokio::test]
async fn dispatch_renders_tool_failures_as_text_results() {
    let server = MockServer::start().await;
    let mcp = McpServer::new(Arc::new(client_for(&server)));

    let response = mcp
        .dispatch(request("tools/call", json!({ "name": "no_such_tool", "arguments": {} })))
        .await;
    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    assert!(result_text(&result).contains("Error calling no_such_tool"));

    // Missing required argument: still a text reply, not a protocol fault.
    let response = mcp
        .dispatch(request("tools/call", json!({ "name": "get_user_details", "arguments": {} })))
        .await;
    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    assert!(result_text(&result).contains("person_id is required"));
}

#[tokio::test]
async fn dispatch_executes_local_tools() {
    let server = MockServer::start().await;
    let mcp = McpServer::new(Arc::new(client_for(&server)));

    let response = mcp
        .dispatch(request(
            "tools/call",
            json!({ "name": "lookup_area_code", "arguments": { "area_code": "415" } }),
        ))
        .await;
    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);
    assert!(result_text(&result).contains("California"));
}

#[tokio::test]
async fn dispatch_rejects_unknown_methods() {
    let server = MockServer::start().await;
    let mcp = McpServer::new(Arc::new(client_for(&server)));

    let response = mcp.dispatch(request("resources/list", Value::Null)).await;
    let error = response.error.unwrap();
    assert_eq!(error.code, callbridge_mcp_sdk::protocol::error_codes::METHOD_NOT_FOUND);
    assert_eq!(response.id, RequestId::Number(1));
}
