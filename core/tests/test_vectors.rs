//! Verify the request/response pipeline against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each vector describes the call (method, path, body, session), the request
//! the client must build, a simulated response, and either the expected
//! payload or the expected error. Bodies are compared as parsed JSON, not raw
//! strings, so field ordering does not matter.

use std::sync::Arc;

use async_trait::async_trait;
use baasbox_core::{
    ApiError, CancellationToken, ClientConfig, HttpMethod, HttpRequest, HttpResponse, NoSession,
    RestClient, SessionSource, SharedSession, Transport,
};
use serde_json::Value;

fn vectors() -> Value {
    let raw = include_str!("../../test-vectors/requests.json");
    serde_json::from_str(raw).unwrap()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        other => panic!("unknown method: {other}"),
    }
}

fn session_for(case: &Value) -> Arc<dyn SessionSource> {
    match case["session"].as_str() {
        Some(token) => Arc::new(SharedSession::with_token(token)),
        None => Arc::new(NoSession),
    }
}

fn simulated_response(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn check_outcome(name: &str, case: &Value, result: Result<Value, ApiError>) {
    match case.get("expected_error").and_then(Value::as_str) {
        Some("Http") => {
            let err = result.unwrap_err();
            let expected = case["expected_status"].as_u64().unwrap() as u16;
            assert!(
                matches!(err, ApiError::Http { status, .. } if status == expected),
                "{name}: expected Http({expected}), got {err:?}"
            );
        }
        Some("Decode") => {
            let err = result.unwrap_err();
            assert!(matches!(err, ApiError::Decode(_)), "{name}: expected Decode, got {err:?}");
        }
        Some(other) => panic!("{name}: unknown expected_error: {other}"),
        None => {
            let data = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e}"));
            assert_eq!(data, case["expected_result"], "{name}: parsed result");
        }
    }
}

#[test]
fn config_vector_deserializes() {
    let config: ClientConfig = serde_json::from_value(vectors()["config"].clone()).unwrap();
    assert_eq!(config, ClientConfig::new("http://api.example.com", 9000, "ABC"));
}

#[test]
fn build_and_parse_vectors() {
    let vectors = vectors();
    let config: ClientConfig = serde_json::from_value(vectors["config"].clone()).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let client = RestClient::new(
            config.clone(),
            session_for(case),
            Arc::new(CannedTransport::default()),
        );
        let method = parse_method(case["method"].as_str().unwrap());
        let body = Some(&case["body"]).filter(|b| !b.is_null());
        let expected_req = &case["expected_request"];

        // Verify build
        let req = client
            .build_request(method, case["path"].as_str().unwrap(), body)
            .unwrap();
        assert_eq!(req.method, method, "{name}: method");
        assert_eq!(req.url, expected_req["url"].as_str().unwrap(), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match req.body.as_deref() {
            Some(raw) => {
                let sent: Value = serde_json::from_str(raw).unwrap();
                assert_eq!(sent, expected_req["body"], "{name}: body");
            }
            None => assert!(expected_req["body"].is_null(), "{name}: body should be None"),
        }

        // Verify parse
        let result = client.parse_response::<Value>(simulated_response(case));
        check_outcome(name, case, result);
    }
}

/// Answers every request with one fixed response.
#[derive(Default)]
struct CannedTransport {
    response: Option<HttpResponse>,
}

#[async_trait]
impl Transport for CannedTransport {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.response
            .clone()
            .ok_or_else(|| ApiError::Transport("no canned response".to_string()))
    }
}

#[tokio::test]
async fn async_operations_match_vectors() {
    let vectors = vectors();
    let config: ClientConfig = serde_json::from_value(vectors["config"].clone()).unwrap();
    let cancel = CancellationToken::new();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let transport = CannedTransport {
            response: Some(simulated_response(case)),
        };
        let client = RestClient::new(config.clone(), session_for(case), Arc::new(transport));
        let path = case["path"].as_str().unwrap();
        let body = Some(&case["body"]).filter(|b| !b.is_null());

        let result = match parse_method(case["method"].as_str().unwrap()) {
            HttpMethod::Get => client.get::<Value>(path, &cancel).await,
            HttpMethod::Post => client.post::<Value, _>(path, body, &cancel).await,
            HttpMethod::Put => client.put::<Value, _>(path, body, &cancel).await,
        };
        check_outcome(name, case, result);
    }
}
