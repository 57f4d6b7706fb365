//! Shared wiremock fixtures for `parley-infra` integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parley_domain::ClientConfig;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Config pointed at `server` with short delays so retries finish quickly.
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.uri())
        .with_request_timeout(Duration::from_secs(2))
        .with_retry_delay(Duration::from_millis(10))
}

pub fn grant_body(token: &str, expires_in: &str) -> Value {
    json!({"token": token, "expiresIn": expires_in, "tokenType": "Bearer"})
}

/// Serve `token` from the token endpoint on every call.
pub async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body(token, "900")))
        .mount(server)
        .await;
}

/// Serve `token-1`, `token-2`, ... in order and count the calls.
pub async fn mount_sequential_tokens(server: &MockServer) -> Arc<AtomicUsize> {
    let issued = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&issued);
    Mock::given(method("POST"))
        .and(path("/api/tokens"))
        .respond_with(move |_req: &Request| -> ResponseTemplate {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            ResponseTemplate::new(200).set_body_json(grant_body(&format!("token-{n}"), "900"))
        })
        .mount(server)
        .await;
    issued
}

pub fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"content": content}))
}

/// Requests the server received on `endpoint`.
pub async fn requests_to(server: &MockServer, endpoint: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == endpoint)
        .collect()
}

pub fn bearer(request: &Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub fn json_body(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap_or(Value::Null)
}
