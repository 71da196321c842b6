// ABOUTME: HTTP contract tests for the OpenAI-compatible provider against a mock server
// ABOUTME: Covers request shape, JSON mode, auth header, and upstream error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::net::TcpListener;

use recipe_ai_server::{
    errors::ErrorCode,
    llm::{
        ChatMessage, ChatRequest, EndpointKind, LlmCapabilities, LlmProvider,
        OpenAiCompatibleConfig, OpenAiCompatibleProvider,
    },
};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn provider_for(server: &MockServer, capabilities: LlmCapabilities) -> OpenAiCompatibleProvider {
    OpenAiCompatibleProvider::new(OpenAiCompatibleConfig {
        base_url: format!("{}/v1", server.uri()),
        api_key: Some("test-key".to_owned()),
        default_model: "test-model".to_owned(),
        kind: EndpointKind::Generic,
        capabilities,
    })
    .unwrap()
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
    })
}

fn hello_request() -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::system("You are a kitchen assistant."),
        ChatMessage::user("hello"),
    ])
}

#[tokio::test]
async fn test_completion_request_shape_and_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "stream": false,
            "messages": [
                { "role": "system", "content": "You are a kitchen assistant." },
                { "role": "user", "content": "hello" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hi! Hungry?")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, LlmCapabilities::chat_completions());
    let response = provider.complete(&hello_request()).await.unwrap();

    assert_eq!(response.content, "Hi! Hungry?");
    assert_eq!(response.model, "test-model");
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 17);
}

#[tokio::test]
async fn test_json_mode_sends_response_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "override-model",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{}")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, LlmCapabilities::chat_completions());
    let request = hello_request()
        .with_model("override-model")
        .with_json_mode();
    provider.complete(&request).await.unwrap();
}

#[tokio::test]
async fn test_json_mode_is_dropped_when_unsupported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{}")))
        .mount(&server)
        .await;

    let provider = provider_for(&server, LlmCapabilities::text_only());
    provider
        .complete(&hello_request().with_json_mode())
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body.get("response_format").is_none());
}

#[tokio::test]
async fn test_upstream_status_mapping() {
    let cases = [
        (401, ErrorCode::ExternalAuthFailed),
        (403, ErrorCode::ExternalAuthFailed),
        (429, ErrorCode::ExternalRateLimited),
        (500, ErrorCode::ExternalServiceUnavailable),
        (503, ErrorCode::ExternalServiceUnavailable),
        (400, ErrorCode::ExternalServiceError),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": { "message": "Rate limit reached. Please try again in 20s.", "type": "api_error" }
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server, LlmCapabilities::chat_completions())
            .complete(&hello_request())
            .await
            .unwrap_err();
        assert_eq!(err.code, expected, "status {status}");
        if status == 429 {
            assert_eq!(
                err.message,
                "AI rate limit reached. Please try again in 20 seconds."
            );
        }
    }
}

#[tokio::test]
async fn test_empty_choices_and_malformed_bodies_are_service_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let provider = provider_for(&server, LlmCapabilities::chat_completions());
    for _ in 0..2 {
        let err = provider.complete(&hello_request()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = OpenAiCompatibleProvider::new(OpenAiCompatibleConfig {
        base_url: format!("http://{addr}/v1"),
        api_key: None,
        default_model: "test-model".to_owned(),
        kind: EndpointKind::Generic,
        capabilities: LlmCapabilities::chat_completions(),
    })
    .unwrap();

    let err = provider.complete(&hello_request()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);
    assert!(err.message.starts_with("Cannot connect to"));
}

#[tokio::test]
async fn test_health_check_lists_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let provider = provider_for(&server, LlmCapabilities::chat_completions());
    assert!(provider.health_check().await.unwrap());
}
