//! End-to-end tests for the chat completions endpoint

mod harness;

use std::io::Write as _;

use conduit_gateway::MANDATED_INSTRUCTION;
use harness::config::ConfigBuilder;
use harness::mock_backend::MockBackend;
use harness::server::TestServer;

fn chat_body(model: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "messages": [
            {"role": "system", "content": "Be brief."},
            {"role": "user", "content": "Hi"}
        ]
    })
}

async fn post_chat(
    server: &TestServer,
    body: &serde_json::Value,
) -> reqwest::Response {
    server
        .client()
        .post(server.url("/v1/chat/completions"))
        .bearer_auth("sk-test-token")
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn completion_translates_request_and_response() {
    let mock = MockBackend::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = post_chat(&server, &chat_body("gpt-4")).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["model"], "gpt-4");
    assert!(body["id"].as_str().unwrap().starts_with("chatcmpl-"));
    assert_eq!(body["choices"][0]["message"]["role"], "assistant");
    assert_eq!(
        body["choices"][0]["message"]["content"],
        "Hello from the mock backend"
    );
    assert_eq!(body["choices"][0]["finish_reason"], "stop");
    assert_eq!(body["usage"]["prompt_tokens"], 12);
    assert_eq!(body["usage"]["completion_tokens"], 5);
    assert_eq!(body["usage"]["total_tokens"], 17);

    let recorded = mock.last_request().unwrap();
    assert_eq!(recorded.anthropic_version.as_deref(), Some("2023-06-01"));
    assert_eq!(recorded.anthropic_beta.as_deref(), Some("oauth-2025-04-20"));
    assert_eq!(recorded.authorization.as_deref(), Some("Bearer sk-test-token"));

    assert_eq!(recorded.body["model"], "claude-sonnet-4-20250514");
    assert_eq!(recorded.body["max_tokens"], 4096);
    assert_eq!(
        recorded.body["messages"],
        serde_json::json!([{"role": "user", "content": "Hi"}])
    );
}

#[tokio::test]
async fn system_messages_become_leading_instruction_blocks() {
    let mock = MockBackend::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = post_chat(&server, &chat_body("gpt-4")).await;
    assert_eq!(resp.status(), 200);

    let recorded = mock.last_request().unwrap();
    let system = recorded.body["system"].as_array().unwrap();
    assert_eq!(system.len(), 2);
    assert_eq!(system[0]["type"], "text");
    assert_eq!(system[0]["text"], MANDATED_INSTRUCTION);
    assert_eq!(system[1]["text"], "Be brief.");
}

#[tokio::test]
async fn low_tier_model_marker_maps_to_low_tier() {
    let mock = MockBackend::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = post_chat(&server, &chat_body("gpt-4o-mini")).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["model"], "gpt-4o-mini");

    let recorded = mock.last_request().unwrap();
    assert_eq!(recorded.body["model"], "claude-3-5-haiku-20241022");
}

#[tokio::test]
async fn mapping_file_override_takes_precedence() {
    let mut map_file = tempfile::NamedTempFile::new().unwrap();
    write!(map_file, r#"{{"gpt-4": "claude-opus-4-20250514"}}"#).unwrap();

    let mock = MockBackend::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url())
        .with_model_map(map_file.path())
        .build();
    let server = TestServer::start(config).await.unwrap();

    let resp = post_chat(&server, &chat_body("gpt-4")).await;
    assert_eq!(resp.status(), 200);

    let recorded = mock.last_request().unwrap();
    assert_eq!(recorded.body["model"], "claude-opus-4-20250514");
}

#[tokio::test]
async fn consecutive_same_role_turns_are_consolidated() {
    let mock = MockBackend::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let body = serde_json::json!({
        "model": "gpt-4",
        "messages": [
            {"role": "user", "content": "First"},
            {"role": "user", "content": "Second"},
            {"role": "assistant", "content": "Reply"},
            {"role": "user", "content": "Third"}
        ]
    });

    let resp = post_chat(&server, &body).await;
    assert_eq!(resp.status(), 200);

    let recorded = mock.last_request().unwrap();
    assert_eq!(
        recorded.body["messages"],
        serde_json::json!([
            {"role": "user", "content": "First\n\nSecond"},
            {"role": "assistant", "content": "Reply"},
            {"role": "user", "content": "Third"}
        ])
    );
}

#[tokio::test]
async fn tool_use_reply_becomes_tool_calls() {
    let mock = MockBackend::start().await.unwrap();
    mock.set_reply(
        serde_json::json!([{
            "type": "tool_use",
            "id": "toolu_01",
            "name": "get_weather",
            "input": {"location": "San Francisco"}
        }]),
        "tool_use",
    );

    let config = ConfigBuilder::new(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let body = serde_json::json!({
        "model": "gpt-4",
        "messages": [{"role": "user", "content": "What is the weather?"}],
        "tools": [{
            "type": "function",
            "function": {
                "name": "get_weather",
                "description": "Get current weather",
                "parameters": {
                    "type": "object",
                    "properties": {"location": {"type": "string"}}
                }
            }
        }]
    });

    let resp = post_chat(&server, &body).await;
    assert_eq!(resp.status(), 200);

    let response: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(response["choices"][0]["finish_reason"], "tool_calls");

    let tool_call = &response["choices"][0]["message"]["tool_calls"][0];
    assert_eq!(tool_call["id"], "toolu_01");
    assert_eq!(tool_call["type"], "function");
    assert_eq!(tool_call["function"]["name"], "get_weather");
    let arguments: serde_json::Value =
        serde_json::from_str(tool_call["function"]["arguments"].as_str().unwrap()).unwrap();
    assert_eq!(arguments, serde_json::json!({"location": "San Francisco"}));

    // Tool definition arrives flattened in native shape
    let recorded = mock.last_request().unwrap();
    let tools = recorded.body["tools"].as_array().unwrap();
    assert_eq!(tools[0]["name"], "get_weather");
    assert_eq!(tools[0]["description"], "Get current weather");
    assert!(tools[0]["input_schema"].is_object());
}

#[tokio::test]
async fn missing_authorization_is_rejected() {
    let mock = MockBackend::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .post(server.url("/v1/chat/completions"))
        .json(&chat_body("gpt-4"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["type"], "authentication_error");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn upstream_error_is_translated() {
    let mock = MockBackend::start().await.unwrap();
    mock.set_error(
        axum::http::StatusCode::SERVICE_UNAVAILABLE,
        serde_json::json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        }),
    );

    let config = ConfigBuilder::new(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = post_chat(&server, &chat_body("gpt-4")).await;
    assert_eq!(resp.status(), 503);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["type"], "overloaded_error");
    assert_eq!(body["error"]["message"], "Overloaded");
}
