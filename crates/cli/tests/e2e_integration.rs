//! End-to-end integration tests for toolchat.
//!
//! These tests exercise the full pipeline: UI messages posted to the
//! gateway, the agent loop with real tools, the SSE stream, and the client
//! chat state folding the events back into messages.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use toolchat_agent::{Agent, AgentStreamEvent, ChatState, ChatStatus, FinishReason};
use toolchat_config::AppConfig;
use toolchat_core::error::ProviderError;
use toolchat_core::message::{Message, MessageToolCall, Role};
use toolchat_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use toolchat_core::ui::{Part, ToolState, UiMessage};
use toolchat_gateway::{GatewayState, build_router};

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted responses in sequence and records
/// every request it sees.
struct ScriptedProvider {
    responses: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, index: usize) -> ProviderRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            panic!("ScriptedProvider exhausted: call #{}", requests.len() + 1);
        }
        requests.push(request);
        responses.remove(0)
    }
}

fn text_response(text: &str) -> Result<ProviderResponse, ProviderError> {
    Ok(ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    })
}

fn tool_response(calls: Vec<MessageToolCall>) -> Result<ProviderResponse, ProviderError> {
    Ok(ProviderResponse {
        message: Message::assistant("").with_tool_calls(calls),
        usage: Some(Usage {
            prompt_tokens: 20,
            completion_tokens: 8,
            total_tokens: 28,
        }),
        model: "mock-model".into(),
    })
}

fn call(id: &str, name: &str, args: Value) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: args.to_string(),
    }
}

// ── Harness ──────────────────────────────────────────────────────────────

fn app(config: &AppConfig, provider: Arc<ScriptedProvider>) -> Router {
    let agent = Agent::from_config(config, provider).unwrap();
    build_router(
        Arc::new(GatewayState::new(agent, &config.gateway)),
        &config.gateway,
    )
}

/// Post the chat's messages to the gateway and fold the SSE reply into it.
async fn post_chat(app: Router, chat: &mut ChatState) -> Vec<AgentStreamEvent> {
    let body = json!({ "messages": chat.messages() }).to_string();
    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    let events: Vec<AgentStreamEvent> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect();
    for event in &events {
        chat.apply(event);
    }
    events
}

fn tool_outputs(message: &UiMessage) -> Vec<(String, Value)> {
    message
        .parts
        .iter()
        .filter_map(|part| match part {
            Part::ToolInvocation {
                tool_name,
                state: ToolState::OutputAvailable,
                output: Some(output),
                ..
            } => Some((tool_name.clone(), output.clone())),
            _ => None,
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_seven_times_six() {
    let provider = ScriptedProvider::new(vec![
        tool_response(vec![call(
            "call_1",
            "calculator",
            json!({"operation": "multiply", "a": 7, "b": 6}),
        )]),
        text_response("7 times 6 is 42."),
    ]);
    let mut chat = ChatState::new();
    chat.submit("What is 7 times 6?");

    let events = post_chat(app(&AppConfig::default(), provider.clone()), &mut chat).await;

    assert_eq!(chat.status(), ChatStatus::Ready);
    let assistant = &chat.messages()[1];
    let outputs = tool_outputs(assistant);
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].0, "calculator");
    assert_eq!(outputs[0].1["result"], 42);
    assert_eq!(outputs[0].1["message"], "7 × 6 = 42");
    assert!(assistant.text().contains("42"));

    match events.last().unwrap() {
        AgentStreamEvent::Finish {
            finish_reason,
            steps,
            tool_calls,
            usage,
            ..
        } => {
            assert_eq!(*finish_reason, FinishReason::Stop);
            assert_eq!(*steps, 2);
            assert_eq!(*tool_calls, 1);
            assert_eq!(usage.unwrap().total_tokens, 43);
        }
        other => panic!("Expected finish, got {other:?}"),
    }
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn e2e_second_turn_carries_tool_history() {
    let provider = ScriptedProvider::new(vec![
        tool_response(vec![call(
            "call_1",
            "searchAssets",
            json!({"search_query": "dell"}),
        )]),
        text_response("You have one Dell laptop."),
        text_response("It is a Dell XPS 15."),
    ]);
    let config = AppConfig::default();
    let mut chat = ChatState::new();

    chat.submit("Find Dell laptops");
    post_chat(app(&config, provider.clone()), &mut chat).await;

    let outputs = tool_outputs(&chat.messages()[1]);
    let assets = outputs[0].1["assets"].as_array().unwrap();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0]["name"], "Dell XPS 15");

    chat.submit("Which model is it?");
    post_chat(app(&config, provider.clone()), &mut chat).await;
    assert_eq!(chat.messages().len(), 4);

    // The third model call sees the full first turn, step by step
    let third = provider.request(2);
    let roles: Vec<Role> = third.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::System,
            Role::User,
            Role::Assistant,
            Role::Tool,
            Role::Assistant,
            Role::User
        ]
    );
    assert_eq!(third.messages[2].tool_calls[0].name, "searchAssets");
    let replayed: Value = serde_json::from_str(&third.messages[3].content).unwrap();
    assert_eq!(replayed["type"], "assets_found");
    // The answer written after the tool ran is its own assistant turn
    assert_eq!(third.messages[4].content, "You have one Dell laptop.");
    assert!(third.messages[4].tool_calls.is_empty());
}

#[tokio::test]
async fn e2e_natural_language_query_uses_structured_output() {
    let provider = ScriptedProvider::new(vec![
        tool_response(vec![call(
            "call_1",
            "queryAssetsNaturalLanguage",
            json!({"query": "total cost of Dell laptops"}),
        )]),
        // Inner structured-output call made by the tool
        text_response(
            &json!({
                "description": "Sum purchase cost of Dell laptops",
                "query_type": "sum",
                "takeaway": "Dell laptops account for $15,600"
            })
            .to_string(),
        ),
        text_response("Your Dell laptops cost $15,600 in total."),
    ]);
    let mut chat = ChatState::new();
    chat.submit("What's the total cost of Dell laptops?");

    post_chat(app(&AppConfig::default(), provider.clone()), &mut chat).await;

    let outputs = tool_outputs(&chat.messages()[1]);
    assert_eq!(outputs[0].1["type"], "query_success");
    assert_eq!(outputs[0].1["query_type"], "sum");
    assert_eq!(outputs[0].1["rowCount"], 3);

    // The inner call carries no tools and is not streamed
    let inner = provider.request(1);
    assert!(inner.tools.is_empty());
    assert!(!inner.stream);
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn e2e_natural_language_query_failure_is_reported() {
    let provider = ScriptedProvider::new(vec![
        tool_response(vec![call(
            "call_1",
            "queryAssetsNaturalLanguage",
            json!({"query": "average value"}),
        )]),
        text_response("I am not JSON"),
        text_response("Sorry, that query failed."),
    ]);
    let mut chat = ChatState::new();
    chat.submit("Average value?");

    let events = post_chat(app(&AppConfig::default(), provider), &mut chat).await;

    let outputs = tool_outputs(&chat.messages()[1]);
    assert_eq!(outputs[0].1["type"], "query_error");
    assert_eq!(
        outputs[0].1["message"],
        "Failed to process natural language query"
    );
    assert!(matches!(
        events.last(),
        Some(AgentStreamEvent::Finish {
            finish_reason: FinishReason::Stop,
            ..
        })
    ));
}

#[tokio::test]
async fn e2e_concurrent_calls_in_one_step() {
    let provider = ScriptedProvider::new(vec![
        tool_response(vec![
            call("call_a", "calculator", json!({"operation": "add", "a": 1, "b": 2})),
            call("call_b", "getAssetStatistics", json!({"metric": "by_status"})),
            call("call_c", "calculator", json!({"operation": "divide", "a": 10, "b": 0})),
        ]),
        text_response("Here you go."),
    ]);
    let mut chat = ChatState::new();
    chat.submit("Several things at once");

    let events = post_chat(app(&AppConfig::default(), provider), &mut chat).await;

    let mut result_ids: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            AgentStreamEvent::ToolResult { tool_call_id, .. } => Some(tool_call_id.clone()),
            _ => None,
        })
        .collect();
    result_ids.sort();
    assert_eq!(result_ids, vec!["call_a", "call_b", "call_c"]);

    let outputs = tool_outputs(&chat.messages()[1]);
    assert_eq!(outputs.len(), 3);
    assert_eq!(outputs[0].1["result"], 3);
    assert_eq!(outputs[1].1["data"][0]["count"], 18);
    assert_eq!(
        outputs[2].1,
        json!({"type": "error", "message": "Cannot divide by zero"})
    );
}

#[tokio::test]
async fn e2e_step_limit() {
    let mut script: Vec<_> = (0..5)
        .map(|i| {
            tool_response(vec![call(
                &format!("call_{i}"),
                "getCurrentTime",
                json!({"timezone": "UTC"}),
            )])
        })
        .collect();
    // Never reached
    script.push(text_response("unreachable"));
    let provider = ScriptedProvider::new(script);
    let mut chat = ChatState::new();
    chat.submit("Keep checking the time");

    let events = post_chat(app(&AppConfig::default(), provider.clone()), &mut chat).await;

    assert_eq!(provider.calls(), 5);
    match events.last().unwrap() {
        AgentStreamEvent::Finish {
            finish_reason,
            steps,
            tool_calls,
            ..
        } => {
            assert_eq!(*finish_reason, FinishReason::StepLimit);
            assert_eq!(*steps, 5);
            assert_eq!(*tool_calls, 5);
        }
        other => panic!("Expected finish, got {other:?}"),
    }
    assert_eq!(chat.status(), ChatStatus::Ready);
    let outputs = tool_outputs(&chat.messages()[1]);
    assert_eq!(outputs.len(), 5);
    assert_eq!(outputs[0].1["type"], "time_retrieved");
    assert_eq!(outputs[0].1["timezone"], "UTC");
}

#[tokio::test]
async fn e2e_ledger_tools_when_enabled() {
    let provider = ScriptedProvider::new(vec![
        tool_response(vec![call(
            "call_1",
            "getAssetHistoryTimeline",
            json!({"asset_id": "asset-1", "limit": 2}),
        )]),
        text_response("Here is the history."),
    ]);
    let mut config = AppConfig::default();
    config.agent.enable_ledger_tools = true;
    let mut chat = ChatState::new();
    chat.submit("Show me the history of asset-1");

    post_chat(app(&config, provider.clone()), &mut chat).await;

    assert_eq!(provider.request(0).tools.len(), 10);
    let outputs = tool_outputs(&chat.messages()[1]);
    let out = &outputs[0].1;
    assert_eq!(out["type"], "timeline_retrieved");
    assert_eq!(out["timeline"].as_array().unwrap().len(), 2);
    assert_eq!(out["total_events"], 3);
    assert_eq!(out["timeline"][0]["title"], "Asset Created");
}

#[tokio::test]
async fn e2e_ledger_tools_absent_by_default() {
    let provider = ScriptedProvider::new(vec![
        tool_response(vec![call(
            "call_1",
            "queryCodeInAssets",
            json!({}),
        )]),
        text_response("That tool is not available."),
    ]);
    let mut chat = ChatState::new();
    chat.submit("Query Code-In");

    post_chat(app(&AppConfig::default(), provider), &mut chat).await;

    let outputs = tool_outputs(&chat.messages()[1]);
    assert_eq!(outputs[0].1["type"], "error");
    assert_eq!(outputs[0].1["message"], "Unknown tool: queryCodeInAssets");
}

#[tokio::test]
async fn e2e_transport_error_keeps_partial_history() {
    let provider = ScriptedProvider::new(vec![
        tool_response(vec![call(
            "call_1",
            "calculator",
            json!({"operation": "add", "a": 2, "b": 2}),
        )]),
        Err(ProviderError::ApiError {
            status_code: 503,
            message: "upstream unavailable".into(),
        }),
    ]);
    let mut chat = ChatState::new();
    chat.submit("2 + 2?");

    let events = post_chat(app(&AppConfig::default(), provider), &mut chat).await;

    assert!(matches!(events.last(), Some(AgentStreamEvent::Error { .. })));
    assert_eq!(chat.status(), ChatStatus::Error);
    assert!(chat.error().unwrap().contains("upstream unavailable"));

    // The first step's tool result survives
    assert_eq!(chat.messages().len(), 2);
    assert_eq!(tool_outputs(&chat.messages()[1])[0].1["result"], 4);
}
