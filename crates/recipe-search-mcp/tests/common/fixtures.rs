//! Test data fixtures for MCP server tests.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, BodyDataStream};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use serde_json::Value;
use tower::ServiceExt;

use recipe_index::{InMemoryIndex, Nutrition, Recipe, RecipeStore};
use recipe_search_mcp::protocol::ProtocolHandler;
use recipe_search_mcp::tools::default_registry;
use recipe_search_mcp::transport::{router, AppState};
use recipe_search_mcp::types::{JsonRpcMessage, JsonRpcRequest, RequestId};

pub const API_KEY: &str = "test-api-key";

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

fn recipe(id: &str, name: &str, description: &str, minutes: u32, calories: f64, ingredients: &[&str]) -> Recipe {
    Recipe {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        nutrition: Nutrition {
            calories,
            protein: 20.0,
            ..Nutrition::default()
        },
        steps: vec!["prepare".to_string(), "cook".to_string()],
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        minutes,
    }
}

/// Four recipes; three of them mention chicken.
pub fn sample_recipes() -> Vec<Recipe> {
    vec![
        recipe("r1", "Chicken soup", "Warm chicken broth with carrots", 30, 250.0, &["chicken", "carrot"]),
        recipe("r2", "Tomato pasta", "Quick pasta in tomato sauce", 20, 500.0, &["tomato", "pasta"]),
        recipe("r3", "Chicken curry", "Spicy chicken with rice", 45, 650.0, &["chicken", "rice"]),
        recipe("r4", "Chicken salad", "Cold chicken with greens", 10, 320.0, &["chicken", "lettuce"]),
    ]
}

/// A recipe store over an in-memory index seeded with [`sample_recipes`].
pub async fn seeded_store() -> RecipeStore {
    let store = RecipeStore::new(Arc::new(InMemoryIndex::new()));
    store
        .index_recipes(&sample_recipes())
        .await
        .expect("Failed to seed index");
    store
}

pub async fn seeded_handler() -> ProtocolHandler {
    let registry = default_registry(seeded_store().await).expect("Failed to build registry");
    ProtocolHandler::new(Arc::new(registry))
}

pub async fn test_state() -> AppState {
    AppState::new(seeded_handler().await, API_KEY)
}

pub async fn test_app() -> (AppState, Router) {
    let state = test_state().await;
    let app = router(state.clone());
    (state, app)
}

pub fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcMessage {
    JsonRpcMessage::Request(JsonRpcRequest::new(RequestId::Number(id), method, params))
}

pub fn call(id: i64, name: &str, arguments: Value) -> JsonRpcMessage {
    request(
        id,
        "tools/call",
        Some(serde_json::json!({"name": name, "arguments": arguments})),
    )
}

/// Text of the first content block of a `tools/call` response.
pub fn tool_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .expect("Expected text content")
}

pub fn is_tool_error(response: &Value) -> bool {
    response["result"]["isError"] == Value::Bool(true)
}

pub fn bearer() -> String {
    format!("Bearer {API_KEY}")
}

/// An open `/sse` response body.
pub struct EventStream {
    pub session_id: String,
    pub endpoint: String,
    body: BodyDataStream,
    buffer: String,
}

impl EventStream {
    /// Next named event as `(event, data)`. Keep-alive comments are skipped.
    pub async fn next_event(&mut self) -> Option<(String, String)> {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                if let Some(event) = parse_frame(&frame) {
                    return Some(event);
                }
                continue;
            }
            let chunk = tokio::time::timeout(EVENT_TIMEOUT, self.body.next())
                .await
                .expect("Timed out waiting for SSE event")?
                .expect("SSE body error");
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }

    /// Next `message` event decoded as JSON.
    pub async fn next_message(&mut self) -> Value {
        let (event, data) = self.next_event().await.expect("Stream ended");
        assert_eq!(event, "message");
        serde_json::from_str(&data).expect("Message data is not JSON")
    }
}

fn parse_frame(frame: &str) -> Option<(String, String)> {
    let mut event = None;
    let mut data = Vec::new();
    for line in frame.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            event = Some(value.strip_prefix(' ').unwrap_or(value).to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
        }
    }
    event.map(|e| (e, data.join("\n")))
}

/// Open a stream and read its endpoint event.
pub async fn open_stream(app: &Router) -> EventStream {
    let response = app
        .clone()
        .oneshot(
            Request::get("/sse")
                .header(header::AUTHORIZATION, bearer())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut stream = EventStream {
        session_id: String::new(),
        endpoint: String::new(),
        body: response.into_body().into_data_stream(),
        buffer: String::new(),
    };
    let (event, endpoint) = stream.next_event().await.expect("No endpoint event");
    assert_eq!(event, "endpoint");
    stream.session_id = endpoint
        .split("sessionId=")
        .nth(1)
        .expect("Endpoint without sessionId")
        .to_string();
    stream.endpoint = endpoint;
    stream
}

/// POST a raw body to `uri` with the test key. Returns status and JSON body, if any.
pub async fn post_raw(app: &Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Option<Value>) {
    let response = app
        .clone()
        .oneshot(
            Request::post(uri)
                .header(header::AUTHORIZATION, bearer())
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).ok();
    (status, json)
}

pub async fn post_message(app: &Router, uri: &str, message: &JsonRpcMessage) -> (StatusCode, Option<Value>) {
    post_raw(app, uri, serde_json::to_vec(message).unwrap()).await
}

/// Wait until `check` holds, polling briefly. Stream cleanup runs on drop,
/// which can lag the test's own progress by a scheduler tick.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
