//! Stress tests: large indexes, many streams, timing bounds.
//!
//! Tests verify that filtered search over 10K recipes stays correct and fast,
//! and that the gateway tracks dozens of simultaneous streams.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use recipe_index::{InMemoryIndex, Nutrition, Recipe, RecipeStore};
use recipe_search_mcp::protocol::NegotiatedCapabilities;
use recipe_search_mcp::transport::{router, AppState};
use recipe_search_mcp::types::{JsonRpcMessage, JsonRpcRequest, RequestId};
use recipe_search_mcp::{default_registry, ProtocolHandler};

const API_KEY: &str = "stress-key";

// ─── Helpers ───────────────────────────────────────────────────────────────

fn recipe(i: usize) -> Recipe {
    Recipe {
        id: format!("r{i}"),
        name: format!("Dish {i}"),
        description: format!("{} with {}", ["stew", "soup", "salad"][i % 3], ["rice", "bread"][i % 2]),
        nutrition: Nutrition {
            calories: (i % 1000) as f64,
            protein: (i % 50) as f64,
            ..Nutrition::default()
        },
        steps: vec!["cook".to_string()],
        ingredients: vec![["garlic", "onion", "leek", "ginger"][i % 4].to_string()],
        minutes: (i % 120) as u32,
    }
}

async fn create_handler(count: usize) -> ProtocolHandler {
    let store = RecipeStore::new(Arc::new(InMemoryIndex::new()));
    let recipes: Vec<Recipe> = (0..count).map(recipe).collect();
    let written = store.index_recipes(&recipes).await.unwrap();
    assert_eq!(written, count);
    ProtocolHandler::new(Arc::new(default_registry(store).unwrap()))
}

async fn call_tool(handler: &ProtocolHandler, name: &str, args: Value) -> Value {
    let req = JsonRpcRequest::new(
        RequestId::Number(1),
        "tools/call",
        Some(json!({"name": name, "arguments": args})),
    );
    handler
        .handle_message(&mut NegotiatedCapabilities::default(), JsonRpcMessage::Request(req))
        .await
        .unwrap()
}

fn parse_json_text(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .expect("Expected text in tool response");
    serde_json::from_str(text).expect("Expected JSON in text")
}

/// Open `/sse` and return the body stream plus its message endpoint.
async fn open_stream(app: &Router) -> (axum::body::BodyDataStream, String) {
    let response = app
        .clone()
        .oneshot(
            Request::get("/sse")
                .header(header::AUTHORIZATION, format!("Bearer {API_KEY}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body().into_data_stream();
    let mut buffer = String::new();
    while !buffer.contains("\n\n") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("Timed out waiting for endpoint")
            .expect("Stream ended")
            .unwrap();
        buffer.push_str(&String::from_utf8_lossy(&chunk));
    }
    let endpoint = buffer
        .lines()
        .find_map(|line| line.strip_prefix("data:"))
        .expect("Endpoint event without data")
        .trim()
        .to_string();
    (body, endpoint)
}

async fn active_connections(app: &Router) -> u64 {
    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: Value = serde_json::from_slice(&bytes).unwrap();
    health["activeConnections"].as_u64().unwrap()
}

// ─── Tests ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_10k_recipes_filtered_search() {
    let start = Instant::now();
    let handler = create_handler(10_000).await;
    let seeded = start.elapsed();

    let start = Instant::now();
    let response = call_tool(
        &handler,
        "search_recipes",
        json!({
            "query": "stew rice",
            "maxCalories": 300,
            "maxMinutes": 30,
            "ingredients": ["garlic", "leek"],
            "maxResults": 100
        }),
    )
    .await;
    let searched = start.elapsed();

    let matches = parse_json_text(&response);
    let matches = matches.as_array().unwrap();
    assert_eq!(matches.len(), 100);
    for m in matches {
        let metadata = &m["metadata"];
        assert!(metadata["nutrition"]["calories"].as_f64().unwrap() < 300.0);
        assert!(metadata["minutes"].as_u64().unwrap() < 30);
        let ingredient = metadata["ingredients"][0].as_str().unwrap();
        assert!(ingredient == "garlic" || ingredient == "leek");
    }
    // Full-term matches rank first.
    assert_eq!(matches[0]["score"], 1.0);

    assert!(seeded < Duration::from_secs(10), "Seeding took {seeded:?}");
    assert!(searched < Duration::from_secs(2), "Search took {searched:?}");
}

#[tokio::test]
async fn test_fetch_many_ids() {
    let handler = create_handler(2_000).await;
    let ids: Vec<String> = (0..2_000).step_by(7).map(|i| format!("r{i}")).collect();

    let response = call_tool(&handler, "get_recipe_by_id", json!({"ids": ids})).await;
    let recipes = parse_json_text(&response);
    let recipes = recipes.as_array().unwrap();
    assert_eq!(recipes.len(), ids.len());
    assert_eq!(recipes[1]["id"], "r7");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_streams_tracked() {
    let state = AppState::new(create_handler(50).await, API_KEY);
    let app = router(state.clone());

    let mut streams = Vec::new();
    for _ in 0..40 {
        streams.push(open_stream(&app).await);
    }
    assert_eq!(active_connections(&app).await, 40);

    let posts = streams.iter().enumerate().map(|(i, (_, endpoint))| {
        let app = app.clone();
        let body = serde_json::to_vec(&json!({"jsonrpc": "2.0", "id": i, "method": "ping"})).unwrap();
        async move {
            let response = app
                .oneshot(
                    Request::post(endpoint.as_str())
                        .header(header::AUTHORIZATION, format!("Bearer {API_KEY}"))
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();
            response.status()
        }
    });
    for status in futures::future::join_all(posts).await {
        assert_eq!(status, StatusCode::OK);
    }

    streams.truncate(10);
    assert_eq!(active_connections(&app).await, 10);
    drop(streams);
    assert_eq!(active_connections(&app).await, 0);
}
