//! Concurrent access: many sessions sharing one registry and index.
//!
//! Tests verify that sessions never see each other's responses, that each
//! session's responses keep request order, and that rapid open/close cycles
//! leave no sessions behind.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::{mpsc, Barrier};
use tokio_util::sync::CancellationToken;

use recipe_index::{InMemoryIndex, Nutrition, Recipe, RecipeStore};
use recipe_search_mcp::session::{SessionChannel, SessionGuard, SessionManager};
use recipe_search_mcp::types::{JsonRpcMessage, JsonRpcRequest, RequestId};
use recipe_search_mcp::{default_registry, ProtocolHandler};

// ─── Helpers ───────────────────────────────────────────────────────────────

fn recipe(i: usize) -> Recipe {
    Recipe {
        id: format!("r{i}"),
        name: format!("Recipe {i}"),
        description: if i % 2 == 0 { "chicken stew" } else { "bean chili" }.to_string(),
        nutrition: Nutrition {
            calories: (i * 10) as f64,
            ..Nutrition::default()
        },
        steps: vec![],
        ingredients: vec![if i % 2 == 0 { "chicken" } else { "beans" }.to_string()],
        minutes: (i % 90) as u32,
    }
}

async fn create_handler(count: usize) -> Arc<ProtocolHandler> {
    let store = RecipeStore::new(Arc::new(InMemoryIndex::new()));
    let recipes: Vec<Recipe> = (0..count).map(recipe).collect();
    store.index_recipes(&recipes).await.unwrap();
    Arc::new(ProtocolHandler::new(Arc::new(default_registry(store).unwrap())))
}

fn search(id: i64, query: &str, max_results: u64) -> JsonRpcMessage {
    JsonRpcMessage::Request(JsonRpcRequest::new(
        RequestId::Number(id),
        "tools/call",
        Some(json!({
            "name": "search_recipes",
            "arguments": {"query": query, "maxResults": max_results}
        })),
    ))
}

fn parse_matches(response: &Value) -> Vec<Value> {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .expect("Expected text in tool response");
    serde_json::from_str(text).expect("Expected JSON array in text")
}

// ─── Tests ─────────────────────────────────────────────────────────────────

/// Every session gets exactly its own responses, in order.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions_isolated() {
    const SESSIONS: i64 = 8;
    const REQUESTS: i64 = 10;

    let handler = create_handler(200).await;
    let manager = Arc::new(SessionManager::new());
    let barrier = Arc::new(Barrier::new(SESSIONS as usize));
    let mut handles = vec![];

    for session_num in 0..SESSIONS {
        let handler = handler.clone();
        let manager = manager.clone();
        let barrier = barrier.clone();

        handles.push(tokio::spawn(async move {
            let (tx, mut outbound) = mpsc::channel(64);
            let channel = SessionChannel::open(handler, tx, CancellationToken::new());
            let id = manager.create(channel.clone());
            let _guard = SessionGuard::new(manager.clone(), id);

            barrier.wait().await;

            let calls = (0..REQUESTS).map(|i| {
                let channel = channel.clone();
                async move {
                    let query = if i % 2 == 0 { "chicken" } else { "chili" };
                    channel.deliver(search(session_num * 100 + i, query, 5)).await
                }
            });
            for reply in futures::future::join_all(calls).await {
                let reply = reply.unwrap().unwrap();
                assert_eq!(parse_matches(&reply).len(), 5);
            }

            let ids: Vec<i64> = (0..REQUESTS)
                .map(|_| outbound.try_recv().unwrap()["id"].as_i64().unwrap())
                .collect();
            let expected: Vec<i64> = (0..REQUESTS).map(|i| session_num * 100 + i).collect();
            assert_eq!(ids, expected, "Session {session_num} saw foreign or reordered responses");
            assert!(outbound.try_recv().is_err());
            session_num
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(manager.count(), 0);
}

/// Sessions opened and closed in quick succession leave nothing behind.
#[tokio::test]
async fn test_rapid_open_close() {
    let handler = create_handler(10).await;
    let manager = Arc::new(SessionManager::new());

    for i in 0..100 {
        let (tx, _outbound) = mpsc::channel(4);
        let channel = SessionChannel::open(handler.clone(), tx, CancellationToken::new());
        let id = manager.create(channel.clone());
        let guard = SessionGuard::new(manager.clone(), id);

        if i % 2 == 0 {
            let session = manager.get(&id).expect("Session should be live");
            let reply = session.channel().deliver(search(i, "stew", 1)).await.unwrap();
            assert!(reply.is_some());
        }
        drop(guard);

        assert!(manager.get(&id).is_none());
        assert!(channel.deliver(search(i, "stew", 1)).await.is_err());
    }
    assert_eq!(manager.count(), 0);
}
