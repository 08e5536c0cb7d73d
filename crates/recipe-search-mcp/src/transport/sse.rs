//! SSE transport: `GET /sse` opens a session, `POST /message` feeds it.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth;
use super::error::GatewayError;
use crate::protocol::ProtocolHandler;
use crate::session::{SessionChannel, SessionGuard, SessionId, SessionManager};
use crate::types::{JsonRpcMessage, McpError, McpResult};

pub const SSE_PATH: &str = "/sse";
pub const MESSAGE_PATH: &str = "/message";
pub const HEALTH_PATH: &str = "/health";

/// Responses buffered per stream before the worker waits on the client.
pub const OUTBOUND_CAPACITY: usize = 64;

const CORS_MAX_AGE: Duration = Duration::from_secs(84600);

/// Shared state of every route.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub handler: Arc<ProtocolHandler>,
    pub api_key: Arc<str>,
    /// Parent of every session's cancellation token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(handler: ProtocolHandler, api_key: impl Into<String>) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new()),
            handler: Arc::new(handler),
            api_key: Arc::from(api_key.into()),
            shutdown: CancellationToken::new(),
        }
    }
}

/// Build the gateway's router. `/health` is the only unauthenticated route.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(SSE_PATH, get(open_stream))
        .route(MESSAGE_PATH, post(post_message))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route(HEALTH_PATH, get(health))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive().max_age(CORS_MAX_AGE)),
        )
        .with_state(state)
}

async fn open_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Value>(OUTBOUND_CAPACITY);
    let cancel = state.shutdown.child_token();
    let channel = SessionChannel::open(state.handler.clone(), outbound_tx, cancel.clone());
    let id = state.sessions.create(channel);
    let guard = SessionGuard::new(state.sessions.clone(), id);
    let endpoint = format!("{MESSAGE_PATH}?sessionId={id}");

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint));

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                message = outbound_rx.recv() => message,
            };
            let Some(message) = next else { break };

            match Event::default().event("message").json_data(&message) {
                Ok(event) => yield Ok(event),
                Err(e) => tracing::warn!(session_id = %id, "Failed to encode SSE event: {e}"),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let id: SessionId = query
        .session_id
        .as_deref()
        .and_then(|raw| raw.parse().ok())
        .ok_or(GatewayError::SessionNotFound)?;
    let session = state
        .sessions
        .get(&id)
        .ok_or(GatewayError::SessionNotFound)?;

    let message: JsonRpcMessage = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::InvalidMessage(e.to_string()))?;

    match session.channel().deliver(message).await {
        Ok(Some(response)) => Ok(Json(response).into_response()),
        Ok(None) => Ok(StatusCode::ACCEPTED.into_response()),
        Err(e) => {
            tracing::debug!(session_id = %id, "Delivery failed: {e}");
            Err(GatewayError::SessionNotFound)
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "activeConnections": state.sessions.count(),
    }))
}

/// The HTTP server hosting the gateway.
pub struct SseTransport {
    state: AppState,
}

impl SseTransport {
    pub fn new(handler: ProtocolHandler, api_key: impl Into<String>) -> Self {
        Self {
            state: AppState::new(handler, api_key),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until Ctrl-C or until the shutdown token is cancelled.
    ///
    /// Cancelling the token ends every open stream, which lets graceful
    /// shutdown complete.
    pub async fn run(self, addr: SocketAddr) -> McpResult<()> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("SSE transport listening on {}", listener.local_addr()?);

        let shutdown = self.state.shutdown.clone();
        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        tracing::info!("SSE transport stopped");
        Ok(())
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => {
                tracing::warn!("Failed to listen for Ctrl-C: {e}");
                shutdown.cancelled().await;
            }
        },
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}
