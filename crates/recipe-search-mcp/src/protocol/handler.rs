//! Dispatch of JSON-RPC messages against the tool registry.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use super::negotiation::NegotiatedCapabilities;
use crate::schema;
use crate::tools::{ToolOutput, ToolRegistry};
use crate::types::{
    CallToolError, CancelledParams, InitializeParams, JsonRpcMessage, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, McpError, McpResult, ToolCallParams, ToolCallResult,
    ToolListResult,
};

/// Resolves and executes requests for one or more sessions.
///
/// Stateless apart from the shared registry; per-session handshake state is
/// passed in by the caller.
pub struct ProtocolHandler {
    registry: Arc<ToolRegistry>,
}

impl ProtocolHandler {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one inbound message. Returns the response for requests, `None`
    /// for notifications and client-sent responses.
    pub async fn handle_message(
        &self,
        session: &mut NegotiatedCapabilities,
        message: JsonRpcMessage,
    ) -> Option<Value> {
        match message {
            JsonRpcMessage::Request(request) => Some(self.handle_request(session, request).await),
            JsonRpcMessage::Notification(notification) => {
                self.handle_notification(session, notification);
                None
            }
            JsonRpcMessage::Response(response) => {
                tracing::debug!("Ignoring client response for request {}", response.id);
                None
            }
            JsonRpcMessage::Error(error) => {
                tracing::debug!(
                    "Ignoring client error for request {}: {}",
                    error.id,
                    error.error.message
                );
                None
            }
        }
    }

    async fn handle_request(
        &self,
        session: &mut NegotiatedCapabilities,
        request: JsonRpcRequest,
    ) -> Value {
        let id = request.id;
        let result = match request.method.as_str() {
            "initialize" => Self::initialize(session, request.params),
            "ping" => Ok(json!({})),
            "tools/list" => self.list_tools(),
            "tools/call" => self.handle_tool_call(request.params).await,
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        match result {
            Ok(value) => encode(JsonRpcResponse::new(id, value)),
            Err(e) => {
                tracing::warn!("Request {id} failed: {e}");
                encode(e.to_json_rpc_error(id))
            }
        }
    }

    fn handle_notification(
        &self,
        session: &mut NegotiatedCapabilities,
        notification: JsonRpcNotification,
    ) {
        match notification.method.as_str() {
            "notifications/initialized" | "initialized" => session.mark_initialized(),
            "notifications/cancelled" => {
                // Calls are not interruptible; the eventual result is still sent.
                if let Some(params) = notification
                    .params
                    .and_then(|p| serde_json::from_value::<CancelledParams>(p).ok())
                {
                    tracing::debug!("Client cancelled request {}", params.request_id);
                }
            }
            other => tracing::debug!("Ignoring notification {other}"),
        }
    }

    fn initialize(session: &mut NegotiatedCapabilities, params: Option<Value>) -> McpResult<Value> {
        let params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("initialize requires params".to_string()))?;
        Ok(serde_json::to_value(session.negotiate(params))?)
    }

    fn list_tools(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: self.registry.list(),
            next_cursor: None,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tool_call(&self, params: Option<Value>) -> McpResult<Value> {
        let params: ToolCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("tools/call requires params".to_string()))?;

        let result = match self.call_tool(&params.name, params.arguments).await {
            Ok(output) => ToolCallResult::from(output),
            Err(e) => {
                tracing::warn!("{e}");
                ToolCallResult::error(e.to_string())
            }
        };
        Ok(serde_json::to_value(result)?)
    }

    /// Resolve, validate and execute a tool.
    ///
    /// The executor runs in its own task: a panic surfaces as
    /// [`CallToolError::Execution`], and the call finishes even if the caller
    /// stops waiting.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolOutput, CallToolError> {
        let tool = self
            .registry
            .resolve(name)
            .ok_or_else(|| CallToolError::ToolNotFound(name.to_string()))?;

        let args = schema::validate(tool.input_schema(), arguments).map_err(|errors| {
            CallToolError::InvalidArguments {
                tool: name.to_string(),
                errors,
            }
        })?;

        let executor = tool.executor();
        let task = tokio::spawn(async move { executor.execute(args).await });

        match task.await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(CallToolError::Execution {
                tool: name.to_string(),
                message: format!("{e:#}"),
            }),
            Err(join_error) => Err(CallToolError::Execution {
                tool: name.to_string(),
                message: if join_error.is_panic() {
                    "tool panicked".to_string()
                } else {
                    join_error.to_string()
                },
            }),
        }
    }
}

fn encode(message: impl Serialize) -> Value {
    serde_json::to_value(message).unwrap_or_else(|e| {
        tracing::error!("Failed to encode response: {e}");
        Value::Null
    })
}
