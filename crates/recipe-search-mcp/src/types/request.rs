//! MCP request parameter types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    /// Tool name.
    pub name: String,
    /// Untyped tool arguments; validated against the tool's schema before use.
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Parameters for `notifications/cancelled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledParams {
    /// The request being cancelled.
    pub request_id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
